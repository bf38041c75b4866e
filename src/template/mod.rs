//! Template engine for flat placeholder substitution.
//!
//! Templates are plain configuration text with `{name}` placeholders. Each
//! placeholder is replaced with the value of the field `name`; there are no
//! loops, conditionals or format specifications.
//!
//! # Syntax
//!
//! - `{name}` - Substitutes the value of field `name` (the exact text between braces)
//! - `{{` - Renders as literal `{`
//! - `}}` - Renders as literal `}`
//!
//! # Error Handling
//!
//! Errors come in two tiers:
//!
//! - Syntax errors (a `{` not closed on its own line, a stray `}`, `{}` or a
//!   `{` inside a placeholder) are detected when the template is parsed, before any record
//!   is rendered.
//! - A placeholder naming a field the record does not have fails the render.
//!   Missing fields are never rendered as empty strings.

mod binder;


pub use binder::{RECORD_SEPARATOR, RenderOutcome, output_path, render_records, render_to_file};
pub(crate) use binder::{malformed_template, read_template};

use crate::extract::Record;
use std::collections::HashMap;
use std::fmt;

/// Error type for template parsing and rendering failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A placeholder names a field that was not provided.
    UndefinedVariable {
        /// The name of the undefined field.
        name: String,
        /// Byte offset of the placeholder's `{`.
        position: usize,
    },
    /// A `{` was found without a matching `}` on the same line.
    UnmatchedOpenBrace { position: usize },
    /// A `}` was found outside a placeholder and not doubled.
    UnmatchedCloseBrace { position: usize },
    /// A `{` was found inside a placeholder name.
    NestedBrace { position: usize },
    /// An empty placeholder `{}`.
    EmptyVariableName { position: usize },
}

impl TemplateError {
    pub fn position(&self) -> usize {
        match self {
            TemplateError::UndefinedVariable { position, .. }
            | TemplateError::UnmatchedOpenBrace { position }
            | TemplateError::UnmatchedCloseBrace { position }
            | TemplateError::NestedBrace { position }
            | TemplateError::EmptyVariableName { position } => *position,
        }
    }
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::UndefinedVariable { name, position } => {
                write!(
                    f,
                    "undefined variable '{}' at position {} in template",
                    name, position
                )
            }
            TemplateError::UnmatchedOpenBrace { position } => {
                write!(f, "single '{{' encountered at position {}", position)
            }
            TemplateError::UnmatchedCloseBrace { position } => {
                write!(f, "single '}}' encountered at position {}", position)
            }
            TemplateError::NestedBrace { position } => {
                write!(f, "unexpected '{{' in field name at position {}", position)
            }
            TemplateError::EmptyVariableName { position } => {
                write!(f, "empty placeholder '{{}}' at position {}", position)
            }
        }
    }
}

impl std::error::Error for TemplateError {}

/// A line whose `{` and `}` counts differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMismatch {
    /// 1-based line number.
    pub line: usize,
    /// The line's text.
    pub content: String,
}

/// Report every line of `text` with unequal `{` and `}` counts.
///
/// This only localizes likely culprits: a line such as `}{` balances and is not
/// reported even though it is malformed.
pub fn mismatched_lines(text: &str) -> Vec<LineMismatch> {
    text.split('\n')
        .enumerate()
        .filter(|(_, line)| line.matches('{').count() != line.matches('}').count())
        .map(|(index, line)| LineMismatch {
            line: index + 1,
            content: line.to_string(),
        })
        .collect()
}

/// 1-based line number of a byte offset in `text`.
pub fn line_of(text: &str, position: usize) -> usize {
    text[..position.min(text.len())].matches('\n').count() + 1
}

/// Source of placeholder values.
pub trait Variables {
    fn lookup(&self, name: &str) -> Option<&str>;
}

impl Variables for Record {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name)
    }
}

impl Variables for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder { name: String, position: usize },
}

/// A parsed template, reusable across any number of renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse template text, rejecting malformed brace syntax.
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = text.char_indices().peekable();

        while let Some((pos, ch)) = chars.next() {
            match ch {
                '{' => {
                    if let Some((_, '{')) = chars.peek() {
                        chars.next();
                        literal.push('{');
                        continue;
                    }

                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some((_, '}')) => break,
                            // Placeholders never span lines.
                            Some((_, '\n')) | None => {
                                return Err(TemplateError::UnmatchedOpenBrace { position: pos });
                            }
                            Some((nested, '{')) => {
                                return Err(TemplateError::NestedBrace { position: nested });
                            }
                            Some((_, c)) => name.push(c),
                        }
                    }

                    if name.is_empty() {
                        return Err(TemplateError::EmptyVariableName { position: pos });
                    }

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder {
                        name,
                        position: pos,
                    });
                }
                '}' => {
                    if let Some((_, '}')) = chars.peek() {
                        chars.next();
                        literal.push('}');
                    } else {
                        return Err(TemplateError::UnmatchedCloseBrace { position: pos });
                    }
                }
                _ => literal.push(ch),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    /// Distinct placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder { name, .. } = segment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Placeholder names that are not among `fields`.
    pub fn unknown_placeholders<S: AsRef<str>>(&self, fields: &[S]) -> Vec<&str> {
        self.placeholders()
            .into_iter()
            .filter(|name| !fields.iter().any(|field| field.as_ref() == *name))
            .collect()
    }

    /// Substitute every placeholder from `variables`.
    ///
    /// Fails with [`TemplateError::UndefinedVariable`] on the first placeholder
    /// `variables` cannot resolve.
    pub fn render<V: Variables + ?Sized>(&self, variables: &V) -> Result<String, TemplateError> {
        let mut result = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => result.push_str(text),
                Segment::Placeholder { name, position } => match variables.lookup(name) {
                    Some(value) => result.push_str(value),
                    None => {
                        return Err(TemplateError::UndefinedVariable {
                            name: name.clone(),
                            position: *position,
                        });
                    }
                },
            }
        }
        Ok(result)
    }
}

/// Parse and render in one step.
pub fn render_template<V: Variables + ?Sized>(
    template: &str,
    variables: &V,
) -> Result<String, TemplateError> {
    Template::parse(template)?.render(variables)
}

/// Helper to create a variables map from a list of key-value pairs.
pub fn vars<I, K, V>(pairs: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
