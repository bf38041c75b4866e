//! Binding records into templates and streaming the results to a sink.

use super::{Template, TemplateError, line_of, mismatched_lines};
use crate::error::{ConfgenError, Result};
use crate::extract::RecordSequence;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Written to the sink after every rendered block.
pub const RECORD_SEPARATOR: &str = "\n\n\n";

/// Result of rendering one template file.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    /// The sink the blocks were written to.
    pub output_path: PathBuf,
    /// One block per record, in record order, without separators.
    pub blocks: Vec<String>,
}

/// Sink path for a template: the template path with `suffix` appended.
pub fn output_path(template: &Path, suffix: &str) -> PathBuf {
    let mut path = template.as_os_str().to_owned();
    path.push(suffix);
    PathBuf::from(path)
}

/// Render `text` once per record, writing each block to `sink`.
///
/// Blocks already written stay in the sink when a later record fails.
///
/// # Returns
///
/// * `Ok(Vec<String>)` - The rendered blocks in record order
/// * `Err(ConfgenError::MalformedTemplate)` - Broken brace syntax, with per-line diagnostics
/// * `Err(ConfgenError::UnresolvedPlaceholder)` - A placeholder names an unknown field
pub fn render_records<W: Write>(
    template_name: &str,
    text: &str,
    records: &RecordSequence,
    sink: &mut W,
) -> Result<Vec<String>> {
    let template =
        Template::parse(text).map_err(|e| malformed_template(template_name, text, &e))?;

    let mut blocks = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let block = template.render(record).map_err(|e| match e {
            TemplateError::UndefinedVariable { name, .. } => ConfgenError::UnresolvedPlaceholder {
                template: template_name.to_string(),
                key: name,
            },
            other => malformed_template(template_name, text, &other),
        })?;

        sink.write_all(block.as_bytes())
            .and_then(|()| sink.write_all(RECORD_SEPARATOR.as_bytes()))
            .map_err(|e| ConfgenError::Io(format!("failed to write rendered output: {}", e)))?;
        debug!(template = template_name, record = index + 1, "rendered record");
        blocks.push(block);
    }
    Ok(blocks)
}

/// Render the template at `template_path` into `<template_path><suffix>`.
///
/// The output file is truncated before the first record is rendered.
pub fn render_to_file(
    template_path: &Path,
    records: &RecordSequence,
    suffix: &str,
) -> Result<RenderOutcome> {
    let name = template_path.display().to_string();
    let text = read_template(template_path)?;

    let output_path = output_path(template_path, suffix);
    let file = File::create(&output_path).map_err(|e| {
        ConfgenError::Io(format!(
            "failed to create output file '{}': {}",
            output_path.display(),
            e
        ))
    })?;
    info!(template = %name, output = %output_path.display(), "rendering template");

    let mut sink = BufWriter::new(file);
    let result = render_records(&name, &text, records, &mut sink);
    // Flush what was rendered even when a later record failed.
    let flushed = sink.flush().map_err(|e| {
        ConfgenError::Io(format!(
            "failed to write output file '{}': {}",
            output_path.display(),
            e
        ))
    });
    let blocks = result?;
    flushed?;

    Ok(RenderOutcome {
        output_path,
        blocks,
    })
}

/// Read a template file with `\r\n` line endings folded to `\n`.
pub(crate) fn read_template(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfgenError::TemplateNotFound(path.display().to_string()),
        _ => ConfgenError::Io(format!(
            "failed to read template file '{}': {}",
            path.display(),
            e
        )),
    })?;
    Ok(text.replace("\r\n", "\n"))
}

/// Build the `MalformedTemplate` error for `error`, with per-line brace diagnostics.
pub(crate) fn malformed_template(
    template_name: &str,
    text: &str,
    error: &TemplateError,
) -> ConfgenError {
    ConfgenError::MalformedTemplate {
        template: template_name.to_string(),
        reason: format!("{} (line {})", error, line_of(text, error.position())),
        mismatched: mismatched_lines(text),
    }
}
