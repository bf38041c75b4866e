//! Error types for the confgen CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use crate::template::LineMismatch;
use thiserror::Error;

/// Main error type for confgen operations.
///
/// Each variant maps to a process exit code through [`ConfgenError::exit_code`].
#[derive(Error, Debug)]
pub enum ConfgenError {
    /// The spreadsheet file does not exist.
    #[error("unable to find spreadsheet '{0}'")]
    TableNotFound(String),

    /// The spreadsheet exists but could not be decoded.
    #[error("failed to read spreadsheet '{path}': {reason}")]
    TableRead { path: String, reason: String },

    /// A named sheet selector did not resolve.
    #[error("unable to find sheet '{name}' inside spreadsheet (available: {})", .available.join(", "))]
    SheetNotFound {
        name: String,
        available: Vec<String>,
    },

    /// A template file could not be opened.
    #[error("unable to open template file '{0}'")]
    TemplateNotFound(String),

    /// A data row has fewer populated cells than the field row demands.
    #[error(
        "row {row} is malformed: field '{field}' maps to column {index} but the row only has {available} populated cells"
    )]
    RowIndexOutOfRange {
        row: usize,
        field: String,
        index: usize,
        available: usize,
    },

    /// The field row names the same field twice (strict mode only).
    #[error("field '{name}' is defined twice in the field row (columns {first} and {second})")]
    DuplicateField {
        name: String,
        first: usize,
        second: usize,
    },

    /// A template references a key the spreadsheet does not define.
    #[error(
        "found key '{key}' in template file {template} but not in the spreadsheet. Remove the key in the template or add it to the spreadsheet."
    )]
    UnresolvedPlaceholder { template: String, key: String },

    /// The template's brace syntax is broken.
    #[error("could not read template file {template}: {reason}{}", format_mismatches(.mismatched))]
    MalformedTemplate {
        template: String,
        reason: String,
        mismatched: Vec<LineMismatch>,
    },

    /// A push was requested without a device address.
    #[error("a device address is required to push configuration; use -i <address> or --ip-address <address>")]
    MissingAddress,

    /// The push command failed.
    #[error("push failed: {0}")]
    PushFailed(String),

    /// The push command exceeded its timeout.
    #[error(
        "push to {address} on port {port} timed out after {seconds}s; ensure the device is reachable"
    )]
    PushTimeout {
        address: String,
        port: u16,
        seconds: u64,
    },

    /// One or more templates failed; each failure was already reported.
    ///
    /// Carries the exit code of the first failure.
    #[error("{failed} of {total} templates failed")]
    TemplatesFailed {
        failed: usize,
        total: usize,
        exit_code: i32,
    },

    /// Invalid or unreadable configuration.
    #[error("{0}")]
    Config(String),

    /// Filesystem failure outside the cases above.
    #[error("{0}")]
    Io(String),
}

fn format_mismatches(mismatched: &[LineMismatch]) -> String {
    if mismatched.is_empty() {
        return String::new();
    }
    let mut out = String::from("\nThere is probably a curly bracket missing:");
    for m in mismatched {
        out.push_str(&format!(
            "\n  curly bracket mismatch on line {}: {}",
            m.line, m.content
        ));
    }
    out
}

impl ConfgenError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConfgenError::SheetNotFound { .. } => exit_codes::SHEET_NOT_FOUND,
            ConfgenError::TemplateNotFound(_) => exit_codes::TEMPLATE_NOT_FOUND,
            ConfgenError::UnresolvedPlaceholder { .. } => exit_codes::UNRESOLVED_PLACEHOLDER,
            ConfgenError::PushFailed(_) => exit_codes::PUSH_FAILURE,
            ConfgenError::MissingAddress => exit_codes::MISSING_ADDRESS,
            ConfgenError::PushTimeout { .. } => exit_codes::PUSH_TIMEOUT,
            ConfgenError::TemplatesFailed { exit_code, .. } => *exit_code,
            ConfgenError::TableNotFound(_)
            | ConfgenError::TableRead { .. }
            | ConfgenError::RowIndexOutOfRange { .. }
            | ConfgenError::DuplicateField { .. }
            | ConfgenError::MalformedTemplate { .. }
            | ConfgenError::Config(_)
            | ConfgenError::Io(_) => exit_codes::USER_ERROR,
        }
    }
}

/// Result type alias for confgen operations.
pub type Result<T> = std::result::Result<T, ConfgenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_not_found_lists_available_sheets() {
        let err = ConfgenError::SheetNotFound {
            name: "Core".to_string(),
            available: vec!["Access".to_string(), "Edge".to_string()],
        };
        assert_eq!(err.exit_code(), exit_codes::SHEET_NOT_FOUND);
        assert_eq!(
            err.to_string(),
            "unable to find sheet 'Core' inside spreadsheet (available: Access, Edge)"
        );
    }

    #[test]
    fn unresolved_placeholder_names_key_and_template() {
        let err = ConfgenError::UnresolvedPlaceholder {
            template: "vlan.txt".to_string(),
            key: "vlan_id".to_string(),
        };
        assert_eq!(err.exit_code(), exit_codes::UNRESOLVED_PLACEHOLDER);
        let msg = err.to_string();
        assert!(msg.contains("'vlan_id'"));
        assert!(msg.contains("vlan.txt"));
    }

    #[test]
    fn malformed_template_lists_each_mismatched_line() {
        let err = ConfgenError::MalformedTemplate {
            template: "t.txt".to_string(),
            reason: "single '{' encountered on line 2".to_string(),
            mismatched: vec![LineMismatch {
                line: 2,
                content: "vlan {vlan".to_string(),
            }],
        };
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
        assert_eq!(
            err.to_string(),
            "could not read template file t.txt: single '{' encountered on line 2\n\
             There is probably a curly bracket missing:\n  \
             curly bracket mismatch on line 2: vlan {vlan"
        );
    }

    #[test]
    fn push_errors_have_distinct_exit_codes() {
        assert_eq!(
            ConfgenError::PushFailed("auth".into()).exit_code(),
            exit_codes::PUSH_FAILURE
        );
        assert_eq!(
            ConfgenError::MissingAddress.exit_code(),
            exit_codes::MISSING_ADDRESS
        );
        let timeout = ConfgenError::PushTimeout {
            address: "10.0.0.1".into(),
            port: 22,
            seconds: 5,
        };
        assert_eq!(timeout.exit_code(), exit_codes::PUSH_TIMEOUT);
    }

    #[test]
    fn templates_failed_keeps_first_exit_code() {
        let err = ConfgenError::TemplatesFailed {
            failed: 2,
            total: 3,
            exit_code: exit_codes::TEMPLATE_NOT_FOUND,
        };
        assert_eq!(err.exit_code(), exit_codes::TEMPLATE_NOT_FOUND);
        assert_eq!(err.to_string(), "2 of 3 templates failed");
    }

    #[test]
    fn extraction_errors_are_user_errors() {
        let err = ConfgenError::RowIndexOutOfRange {
            row: 4,
            field: "vlan".into(),
            index: 1,
            available: 1,
        };
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
        assert!(err.to_string().starts_with("row 4 is malformed"));
        assert_eq!(
            ConfgenError::TableNotFound("x.xlsx".into()).exit_code(),
            exit_codes::USER_ERROR
        );
    }
}
