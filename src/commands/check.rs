//! Implementation of the `confgen check` command.
//!
//! Parses every template and compares its placeholders with the spreadsheet's
//! fields. Nothing is rendered and no output file is touched.

use super::{Failures, load_records};
use crate::cli::CheckArgs;
use crate::config::Config;
use crate::error::{ConfgenError, Result};
use crate::template::{Template, malformed_template, read_template};
use std::path::Path;

/// Execute the `confgen check` command.
pub fn cmd_check(args: CheckArgs, config: &Config) -> Result<()> {
    let records = load_records(&args.source, config)?;
    println!(
        "Read {} entries with fields: {}",
        records.len(),
        records.fields().join(", ")
    );

    let mut failures = Failures::default();
    for template in &args.templates {
        match check_template(template, records.fields()) {
            Ok(count) => println!("{}: OK ({} placeholders)", template.display(), count),
            Err(errors) => failures.record_all(&errors),
        }
    }
    failures.into_result(args.templates.len())
}

/// Check one template against `fields`.
///
/// Returns the number of distinct placeholders, or every problem found.
pub(crate) fn check_template(
    path: &Path,
    fields: &[String],
) -> std::result::Result<usize, Vec<ConfgenError>> {
    let name = path.display().to_string();
    let text = read_template(path).map_err(|e| vec![e])?;

    let template =
        Template::parse(&text).map_err(|e| vec![malformed_template(&name, &text, &e)])?;

    let unknown: Vec<ConfgenError> = template
        .unknown_placeholders(fields)
        .into_iter()
        .map(|key| ConfgenError::UnresolvedPlaceholder {
            template: name.clone(),
            key: key.to_string(),
        })
        .collect();
    if !unknown.is_empty() {
        return Err(unknown);
    }
    Ok(template.placeholders().len())
}
