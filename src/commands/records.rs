//! Implementation of the `confgen records` command.

use super::load_records;
use crate::cli::RecordsArgs;
use crate::config::Config;
use crate::error::{ConfgenError, Result};
use crate::extract::RecordSequence;

/// Print the extracted records as a tab-separated table or JSON.
pub fn cmd_records(args: RecordsArgs, config: &Config) -> Result<()> {
    let records = load_records(&args.source, config)?;
    let rendered = if args.json {
        serde_json::to_string_pretty(records.records())
            .map_err(|e| ConfgenError::Io(format!("failed to serialize records: {}", e)))?
    } else {
        format_records(&records)
    };
    println!("{}", rendered);
    Ok(())
}

/// Field names on the first line, then one tab-separated line per record.
pub(crate) fn format_records(records: &RecordSequence) -> String {
    let mut lines = vec![records.fields().join("\t")];
    for record in records {
        let values: Vec<&str> = record.iter().map(|(_, value)| value).collect();
        lines.push(values.join("\t"));
    }
    lines.join("\n")
}
