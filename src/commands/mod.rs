//! Command implementations for confgen.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the record loading shared by all of them.

mod check;
mod generate;
mod records;


use crate::cli::{Command, SourceArgs};
use crate::config::Config;
use crate::error::{ConfgenError, Result};
use crate::extract::{ExtractOptions, RecordSequence, extract};
use crate::table::{TableSource, Workbook};
use std::path::Path;
use tracing::info;

/// Dispatch a command to its implementation.
///
/// The config is resolved once here and handed to the command.
pub fn dispatch(command: Command, config_path: Option<&Path>) -> Result<()> {
    let config = Config::discover(config_path)?;
    match command {
        Command::Generate(args) => generate::cmd_generate(args, &config),
        Command::Records(args) => records::cmd_records(args, &config),
        Command::Check(args) => check::cmd_check(args, &config),
    }
}

/// Open the spreadsheet named by `source` and extract its records.
fn load_records(source: &SourceArgs, config: &Config) -> Result<RecordSequence> {
    let mut workbook = Workbook::open(&source.spreadsheet)?;
    if source.sheet.is_none() {
        info!(sheet = workbook.active_sheet().unwrap_or_default(), "using active sheet");
    }
    let options = ExtractOptions {
        strict_fields: source.strict_fields || config.strict_fields,
    };
    read_records(&mut workbook, source.sheet.as_deref(), &options)
}

/// Select a table from `tables` and extract its records.
fn read_records<S: TableSource + ?Sized>(
    tables: &mut S,
    sheet: Option<&str>,
    options: &ExtractOptions,
) -> Result<RecordSequence> {
    let table = tables.table(sheet)?;
    info!(sheet = table.name(), rows = table.len(), "selected sheet");
    extract(&table, options)
}

/// Track per-template failures without stopping at the first one.
#[derive(Default)]
struct Failures {
    count: usize,
    first_exit_code: Option<i32>,
}

impl Failures {
    /// Report a template that failed with `error`.
    fn record(&mut self, error: &ConfgenError) {
        self.record_all(std::slice::from_ref(error));
    }

    /// Report a template that failed with every one of `errors`.
    fn record_all(&mut self, errors: &[ConfgenError]) {
        for error in errors {
            eprintln!("Error: {}", error);
            self.first_exit_code.get_or_insert(error.exit_code());
        }
        if !errors.is_empty() {
            self.count += 1;
        }
    }

    fn into_result(self, total: usize) -> Result<()> {
        match self.first_exit_code {
            None => Ok(()),
            Some(exit_code) => Err(ConfgenError::TemplatesFailed {
                failed: self.count,
                total,
                exit_code,
            }),
        }
    }
}
