//! Record extraction.
//!
//! Turns a two-header-row [`Table`] into an ordered [`RecordSequence`]:
//!
//! - Row 0 holds human-readable titles and is ignored.
//! - Row 1 holds field names. Scanning stops at the first blank cell.
//! - Every later row is one record, until a row whose first cell is absent.
//!
//! # Empty cells in data rows
//!
//! Data rows are gap-compressed: cells holding exactly the empty string are
//! dropped before values are matched to fields by column index. Absent cells
//! keep their position. Empty-text cells must therefore only trail the
//! populated cells of a row, otherwise later values shift left onto the wrong
//! field.

mod record;


pub use record::{FieldMap, Record, RecordSequence};

use crate::error::{ConfgenError, Result};
use crate::table::{CellValue, Table};
use tracing::{debug, warn};

/// Row holding the human-readable titles.
const TITLE_ROW: usize = 0;

/// Row holding the field names.
const FIELD_ROW: usize = 1;

/// Options controlling extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Reject a field row that names the same field twice instead of letting the
    /// later column win.
    pub strict_fields: bool,
}

/// Extract the records of `table`.
///
/// # Returns
///
/// * `Ok(RecordSequence)` - One record per data row, all with the same keys
/// * `Err(ConfgenError::RowIndexOutOfRange)` - A data row is too short for the field row
/// * `Err(ConfgenError::DuplicateField)` - Duplicate field name in strict mode
pub fn extract(table: &Table, options: &ExtractOptions) -> Result<RecordSequence> {
    let rows = table.rows();
    debug!(sheet = table.name(), rows = rows.len(), "extracting records");

    let field_map = match rows.get(FIELD_ROW) {
        Some(row) => build_field_map(row, options)?,
        None => FieldMap::default(),
    };

    let mut records = Vec::new();
    for (index, row) in rows.iter().enumerate().skip(FIELD_ROW + 1) {
        if row.first().is_some_and(CellValue::is_absent) {
            debug!(row = index + 1, "first cell is empty, end of data");
            break;
        }

        let values: Vec<&CellValue> = row.iter().filter(|cell| !cell.is_empty_text()).collect();

        let mut record = Record::with_capacity(field_map.len());
        for (name, column) in field_map.iter() {
            let value = values
                .get(column)
                .ok_or_else(|| ConfgenError::RowIndexOutOfRange {
                    row: index + 1,
                    field: name.to_string(),
                    index: column,
                    available: values.len(),
                })?;
            // Absent cells display as the empty string.
            record.push(name, value.to_string());
        }
        records.push(record);
    }

    debug!(
        sheet = table.name(),
        skipped = TITLE_ROW + 1,
        fields = field_map.len(),
        records = records.len(),
        "extraction finished"
    );
    Ok(RecordSequence::new(field_map.names(), records))
}

/// Read field names from the field row, stopping at the first blank cell.
fn build_field_map(row: &[CellValue], options: &ExtractOptions) -> Result<FieldMap> {
    let mut field_map = FieldMap::default();
    for (column, cell) in row.iter().enumerate() {
        if cell.is_absent() || cell.is_empty_text() {
            break;
        }

        let name = cell.to_string();
        if let Some(first) = field_map.insert(&name, column) {
            if options.strict_fields {
                return Err(ConfgenError::DuplicateField {
                    name,
                    first: first + 1,
                    second: column + 1,
                });
            }
            warn!(
                field = %name,
                first_column = first + 1,
                column = column + 1,
                "duplicate field name, later column wins"
            );
        }
    }
    Ok(field_map)
}
