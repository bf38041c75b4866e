//! Logical spreadsheet model.
//!
//! A [`Table`] is a rectangular grid of [`CellValue`]s read from one sheet of a
//! workbook. Row 0 and row 1 are the two header rows consumed by
//! [`crate::extract`]; everything below them is data.
//!
//! Tables are produced by a [`TableSource`], which resolves either the
//! workbook's active sheet or a sheet selected by name. [`Workbook`] is the
//! `.xlsx` implementation.

mod reference;
mod xlsx;
mod xml;

pub use xlsx::Workbook;

use crate::error::Result;
use std::fmt;

/// The value held by a single cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    /// No value at all (the cell is absent from the sheet).
    #[default]
    Empty,
    /// Text content, possibly the empty string.
    Text(String),
    /// A numeric value.
    Number(f64),
    /// A boolean value.
    Bool(bool),
}

impl CellValue {
    /// True for the "no value" sentinel.
    pub fn is_absent(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// True only for a text cell holding exactly the empty string.
    pub fn is_empty_text(&self) -> bool {
        matches!(self, CellValue::Text(text) if text.is_empty())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(text) => f.write_str(text),
            // Integral numbers come out of spreadsheets as floats; show them the way
            // the sheet does.
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(true) => f.write_str("True"),
            CellValue::Bool(false) => f.write_str("False"),
        }
    }
}

/// A single sheet materialized as rows of cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    name: String,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Create a table from already materialized rows.
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// The sheet name this table was read from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All rows in sheet order.
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Something that can hand out tables by sheet selector.
pub trait TableSource {
    /// Names of the available sheets, in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// Read the active sheet (`None`) or the sheet with the given name.
    ///
    /// Fails with `SheetNotFound` when the name does not resolve.
    fn table(&mut self, sheet: Option<&str>) -> Result<Table>;
}
