//! Office Open XML (`.xlsx` / `.xlsm`) workbook reader.
//!
//! Only what the extractor needs is decoded: the sheet list, the active
//! sheet, shared strings and raw cell values. Number formats are not applied,
//! so date cells come through as their serial numbers.

use super::reference::reference_to_index;
use super::xml::{XlsxError, XmlReader, attribute, push_reference};
use super::{CellValue, Table, TableSource};
use crate::error::{ConfgenError, Result};
use crate::match_xml_events;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

const TAG_RELATIONSHIP: &[u8] = b"Relationship";
const TAG_SHEET: QName = QName(b"sheet");
const TAG_WORKBOOK_VIEW: QName = QName(b"workbookView");
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");
const TAG_TEXT: QName = QName(b"t");
const TAG_ROW: QName = QName(b"row");
const TAG_CELL: QName = QName(b"c");
const TAG_INLINE_STRING: QName = QName(b"is");
const TAG_VALUE: QName = QName(b"v");

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// How a cell's raw `<v>` text must be interpreted (the `t` attribute).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Number,
    SharedString,
    Text,
    Boolean,
    Error,
}

impl CellKind {
    fn from_attribute(value: Option<&str>) -> Self {
        match value {
            Some("s") => CellKind::SharedString,
            Some("inlineStr") | Some("str") | Some("d") => CellKind::Text,
            Some("b") => CellKind::Boolean,
            Some("e") => CellKind::Error,
            _ => CellKind::Number,
        }
    }
}

/// An opened `.xlsx` workbook.
pub struct Workbook {
    path: PathBuf,
    zip: ZipArchive<File>,
    /// `(sheet name, part path)` in workbook order.
    sheets: Vec<(String, String)>,
    active: usize,
    shared_strings: Vec<String>,
}

impl std::fmt::Debug for Workbook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workbook")
            .field("path", &self.path)
            .field("sheets", &self.sheets)
            .field("active", &self.active)
            .finish()
    }
}

impl Workbook {
    /// Open a workbook and load its sheet list and shared strings.
    ///
    /// # Returns
    ///
    /// * `Err(ConfgenError::TableNotFound)` - The file does not exist
    /// * `Err(ConfgenError::TableRead)` - The file is not a readable workbook
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfgenError::TableNotFound(path.display().to_string()),
            _ => read_error(path, e),
        })?;

        Self::load(path, file).map_err(|e| read_error(path, e))
    }

    fn load(path: &Path, file: File) -> std::result::Result<Self, XlsxError> {
        let mut zip = ZipArchive::new(file)?;
        let relationships = load_relationships(&mut zip)?;
        let (sheets, active) = load_workbook(&mut zip, &relationships)?;
        let shared_strings = load_shared_strings(&mut zip)?;
        debug!(
            path = %path.display(),
            sheets = sheets.len(),
            shared_strings = shared_strings.len(),
            "opened workbook"
        );

        Ok(Self {
            path: path.to_path_buf(),
            zip,
            active: active.min(sheets.len().saturating_sub(1)),
            sheets,
            shared_strings,
        })
    }

    /// Name of the sheet that was active when the workbook was saved.
    pub fn active_sheet(&self) -> Option<&str> {
        self.sheets.get(self.active).map(|(name, _)| name.as_str())
    }

    fn read_sheet(&mut self, index: usize) -> std::result::Result<Table, XlsxError> {
        let (name, part) = self.sheets[index].clone();
        let cells = read_cells(&mut self.zip, &part, &self.shared_strings)?;
        debug!(sheet = %name, cells = cells.len(), "read worksheet");
        Ok(Table::new(name, into_rows(cells)))
    }
}

impl TableSource for Workbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.clone()).collect()
    }

    fn table(&mut self, sheet: Option<&str>) -> Result<Table> {
        let index = match sheet {
            None => {
                if self.sheets.is_empty() {
                    return Err(read_error(
                        &self.path,
                        XlsxError::MissingPart("worksheet".to_string()),
                    ));
                }
                self.active
            }
            Some(name) => self
                .sheets
                .iter()
                .position(|(sheet_name, _)| sheet_name == name)
                .ok_or_else(|| ConfgenError::SheetNotFound {
                    name: name.to_string(),
                    available: self.sheet_names(),
                })?,
        };

        let path = self.path.clone();
        self.read_sheet(index).map_err(|e| read_error(&path, e))
    }
}

fn read_error(path: &Path, error: impl std::fmt::Display) -> ConfgenError {
    ConfgenError::TableRead {
        path: path.display().to_string(),
        reason: error.to_string(),
    }
}

/// Open a part of the archive as an XML reader, matching the name case-insensitively.
fn xml_part<'z, R: Read + Seek>(
    zip: &'z mut ZipArchive<R>,
    name: &str,
) -> std::result::Result<Option<XmlReader<BufReader<zip::read::ZipFile<'z, R>>>>, XlsxError> {
    let found = zip
        .file_names()
        .find(|file_name| name.eq_ignore_ascii_case(file_name))
        .map(str::to_owned);
    match found {
        Some(file_name) => {
            let file = zip.by_name(&file_name)?;
            Ok(Some(XmlReader::new(BufReader::new(file))))
        }
        None => Ok(None),
    }
}

/// Relationship id → worksheet part path.
fn load_relationships<R: Read + Seek>(
    zip: &mut ZipArchive<R>,
) -> std::result::Result<HashMap<String, String>, XlsxError> {
    let mut reader = xml_part(zip, WORKBOOK_RELS_PART)?
        .ok_or_else(|| XlsxError::MissingPart(WORKBOOK_RELS_PART.to_string()))?;
    let mut relationships = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = attribute(&event, "Id")?;
            let kind = attribute(&event, "Type")?;
            let target = attribute(&event, "Target")?;
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_part_path(&target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Sheets in workbook order plus the active tab index.
fn load_workbook<R: Read + Seek>(
    zip: &mut ZipArchive<R>,
    relationships: &HashMap<String, String>,
) -> std::result::Result<(Vec<(String, String)>, usize), XlsxError> {
    let mut reader = xml_part(zip, WORKBOOK_PART)?
        .ok_or_else(|| XlsxError::MissingPart(WORKBOOK_PART.to_string()))?;
    let mut sheets = Vec::new();
    // Position in `sheets` of every tab, chart tabs included.
    let mut tabs: Vec<Option<usize>> = Vec::new();
    let mut active_tab = 0usize;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None;
            let mut id = None;
            for result in event.attributes() {
                let attribute = result?;
                match attribute.key.local_name().as_ref() {
                    b"name" => name = Some(attribute.unescape_value()?.to_string()),
                    b"id" => id = Some(attribute.unescape_value()?.to_string()),
                    _ => (),
                }
            }
            let part = id.and_then(|id| relationships.get(&id));
            match name.zip(part) {
                Some((name, part)) => {
                    tabs.push(Some(sheets.len()));
                    sheets.push((name, part.clone()));
                }
                None => tabs.push(None),
            }
        }
        Event::Start(event) if event.name() == TAG_WORKBOOK_VIEW => {
            if let Some(tab) = attribute(&event, "activeTab")? {
                active_tab = tab.parse::<usize>()?;
            }
        }
    });
    let active = tabs.get(active_tab).copied().flatten().unwrap_or(0);
    Ok((sheets, active))
}

fn load_shared_strings<R: Read + Seek>(
    zip: &mut ZipArchive<R>,
) -> std::result::Result<Vec<String>, XlsxError> {
    let mut strings = Vec::new();
    let Some(mut reader) = xml_part(zip, SHARED_STRINGS_PART)? else {
        return Ok(strings);
    };
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
            strings.push(read_text(&mut reader, TAG_SHARED_STRING_ITEM, false)?);
        }
    });
    Ok(strings)
}

/// Collect the text of an element up to `end_tag`, skipping phonetic runs.
///
/// When `is_text_content` is set the element's own text counts; otherwise only
/// text inside `<t>` children does.
fn read_text<R: std::io::BufRead>(
    reader: &mut XmlReader<R>,
    end_tag: QName,
    is_text_content: bool,
) -> std::result::Result<String, XlsxError> {
    let mut is_phonetic = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic = false,
        Event::Start(event) if !is_phonetic && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = is_text_content,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => push_reference(&mut text, &event)?,
    });
    Ok(text)
}

/// Read every valued cell of a worksheet into a `(row, col)` map.
fn read_cells<R: Read + Seek>(
    zip: &mut ZipArchive<R>,
    part: &str,
    shared_strings: &[String],
) -> std::result::Result<BTreeMap<(usize, usize), CellValue>, XlsxError> {
    let mut reader =
        xml_part(zip, part)?.ok_or_else(|| XlsxError::MissingPart(part.to_string()))?;
    let mut cells = BTreeMap::new();
    // Rows and cells may omit their `r` attribute, in which case position is implied
    // by document order.
    let mut row = 0usize;
    let mut next_row = 0usize;
    let mut next_col = 0usize;
    let mut position = (0usize, 0usize);
    let mut kind = CellKind::Number;
    let mut raw: Option<String> = None;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_ROW => {
            row = match attribute(&event, "r")? {
                Some(r) => r.parse::<usize>()?.saturating_sub(1),
                None => next_row,
            };
            next_row = row + 1;
            next_col = 0;
        }
        Event::Start(event) if event.name() == TAG_CELL => {
            position = attribute(&event, "r")?
                .and_then(|r| reference_to_index(&r))
                .unwrap_or((row, next_col));
            next_col = position.1 + 1;
            kind = CellKind::from_attribute(attribute(&event, "t")?.as_deref());
            raw = None;
        }
        Event::Start(event) if event.name() == TAG_VALUE => {
            raw = Some(read_text(&mut reader, TAG_VALUE, true)?);
        }
        Event::Start(event) if event.name() == TAG_INLINE_STRING => {
            raw = Some(read_text(&mut reader, TAG_INLINE_STRING, false)?);
        }
        Event::End(event) if event.name() == TAG_CELL => {
            if let Some(value) = raw.take() {
                let value = decode_cell(kind, value, shared_strings)?;
                if !value.is_absent() {
                    cells.insert(position, value);
                }
            }
        }
    });
    Ok(cells)
}

fn decode_cell(
    kind: CellKind,
    raw: String,
    shared_strings: &[String],
) -> std::result::Result<CellValue, XlsxError> {
    let value = match kind {
        CellKind::SharedString => {
            let index = raw.trim().parse::<usize>()?;
            let text = shared_strings
                .get(index)
                .ok_or(XlsxError::SharedStringIndex(index))?;
            CellValue::Text(text.clone())
        }
        CellKind::Text => CellValue::Text(raw),
        CellKind::Boolean => CellValue::Bool(matches!(raw.trim(), "1" | "true")),
        CellKind::Error => CellValue::Empty,
        CellKind::Number => match raw.trim().parse::<f64>() {
            Ok(number) => CellValue::Number(number),
            Err(_) => CellValue::Text(raw),
        },
    };
    Ok(value)
}

/// Lay sparse cells out as a rectangle anchored at `A1`, padding with `Empty`.
fn into_rows(cells: BTreeMap<(usize, usize), CellValue>) -> Vec<Vec<CellValue>> {
    let Some(height) = cells.keys().map(|(row, _)| row + 1).max() else {
        return Vec::new();
    };
    let width = cells.keys().map(|(_, col)| col + 1).max().unwrap_or(0);
    let mut rows = vec![vec![CellValue::Empty; width]; height];
    for ((row, col), value) in cells {
        rows[row][col] = value;
    }
    rows
}

fn to_part_path(target: &str) -> String {
    if let Some(stripped) = target.strip_prefix('/') {
        stripped.to_string()
    } else if target.starts_with("xl/") {
        target.to_string()
    } else {
        format!("xl/{target}")
    }
}
