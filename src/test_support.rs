use crate::error::{ConfgenError, Result};
use crate::table::{CellValue, Table, TableSource};
use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not thread-safe.
        // Lock it so tests don't race even if a #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// Build a table where every cell is text (`""` stays an empty-text cell).
pub(crate) fn text_table(rows: &[&[&str]]) -> Table {
    Table::new(
        "Sheet1",
        rows.iter()
            .map(|row| row.iter().map(|cell| CellValue::from(*cell)).collect())
            .collect(),
    )
}

/// In-memory stand-in for a workbook.
pub(crate) struct MemorySource {
    pub(crate) tables: Vec<Table>,
    pub(crate) active: usize,
}

impl TableSource for MemorySource {
    fn sheet_names(&self) -> Vec<String> {
        self.tables.iter().map(|t| t.name().to_string()).collect()
    }

    fn table(&mut self, sheet: Option<&str>) -> Result<Table> {
        match sheet {
            None => Ok(self.tables[self.active].clone()),
            Some(name) => self
                .tables
                .iter()
                .find(|t| t.name() == name)
                .cloned()
                .ok_or_else(|| ConfgenError::SheetNotFound {
                    name: name.to_string(),
                    available: self.sheet_names(),
                }),
        }
    }
}

/// Description of a minimal `.xlsx` file for tests.
///
/// Cells that parse as numbers are written as numeric cells, `""` cells are
/// left out entirely and everything else goes through the shared string table.
/// Chart tabs are listed in the workbook but carry no cells.
#[derive(Default)]
pub(crate) struct XlsxFixture {
    sheets: Vec<(String, Option<Vec<Vec<String>>>)>,
    active: usize,
}

impl XlsxFixture {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn sheet(mut self, name: &str, rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        self.sheets.push((name.to_string(), Some(rows)));
        self
    }

    pub(crate) fn chart(mut self, name: &str) -> Self {
        self.sheets.push((name.to_string(), None));
        self
    }

    pub(crate) fn active(mut self, index: usize) -> Self {
        self.active = index;
        self
    }
}

/// Write `fixture` to `dir/name` and return the path.
pub(crate) fn write_xlsx(dir: &Path, name: &str, fixture: &XlsxFixture) -> PathBuf {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    let mut shared: Vec<String> = Vec::new();
    let mut worksheets = Vec::new();
    for rows in fixture.sheets.iter().filter_map(|(_, rows)| rows.as_ref()) {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
        );
        for (r, row) in rows.iter().enumerate() {
            write!(xml, r#"<row r="{}">"#, r + 1).unwrap();
            for (c, cell) in row.iter().enumerate() {
                if cell.is_empty() {
                    continue;
                }
                let reference = format!("{}{}", column_letters(c), r + 1);
                if cell.parse::<f64>().is_ok() {
                    write!(xml, r#"<c r="{reference}"><v>{cell}</v></c>"#).unwrap();
                } else {
                    let index = shared.len();
                    shared.push(cell.clone());
                    write!(xml, r#"<c r="{reference}" t="s"><v>{index}</v></c>"#).unwrap();
                }
            }
            xml.push_str("</row>");
        }
        xml.push_str("</sheetData></worksheet>");
        worksheets.push(xml);
    }

    let mut workbook = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><bookViews><workbookView activeTab="{}"/></bookViews><sheets>"#,
        fixture.active
    );
    let mut rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    let (mut worksheet_number, mut chart_number) = (0, 0);
    for (i, (name, rows)) in fixture.sheets.iter().enumerate() {
        write!(
            workbook,
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape(name),
            i + 1,
            i + 1
        )
        .unwrap();
        let (kind, target) = if rows.is_some() {
            worksheet_number += 1;
            ("worksheet", format!("worksheets/sheet{worksheet_number}.xml"))
        } else {
            chart_number += 1;
            ("chartsheet", format!("chartsheets/sheet{chart_number}.xml"))
        };
        write!(
            rels,
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/{kind}" Target="{target}"/>"#,
            i + 1
        )
        .unwrap();
    }
    workbook.push_str("</sheets></workbook>");
    rels.push_str("</Relationships>");

    let mut strings = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );
    for s in &shared {
        write!(strings, "<si><t>{}</t></si>", escape(s)).unwrap();
    }
    strings.push_str("</sst>");

    zip.start_file("xl/workbook.xml", options).unwrap();
    zip.write_all(workbook.as_bytes()).unwrap();
    zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
    zip.write_all(rels.as_bytes()).unwrap();
    zip.start_file("xl/sharedStrings.xml", options).unwrap();
    zip.write_all(strings.as_bytes()).unwrap();
    for (i, xml) in worksheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)
            .unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
    path
}

fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
