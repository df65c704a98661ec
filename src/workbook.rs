//! In-memory workbook model and loaders
//!
//! CSV files are read with the `csv` crate. Binary spreadsheet formats are
//! read with calamine when the `xlsx` feature is enabled.

use crate::ExtractError;
use std::io::Read;
use std::path::Path;

/// Raw spreadsheet cell value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SheetCell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl SheetCell {
    /// Build a cell from raw text, mapping blank text to `Empty`
    pub fn from_text(text: &str) -> Self {
        if text.trim().is_empty() {
            SheetCell::Empty
        } else {
            SheetCell::Text(text.to_string())
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            SheetCell::Empty => true,
            SheetCell::Text(text) => text.trim().is_empty(),
            SheetCell::Number(_) => false,
        }
    }

    /// Trimmed display text of the cell
    pub fn as_text(&self) -> String {
        match self {
            SheetCell::Empty => String::new(),
            SheetCell::Text(text) => text.trim().to_string(),
            SheetCell::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for SheetCell {
    fn from(text: &str) -> Self {
        SheetCell::from_text(text)
    }
}

impl From<f64> for SheetCell {
    fn from(n: f64) -> Self {
        SheetCell::Number(n)
    }
}

/// A named 2-D grid of cells
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<SheetCell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<SheetCell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// An ordered collection of sheets
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Read a headerless CSV as a single sheet
    pub fn from_csv_reader<R: Read>(name: &str, reader: R) -> Result<Self, ExtractError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(SheetCell::from_text).collect());
        }

        Ok(Self::new(vec![Sheet::new(name, rows)]))
    }

    /// Read a CSV file, naming the sheet after the file stem
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(&sheet_name_for(path), file)
    }
}

fn sheet_name_for(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Sheet1")
        .to_string()
}

/// Load a workbook, choosing the parser from the file extension
pub fn load_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook, ExtractError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match extension.as_str() {
        "csv" | "txt" => Workbook::from_csv_path(path),
        "xlsx" | "xlsm" | "xls" | "ods" => load_spreadsheet(path),
        other => Err(ExtractError::UnsupportedFormat(other.to_string())),
    }
}

#[cfg(feature = "xlsx")]
fn load_spreadsheet(path: &Path) -> Result<Workbook, ExtractError> {
    use calamine::{open_workbook_auto, Data, Reader};

    let mut workbook =
        open_workbook_auto(path).map_err(|e| ExtractError::Spreadsheet(e.to_string()))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = match workbook.worksheet_range(&name) {
            Ok(range) => range,
            Err(e) => {
                log::warn!("sheet {:?} unreadable, skipping: {}", name, e);
                continue;
            }
        };

        let rows = range
            .rows()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Data::Empty => SheetCell::Empty,
                        Data::Int(i) => SheetCell::Number(*i as f64),
                        Data::Float(f) => SheetCell::Number(*f),
                        Data::String(s) => SheetCell::from_text(s),
                        other => SheetCell::from_text(&other.to_string()),
                    })
                    .collect()
            })
            .collect();
        sheets.push(Sheet::new(name, rows));
    }

    Ok(Workbook::new(sheets))
}

#[cfg(not(feature = "xlsx"))]
fn load_spreadsheet(path: &Path) -> Result<Workbook, ExtractError> {
    Err(ExtractError::LibraryUnavailable(format!(
        "{} needs the `xlsx` feature (calamine)",
        path.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_reader_flexible_rows() {
        let data = "Account,Debit,Credit\nCash,100\n,,\nBank,0,50\n";
        let workbook = Workbook::from_csv_reader("Opening", data.as_bytes()).unwrap();
        assert_eq!(workbook.sheets.len(), 1);

        let sheet = &workbook.sheets[0];
        assert_eq!(sheet.name, "Opening");
        assert_eq!(sheet.rows.len(), 4);
        assert_eq!(sheet.rows[1], vec![SheetCell::Text("Cash".into()), SheetCell::Text("100".into())]);
        assert!(sheet.rows[2].iter().all(SheetCell::is_blank));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_workbook("balances.docx").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat(ext) if ext == "docx"));
    }

    #[cfg(not(feature = "xlsx"))]
    #[test]
    fn test_xlsx_without_feature() {
        let err = load_workbook("balances.xlsx").unwrap_err();
        assert!(matches!(err, ExtractError::LibraryUnavailable(_)));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(SheetCell::from_text("  "), SheetCell::Empty);
        assert_eq!(SheetCell::Text(" Cash ".into()).as_text(), "Cash");
        assert_eq!(SheetCell::Number(100.0).as_text(), "100");
        assert!(!SheetCell::Number(0.0).is_blank());
    }
}
