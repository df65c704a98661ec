//! Document heuristics for DocuFlow accounting workflows
//!
//! This crate provides:
//! - Positioned text extraction from PDF statements using lopdf
//! - Reading-order line reconstruction with `--- Page N ---` markers
//! - Opening-balance import from arbitrary spreadsheets, with header
//!   detection, column role inference and category resolution

pub mod amount;
pub mod balances;
pub mod category;
pub mod columns;
pub mod extractor;
pub mod lines;
pub mod workbook;

pub use balances::{
    infer_import, infer_import_with, infer_workbook_import, infer_workbook_import_with,
    ImportOutcome, ImportedAccount, ImportedBalanceRow,
};
pub use category::Category;
pub use columns::{ColumnRoles, ImportOptions};
pub use extractor::{extract_page_fragments, extract_page_fragments_mem};
pub use lines::{reconstruct_lines, render_document, LineOptions, TextFragment, TextLine};
pub use workbook::{load_workbook, Sheet, SheetCell, Workbook};

use std::path::Path;

/// Plain-text rendering of a statement PDF
#[derive(Debug)]
pub struct StatementText {
    /// Page blocks, each prefixed with `--- Page N ---`
    pub text: String,
    /// Page count
    pub page_count: u32,
    /// 1-indexed pages with no text layer (scanned pages needing OCR)
    pub pages_without_text: Vec<u32>,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

impl StatementText {
    /// Whether no page carried extractable text
    pub fn is_scanned(&self) -> bool {
        self.page_count > 0 && self.pages_without_text.len() as u32 == self.page_count
    }
}

/// Extract a statement PDF as reading-ordered text
pub fn statement_text<P: AsRef<Path>>(path: P) -> Result<StatementText, ExtractError> {
    let start = std::time::Instant::now();
    let pages = extract_page_fragments(path)?;
    Ok(build_statement_text(pages, start))
}

/// Extract a statement PDF held in memory
pub fn statement_text_mem(buffer: &[u8]) -> Result<StatementText, ExtractError> {
    let start = std::time::Instant::now();
    let pages = extract_page_fragments_mem(buffer)?;
    Ok(build_statement_text(pages, start))
}

fn build_statement_text(pages: Vec<Vec<TextFragment>>, start: std::time::Instant) -> StatementText {
    let page_count = pages.len() as u32;
    let pages_without_text: Vec<u32> = pages
        .iter()
        .enumerate()
        .filter(|(_, fragments)| fragments.is_empty())
        .map(|(i, _)| i as u32 + 1)
        .collect();

    if !pages_without_text.is_empty() {
        log::debug!("pages without a text layer: {:?}", pages_without_text);
    }

    let text = render_document(pages, &LineOptions::default());

    StatementText {
        text,
        page_count,
        pages_without_text,
        processing_time_ms: start.elapsed().as_millis() as u64,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("PDF is encrypted")]
    Encrypted,
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),
    #[error("spreadsheet parser unavailable: {0}")]
    LibraryUnavailable(String),
    #[error("unsupported file format: {0:?}")]
    UnsupportedFormat(String),
}

impl From<lopdf::Error> for ExtractError {
    fn from(e: lopdf::Error) -> Self {
        ExtractError::Parse(e.to_string())
    }
}
