//! Positioned text fragment extraction from PDF using lopdf
//!
//! Each page's content stream is walked while tracking the graphics and text
//! state, and every shown string becomes a [`TextFragment`] at the origin of
//! the current text matrix in page space.

use crate::lines::TextFragment;
use crate::ExtractError;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;
use std::path::Path;

type PageFonts<'a> = BTreeMap<Vec<u8>, &'a Dictionary>;

const IDENTITY: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Extract fragments from a PDF file, one collection per page in page order
pub fn extract_page_fragments<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<TextFragment>>, ExtractError> {
    let doc = Document::load(path)?;
    fragments_from_doc(&doc)
}

/// Extract fragments from a PDF memory buffer
pub fn extract_page_fragments_mem(buffer: &[u8]) -> Result<Vec<Vec<TextFragment>>, ExtractError> {
    let doc = Document::load_mem(buffer)?;
    fragments_from_doc(&doc)
}

fn fragments_from_doc(doc: &Document) -> Result<Vec<Vec<TextFragment>>, ExtractError> {
    if doc.is_encrypted() {
        return Err(ExtractError::Encrypted);
    }

    // get_pages is keyed by page number, so iteration is already in page order
    let pages = doc
        .get_pages()
        .into_iter()
        .map(|(page_num, page_id)| match page_fragments(doc, page_id) {
            Ok(fragments) => fragments,
            Err(e) => {
                log::warn!("page {}: content not decodable, treating as empty: {}", page_num, e);
                Vec::new()
            }
        })
        .collect();

    Ok(pages)
}

/// Multiply two 2D transformation matrices in PDF `[a b c d e f]` form
fn multiply_matrices(m1: &[f32; 6], m2: &[f32; 6]) -> [f32; 6] {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

/// Graphics and text state while walking a content stream
struct TextState {
    ctm: [f32; 6],
    ctm_stack: Vec<[f32; 6]>,
    font: String,
    font_size: f32,
    leading: f32,
    text_matrix: [f32; 6],
    line_matrix: [f32; 6],
    in_text_block: bool,
}

impl TextState {
    fn new() -> Self {
        Self {
            ctm: IDENTITY,
            ctm_stack: Vec::new(),
            font: String::new(),
            font_size: 12.0,
            leading: 0.0,
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            in_text_block: false,
        }
    }

    fn translate_line(&mut self, tx: f32, ty: f32) {
        // Td offsets are expressed in the line matrix's own space
        let translation = [1.0, 0.0, 0.0, 1.0, tx, ty];
        self.line_matrix = multiply_matrices(&translation, &self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = if self.leading != 0.0 {
            self.leading
        } else {
            self.font_size * 1.2
        };
        self.translate_line(0.0, -leading);
    }

    /// Page-space origin of the current text matrix
    fn origin(&self) -> (f32, f32) {
        let combined = multiply_matrices(&self.text_matrix, &self.ctm);
        (combined[4], combined[5])
    }

    fn apply(&mut self, op: &Operation, doc: &Document, fonts: &PageFonts, out: &mut Vec<TextFragment>) {
        let operands = &op.operands;
        match op.operator.as_str() {
            "q" => self.ctm_stack.push(self.ctm),
            "Q" => {
                if let Some(saved) = self.ctm_stack.pop() {
                    self.ctm = saved;
                }
            }
            "cm" => {
                if let Some(matrix) = matrix_operand(operands) {
                    self.ctm = multiply_matrices(&matrix, &self.ctm);
                }
            }
            "BT" => {
                self.in_text_block = true;
                self.text_matrix = IDENTITY;
                self.line_matrix = IDENTITY;
            }
            "ET" => self.in_text_block = false,
            "Tf" => {
                if operands.len() >= 2 {
                    if let Ok(name) = operands[0].as_name() {
                        self.font = String::from_utf8_lossy(name).to_string();
                    }
                    if let Some(size) = get_number(&operands[1]) {
                        self.font_size = size;
                    }
                }
            }
            "TL" => {
                if let Some(leading) = operands.first().and_then(get_number) {
                    self.leading = leading;
                }
            }
            "Td" | "TD" => {
                if operands.len() >= 2 {
                    let tx = get_number(&operands[0]).unwrap_or(0.0);
                    let ty = get_number(&operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        self.leading = -ty;
                    }
                    self.translate_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(matrix) = matrix_operand(operands) {
                    self.text_matrix = matrix;
                    self.line_matrix = matrix;
                }
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(text) = operands.first().and_then(|o| decode_operand(o, doc, fonts, &self.font)) {
                    self.emit(text, out);
                }
            }
            "TJ" => {
                if let Some(Ok(array)) = operands.first().map(Object::as_array) {
                    let text: String = array
                        .iter()
                        .filter_map(|item| decode_operand(item, doc, fonts, &self.font))
                        .collect();
                    self.emit(text, out);
                }
            }
            "'" => {
                self.next_line();
                if let Some(text) = operands.first().and_then(|o| decode_operand(o, doc, fonts, &self.font)) {
                    self.emit(text, out);
                }
            }
            "\"" => {
                // aw ac string
                self.next_line();
                if let Some(text) = operands.get(2).and_then(|o| decode_operand(o, doc, fonts, &self.font)) {
                    self.emit(text, out);
                }
            }
            _ => {}
        }
    }

    fn emit(&self, text: String, out: &mut Vec<TextFragment>) {
        if !self.in_text_block || text.trim().is_empty() {
            return;
        }
        let (x, y) = self.origin();
        out.push(TextFragment { text, x, y });
    }
}

/// Extract fragments from a single page
fn page_fragments(doc: &Document, page_id: ObjectId) -> Result<Vec<TextFragment>, ExtractError> {
    let fonts = doc.get_page_fonts(page_id).unwrap_or_default();
    let content_data = doc.get_page_content(page_id)?;
    let content = Content::decode(&content_data)?;

    let mut state = TextState::new();
    let mut fragments = Vec::new();
    for op in &content.operations {
        state.apply(op, doc, &fonts, &mut fragments);
    }

    Ok(fragments)
}

fn matrix_operand(operands: &[Object]) -> Option<[f32; 6]> {
    if operands.len() < 6 {
        return None;
    }
    let mut matrix = IDENTITY;
    for (i, operand) in operands.iter().take(6).enumerate() {
        matrix[i] = get_number(operand).unwrap_or(IDENTITY[i]);
    }
    Some(matrix)
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Decode a string operand with the current font's encoding
fn decode_operand(obj: &Object, doc: &Document, fonts: &PageFonts, current_font: &str) -> Option<String> {
    let Object::String(bytes, _) = obj else {
        return None;
    };

    if let Some(font_dict) = fonts.get(current_font.as_bytes()) {
        if let Ok(encoding) = font_dict.get_font_encoding(doc) {
            if let Ok(text) = Document::decode_text(&encoding, bytes) {
                return Some(text);
            }
        }
    }

    Some(decode_fallback(bytes))
}

/// UTF-16BE when a byte-order mark is present, Latin-1 otherwise
fn decode_fallback(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE_u8, 0xFF][..]) {
        let utf16: Vec<u16> = rest
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiply_identity() {
        let m = [2.0, 0.0, 0.0, 2.0, 10.0, 20.0];
        assert_eq!(multiply_matrices(&m, &IDENTITY), m);
        assert_eq!(multiply_matrices(&IDENTITY, &m), m);
    }

    #[test]
    fn test_td_is_relative_to_line_start() {
        let mut state = TextState::new();
        state.in_text_block = true;
        state.translate_line(72.0, 700.0);
        state.translate_line(0.0, -14.0);
        assert_eq!(state.origin(), (72.0, 686.0));
    }

    #[test]
    fn test_next_line_uses_leading() {
        let mut state = TextState::new();
        state.translate_line(50.0, 500.0);
        state.leading = 10.0;
        state.next_line();
        assert_eq!(state.origin(), (50.0, 490.0));
    }

    #[test]
    fn test_origin_applies_ctm() {
        let mut state = TextState::new();
        state.ctm = [1.0, 0.0, 0.0, 1.0, 0.0, 100.0];
        state.translate_line(10.0, 10.0);
        assert_eq!(state.origin(), (10.0, 110.0));
    }

    #[test]
    fn test_emit_skips_whitespace_and_outside_text_block() {
        let mut state = TextState::new();
        let mut out = Vec::new();
        state.emit("outside".into(), &mut out);
        state.in_text_block = true;
        state.emit("   ".into(), &mut out);
        state.emit("inside".into(), &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "inside");
    }

    #[test]
    fn test_decode_fallback() {
        assert_eq!(decode_fallback(b"Caf\xe9"), "Café");
        assert_eq!(decode_fallback(&[0xFE, 0xFF, 0x00, 0x41, 0x00, 0x42]), "AB");
    }
}
