//! Reading-order line reconstruction from positioned text fragments
//!
//! PDF text extraction yields an unordered bag of glyph runs with baseline
//! coordinates only. This module sorts them top-to-bottom, groups runs that
//! share a vertical position into lines, and renders pages as plain text
//! blocks for the downstream extraction prompts.

use rayon::prelude::*;
use std::cmp::Ordering;

/// One positioned run of text extracted from a PDF page
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    /// The text content
    pub text: String,
    /// X position on page
    pub x: f32,
    /// Baseline Y position (PDF coordinates, origin at bottom-left)
    pub y: f32,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
        }
    }
}

/// A line of text (fragments sharing an inferred vertical position)
#[derive(Debug, Clone)]
pub struct TextLine {
    /// Fragments ordered left to right
    pub fragments: Vec<TextFragment>,
    /// Y of the topmost fragment that opened the line
    pub y: f32,
}

impl TextLine {
    /// Join the fragment texts left to right
    pub fn text(&self, separator: &str) -> String {
        self.fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// Options for line reconstruction
#[derive(Debug, Clone)]
pub struct LineOptions {
    /// Maximum Y distance from the line's reference before a new line starts
    pub y_tolerance: f32,
    /// Separator placed between fragments of the same line
    pub separator: String,
}

impl Default for LineOptions {
    fn default() -> Self {
        Self {
            y_tolerance: 8.0,
            // Two spaces keep column gaps visible in tabular statements
            separator: "  ".to_string(),
        }
    }
}

/// Reconstruct reading-ordered lines with default options
pub fn reconstruct_lines(fragments: Vec<TextFragment>) -> Vec<TextLine> {
    reconstruct_lines_with(fragments, &LineOptions::default())
}

/// Reconstruct reading-ordered lines from an unordered fragment collection
///
/// Fragments are sorted by Y descending (top of page first), then grouped
/// greedily: a fragment joins the current line when its Y is within
/// `y_tolerance` of the line's reference Y, and the reference then moves to
/// that fragment. The reference drifts along a chain of close fragments, so
/// endpoints of one line may be further apart than the tolerance.
pub fn reconstruct_lines_with(mut fragments: Vec<TextFragment>, options: &LineOptions) -> Vec<TextLine> {
    if fragments.is_empty() {
        return Vec::new();
    }

    fragments.sort_by(reading_order);

    let mut lines: Vec<TextLine> = Vec::new();
    let mut reference_y = f32::NAN;

    for fragment in fragments {
        // NaN never compares within tolerance, so it always opens a line
        let same_line = (fragment.y - reference_y).abs() <= options.y_tolerance;
        reference_y = fragment.y;

        match lines.last_mut() {
            Some(line) if same_line => line.fragments.push(fragment),
            _ => lines.push(TextLine {
                y: fragment.y,
                fragments: vec![fragment],
            }),
        }
    }

    for line in &mut lines {
        line.fragments.sort_by(|a, b| a.x.total_cmp(&b.x));
    }

    lines
}

/// Y descending, X ascending, text as the final tie-break so the result does
/// not depend on input order
fn reading_order(a: &TextFragment, b: &TextFragment) -> Ordering {
    b.y.total_cmp(&a.y)
        .then_with(|| a.x.total_cmp(&b.x))
        .then_with(|| a.text.cmp(&b.text))
}

/// Render the lines of a page as text, one line per row
pub fn lines_to_text(lines: &[TextLine], separator: &str) -> String {
    lines
        .iter()
        .map(|line| line.text(separator))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Marker placed before each page's text block
pub fn page_marker(page_number: usize) -> String {
    format!("--- Page {} ---", page_number)
}

/// Render one page (1-indexed) as a marker followed by its reconstructed lines
pub fn render_page(page_number: usize, fragments: Vec<TextFragment>, options: &LineOptions) -> String {
    let lines = reconstruct_lines_with(fragments, options);
    let body = lines_to_text(&lines, &options.separator);

    if body.is_empty() {
        page_marker(page_number)
    } else {
        format!("{}\n{}", page_marker(page_number), body)
    }
}

/// Render a whole document, one fragment collection per page
///
/// Pages are independent, so they are reconstructed in parallel; the output
/// keeps page order.
pub fn render_document(pages: Vec<Vec<TextFragment>>, options: &LineOptions) -> String {
    let blocks: Vec<String> = pages
        .into_par_iter()
        .enumerate()
        .map(|(index, fragments)| render_page(index + 1, fragments, options))
        .collect();

    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(text: &str, x: f32, y: f32) -> TextFragment {
        TextFragment::new(text, x, y)
    }

    #[test]
    fn test_statement_rows() {
        let fragments = vec![
            frag("100.00", 400.0, 680.0),
            frag("01/02", 50.0, 700.0),
            frag("Opening balance", 120.0, 700.0),
            frag("02/02", 50.0, 681.5),
            frag("Card payment", 120.0, 679.0),
        ];

        let lines = reconstruct_lines(fragments);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text("  "), "01/02  Opening balance");
        assert_eq!(lines[1].text("  "), "02/02  Card payment  100.00");
        assert_eq!(lines[0].y, 700.0);
    }

    #[test]
    fn test_tolerance_boundary() {
        let lines = reconstruct_lines(vec![frag("a", 0.0, 100.0), frag("b", 0.0, 92.0)]);
        assert_eq!(lines.len(), 1);

        let lines = reconstruct_lines(vec![frag("a", 0.0, 100.0), frag("b", 0.0, 91.9)]);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_custom_tolerance_and_separator() {
        let options = LineOptions {
            y_tolerance: 2.0,
            separator: " | ".to_string(),
        };
        let lines = reconstruct_lines_with(
            vec![frag("x", 10.0, 50.0), frag("w", 0.0, 51.0), frag("z", 0.0, 40.0)],
            &options,
        );
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(&options.separator), "w | x");
    }

    #[test]
    fn test_nan_y_starts_own_line() {
        let lines = reconstruct_lines(vec![frag("a", 0.0, 10.0), frag("b", 0.0, f32::NAN)]);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_render_empty_page() {
        assert_eq!(render_page(3, Vec::new(), &LineOptions::default()), "--- Page 3 ---");
    }

    #[test]
    fn test_render_document_page_order() {
        let pages = vec![
            vec![frag("first", 0.0, 10.0)],
            Vec::new(),
            vec![frag("third", 0.0, 10.0)],
        ];
        let text = render_document(pages, &LineOptions::default());
        assert_eq!(
            text,
            "--- Page 1 ---\nfirst\n\n--- Page 2 ---\n\n--- Page 3 ---\nthird"
        );
    }
}
