//! Lenient numeric parsing for spreadsheet amount cells

use crate::workbook::SheetCell;
use once_cell::sync::Lazy;
use regex::Regex;

/// ISO codes seen on trial balances; any other word makes the cell text
const CURRENCY_CODES: &str =
    "AED|AUD|BHD|CAD|CHF|CNY|EGP|EUR|GBP|HKD|INR|JPY|KWD|NZD|OMR|PKR|QAR|SAR|SGD|USD|ZAR";

/// Leading or trailing currency code set apart from the digits
/// ("AED 1,200", "USD.500", "1,200 USD")
static CURRENCY_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?:{codes})(?:\.\s*|\s+)|\s+(?:{codes})$",
        codes = CURRENCY_CODES
    ))
    .unwrap()
});

/// What is left once separators and symbols are gone must be a plain number
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-+]?(\d+\.?\d*|\.\d+)$").unwrap());

/// Parse an amount string
///
/// Accepts thousands separators, currency symbols and codes, and accounting
/// negatives in parentheses (`(123)` is `-123`). Returns `None` when the text
/// is not a number.
pub fn parse_amount_text(raw: &str) -> Option<f64> {
    let mut s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let mut negative = false;
    if let Some(inner) = s.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
        negative = true;
        s = inner.trim();
    }

    let without_code = CURRENCY_CODE_RE.replace_all(s, "");
    let cleaned: String = without_code
        .chars()
        .filter(|c| !is_ignorable(*c))
        .collect();

    if !NUMBER_RE.is_match(&cleaned) {
        return None;
    }

    let value: f64 = cleaned.parse().ok()?;
    Some(if negative { -value.abs() } else { value })
}

fn is_ignorable(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | '\'' | '$' | '€' | '£' | '¥' | '₹')
}

/// Numeric value of a cell, 0 for empty or non-numeric cells
pub fn parse_amount(cell: &SheetCell) -> f64 {
    cell_number(cell).unwrap_or(0.0)
}

/// Numeric value of a cell, `None` for empty or non-numeric cells
pub fn cell_number(cell: &SheetCell) -> Option<f64> {
    match cell {
        SheetCell::Number(n) if n.is_finite() => Some(*n),
        SheetCell::Number(_) | SheetCell::Empty => None,
        SheetCell::Text(text) => parse_amount_text(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(parse_amount_text("100"), Some(100.0));
        assert_eq!(parse_amount_text("-42.5"), Some(-42.5));
        assert_eq!(parse_amount_text(".5"), Some(0.5));
    }

    #[test]
    fn test_separators_and_symbols() {
        assert_eq!(parse_amount_text("1,234,567.89"), Some(1_234_567.89));
        assert_eq!(parse_amount_text("$ 1,200"), Some(1200.0));
        assert_eq!(parse_amount_text("€300"), Some(300.0));
        assert_eq!(parse_amount_text("AED 1,500.00"), Some(1500.0));
        assert_eq!(parse_amount_text("2,000 USD"), Some(2000.0));
        assert_eq!(parse_amount_text("SAR. 75"), Some(75.0));
        assert_eq!(parse_amount_text("(GBP 40)"), Some(-40.0));
    }

    #[test]
    fn test_parenthesized_negative() {
        assert_eq!(parse_amount_text("(123)"), Some(-123.0));
        assert_eq!(parse_amount_text("(1,000.50)"), Some(-1000.5));
        assert_eq!(parse_amount_text("($75)"), Some(-75.0));
    }

    #[test]
    fn test_not_numbers() {
        assert_eq!(parse_amount_text(""), None);
        assert_eq!(parse_amount_text("-"), None);
        assert_eq!(parse_amount_text("Cash"), None);
        assert_eq!(parse_amount_text("Assets"), None);
        assert_eq!(parse_amount_text("12 Main St"), None);
        assert_eq!(parse_amount_text("Van 2"), None);
        assert_eq!(parse_amount_text("VAT 5"), None);
        assert_eq!(parse_amount_text("Car 3"), None);
        assert_eq!(parse_amount_text("2 usd"), None);
        assert_eq!(parse_amount_text("USD1,000"), None);
    }

    #[test]
    fn test_cells() {
        assert_eq!(parse_amount(&SheetCell::Number(12.5)), 12.5);
        assert_eq!(parse_amount(&SheetCell::Empty), 0.0);
        assert_eq!(parse_amount(&SheetCell::Text("n/a".into())), 0.0);
        assert_eq!(parse_amount(&SheetCell::Number(f64::NAN)), 0.0);
    }
}
