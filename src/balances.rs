//! Opening-balance import from arbitrary accounting spreadsheets
//!
//! The sheet is scanned for a header row, column roles are inferred, and
//! every data row below the header becomes zero or more
//! [`ImportedBalanceRow`]s. Malformed rows never fail the import; they are
//! counted in [`ImportOutcome::skipped`].

use crate::amount::parse_amount;
use crate::category::{
    category_from_account_name, is_top_level_name, lookup_chart_of_accounts, normalize_category,
    normalize_label, Category,
};
use crate::columns::{find_header_row, resolve_columns, select_sheet, ColumnRoles, ImportOptions};
use crate::workbook::{SheetCell, Workbook};
use serde::Serialize;

/// Labels that head or total a statement rather than name an account
const STOP_LABELS: [&str; 10] = [
    "account",
    "total",
    "totals",
    "profit loss",
    "profit and loss",
    "balance sheet",
    "statement of financial position",
    "statement of profit or loss",
    "trial balance",
    "common trial balance accounts",
];

/// One imported account with its opening debit and credit
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedAccount {
    pub name: String,
    pub debit: f64,
    pub credit: f64,
    pub sub_category: String,
}

/// An account placed under its top-level category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportedBalanceRow {
    pub category: Category,
    pub account: ImportedAccount,
}

/// Result of importing one sheet
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub entries: Vec<ImportedBalanceRow>,
    /// Rows (or comma-separated names) dropped for lacking an account or category
    pub skipped: usize,
    /// Name of the imported sheet, when imported from a workbook
    pub sheet_name: Option<String>,
    /// Index of the header row within the sheet
    pub header_row: Option<usize>,
    pub roles: ColumnRoles,
}

/// Import a single sheet grid with default options
pub fn infer_import(grid: &[Vec<SheetCell>]) -> ImportOutcome {
    infer_import_with(grid, &ImportOptions::default())
}

pub fn infer_import_with(grid: &[Vec<SheetCell>], options: &ImportOptions) -> ImportOutcome {
    let header_row = find_header_row(grid, options.header_scan_rows).map(|(row, _)| row);
    import_rows(grid, header_row, options)
}

/// Import the most header-like sheet of a workbook with default options
pub fn infer_workbook_import(workbook: &Workbook) -> ImportOutcome {
    infer_workbook_import_with(workbook, &ImportOptions::default())
}

pub fn infer_workbook_import_with(workbook: &Workbook, options: &ImportOptions) -> ImportOutcome {
    let Some(choice) = select_sheet(workbook, options) else {
        log::warn!("workbook has no sheets");
        return ImportOutcome::default();
    };

    let sheet = &workbook.sheets[choice.sheet_index];
    log::debug!(
        "importing sheet {:?} (header row {:?}, score {})",
        sheet.name,
        choice.header_row,
        choice.score
    );

    let mut outcome = import_rows(&sheet.rows, choice.header_row, options);
    outcome.sheet_name = Some(sheet.name.clone());
    outcome
}

fn import_rows(rows: &[Vec<SheetCell>], header_row: Option<usize>, options: &ImportOptions) -> ImportOutcome {
    let (header, data, first_data_row) = match header_row {
        Some(index) => (Some(rows[index].as_slice()), &rows[index + 1..], index + 1),
        None => {
            log::warn!("no header row recognised, inferring columns from content");
            (None, rows, 0)
        }
    };

    let roles = resolve_columns(header, data, options);
    let mut outcome = ImportOutcome {
        header_row,
        roles,
        ..Default::default()
    };

    for (offset, row) in data.iter().enumerate() {
        if row.iter().all(SheetCell::is_blank) {
            continue;
        }
        materialize_row(row, &roles, first_data_row + offset, &mut outcome);
    }

    outcome
}

/// Whether an account label is a heading, total or bare category name
fn is_non_account_label(text: &str) -> bool {
    let label = normalize_label(text);
    label.is_empty()
        || STOP_LABELS.contains(&label.as_str())
        || label.starts_with("step")
        || is_top_level_name(&label)
}

fn materialize_row(row: &[SheetCell], roles: &ColumnRoles, row_index: usize, outcome: &mut ImportOutcome) {
    let cell = |column: Option<usize>| column.and_then(|c| row.get(c));
    let text_of = |column: Option<usize>| cell(column).map(SheetCell::as_text).unwrap_or_default();
    let amount_of = |column: Option<usize>| cell(column).map_or(0.0, parse_amount);

    let account = text_of(roles.account);
    if account.is_empty() {
        log::debug!("row {}: skipped, blank account", row_index);
        outcome.skipped += 1;
        return;
    }
    if is_non_account_label(&account) {
        log::debug!("row {}: skipped heading {:?}", row_index, account);
        outcome.skipped += 1;
        return;
    }

    let category_text = text_of(roles.category);
    let amounts = Amounts {
        debit: amount_of(roles.debit),
        credit: amount_of(roles.credit),
        balance: amount_of(roles.balance),
    };

    // A heading cell listing several accounts inline ("Cash, Bank") with no
    // amounts stands for one zero-balance account per name
    let names: Vec<&str> = if amounts.is_zero() && account.contains(',') {
        account.split(',').map(str::trim).filter(|n| !n.is_empty()).collect()
    } else {
        vec![account.as_str()]
    };

    for name in names {
        if is_non_account_label(name) {
            outcome.skipped += 1;
            continue;
        }
        match build_entry(name, &category_text, amounts) {
            Some(entry) => outcome.entries.push(entry),
            None => {
                log::debug!("row {}: skipped {:?}, no category and zero balance", row_index, name);
                outcome.skipped += 1;
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Amounts {
    debit: f64,
    credit: f64,
    balance: f64,
}

impl Amounts {
    fn is_zero(&self) -> bool {
        self.debit == 0.0 && self.credit == 0.0 && self.balance == 0.0
    }

    /// Signed net position, debit positive
    fn net(&self) -> f64 {
        if self.balance != 0.0 {
            self.balance
        } else {
            self.debit - self.credit
        }
    }

    /// Non-negative debit and credit for a resolved category
    fn sides(&self, category: Category) -> (f64, f64) {
        let (mut debit, mut credit) = (self.debit, self.credit);

        // A negative amount belongs on the opposite side
        if debit < 0.0 {
            credit -= debit;
            debit = 0.0;
        }
        if credit < 0.0 {
            debit -= credit;
            credit = 0.0;
        }

        if debit == 0.0 && credit == 0.0 && self.balance != 0.0 {
            if category.is_debit_normal() {
                if self.balance > 0.0 {
                    debit = self.balance;
                } else {
                    credit = -self.balance;
                }
            } else {
                // Credit-normal balances come either signed (negative) or as
                // presented (positive); both are credits
                credit = self.balance.abs();
            }
        }

        (debit, credit)
    }
}

/// Resolve the category of one account and build its entry
///
/// Category sources, in order: the explicit category cell, the chart of
/// accounts, keywords in the account name, then the sign of the net amount.
/// `None` when nothing resolves and the net amount is zero.
fn build_entry(name: &str, category_text: &str, amounts: Amounts) -> Option<ImportedBalanceRow> {
    let chart = lookup_chart_of_accounts(name);

    let category = normalize_category(category_text)
        .or(chart.map(|entry| entry.category))
        .or_else(|| category_from_account_name(name))
        .or_else(|| {
            let net = amounts.net();
            if net > 0.0 {
                Some(Category::Assets)
            } else if net < 0.0 {
                Some(Category::Liabilities)
            } else {
                None
            }
        })?;

    let (debit, credit) = amounts.sides(category);

    let sub_category = chart
        .filter(|entry| entry.category == category)
        .map(|entry| entry.sub_category.to_string())
        .or_else(|| {
            let label = normalize_label(category_text);
            (!label.is_empty() && !is_top_level_name(&label)).then(|| category_text.to_string())
        })
        .unwrap_or_default();

    Some(ImportedBalanceRow {
        category,
        account: ImportedAccount {
            name: name.to_string(),
            debit,
            credit,
            sub_category,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<SheetCell> {
        cells.iter().map(|c| SheetCell::from_text(c)).collect()
    }

    fn amounts(debit: f64, credit: f64, balance: f64) -> Amounts {
        Amounts { debit, credit, balance }
    }

    #[test]
    fn test_negative_amounts_flip_sides() {
        assert_eq!(amounts(-50.0, 0.0, 0.0).sides(Category::Assets), (0.0, 50.0));
        assert_eq!(amounts(0.0, -20.0, 0.0).sides(Category::Liabilities), (20.0, 0.0));
        assert_eq!(amounts(30.0, 10.0, 0.0).sides(Category::Assets), (30.0, 10.0));
    }

    #[test]
    fn test_balance_split_by_normal_side() {
        assert_eq!(amounts(0.0, 0.0, 250.0).sides(Category::Assets), (250.0, 0.0));
        assert_eq!(amounts(0.0, 0.0, -250.0).sides(Category::Expenses), (0.0, 250.0));
        assert_eq!(amounts(0.0, 0.0, -500.0).sides(Category::Liabilities), (0.0, 500.0));
        assert_eq!(amounts(0.0, 0.0, 800.0).sides(Category::Income), (0.0, 800.0));
    }

    #[test]
    fn test_non_account_labels() {
        assert!(is_non_account_label("TOTAL"));
        assert!(is_non_account_label("Profit & Loss"));
        assert!(is_non_account_label("Statement of Profit or Loss"));
        assert!(is_non_account_label("Step 2: review"));
        assert!(is_non_account_label("Liabilities"));
        assert!(is_non_account_label("--"));
        assert!(!is_non_account_label("Total assets held"));
        assert!(!is_non_account_label("Cash"));
        // The "step" prefix is matched on the bare label, names included
        assert!(is_non_account_label("Stephens loan"));
        assert!(is_non_account_label("Steps to reconcile"));
    }

    #[test]
    fn test_category_from_explicit_cell_beats_chart() {
        let entry = build_entry("Cash", "Expenses", amounts(10.0, 0.0, 0.0)).unwrap();
        assert_eq!(entry.category, Category::Expenses);
        assert_eq!(entry.account.sub_category, "");
    }

    #[test]
    fn test_unrecognised_category_cell_falls_through() {
        let entry = build_entry("Retained earnings", "BS-03", amounts(0.0, 900.0, 0.0)).unwrap();
        assert_eq!(entry.category, Category::Equity);
        assert_eq!(entry.account.sub_category, "Equity");
    }

    #[test]
    fn test_sign_fallback() {
        let entry = build_entry("Sundry", "", amounts(0.0, 0.0, -75.0)).unwrap();
        assert_eq!(entry.category, Category::Liabilities);
        assert_eq!((entry.account.debit, entry.account.credit), (0.0, 75.0));

        let entry = build_entry("Sundry", "", amounts(40.0, 0.0, 0.0)).unwrap();
        assert_eq!(entry.category, Category::Assets);

        assert!(build_entry("Sundry", "", amounts(0.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_statement_heading_category_cell_is_ignored() {
        let entry = build_entry("Sundry", "Profit or Loss", amounts(0.0, 100.0, 0.0)).unwrap();
        assert_eq!(entry.category, Category::Liabilities);
        assert_eq!((entry.account.debit, entry.account.credit), (0.0, 100.0));
    }

    #[test]
    fn test_step_rows_skipped() {
        let grid = vec![
            row(&["Account", "Debit", "Credit"]),
            row(&["Stephens loan", "", "100"]),
            row(&["Cash", "100", ""]),
        ];
        let outcome = infer_import(&grid);
        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(outcome.skipped, 1);
    }

    #[test]
    fn test_sub_category_from_cell_text() {
        let entry = build_entry("Sundry debtors", "Current Assets", amounts(5.0, 0.0, 0.0)).unwrap();
        assert_eq!(entry.category, Category::Assets);
        assert_eq!(entry.account.sub_category, "Current Assets");
    }

    #[test]
    fn test_blank_rows_not_counted() {
        let grid = vec![
            row(&["Account", "Debit", "Credit"]),
            row(&["", "", ""]),
            row(&["Cash", "10", ""]),
            row(&["", "5", ""]),
        ];
        let outcome = infer_import(&grid);
        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.header_row, Some(0));
    }

    #[test]
    fn test_serialized_shape() {
        let grid = vec![row(&["Account", "Category", "Debit", "Credit"]), row(&["Cash", "Assets", "100", "0"])];
        let json = serde_json::to_value(infer_import(&grid)).unwrap();
        assert_eq!(json["entries"][0]["category"], "Assets");
        assert_eq!(json["entries"][0]["account"]["name"], "Cash");
        assert_eq!(json["entries"][0]["account"]["subCategory"], "Current Assets");
        assert_eq!(json["skipped"], 0);
        assert_eq!(json["headerRow"], 0);
    }
}
