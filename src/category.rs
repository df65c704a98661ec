//! Top-level ledger categories and the rules that infer them
//!
//! A category comes from an explicit category cell, a static chart of
//! accounts keyed by account name, or keyword families matched inside the
//! account name, in that order.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Top-level ledger category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Assets,
    Liabilities,
    Equity,
    Income,
    Expenses,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Assets,
        Category::Liabilities,
        Category::Equity,
        Category::Income,
        Category::Expenses,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Assets => "Assets",
            Category::Liabilities => "Liabilities",
            Category::Equity => "Equity",
            Category::Income => "Income",
            Category::Expenses => "Expenses",
        }
    }

    /// Whether increases are recorded as debits (Assets, Expenses)
    pub fn is_debit_normal(&self) -> bool {
        matches!(self, Category::Assets | Category::Expenses)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lower-case, replace every non-alphanumeric character with a space and
/// collapse runs of whitespace ("Profit & Loss" -> "profit loss")
pub fn normalize_label(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Synonym families, in the priority used for account-name matching
const KEYWORD_FAMILIES: [(Category, &[&str]); 5] = [
    (Category::Equity, &["equity", "shareholder", "capital", "owner"]),
    (
        Category::Liabilities,
        &["liabilit", "payable", "overdraft", "loan", "debenture"],
    ),
    (
        Category::Expenses,
        &[
            "expense",
            "cost",
            "loss",
            "depreciation",
            "amortization",
            "amortisation",
            "impairment",
            "finance cost",
        ],
    ),
    (Category::Income, &["revenue", "income", "gain", "dividend", "profit"]),
    (Category::Assets, &["asset"]),
];

/// Section headings that name a statement rather than a category
const STATEMENT_HEADINGS: [&str; 6] = [
    "profit loss",
    "profit and loss",
    "profit or loss",
    "statement of profit or loss",
    "balance sheet",
    "statement of financial position",
];

/// Map an explicit category cell to a category
///
/// Statement headings on their own ("Profit & Loss", "Balance Sheet") carry
/// no category.
pub fn normalize_category(text: &str) -> Option<Category> {
    let label = normalize_label(text);
    if label.is_empty() || STATEMENT_HEADINGS.contains(&label.as_str()) {
        return None;
    }

    // Explicit cells name the category itself, so the most literal families
    // win before the looser ones ("Current Assets" must not become Income)
    let order = [
        Category::Assets,
        Category::Liabilities,
        Category::Equity,
        Category::Expenses,
        Category::Income,
    ];
    order.into_iter().find(|category| family_matches(*category, &label))
}

/// Pattern-match keyword families inside an account name
///
/// Families are checked in fixed priority: Equity, Liabilities, Expenses,
/// Income, Assets.
pub fn category_from_account_name(name: &str) -> Option<Category> {
    let label = normalize_label(name);
    KEYWORD_FAMILIES
        .iter()
        .map(|(category, _)| *category)
        .find(|category| family_matches(*category, &label))
}

fn family_matches(category: Category, label: &str) -> bool {
    KEYWORD_FAMILIES
        .iter()
        .find(|(c, _)| *c == category)
        .is_some_and(|(_, keywords)| keywords.iter().any(|k| label.contains(k)))
}

/// Whether a label is one of the bare top-level category names
pub fn is_top_level_name(label: &str) -> bool {
    matches!(
        label,
        "assets" | "liabilities" | "equity" | "income" | "expenses"
    )
}

/// A chart-of-accounts entry: category plus the sub-category it sits under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartEntry {
    pub category: Category,
    pub sub_category: &'static str,
}

/// Static chart of accounts keyed by normalized account name
pub static CHART_OF_ACCOUNTS: LazyLock<HashMap<&'static str, ChartEntry>> = LazyLock::new(|| {
    use Category::*;

    let entries: &[(&str, Category, &str)] = &[
        // Assets
        ("cash", Assets, "Current Assets"),
        ("cash in hand", Assets, "Current Assets"),
        ("cash on hand", Assets, "Current Assets"),
        ("petty cash", Assets, "Current Assets"),
        ("bank", Assets, "Current Assets"),
        ("cash at bank", Assets, "Current Assets"),
        ("bank account", Assets, "Current Assets"),
        ("cash and cash equivalents", Assets, "Current Assets"),
        ("accounts receivable", Assets, "Current Assets"),
        ("trade receivables", Assets, "Current Assets"),
        ("receivables", Assets, "Current Assets"),
        ("debtors", Assets, "Current Assets"),
        ("inventory", Assets, "Current Assets"),
        ("inventories", Assets, "Current Assets"),
        ("stock", Assets, "Current Assets"),
        ("prepaid expenses", Assets, "Current Assets"),
        ("prepayments", Assets, "Current Assets"),
        ("deposits", Assets, "Current Assets"),
        ("vat recoverable", Assets, "Current Assets"),
        ("input vat", Assets, "Current Assets"),
        ("property plant and equipment", Assets, "Non-Current Assets"),
        ("furniture and fixtures", Assets, "Non-Current Assets"),
        ("office equipment", Assets, "Non-Current Assets"),
        ("computer equipment", Assets, "Non-Current Assets"),
        ("motor vehicles", Assets, "Non-Current Assets"),
        ("vehicles", Assets, "Non-Current Assets"),
        ("land and buildings", Assets, "Non-Current Assets"),
        ("buildings", Assets, "Non-Current Assets"),
        ("intangible assets", Assets, "Non-Current Assets"),
        ("goodwill", Assets, "Non-Current Assets"),
        // Liabilities
        ("accounts payable", Liabilities, "Current Liabilities"),
        ("trade payables", Liabilities, "Current Liabilities"),
        ("creditors", Liabilities, "Current Liabilities"),
        ("accrued expenses", Liabilities, "Current Liabilities"),
        ("accruals", Liabilities, "Current Liabilities"),
        ("vat payable", Liabilities, "Current Liabilities"),
        ("output vat", Liabilities, "Current Liabilities"),
        ("corporate tax payable", Liabilities, "Current Liabilities"),
        ("bank overdraft", Liabilities, "Current Liabilities"),
        ("credit card", Liabilities, "Current Liabilities"),
        ("unearned revenue", Liabilities, "Current Liabilities"),
        ("deferred revenue", Liabilities, "Current Liabilities"),
        ("customer advances", Liabilities, "Current Liabilities"),
        ("employee end of service benefits", Liabilities, "Non-Current Liabilities"),
        ("end of service benefits", Liabilities, "Non-Current Liabilities"),
        ("long term loan", Liabilities, "Non-Current Liabilities"),
        ("bank loan", Liabilities, "Non-Current Liabilities"),
        ("lease liabilities", Liabilities, "Non-Current Liabilities"),
        // Equity
        ("share capital", Equity, "Equity"),
        ("capital", Equity, "Equity"),
        ("owner s equity", Equity, "Equity"),
        ("owners equity", Equity, "Equity"),
        ("retained earnings", Equity, "Equity"),
        ("drawings", Equity, "Equity"),
        ("owner drawings", Equity, "Equity"),
        ("statutory reserve", Equity, "Equity"),
        ("legal reserve", Equity, "Equity"),
        ("current account partners", Equity, "Equity"),
        // Income
        ("sales", Income, "Operating Income"),
        ("sales revenue", Income, "Operating Income"),
        ("service revenue", Income, "Operating Income"),
        ("revenue", Income, "Operating Income"),
        ("turnover", Income, "Operating Income"),
        ("consulting income", Income, "Operating Income"),
        ("interest income", Income, "Other Income"),
        ("other income", Income, "Other Income"),
        ("commission received", Income, "Other Income"),
        ("discount received", Income, "Other Income"),
        ("rental income", Income, "Other Income"),
        // Expenses
        ("cost of sales", Expenses, "Cost of Sales"),
        ("cost of goods sold", Expenses, "Cost of Sales"),
        ("purchases", Expenses, "Cost of Sales"),
        ("salaries", Expenses, "Operating Expenses"),
        ("salaries and wages", Expenses, "Operating Expenses"),
        ("wages", Expenses, "Operating Expenses"),
        ("rent", Expenses, "Operating Expenses"),
        ("rent expense", Expenses, "Operating Expenses"),
        ("utilities", Expenses, "Operating Expenses"),
        ("electricity", Expenses, "Operating Expenses"),
        ("telephone", Expenses, "Operating Expenses"),
        ("internet", Expenses, "Operating Expenses"),
        ("office supplies", Expenses, "Operating Expenses"),
        ("stationery", Expenses, "Operating Expenses"),
        ("advertising", Expenses, "Operating Expenses"),
        ("marketing", Expenses, "Operating Expenses"),
        ("insurance", Expenses, "Operating Expenses"),
        ("repairs and maintenance", Expenses, "Operating Expenses"),
        ("travel", Expenses, "Operating Expenses"),
        ("professional fees", Expenses, "Operating Expenses"),
        ("legal fees", Expenses, "Operating Expenses"),
        ("audit fees", Expenses, "Operating Expenses"),
        ("bank charges", Expenses, "Finance Costs"),
        ("interest expense", Expenses, "Finance Costs"),
        ("depreciation", Expenses, "Operating Expenses"),
        ("visa expenses", Expenses, "Operating Expenses"),
        ("licence fees", Expenses, "Operating Expenses"),
        ("license fees", Expenses, "Operating Expenses"),
    ];

    entries
        .iter()
        .map(|&(name, category, sub_category)| (name, ChartEntry { category, sub_category }))
        .collect()
});

/// Look an account name up in the static chart of accounts
pub fn lookup_chart_of_accounts(name: &str) -> Option<ChartEntry> {
    CHART_OF_ACCOUNTS.get(normalize_label(name).as_str()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  Profit & Loss "), "profit loss");
        assert_eq!(normalize_label("Cash-at-Bank"), "cash at bank");
        assert_eq!(normalize_label(""), "");
        assert_eq!(normalize_label("ÉTAT Financier"), "état financier");
        assert_eq!(normalize_label("KASSE/BANK Ü"), "kasse bank ü");
    }

    #[test]
    fn test_normalize_category_synonyms() {
        assert_eq!(normalize_category("Revenue"), Some(Category::Income));
        assert_eq!(normalize_category("Dividend received"), Some(Category::Income));
        assert_eq!(normalize_category("Finance cost"), Some(Category::Expenses));
        assert_eq!(normalize_category("Impairment"), Some(Category::Expenses));
        assert_eq!(normalize_category("Current Assets"), Some(Category::Assets));
        assert_eq!(normalize_category("Overdraft"), Some(Category::Liabilities));
        assert_eq!(normalize_category("Debentures"), Some(Category::Liabilities));
        assert_eq!(normalize_category("Owner"), Some(Category::Equity));
        assert_eq!(normalize_category("Shareholders' funds"), Some(Category::Equity));
    }

    #[test]
    fn test_statement_headings_have_no_category() {
        assert_eq!(normalize_category("Profit & Loss"), None);
        assert_eq!(normalize_category("Balance Sheet"), None);
        assert_eq!(normalize_category("Profit or Loss"), None);
        assert_eq!(normalize_category("Statement of Profit or Loss"), None);
        assert_eq!(normalize_category(""), None);
        assert_eq!(normalize_category("1010"), None);
    }

    #[test]
    fn test_account_name_priority() {
        // Equity outranks Liabilities, Liabilities outranks Assets
        assert_eq!(category_from_account_name("Owner loan"), Some(Category::Equity));
        assert_eq!(category_from_account_name("Accounts Payable"), Some(Category::Liabilities));
        assert_eq!(category_from_account_name("Loan to related asset co"), Some(Category::Liabilities));
        // Expenses outranks Income
        assert_eq!(category_from_account_name("Loss on disposal gain"), Some(Category::Expenses));
        assert_eq!(category_from_account_name("Fixed assets"), Some(Category::Assets));
        assert_eq!(category_from_account_name("Miscellaneous"), None);
    }

    #[test]
    fn test_chart_lookup() {
        let entry = lookup_chart_of_accounts("Cash at Bank").unwrap();
        assert_eq!(entry.category, Category::Assets);
        assert_eq!(entry.sub_category, "Current Assets");
        assert_eq!(lookup_chart_of_accounts("Retained Earnings").unwrap().category, Category::Equity);
        assert!(lookup_chart_of_accounts("Unknown thing").is_none());
    }

    #[test]
    fn test_debit_normal() {
        assert!(Category::Assets.is_debit_normal());
        assert!(Category::Expenses.is_debit_normal());
        assert!(!Category::Liabilities.is_debit_normal());
        assert!(!Category::Equity.is_debit_normal());
        assert!(!Category::Income.is_debit_normal());
    }
}
