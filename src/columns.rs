//! Column role inference for balance spreadsheets
//!
//! Roles are resolved in three passes: header keywords, positional defaults
//! conditioned on sheet width, then statistics over cell contents. A column
//! is never claimed by two roles.

use crate::amount::cell_number;
use crate::category::normalize_category;
use crate::workbook::{Sheet, SheetCell, Workbook};
use serde::Serialize;

/// Options for spreadsheet import
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Leading rows searched for a header row on each sheet
    pub header_scan_rows: usize,
    /// Data rows sampled for the content-statistics pass
    pub statistics_sample_rows: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            header_scan_rows: 10,
            statistics_sample_rows: 50,
        }
    }
}

/// Logical column role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Account,
    Category,
    Debit,
    Credit,
    Balance,
}

impl Role {
    const ALL: [Role; 5] = [Role::Account, Role::Category, Role::Debit, Role::Credit, Role::Balance];

    fn weight(&self) -> u32 {
        match self {
            Role::Account => 3,
            Role::Category | Role::Debit | Role::Credit => 2,
            Role::Balance => 1,
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Role::Account => &["account"],
            Role::Category => &["category", "categories", "heading", "type", "group"],
            Role::Debit => &["debit", "dr"],
            Role::Credit => &["credit", "cr"],
            Role::Balance => &["balance", "amount", "net"],
        }
    }
}

/// Column index per role, `None` when unassigned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ColumnRoles {
    pub account: Option<usize>,
    pub category: Option<usize>,
    pub debit: Option<usize>,
    pub credit: Option<usize>,
    pub balance: Option<usize>,
}

impl ColumnRoles {
    pub fn get(&self, role: Role) -> Option<usize> {
        match role {
            Role::Account => self.account,
            Role::Category => self.category,
            Role::Debit => self.debit,
            Role::Credit => self.credit,
            Role::Balance => self.balance,
        }
    }

    fn slot(&mut self, role: Role) -> &mut Option<usize> {
        match role {
            Role::Account => &mut self.account,
            Role::Category => &mut self.category,
            Role::Debit => &mut self.debit,
            Role::Credit => &mut self.credit,
            Role::Balance => &mut self.balance,
        }
    }

    /// Whether some role already holds this column
    pub fn is_claimed(&self, column: usize) -> bool {
        Role::ALL.iter().any(|role| self.get(*role) == Some(column))
    }

    /// Assign a role if it is still open and the column is free
    fn claim(&mut self, role: Role, column: usize) -> bool {
        if self.get(role).is_some() || self.is_claimed(column) {
            return false;
        }
        *self.slot(role) = Some(column);
        true
    }

    fn has_amounts(&self) -> bool {
        self.debit.is_some() || self.credit.is_some() || self.balance.is_some()
    }
}

/// Header-like cell text: camel-case words split apart, then lower-cased
/// ("AccountName" -> "account name")
fn header_text(cell: &SheetCell) -> String {
    let SheetCell::Text(text) = cell else {
        return String::new();
    };

    let mut split = String::with_capacity(text.len() + 4);
    let mut after_lower = false;
    for c in text.trim().chars() {
        if c.is_uppercase() && after_lower {
            split.push(' ');
        }
        after_lower = c.is_lowercase() || c.is_numeric();
        split.push(c);
    }
    split.to_lowercase()
}

/// Whether header text hits one of the role's keywords
///
/// Keywords match whole tokens, optionally pluralised: "Debit Balance",
/// "DebitAmount" and "Accounts" match, "Creditors" and "Drawings" do not.
fn header_matches(text: &str, role: Role) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .any(|token| {
            let singular = token.strip_suffix('s').unwrap_or(token);
            role.keywords().iter().any(|k| token == *k || singular == *k)
        })
}

/// Rows holding amounts are data, not headers; whole years are allowed
/// ("Account", "2023")
fn is_data_row(row: &[SheetCell]) -> bool {
    row.iter().filter_map(cell_number).any(|v| {
        let is_year = v.fract() == 0.0 && (1900.0..=2100.0).contains(&v);
        !is_year
    })
}

/// Weighted count of roles recognised in a candidate header row
///
/// Single-cell rows are titles ("Trial Balance as at 31 Dec") and rows with
/// amounts are data; both score zero.
pub fn score_header_row(row: &[SheetCell]) -> u32 {
    let filled = row.iter().filter(|cell| !cell.is_blank()).count();
    if filled < 2 || is_data_row(row) {
        return 0;
    }
    let texts: Vec<String> = row.iter().map(header_text).collect();
    Role::ALL
        .iter()
        .filter(|role| texts.iter().any(|t| header_matches(t, **role)))
        .map(Role::weight)
        .sum()
}

/// Best header row among the first `scan_rows` rows, with its score
pub fn find_header_row(rows: &[Vec<SheetCell>], scan_rows: usize) -> Option<(usize, u32)> {
    let mut best: Option<(usize, u32)> = None;
    for (index, row) in rows.iter().take(scan_rows).enumerate() {
        let score = score_header_row(row);
        if score > 0 && best.map_or(true, |(_, s)| score > s) {
            best = Some((index, score));
        }
    }
    best
}

/// The sheet chosen for import and where its header sits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetChoice {
    pub sheet_index: usize,
    pub header_row: Option<usize>,
    pub score: u32,
}

/// Pick the most header-like sheet
///
/// Ties go to a sheet whose name mentions "opening", then to the earlier
/// sheet. Returns `None` only for a workbook without sheets.
pub fn select_sheet(workbook: &Workbook, options: &ImportOptions) -> Option<SheetChoice> {
    let mut best: Option<(SheetChoice, bool)> = None;

    for (sheet_index, sheet) in workbook.sheets.iter().enumerate() {
        let header = find_header_row(&sheet.rows, options.header_scan_rows);
        let choice = SheetChoice {
            sheet_index,
            header_row: header.map(|(row, _)| row),
            score: header.map_or(0, |(_, score)| score),
        };
        let opening = is_opening_sheet(sheet);

        let better = match best {
            None => true,
            Some((current, current_opening)) => {
                choice.score > current.score || (choice.score == current.score && opening && !current_opening)
            }
        };
        if better {
            best = Some((choice, opening));
        }
    }

    best.map(|(choice, _)| choice)
}

fn is_opening_sheet(sheet: &Sheet) -> bool {
    sheet.name.to_lowercase().contains("opening")
}

/// Per-column content statistics over sampled data rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnStats {
    /// Non-empty cells holding words rather than numbers
    pub text: usize,
    /// Cells that parse as amounts
    pub numeric: usize,
    /// Cells naming an accounting category
    pub category: usize,
}

pub fn column_stats(rows: &[Vec<SheetCell>], width: usize) -> Vec<ColumnStats> {
    let mut stats = vec![ColumnStats::default(); width];
    for row in rows {
        for (column, cell) in row.iter().enumerate().take(width) {
            if cell.is_blank() {
                continue;
            }
            if cell_number(cell).is_some() {
                stats[column].numeric += 1;
                continue;
            }
            let text = cell.as_text();
            if text.chars().any(char::is_alphabetic) {
                stats[column].text += 1;
                if normalize_category(&text).is_some() {
                    stats[column].category += 1;
                }
            }
        }
    }
    stats
}

/// Row width ignoring trailing blank cells
pub fn row_width(row: &[SheetCell]) -> usize {
    row.iter().rposition(|cell| !cell.is_blank()).map_or(0, |i| i + 1)
}

/// Resolve column roles for a sheet
///
/// `header` is the detected header row, if any; `data` are the rows below it.
pub fn resolve_columns(header: Option<&[SheetCell]>, data: &[Vec<SheetCell>], options: &ImportOptions) -> ColumnRoles {
    let sample = &data[..data.len().min(options.statistics_sample_rows)];
    let width = sample
        .iter()
        .map(|row| row_width(row))
        .chain(header.map(row_width))
        .max()
        .unwrap_or(0);
    let stats = column_stats(sample, width);

    let mut roles = ColumnRoles::default();
    if let Some(header) = header {
        assign_from_header(&mut roles, header);
    }
    assign_positional(&mut roles, width, &stats);
    assign_from_statistics(&mut roles, &stats);

    log::debug!("column roles (width {}): {:?}", width, roles);
    roles
}

fn assign_from_header(roles: &mut ColumnRoles, header: &[SheetCell]) {
    let texts: Vec<String> = header.iter().map(header_text).collect();

    for role in Role::ALL {
        // "Account Type" is a category column when a plain account column exists
        if role == Role::Account {
            let plain = texts
                .iter()
                .position(|t| header_matches(t, Role::Account) && !header_matches(t, Role::Category));
            if let Some(column) = plain {
                roles.claim(role, column);
                continue;
            }
        }

        if let Some(column) = (0..texts.len()).find(|&i| header_matches(&texts[i], role) && !roles.is_claimed(i)) {
            roles.claim(role, column);
        }
    }
}

fn assign_positional(roles: &mut ColumnRoles, width: usize, stats: &[ColumnStats]) {
    let has_text = |column: usize| stats.get(column).is_some_and(|s| s.text > 0);
    let has_numbers = |column: usize| stats.get(column).is_some_and(|s| s.numeric > 0);
    let has_categories = |column: usize| stats.get(column).is_some_and(|s| s.category > 0);

    if width >= 4 && has_categories(0) {
        roles.claim(Role::Category, 0);
    }

    let account_default = if roles.category == Some(0) { 1 } else { 0 };
    if width > account_default && has_text(account_default) {
        roles.claim(Role::Account, account_default);
    }

    let defaults: Vec<(Role, usize)> = match width {
        w if w >= 4 => vec![(Role::Debit, w - 2), (Role::Credit, w - 1)],
        3 => vec![(Role::Debit, 1), (Role::Credit, 2)],
        2 => vec![(Role::Balance, 1)],
        _ => Vec::new(),
    };
    if !defaults.iter().any(|&(_, column)| has_numbers(column)) {
        return;
    }

    // Each open role takes its default column on its own, so a header naming
    // only "Debit" still gets a credit column
    for (role, column) in defaults {
        if amount_layout_open(roles, role) {
            roles.claim(role, column);
        }
    }
}

/// A balance column and a debit/credit pair are alternative layouts; one
/// never joins the other
fn amount_layout_open(roles: &ColumnRoles, role: Role) -> bool {
    match role {
        Role::Balance => roles.debit.is_none() && roles.credit.is_none(),
        Role::Debit | Role::Credit => roles.balance.is_none(),
        Role::Account | Role::Category => true,
    }
}

fn assign_from_statistics(roles: &mut ColumnRoles, stats: &[ColumnStats]) {
    if roles.account.is_none() {
        // Highest text score; a column made only of category names loses ties
        let best = stats
            .iter()
            .enumerate()
            .filter(|(i, s)| s.text > 0 && !roles.is_claimed(*i))
            .max_by(|(ia, a), (ib, b)| {
                a.text
                    .cmp(&b.text)
                    .then(b.category.cmp(&a.category))
                    .then(ib.cmp(ia))
            })
            .map(|(i, _)| i);
        if let Some(column) = best {
            roles.claim(Role::Account, column);
        }
    }

    if roles.category.is_none() {
        let best = stats
            .iter()
            .enumerate()
            .filter(|(i, s)| s.category > 0 && !roles.is_claimed(*i))
            .max_by(|(ia, a), (ib, b)| a.category.cmp(&b.category).then(ib.cmp(ia)))
            .map(|(i, _)| i);
        if let Some(column) = best {
            roles.claim(Role::Category, column);
        }
    }

    let numeric: Vec<usize> = stats
        .iter()
        .enumerate()
        .filter(|(i, s)| s.numeric > 0 && !roles.is_claimed(*i))
        .map(|(i, _)| i)
        .collect();

    if !roles.has_amounts() {
        match numeric.as_slice() {
            [single] => {
                roles.claim(Role::Balance, *single);
            }
            [first, second, ..] => {
                roles.claim(Role::Debit, *first);
                roles.claim(Role::Credit, *second);
            }
            [] => {}
        }
        return;
    }

    // Complete a half-resolved debit/credit pair from the free numeric columns
    let mut free = numeric.into_iter();
    for role in [Role::Debit, Role::Credit] {
        if roles.get(role).is_none() && amount_layout_open(roles, role) {
            if let Some(column) = free.next() {
                roles.claim(role, column);
            }
        }
    }
}
