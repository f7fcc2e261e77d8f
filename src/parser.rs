use std::fmt;

use tracing::{debug, info};

use crate::dates;
use crate::error::{Error, Result};
use crate::models::{DateOrdering, RawCell, RawTable, Transaction, TransactionKind, UNCATEGORIZED};

// ---------------------------------------------------------------------------
// Column roles
// ---------------------------------------------------------------------------

/// Column index for each field, resolved from header text by substring match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnRoles {
    pub date: Option<usize>,
    pub category: Option<usize>,
    pub kind: Option<usize>,
    pub amount: Option<usize>,
    pub balance: Option<usize>,
    pub description: Option<usize>,
}

impl ColumnRoles {
    pub fn resolve(header: &[RawCell]) -> Self {
        let names: Vec<String> = header.iter().map(|c| c.text().trim().to_lowercase()).collect();
        Self {
            date: find_header(&names, |h| h.contains("date")),
            category: find_header(&names, |h| h.contains("category")),
            kind: find_header(&names, |h| h.contains("type")),
            amount: find_header(&names, |h| h.contains("amount")),
            balance: find_header(&names, |h| h.contains("balance")),
            description: find_header(&names, |h| h.contains("description") || h.contains("desc")),
        }
    }

    /// Names of the mandatory columns that were not found.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.date.is_none() {
            missing.push("Date");
        }
        if self.amount.is_none() {
            missing.push("Amount");
        }
        missing
    }
}

fn find_header(names: &[String], pred: impl Fn(&str) -> bool) -> Option<usize> {
    names.iter().position(|h| pred(h.as_str()))
}

// ---------------------------------------------------------------------------
// Row outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    EmptyRow,
    ZeroAmount,
    InvalidAmount,
    InvalidDate,
}

impl SkipReason {
    pub const ALL: [SkipReason; 4] = [
        SkipReason::EmptyRow,
        SkipReason::ZeroAmount,
        SkipReason::InvalidAmount,
        SkipReason::InvalidDate,
    ];
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::EmptyRow => "empty row",
            SkipReason::ZeroAmount => "zero or missing amount",
            SkipReason::InvalidAmount => "amount is not a finite number",
            SkipReason::InvalidDate => "unparseable date",
        };
        f.write_str(s)
    }
}

pub type RowOutcome = std::result::Result<Transaction, SkipReason>;

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// Position in the data rows (0-based, header excluded).
    pub row: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone)]
pub struct ParseReport {
    pub roles: ColumnRoles,
    /// Newest first; ties keep source row order.
    pub transactions: Vec<Transaction>,
    pub skipped: Vec<SkippedRow>,
}

impl ParseReport {
    pub fn skip_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn skip_count_for(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|s| s.reason == reason).count()
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a numeric amount. Strips thousands separators, quotes, whitespace and
/// currency symbols; `(500.00)` is read as -500. Unparseable text is 0.
pub fn parse_amount(raw: &str) -> f64 {
    let s: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | '"' | '$' | '₹' | '€' | '£') && !c.is_whitespace())
        .collect();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return -inner.parse::<f64>().unwrap_or(0.0);
    }
    s.parse().unwrap_or(0.0)
}

fn cell_amount(cell: Option<&RawCell>) -> f64 {
    match cell {
        Some(RawCell::Number(n)) => *n,
        Some(RawCell::Text(s)) => parse_amount(s),
        _ => 0.0,
    }
}

fn cell_text(row: &[RawCell], idx: Option<usize>) -> String {
    idx.and_then(|i| row.get(i)).map(|c| c.text().trim().to_string()).unwrap_or_default()
}

/// Build one transaction from a data row, or report why the row is skipped.
pub fn parse_row(
    id: usize,
    row: &[RawCell],
    roles: &ColumnRoles,
    ordering: DateOrdering,
) -> RowOutcome {
    if row.iter().all(RawCell::is_blank) {
        return Err(SkipReason::EmptyRow);
    }

    let amount = cell_amount(roles.amount.and_then(|i| row.get(i)));
    if !amount.is_finite() {
        return Err(SkipReason::InvalidAmount);
    }
    if amount == 0.0 {
        return Err(SkipReason::ZeroAmount);
    }

    let kind = TransactionKind::from_type_text(&cell_text(row, roles.kind));

    let category = match cell_text(row, roles.category) {
        c if c.is_empty() => UNCATEGORIZED.to_string(),
        c => c,
    };

    let date_cell = roles.date.and_then(|i| row.get(i)).unwrap_or(&RawCell::Empty);
    let date = dates::normalize(date_cell, ordering).ok_or(SkipReason::InvalidDate)?;

    let running_balance = match cell_amount(roles.balance.and_then(|i| row.get(i))) {
        b if b.is_finite() => b,
        _ => 0.0,
    };

    Ok(Transaction {
        id,
        date,
        raw_date: date_cell.text(),
        category,
        kind,
        amount: amount.abs(),
        running_balance,
        description: cell_text(row, roles.description),
    })
}

/// Turn a header row and data rows into a date-descending transaction list.
///
/// Fails only when the Date or Amount column is absent; bad rows are skipped
/// and recorded in the report.
pub fn parse(header: &[RawCell], rows: &[Vec<RawCell>], ordering: DateOrdering) -> Result<ParseReport> {
    let roles = ColumnRoles::resolve(header);
    debug!(?roles, "resolved column roles");

    let missing = roles.missing_required();
    if !missing.is_empty() {
        return Err(Error::MissingColumns(missing));
    }

    let mut transactions = Vec::new();
    let mut skipped = Vec::new();
    for (id, row) in rows.iter().enumerate() {
        match parse_row(id, row, &roles, ordering) {
            Ok(txn) => transactions.push(txn),
            Err(reason) => skipped.push(SkippedRow { row: id, reason }),
        }
    }

    // Stable, so equal dates keep their source order.
    transactions.sort_by(|a, b| b.date.cmp(&a.date));

    info!(parsed = transactions.len(), skipped = skipped.len(), "parsed transactions");
    for reason in SkipReason::ALL {
        let n = skipped.iter().filter(|s: &&SkippedRow| s.reason == reason).count();
        if n > 0 {
            debug!("{n} row(s) skipped: {reason}");
        }
    }

    Ok(ParseReport {
        roles,
        transactions,
        skipped,
    })
}

pub fn parse_table(table: &RawTable, ordering: DateOrdering, source_name: &str) -> Result<ParseReport> {
    let header = table
        .header()
        .ok_or_else(|| Error::EmptySource(source_name.to_string()))?;
    parse(header, table.data_rows(), ordering)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(cells: &[&str]) -> Vec<RawCell> {
        cells.iter().map(|c| RawCell::from(*c)).collect()
    }

    fn standard_header() -> Vec<RawCell> {
        row(&["Date", "Category", "Type", "Amount", "Balance", "Description"])
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56"), 1234.56);
        assert_eq!(parse_amount("\"500.00\""), 500.0);
        assert_eq!(parse_amount("  -42.50  "), -42.5);
        assert_eq!(parse_amount("₹15,000"), 15000.0);
        assert_eq!(parse_amount("(1,234.56)"), -1234.56);
        assert_eq!(parse_amount("0"), 0.0);
        assert_eq!(parse_amount("not_a_number"), 0.0);
        assert_eq!(parse_amount(""), 0.0);
    }

    #[test]
    fn test_resolve_roles_by_substring() {
        let header = row(&[" Txn Date ", "Category", "Type", "Amount (INR)", "Running Balance", "Desc"]);
        let roles = ColumnRoles::resolve(&header);
        assert_eq!(roles.date, Some(0));
        assert_eq!(roles.category, Some(1));
        assert_eq!(roles.kind, Some(2));
        assert_eq!(roles.amount, Some(3));
        assert_eq!(roles.balance, Some(4));
        assert_eq!(roles.description, Some(5));
    }

    #[test]
    fn test_resolve_roles_first_match_wins() {
        let header = row(&["Value Date", "Posting Date", "Amount", "Amount 2"]);
        let roles = ColumnRoles::resolve(&header);
        assert_eq!(roles.date, Some(0));
        assert_eq!(roles.amount, Some(2));
        assert_eq!(roles.category, None);
    }

    #[test]
    fn test_missing_required_columns_is_schema_error() {
        let header = row(&["When", "Category", "Value"]);
        let err = parse(&header, &[row(&["01/01/2025", "Rent", "10"])], DateOrdering::DayMonthYear)
            .unwrap_err();
        match err {
            Error::MissingColumns(cols) => assert_eq!(cols, vec!["Date", "Amount"]),
            other => panic!("unexpected error: {other}"),
        }

        let header = row(&["Date", "Category"]);
        let err = parse(&header, &[], DateOrdering::DayMonthYear).unwrap_err();
        assert!(matches!(err, Error::MissingColumns(ref c) if c == &vec!["Amount"]));
    }

    #[test]
    fn test_end_to_end_two_rows_sorted_newest_first() {
        let rows = vec![
            row(&["01/01/2025", "Rent", "Expense", "15000", "85000", "Monthly Rent"]),
            row(&["05/01/2025", "Salary", "Income", "50000", "135000", "Jan Salary"]),
        ];
        let report = parse(&standard_header(), &rows, DateOrdering::DayMonthYear).unwrap();
        let txns = &report.transactions;
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].date, ymd(2025, 1, 5));
        assert_eq!(txns[0].kind, TransactionKind::Income);
        assert_eq!(txns[0].amount, 50000.0);
        assert_eq!(txns[0].running_balance, 135000.0);
        assert_eq!(txns[0].id, 1);
        assert_eq!(txns[1].date, ymd(2025, 1, 1));
        assert_eq!(txns[1].kind, TransactionKind::Expense);
        assert_eq!(txns[1].amount, 15000.0);
        assert_eq!(txns[1].category, "Rent");
        assert_eq!(txns[1].description, "Monthly Rent");
        assert_eq!(txns[1].raw_date, "01/01/2025");
        assert_eq!(report.skip_count(), 0);
    }

    #[test]
    fn test_zero_and_unparseable_amounts_are_skipped() {
        let rows = vec![
            row(&["01/01/2025", "Rent", "Expense", "0", "", ""]),
            row(&["02/01/2025", "Rent", "Expense", "abc", "", ""]),
            row(&["03/01/2025", "Rent", "Expense", "", "", ""]),
            row(&["04/01/2025", "Food", "Expense", "12.5", "", ""]),
        ];
        let report = parse(&standard_header(), &rows, DateOrdering::DayMonthYear).unwrap();
        assert_eq!(report.transactions.len(), 1);
        assert_eq!(report.transactions[0].category, "Food");
        assert_eq!(report.skip_count_for(SkipReason::ZeroAmount), 3);
    }

    #[test]
    fn test_non_finite_amount_is_skipped() {
        let rows = vec![row(&["01/01/2025", "Rent", "Expense", "inf", "", ""])];
        let report = parse(&standard_header(), &rows, DateOrdering::DayMonthYear).unwrap();
        assert!(report.transactions.is_empty());
        assert_eq!(report.skipped, vec![SkippedRow { row: 0, reason: SkipReason::InvalidAmount }]);
    }

    #[test]
    fn test_invalid_dates_and_empty_rows_are_skipped() {
        let rows = vec![
            row(&["31/04/2025", "Rent", "Expense", "100", "", ""]),
            row(&["", "", "", "", "", ""]),
            vec![],
            row(&["", "Rent", "Expense", "100", "", ""]),
        ];
        let report = parse(&standard_header(), &rows, DateOrdering::DayMonthYear).unwrap();
        assert!(report.transactions.is_empty());
        assert_eq!(report.skip_count_for(SkipReason::InvalidDate), 2);
        assert_eq!(report.skip_count_for(SkipReason::EmptyRow), 2);
    }

    #[test]
    fn test_negative_amounts_stored_as_magnitude() {
        let rows = vec![row(&["01/01/2025", "Groceries", "Debit", "-250.75", "1000", ""])];
        let report = parse(&standard_header(), &rows, DateOrdering::DayMonthYear).unwrap();
        let t = &report.transactions[0];
        assert_eq!(t.amount, 250.75);
        assert_eq!(t.kind, TransactionKind::Expense);
    }

    #[test]
    fn test_optional_columns_default() {
        let header = row(&["Date", "Amount"]);
        let rows = vec![row(&["01/01/2025", "99"])];
        let report = parse(&header, &rows, DateOrdering::DayMonthYear).unwrap();
        let t = &report.transactions[0];
        assert_eq!(t.category, UNCATEGORIZED);
        assert_eq!(t.kind, TransactionKind::Expense);
        assert_eq!(t.running_balance, 0.0);
        assert_eq!(t.description, "");
    }

    #[test]
    fn test_blank_category_and_short_rows() {
        let rows = vec![row(&["01/01/2025", "   ", "Income", "10"])];
        let report = parse(&standard_header(), &rows, DateOrdering::DayMonthYear).unwrap();
        let t = &report.transactions[0];
        assert_eq!(t.category, UNCATEGORIZED);
        assert_eq!(t.kind, TransactionKind::Income);
        assert_eq!(t.running_balance, 0.0);
    }

    #[test]
    fn test_numeric_cells() {
        let rows = vec![vec![
            RawCell::Number(1.0),
            RawCell::from("Misc"),
            RawCell::from("Expense"),
            RawCell::Number(42.0),
            RawCell::Number(1000.0),
            RawCell::Empty,
        ]];
        let report = parse(&standard_header(), &rows, DateOrdering::DayMonthYear).unwrap();
        let t = &report.transactions[0];
        assert_eq!(t.date, ymd(1899, 12, 31));
        assert_eq!(t.raw_date, "1");
        assert_eq!(t.amount, 42.0);
        assert_eq!(t.running_balance, 1000.0);
    }

    #[test]
    fn test_sort_is_descending_and_stable() {
        let rows = vec![
            row(&["02/01/2025", "A", "Expense", "1", "", "first"]),
            row(&["03/01/2025", "B", "Expense", "2", "", ""]),
            row(&["02/01/2025", "C", "Expense", "3", "", "second"]),
            row(&["01/01/2025", "D", "Expense", "4", "", ""]),
        ];
        let report = parse(&standard_header(), &rows, DateOrdering::DayMonthYear).unwrap();
        let ids: Vec<usize> = report.transactions.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 0, 2, 3]);
        assert!(report.transactions.windows(2).all(|w| w[0].date >= w[1].date));
    }

    #[test]
    fn test_parse_table_requires_header() {
        let err = parse_table(&RawTable::default(), DateOrdering::DayMonthYear, "empty.csv").unwrap_err();
        assert!(matches!(err, Error::EmptySource(_)));
    }
}
