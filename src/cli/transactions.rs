use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{ingest, open_dashboard, SourceArgs, WindowArgs};
use crate::error::Result;
use crate::fmt::money;
use crate::models::Transaction;
use crate::settings::load_settings;

const DESCRIPTION_WIDTH: usize = 40;

pub fn run(source_args: SourceArgs, window: WindowArgs, limit: Option<usize>, all: bool) -> Result<()> {
    let settings = load_settings();
    let reference = window.reference()?;
    let source = source_args.resolve(&settings, reference)?;
    let report = ingest(&source, source_args.ordering(&settings))?;

    let dashboard = open_dashboard(report.transactions, &window, &settings, reference)?;

    let (title, rows): (String, Vec<&Transaction>) = if all {
        ("All transactions".to_string(), dashboard.transactions().iter().collect())
    } else {
        let view = dashboard.view();
        (view.label, view.transactions)
    };

    if rows.is_empty() {
        println!("{title}: no transactions.");
        return Ok(());
    }
    println!("{}", render(&title, &rows, limit, &settings.currency));
    Ok(())
}

pub fn render(title: &str, rows: &[&Transaction], limit: Option<usize>, currency: &str) -> String {
    let shown = limit.unwrap_or(rows.len()).min(rows.len());

    let mut table = Table::new();
    table.set_header(vec!["Date", "Type", "Category", "Amount", "Balance", "Description"]);
    for t in &rows[..shown] {
        let amount = if t.is_income() {
            money(t.amount, currency).green()
        } else {
            money(-t.amount, currency).red()
        };
        table.add_row(vec![
            Cell::new(t.date.format("%Y-%m-%d")),
            Cell::new(t.kind.label()),
            Cell::new(&t.category),
            Cell::new(amount),
            Cell::new(money(t.running_balance, currency)),
            Cell::new(textwrap::fill(&t.description, DESCRIPTION_WIDTH)),
        ]);
    }

    let mut out = format!("{title}\n{table}");
    if shown < rows.len() {
        out.push_str(&format!("\n{} of {} shown", shown, rows.len()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionKind;
    use chrono::NaiveDate;

    fn txn(id: usize, day: u32, kind: TransactionKind, amount: f64, description: &str) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2025, 3, day).unwrap();
        Transaction {
            id,
            date,
            raw_date: date.to_string(),
            category: "General".to_string(),
            kind,
            amount,
            running_balance: 2500.0,
            description: description.to_string(),
        }
    }

    #[test]
    fn test_render_register() {
        let a = txn(0, 12, TransactionKind::Expense, 42.5, "Coffee beans");
        let b = txn(1, 2, TransactionKind::Income, 900.0, "Invoice 17");
        let out = render("March 2025", &[&a, &b], None, "$");
        assert!(out.starts_with("March 2025"));
        assert!(out.contains("2025-03-12"));
        assert!(out.contains("-$42.50"));
        assert!(out.contains("$900.00"));
        assert!(out.contains("$2,500.00"));
        assert!(out.contains("Coffee beans"));
        assert!(!out.contains("shown"));
    }

    #[test]
    fn test_render_respects_limit() {
        let a = txn(0, 12, TransactionKind::Expense, 1.0, "first");
        let b = txn(1, 11, TransactionKind::Expense, 2.0, "second");
        let c = txn(2, 10, TransactionKind::Expense, 3.0, "third");
        let out = render("March 2025", &[&a, &b, &c], Some(2), "$");
        assert!(out.contains("first"));
        assert!(out.contains("second"));
        assert!(!out.contains("third"));
        assert!(out.contains("2 of 3 shown"));
    }
}
