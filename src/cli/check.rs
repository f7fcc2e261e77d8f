use comfy_table::{Cell, Table};

use crate::cli::{today, SourceArgs};
use crate::error::Result;
use crate::models::{DateOrdering, RawCell};
use crate::parser::{parse_table, ColumnRoles, ParseReport, SkipReason};
use crate::settings::load_settings;

pub fn run(source_args: SourceArgs) -> Result<()> {
    let settings = load_settings();
    let source = source_args.resolve(&settings, today())?;
    let ordering = source_args.ordering(&settings);

    let table = source.read()?;
    let header = table.header().unwrap_or_default().to_vec();
    println!("Source:       {}", source.name());
    if let Some(fp) = source.fingerprint()? {
        println!("SHA-256:      {}", &fp[..12.min(fp.len())]);
    }
    println!("Date format:  {}", ordering_label(ordering));
    println!("Rows read:    {}", table.rows.len());

    let report = parse_table(&table, ordering, &source.name())?;
    println!("{}", render(&header, &report));
    Ok(())
}

fn ordering_label(ordering: DateOrdering) -> &'static str {
    match ordering {
        DateOrdering::DayMonthYear => "dmy (day/month/year)",
        DateOrdering::MonthDayYear => "mdy (month/day/year)",
    }
}

fn role_rows(roles: &ColumnRoles) -> [(&'static str, Option<usize>); 6] {
    [
        ("Date", roles.date),
        ("Category", roles.category),
        ("Type", roles.kind),
        ("Amount", roles.amount),
        ("Balance", roles.balance),
        ("Description", roles.description),
    ]
}

pub fn render(header: &[RawCell], report: &ParseReport) -> String {
    let mut columns = Table::new();
    columns.set_header(vec!["Field", "Column", "Header"]);
    for (field, idx) in role_rows(&report.roles) {
        let (col, name) = match idx {
            Some(i) => (
                (i + 1).to_string(),
                header.get(i).map(RawCell::text).unwrap_or_default(),
            ),
            None => ("-".to_string(), "(not found)".to_string()),
        };
        columns.add_row(vec![Cell::new(field), Cell::new(col), Cell::new(name)]);
    }

    let mut out = format!("\n{columns}\n\nParsed:       {}", report.transactions.len());
    // Newest first.
    if let (Some(newest), Some(oldest)) = (report.transactions.first(), report.transactions.last()) {
        out.push_str(&format!(" ({} to {})", oldest.date, newest.date));
    }
    out.push_str(&format!("\nSkipped:      {}", report.skip_count()));
    for reason in SkipReason::ALL {
        let n = report.skip_count_for(reason);
        if n > 0 {
            out.push_str(&format!("\n  {reason}: {n}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn row(cells: &[&str]) -> Vec<RawCell> {
        cells.iter().map(|c| RawCell::from(*c)).collect()
    }

    #[test]
    fn test_render_reports_roles_and_skips() {
        let header = row(&["Txn Date", "Amount (INR)", "Notes"]);
        let rows = vec![
            row(&["05/03/2025", "100", "a"]),
            row(&["not a date", "50", "b"]),
            row(&["06/03/2025", "0", "c"]),
            row(&["", "", ""]),
            row(&["01/02/2025", "75", "d"]),
        ];
        let report = parse(&header, &rows, DateOrdering::DayMonthYear).unwrap();
        let out = render(&header, &report);
        assert!(out.contains("Txn Date"));
        assert!(out.contains("Amount (INR)"));
        assert!(out.contains("(not found)"));
        assert!(out.contains("Parsed:       2 (2025-02-01 to 2025-03-05)"));
        assert!(out.contains("Skipped:      3"));
        assert!(out.contains("unparseable date: 1"));
        assert!(out.contains("zero or missing amount: 1"));
        assert!(out.contains("empty row: 1"));
    }
}
