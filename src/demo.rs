use chrono::{Datelike, Months, NaiveDate};

use crate::models::{RawCell, RawTable, TransactionKind};

const OPENING_BALANCE: f64 = 100_000.0;

/// Months of history generated, ending with the anchor's month.
const MONTHS: u32 = 3;

struct DemoTxn {
    day: u32,
    category: &'static str,
    kind: &'static str,
    amount: f64,
    description: &'static str,
}

/// Transactions generated every month.
const RECURRING: &[DemoTxn] = &[
    DemoTxn { day: 1, category: "Salary", kind: "Income", amount: 50000.0, description: "Monthly salary" },
    DemoTxn { day: 3, category: "Rent", kind: "Expense", amount: 15000.0, description: "Monthly rent" },
    DemoTxn { day: 5, category: "Utilities", kind: "Expense", amount: 2100.0, description: "Electricity and water" },
    DemoTxn { day: 7, category: "Groceries", kind: "Expense", amount: 3200.0, description: "Weekly groceries" },
    DemoTxn { day: 14, category: "Groceries", kind: "Expense", amount: 2850.0, description: "Weekly groceries" },
    DemoTxn { day: 21, category: "Groceries", kind: "Expense", amount: 3400.0, description: "Weekly groceries" },
    DemoTxn { day: 28, category: "Groceries", kind: "Expense", amount: 2950.0, description: "Weekly groceries" },
    DemoTxn { day: 10, category: "Transport", kind: "Expense", amount: 1800.0, description: "Metro card top-up" },
];

/// One-off rows; each month picks a subset based on its index.
const ROTATING: &[DemoTxn] = &[
    DemoTxn { day: 15, category: "Freelance", kind: "Earning", amount: 12000.0, description: "Design contract" },
    DemoTxn { day: 18, category: "Dining", kind: "Expense", amount: 2400.0, description: "Dinner with friends" },
    DemoTxn { day: 20, category: "Shopping", kind: "Expense", amount: 5600.0, description: "Winter jacket" },
    DemoTxn { day: 12, category: "Health", kind: "Expense", amount: 1500.0, description: "Pharmacy" },
    DemoTxn { day: 24, category: "Entertainment", kind: "Expense", amount: 900.0, description: "Concert tickets" },
    DemoTxn { day: 16, category: "Interest", kind: "Other Income", amount: 750.0, description: "Savings interest" },
];

fn excel_serial(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN);
    (date - epoch).num_days() as f64
}

/// A small ledger ending at `anchor`. Income rows carry spreadsheet serial
/// dates and expenses ISO text, so it parses the same under either day/month
/// ordering. One zero-amount row is included and is dropped by the parser.
pub fn sample_table(anchor: NaiveDate) -> RawTable {
    let first_of_anchor = anchor.with_day(1).unwrap_or(anchor);
    let mut entries: Vec<(NaiveDate, &DemoTxn)> = Vec::new();

    for back in (0..MONTHS).rev() {
        let Some(month_start) = first_of_anchor.checked_sub_months(Months::new(back)) else {
            continue;
        };
        let idx = month_start.month0() as usize;
        let rotating = [&ROTATING[idx % ROTATING.len()], &ROTATING[(idx + 2) % ROTATING.len()]];
        for txn in RECURRING.iter().chain(rotating) {
            let Some(date) = month_start.with_day(txn.day) else { continue };
            if date <= anchor {
                entries.push((date, txn));
            }
        }
    }
    entries.sort_by_key(|(date, _)| *date);

    let mut rows = vec![vec![
        RawCell::from("Date"),
        RawCell::from("Category"),
        RawCell::from("Type"),
        RawCell::from("Amount"),
        RawCell::from("Balance"),
        RawCell::from("Description"),
    ]];

    let mut balance = OPENING_BALANCE;
    for (date, txn) in &entries {
        let is_income = TransactionKind::from_type_text(txn.kind) == TransactionKind::Income;
        balance += if is_income { txn.amount } else { -txn.amount };
        let date_cell = if is_income {
            RawCell::Number(excel_serial(*date))
        } else {
            RawCell::Text(date.format("%Y-%m-%d").to_string())
        };
        rows.push(vec![
            date_cell,
            RawCell::from(txn.category),
            RawCell::from(txn.kind),
            RawCell::Text(format!("₹{:.2}", txn.amount)),
            RawCell::Number(balance),
            RawCell::from(txn.description),
        ]);
    }

    rows.push(vec![
        RawCell::Text(first_of_anchor.format("%Y-%m-%d").to_string()),
        RawCell::from("Refunds"),
        RawCell::from("Income"),
        RawCell::from("0"),
        RawCell::Number(balance),
        RawCell::from("Refund pending"),
    ]);

    RawTable::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DateOrdering;
    use crate::parser::{parse_table, SkipReason};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_excel_serial() {
        assert_eq!(excel_serial(ymd(1899, 12, 31)), 1.0);
        assert_eq!(excel_serial(ymd(2025, 1, 10)), 45667.0);
    }

    #[test]
    fn test_sample_parses_under_both_orderings() {
        let table = sample_table(ymd(2025, 3, 31));
        let dmy = parse_table(&table, DateOrdering::DayMonthYear, "demo").unwrap();
        let mdy = parse_table(&table, DateOrdering::MonthDayYear, "demo").unwrap();
        assert_eq!(dmy.transactions, mdy.transactions);
        assert_eq!(dmy.skip_count(), 1);
        assert_eq!(dmy.skip_count_for(SkipReason::ZeroAmount), 1);
    }

    #[test]
    fn test_sample_stays_within_three_months_of_anchor() {
        let anchor = ymd(2025, 3, 12);
        let report = parse_table(&sample_table(anchor), DateOrdering::DayMonthYear, "demo").unwrap();
        let txns = &report.transactions;
        assert!(!txns.is_empty());
        assert!(txns.iter().all(|t| t.date <= anchor && t.date >= ymd(2025, 1, 1)));
        assert_eq!(txns[0].date, ymd(2025, 3, 10));
    }

    #[test]
    fn test_sample_is_deterministic() {
        let anchor = ymd(2025, 6, 30);
        assert_eq!(sample_table(anchor), sample_table(anchor));
    }
}
