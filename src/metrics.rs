//! KPI aggregation over a windowed transaction set.
//!
//! Everything here is a pure function of its inputs: the same transactions,
//! granularity and reference date always produce the same snapshot.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::Transaction;
use crate::period::{week_of_month, Granularity, PeriodWindow};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub name: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekTotals {
    pub label: String,
    pub income: f64,
    pub expenses: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub name: String,
    pub total: f64,
    pub pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_balance: f64,
    pub current_balance: f64,
    /// Expense totals per category, in first-seen order.
    pub category_breakdown: Vec<CategoryTotal>,
    /// Income/expense per `Week n` bucket, in first-seen order.
    pub weekly_breakdown: Vec<WeekTotals>,
    pub income_change: i64,
    pub expense_change: i64,
}

impl MetricsSnapshot {
    /// The `limit` largest expense categories with their share of all
    /// expenses in the window.
    pub fn category_shares(&self, limit: usize) -> Vec<CategoryShare> {
        let total: f64 = self.category_breakdown.iter().map(|c| c.total).sum();
        let mut items: Vec<&CategoryTotal> = self.category_breakdown.iter().collect();
        items.sort_by(|a, b| b.total.total_cmp(&a.total));
        items
            .into_iter()
            .take(limit)
            .map(|c| CategoryShare {
                name: c.name.clone(),
                total: c.total,
                pct: if total != 0.0 { c.total / total * 100.0 } else { 0.0 },
            })
            .collect()
    }
}

/// Income and expense sums of a transaction subset.
pub fn totals<'a, I>(transactions: I) -> (f64, f64)
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions.into_iter().fold((0.0, 0.0), |(inc, exp), t| {
        if t.is_income() {
            (inc + t.amount, exp)
        } else {
            (inc, exp + t.amount)
        }
    })
}

/// Whole-percent change from `previous` to `current`. A zero baseline reports
/// 0 rather than an unbounded change. Halves round toward positive infinity.
pub fn percent_change(current: f64, previous: f64) -> i64 {
    if previous == 0.0 {
        return 0;
    }
    let pct = (current - previous) / previous * 100.0;
    (pct + 0.5).floor() as i64
}

pub fn category_breakdown(current: &[&Transaction]) -> Vec<CategoryTotal> {
    let mut out: Vec<CategoryTotal> = Vec::new();
    for t in current.iter().filter(|t| t.is_expense()) {
        match out.iter_mut().find(|c| c.name == t.category) {
            Some(c) => c.total += t.amount,
            None => out.push(CategoryTotal {
                name: t.category.clone(),
                total: t.amount,
            }),
        }
    }
    out
}

pub fn weekly_breakdown(current: &[&Transaction]) -> Vec<WeekTotals> {
    let mut out: Vec<WeekTotals> = Vec::new();
    for t in current {
        let label = format!("Week {}", week_of_month(t.date));
        let idx = match out.iter().position(|w| w.label == label) {
            Some(i) => i,
            None => {
                out.push(WeekTotals {
                    label,
                    income: 0.0,
                    expenses: 0.0,
                });
                out.len() - 1
            }
        };
        if t.is_income() {
            out[idx].income += t.amount;
        } else {
            out[idx].expenses += t.amount;
        }
    }
    out
}

/// Compute the dashboard KPIs for `current`, comparing against the window
/// immediately before the one containing `reference`, drawn from `all`.
pub fn aggregate(
    current: &[&Transaction],
    all: &[Transaction],
    granularity: Granularity,
    reference: NaiveDate,
) -> MetricsSnapshot {
    let (total_income, total_expenses) = totals(current.iter().copied());

    let (prev_income, prev_expenses) = PeriodWindow::containing(granularity, reference)
        .previous()
        .map(|w| totals(w.filter(all)))
        .unwrap_or((0.0, 0.0));

    MetricsSnapshot {
        total_income,
        total_expenses,
        net_balance: total_income - total_expenses,
        current_balance: current.first().map(|t| t.running_balance).unwrap_or(0.0),
        category_breakdown: category_breakdown(current),
        weekly_breakdown: weekly_breakdown(current),
        income_change: percent_change(total_income, prev_income),
        expense_change: percent_change(total_expenses, prev_expenses),
    }
}
