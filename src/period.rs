use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::Transaction;

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Week,
    #[default]
    Month,
    Quarter,
}

impl Granularity {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "quarter" => Some(Self::Quarter),
            _ => None,
        }
    }

    fn months(&self) -> u32 {
        match self {
            Self::Week => 0,
            Self::Month => 1,
            Self::Quarter => 3,
        }
    }
}

/// Week of the month as the period header counts it: days are offset by the
/// weekday (Sunday = 0) of the 1st, then grouped in sevens.
pub fn week_of_month(date: NaiveDate) -> u32 {
    let first_weekday = date.with_day(1).unwrap_or(date).weekday().num_days_from_sunday();
    (date.day() + first_weekday).div_ceil(7)
}

/// Move `date` by `steps` whole units of `granularity`. Month arithmetic
/// clamps to the last day of shorter months.
pub fn shift_date(date: NaiveDate, granularity: Granularity, steps: i32) -> Option<NaiveDate> {
    match granularity {
        Granularity::Week => date.checked_add_signed(Duration::days(7 * steps as i64)),
        _ => {
            let months = Months::new(granularity.months() * steps.unsigned_abs());
            if steps >= 0 {
                date.checked_add_months(months)
            } else {
                date.checked_sub_months(months)
            }
        }
    }
}

/// Half-open date range `[start, end)` for one week, month or quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodWindow {
    pub granularity: Granularity,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Reference date the window was built from.
    pub anchor: NaiveDate,
}

impl PeriodWindow {
    /// Window of `granularity` containing `reference`. Weeks run Monday to
    /// Sunday.
    pub fn containing(granularity: Granularity, reference: NaiveDate) -> Self {
        let (start, end) = match granularity {
            Granularity::Week => {
                let start = reference - Duration::days(reference.weekday().num_days_from_monday() as i64);
                (start, start + Duration::days(7))
            }
            Granularity::Month | Granularity::Quarter => {
                let month0 = match granularity {
                    Granularity::Quarter => reference.month0() / 3 * 3,
                    _ => reference.month0(),
                };
                let start = NaiveDate::from_ymd_opt(reference.year(), month0 + 1, 1).unwrap_or(reference);
                let end = start
                    .checked_add_months(Months::new(granularity.months()))
                    .unwrap_or(NaiveDate::MAX);
                (start, end)
            }
        };
        Self {
            granularity,
            start,
            end,
            anchor: reference,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    /// Last day inside the window.
    pub fn last_day(&self) -> NaiveDate {
        self.end.pred_opt().unwrap_or(self.end)
    }

    pub fn shift(&self, steps: i32) -> Option<Self> {
        shift_date(self.anchor, self.granularity, steps).map(|d| Self::containing(self.granularity, d))
    }

    pub fn previous(&self) -> Option<Self> {
        self.shift(-1)
    }

    /// Human label: `March 2025`, `Q1 2025`, `Week 2, Mar 2025`.
    pub fn label(&self) -> String {
        let a = self.anchor;
        let month = MONTH_NAMES[a.month0() as usize];
        match self.granularity {
            Granularity::Month => format!("{month} {}", a.year()),
            Granularity::Quarter => format!("Q{} {}", a.month0() / 3 + 1, a.year()),
            Granularity::Week => format!("Week {}, {} {}", week_of_month(a), &month[..3], a.year()),
        }
    }

    /// Transactions inside the window, in their original relative order.
    pub fn filter<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        transactions.iter().filter(|t| self.contains(t.date)).collect()
    }
}

pub fn filter_by_window(
    transactions: &[Transaction],
    granularity: Granularity,
    reference: NaiveDate,
) -> Vec<&Transaction> {
    let window = PeriodWindow::containing(granularity, reference);
    let selected = window.filter(transactions);
    debug!(
        start = %window.start,
        end = %window.end,
        selected = selected.len(),
        total = transactions.len(),
        "filtered transactions by {}",
        granularity.key()
    );
    selected
}
