use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const UNCATEGORIZED: &str = "Uncategorized";

/// A single cell of a raw source table, before any interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
}

impl RawCell {
    pub fn is_blank(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            RawCell::Number(_) => false,
        }
    }

    /// Display text of the cell. Whole numbers print without a fraction.
    pub fn text(&self) -> String {
        match self {
            RawCell::Empty => String::new(),
            RawCell::Text(s) => s.clone(),
            RawCell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            RawCell::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for RawCell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            RawCell::Empty
        } else {
            RawCell::Text(s.to_string())
        }
    }
}

impl From<f64> for RawCell {
    fn from(n: f64) -> Self {
        RawCell::Number(n)
    }
}

/// Two-dimensional payload produced by a source reader. Row 0 is the header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<RawCell>>) -> Self {
        Self { rows }
    }

    pub fn header(&self) -> Option<&[RawCell]> {
        self.rows.first().map(|r| r.as_slice())
    }

    pub fn data_rows(&self) -> &[Vec<RawCell>] {
        if self.rows.is_empty() {
            &[]
        } else {
            &self.rows[1..]
        }
    }
}

/// Order of the day and month parts in delimited date text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum DateOrdering {
    /// DD/MM/YYYY
    #[default]
    #[value(name = "dmy")]
    #[serde(rename = "dmy")]
    DayMonthYear,
    /// MM/DD/YYYY
    #[value(name = "mdy")]
    #[serde(rename = "mdy")]
    MonthDayYear,
}

impl DateOrdering {
    pub fn key(&self) -> &'static str {
        match self {
            Self::DayMonthYear => "dmy",
            Self::MonthDayYear => "mdy",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "dmy" | "dd/mm/yyyy" => Some(Self::DayMonthYear),
            "mdy" | "mm/dd/yyyy" => Some(Self::MonthDayYear),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    /// Income when the type text mentions income or earnings, Expense otherwise.
    pub fn from_type_text(raw: &str) -> Self {
        let t = raw.trim().to_lowercase();
        if t.contains("income") || t.contains("earning") {
            Self::Income
        } else {
            Self::Expense
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// Position of the row in the source data (0-based, header excluded).
    pub id: usize,
    pub date: NaiveDate,
    pub raw_date: String,
    pub category: String,
    pub kind: TransactionKind,
    /// Always positive; `kind` carries the direction.
    pub amount: f64,
    pub running_balance: f64,
    pub description: String,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }
}
