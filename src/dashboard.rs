use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::metrics::{aggregate, MetricsSnapshot};
use crate::models::Transaction;
use crate::period::{filter_by_window, shift_date, Granularity, PeriodWindow};

/// Dashboard state: the ingested transactions plus the window being viewed.
#[derive(Debug, Clone)]
pub struct Dashboard {
    transactions: Vec<Transaction>,
    granularity: Granularity,
    reference: NaiveDate,
}

/// Everything the presentation layer needs to render one window.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView<'a> {
    pub label: String,
    pub window: PeriodWindow,
    pub transactions: Vec<&'a Transaction>,
    pub metrics: MetricsSnapshot,
}

impl Dashboard {
    pub fn new(transactions: Vec<Transaction>, granularity: Granularity, reference: NaiveDate) -> Self {
        Self {
            transactions,
            granularity,
            reference,
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn reference(&self) -> NaiveDate {
        self.reference
    }

    /// Swap in a freshly ingested set. The old set is dropped whole.
    pub fn replace(&mut self, transactions: Vec<Transaction>) {
        debug!(old = self.transactions.len(), new = transactions.len(), "replacing transaction set");
        self.transactions = transactions;
    }

    /// Move the reference date by `steps` windows (negative goes back).
    /// Returns false if the move would leave the supported date range.
    pub fn navigate(&mut self, steps: i32) -> bool {
        match shift_date(self.reference, self.granularity, steps) {
            Some(d) => {
                self.reference = d;
                true
            }
            None => false,
        }
    }

    /// Switch granularity; the view jumps back to `today`.
    pub fn set_granularity(&mut self, granularity: Granularity, today: NaiveDate) {
        self.granularity = granularity;
        self.reference = today;
    }

    pub fn window(&self) -> PeriodWindow {
        PeriodWindow::containing(self.granularity, self.reference)
    }

    pub fn view(&self) -> DashboardView<'_> {
        let window = self.window();
        let transactions = filter_by_window(&self.transactions, self.granularity, self.reference);
        let metrics = aggregate(&transactions, &self.transactions, self.granularity, self.reference);
        DashboardView {
            label: window.label(),
            window,
            transactions,
            metrics,
        }
    }
}
