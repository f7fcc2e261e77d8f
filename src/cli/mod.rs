pub mod check;
pub mod config;
pub mod dashboard;
pub mod transactions;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

use crate::dashboard::Dashboard;
use crate::dates::parse_iso;
use crate::error::{Error, Result};
use crate::models::{DateOrdering, Transaction};
use crate::parser::{parse_table, ParseReport};
use crate::period::Granularity;
use crate::settings::Settings;
use crate::source::{SheetSelector, Source};

#[derive(Parser)]
#[command(name = "ledgerboard", about = "KPI dashboard for spreadsheet and CSV transaction ledgers.")]
pub struct Cli {
    /// Increase log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show KPI cards, weekly flow and expense categories for a period.
    Dashboard {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        window: WindowArgs,
        /// Print the snapshot as JSON instead of tables
        #[arg(long)]
        json: bool,
        /// Re-read the source whenever the file changes
        #[arg(long)]
        watch: bool,
    },
    /// List the transactions inside a period, newest first.
    Transactions {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        window: WindowArgs,
        /// Show at most this many rows
        #[arg(long)]
        limit: Option<usize>,
        /// Include every transaction instead of one period
        #[arg(long)]
        all: bool,
    },
    /// Report how the source was read: column roles, parsed and skipped rows.
    Check {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Show or change saved settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the current settings and where they are stored.
    Show,
    /// Set a value: source, sheet, date_format, period, currency, refresh_secs.
    Set {
        key: String,
        /// New value (empty clears source/sheet)
        value: String,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Spreadsheet (.xlsx/.xls/.ods) or CSV file; defaults to the configured source
    pub file: Option<PathBuf>,
    /// Use built-in sample data instead of a file
    #[arg(long, conflicts_with = "file")]
    pub demo: bool,
    /// Worksheet name or 0-based index (default: first sheet)
    #[arg(long)]
    pub sheet: Option<String>,
    /// Day/month order of text dates
    #[arg(long = "date-format", value_enum)]
    pub date_format: Option<DateOrdering>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct WindowArgs {
    /// Window size
    #[arg(long, value_enum)]
    pub period: Option<Granularity>,
    /// Reference date inside the window: YYYY-MM-DD (default: today)
    #[arg(long)]
    pub date: Option<String>,
    /// Move this many periods from the reference date (e.g. -1 for the previous one)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub offset: i32,
}

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

impl SourceArgs {
    pub fn ordering(&self, settings: &Settings) -> DateOrdering {
        self.date_format.unwrap_or(settings.date_format)
    }

    /// Command-line source first, then the configured one.
    pub fn resolve(&self, settings: &Settings, anchor: NaiveDate) -> Result<Source> {
        if self.demo {
            return Ok(Source::Demo { anchor });
        }
        let path = match (&self.file, &settings.source) {
            (Some(p), _) => p.clone(),
            (None, Some(p)) => PathBuf::from(p),
            (None, None) => return Err(Error::NoSource),
        };
        let sheet = self
            .sheet
            .as_deref()
            .or(settings.sheet.as_deref())
            .map(SheetSelector::parse)
            .unwrap_or_default();
        Ok(Source::from_path(&path, sheet))
    }
}

impl WindowArgs {
    pub fn reference(&self) -> Result<NaiveDate> {
        match &self.date {
            Some(d) => parse_iso(d),
            None => Ok(today()),
        }
    }
}

/// Dashboard state for the requested window: starts on the configured period
/// at the reference date, switches granularity when `--period` is given, then
/// moves by `--offset` windows.
pub fn open_dashboard(
    transactions: Vec<Transaction>,
    window: &WindowArgs,
    settings: &Settings,
    reference: NaiveDate,
) -> Result<Dashboard> {
    let mut dashboard = Dashboard::new(transactions, settings.period, reference);
    if let Some(period) = window.period {
        dashboard.set_granularity(period, reference);
    }
    if window.offset != 0 && !dashboard.navigate(window.offset) {
        return Err(Error::Other(format!("offset {} is out of range", window.offset)));
    }
    debug!(reference = %dashboard.reference(), "opened dashboard");
    Ok(dashboard)
}

/// Read and parse a source in one step.
pub fn ingest(source: &Source, ordering: DateOrdering) -> Result<ParseReport> {
    let table = source.read()?;
    let report = parse_table(&table, ordering, &source.name())?;
    info!(
        "ingested {} transaction(s) from {} ({} skipped)",
        report.transactions.len(),
        source.name(),
        report.skip_count()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_command_line() {
        let mut settings = Settings::default();
        settings.source = Some("/data/configured.xlsx".into());
        settings.sheet = Some("Budget".into());
        let anchor = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        let args = SourceArgs {
            file: Some(PathBuf::from("statement.csv")),
            ..Default::default()
        };
        assert_eq!(
            args.resolve(&settings, anchor).unwrap(),
            Source::Csv { path: PathBuf::from("statement.csv") }
        );

        let args = SourceArgs::default();
        assert_eq!(
            args.resolve(&settings, anchor).unwrap(),
            Source::Workbook {
                path: PathBuf::from("/data/configured.xlsx"),
                sheet: SheetSelector::Name("Budget".into()),
            }
        );

        let args = SourceArgs { demo: true, ..Default::default() };
        assert_eq!(args.resolve(&settings, anchor).unwrap(), Source::Demo { anchor });
    }

    #[test]
    fn test_resolve_without_source_fails() {
        let anchor = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let err = SourceArgs::default().resolve(&Settings::default(), anchor).unwrap_err();
        assert!(matches!(err, Error::NoSource));
    }

    #[test]
    fn test_window_args() {
        let args = WindowArgs {
            period: None,
            date: Some("2025-03-09".into()),
            offset: 0,
        };
        assert_eq!(args.reference().unwrap(), NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());
        let bad = WindowArgs {
            date: Some("09/03/2025".into()),
            ..args
        };
        assert!(bad.reference().is_err());
    }

    #[test]
    fn test_open_dashboard_applies_period_and_offset() {
        let mut settings = Settings::default();
        settings.period = Granularity::Quarter;
        let reference = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap();

        let configured = open_dashboard(Vec::new(), &WindowArgs::default(), &settings, reference).unwrap();
        assert_eq!(configured.view().label, "Q2 2025");

        let args = WindowArgs {
            period: Some(Granularity::Month),
            date: None,
            offset: -2,
        };
        let dash = open_dashboard(Vec::new(), &args, &settings, reference).unwrap();
        assert_eq!(dash.reference(), NaiveDate::from_ymd_opt(2025, 3, 20).unwrap());
        assert_eq!(dash.view().label, "March 2025");

        let far = WindowArgs {
            offset: i32::MAX,
            ..args
        };
        assert!(open_dashboard(Vec::new(), &far, &settings, reference).is_err());
    }
}
