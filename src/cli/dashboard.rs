use std::time::Duration;

use colored::Colorize;
use comfy_table::{Cell, Table};
use tracing::{info, warn};

use crate::cli::{ingest, open_dashboard, SourceArgs, WindowArgs};
use crate::dashboard::DashboardView;
use crate::error::{Error, Result};
use crate::fmt::{change, money};
use crate::settings::load_settings;

/// Categories listed in the share table.
const TOP_CATEGORIES: usize = 6;

pub fn run(source_args: SourceArgs, window: WindowArgs, json: bool, watch: bool) -> Result<()> {
    let settings = load_settings();
    let reference = window.reference()?;
    let ordering = source_args.ordering(&settings);
    let source = source_args.resolve(&settings, reference)?;

    let report = ingest(&source, ordering)?;
    let mut dashboard = open_dashboard(report.transactions, &window, &settings, reference)?;

    print_view(&dashboard.view(), &settings.currency, json)?;
    if !watch {
        return Ok(());
    }

    if source.path().is_none() {
        return Err(Error::Other("--watch needs a file source".into()));
    }
    let interval = Duration::from_secs(settings.refresh_secs.max(1));
    let mut last = source.fingerprint()?;
    info!("watching {} every {}s", source.name(), interval.as_secs());
    loop {
        std::thread::sleep(interval);
        let current = match source.fingerprint() {
            Ok(f) => f,
            Err(e) => {
                warn!("cannot read {}: {e}", source.name());
                continue;
            }
        };
        if current == last {
            continue;
        }
        last = current;
        match ingest(&source, ordering) {
            Ok(report) => {
                dashboard.replace(report.transactions);
                println!();
                print_view(&dashboard.view(), &settings.currency, json)?;
            }
            Err(e) => warn!("reload of {} failed, keeping previous data: {e}", source.name()),
        }
    }
}

fn print_view(view: &DashboardView<'_>, currency: &str, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(view).map_err(|e| Error::Other(e.to_string()))?;
        println!("{out}");
    } else {
        println!("{}", render(view, currency));
    }
    Ok(())
}

fn colored_change(pct: i64, higher_is_good: bool) -> String {
    let text = change(pct);
    match (pct.signum(), higher_is_good) {
        (0, _) => text,
        (1, true) | (-1, false) => text.green().to_string(),
        _ => text.red().to_string(),
    }
}

pub fn render(view: &DashboardView<'_>, currency: &str) -> String {
    let m = &view.metrics;
    let period = view.window.granularity.key();
    let mut out = format!(
        "{}  ({} to {})\n",
        view.label.bold(),
        view.window.start,
        view.window.last_day()
    );

    let mut kpis = Table::new();
    let vs = format!("vs last {period}");
    kpis.set_header(vec!["", "Amount", vs.as_str()]);
    kpis.add_row(vec![
        Cell::new("Income".green().bold()),
        Cell::new(money(m.total_income, currency)),
        Cell::new(colored_change(m.income_change, true)),
    ]);
    kpis.add_row(vec![
        Cell::new("Expenses".red().bold()),
        Cell::new(money(m.total_expenses, currency)),
        Cell::new(colored_change(m.expense_change, false)),
    ]);
    let net_label = if m.net_balance >= 0.0 { "Net".green().bold() } else { "Net".red().bold() };
    kpis.add_row(vec![
        Cell::new(net_label),
        Cell::new(money(m.net_balance, currency)),
        Cell::new(""),
    ]);
    kpis.add_row(vec![
        Cell::new("Balance".bold()),
        Cell::new(money(m.current_balance, currency)),
        Cell::new(""),
    ]);
    out.push_str(&kpis.to_string());

    if view.transactions.is_empty() {
        out.push_str("\n\nNo transactions in this period.");
        return out;
    }

    let mut weekly = Table::new();
    weekly.set_header(vec!["Week", "Income", "Expenses"]);
    let mut weeks: Vec<_> = m.weekly_breakdown.iter().collect();
    weeks.sort_by(|a, b| a.label.cmp(&b.label));
    for w in weeks {
        weekly.add_row(vec![
            Cell::new(&w.label),
            Cell::new(money(w.income, currency)),
            Cell::new(money(w.expenses, currency)),
        ]);
    }
    out.push_str(&format!("\n\nWeekly flow\n{weekly}"));

    let shares = m.category_shares(TOP_CATEGORIES);
    if !shares.is_empty() {
        let mut cats = Table::new();
        cats.set_header(vec!["Category", "Amount", "Share"]);
        for s in &shares {
            cats.add_row(vec![
                Cell::new(&s.name),
                Cell::new(money(s.total, currency)),
                Cell::new(format!("{:.1}%", s.pct)),
            ]);
        }
        let rest = m.category_breakdown.len().saturating_sub(shares.len());
        out.push_str(&format!("\n\nExpenses by category\n{cats}"));
        if rest > 0 {
            out.push_str(&format!("\n(+{rest} more)"));
        }
    }
    out
}
