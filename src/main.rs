mod cli;
mod dashboard;
mod dates;
mod demo;
mod error;
mod fmt;
mod metrics;
mod models;
mod parser;
mod period;
mod settings;
mod source;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Dashboard {
            source,
            window,
            json,
            watch,
        } => cli::dashboard::run(source, window, json, watch),
        Commands::Transactions {
            source,
            window,
            limit,
            all,
        } => cli::transactions::run(source, window, limit, all),
        Commands::Check { source } => cli::check::run(source),
        Commands::Config { command } => cli::config::run(command),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
