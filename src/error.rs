use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read workbook: {0}")]
    Workbook(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("No data found in {0}")]
    EmptySource(String),

    #[error("Source must have \"Date\" and \"Amount\" columns; missing: {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),

    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("No source configured. Pass a file path, use --demo, or run `ledgerboard config set source <path>`")]
    NoSource,

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
