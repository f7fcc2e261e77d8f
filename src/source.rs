use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::demo;
use crate::error::{Error, Result};
use crate::models::{RawCell, RawTable};

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Which worksheet of a workbook to read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SheetSelector {
    #[default]
    First,
    Name(String),
    Index(usize),
}

impl SheetSelector {
    /// All-digit text selects by (0-based) index, anything else by name.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Self::First;
        }
        match raw.parse::<usize>() {
            Ok(i) => Self::Index(i),
            Err(_) => Self::Name(raw.to_string()),
        }
    }
}

impl fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("first sheet"),
            Self::Name(n) => write!(f, "sheet \"{n}\""),
            Self::Index(i) => write!(f, "sheet #{i}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Workbook { path: PathBuf, sheet: SheetSelector },
    Csv { path: PathBuf },
    /// Built-in sample ledger covering the three months up to `anchor`.
    Demo { anchor: NaiveDate },
}

impl Source {
    pub fn from_path(path: &Path, sheet: SheetSelector) -> Self {
        let is_workbook = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| WORKBOOK_EXTENSIONS.iter().any(|w| e.eq_ignore_ascii_case(w)));
        if is_workbook {
            Self::Workbook {
                path: path.to_path_buf(),
                sheet,
            }
        } else {
            Self::Csv {
                path: path.to_path_buf(),
            }
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::Workbook { path, sheet } => format!("{} ({sheet})", path.display()),
            Self::Csv { path } => path.display().to_string(),
            Self::Demo { .. } => "demo data".to_string(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Workbook { path, .. } | Self::Csv { path } => Some(path),
            Self::Demo { .. } => None,
        }
    }

    /// Read the whole source into a raw table. Any failure here is fatal for
    /// the ingestion attempt.
    pub fn read(&self) -> Result<RawTable> {
        let table = match self {
            Self::Workbook { path, sheet } => read_workbook(path, sheet)?,
            Self::Csv { path } => read_csv(path)?,
            Self::Demo { anchor } => demo::sample_table(*anchor),
        };
        if table.rows.is_empty() {
            return Err(Error::EmptySource(self.name()));
        }
        info!("read {} row(s) from {}", table.rows.len(), self.name());
        Ok(table)
    }

    /// SHA-256 of the source file, or `None` for in-memory sources.
    pub fn fingerprint(&self) -> Result<Option<String>> {
        match self.path() {
            Some(path) => compute_checksum(path).map(Some),
            None => Ok(None),
        }
    }
}

fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn read_csv(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(csv_cell).collect());
    }
    debug!(rows = rows.len(), "parsed CSV records");
    Ok(RawTable::new(rows))
}

/// Plain numeric fields become numbers, as a spreadsheet would read them, so
/// serial dates in a CSV export still resolve.
fn csv_cell(field: &str) -> RawCell {
    match field.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => RawCell::Number(n),
        _ => RawCell::from(field),
    }
}

// ---------------------------------------------------------------------------
// Workbooks (feature-gated)
// ---------------------------------------------------------------------------

#[cfg(feature = "xlsx")]
fn read_workbook(path: &Path, sheet: &SheetSelector) -> Result<RawTable> {
    use calamine::Reader;

    if !path.exists() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }
    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| Error::Workbook(format!("{}: {e}", path.display())))?;
    let names = workbook.sheet_names();
    debug!(?names, "workbook sheets");

    let range = match sheet {
        SheetSelector::Name(name) => {
            if !names.iter().any(|n| n == name) {
                return Err(Error::SheetNotFound(name.clone()));
            }
            workbook
                .worksheet_range(name)
                .map_err(|e| Error::Workbook(e.to_string()))?
        }
        SheetSelector::First | SheetSelector::Index(_) => {
            let idx = match sheet {
                SheetSelector::Index(i) => *i,
                _ => 0,
            };
            workbook
                .worksheet_range_at(idx)
                .ok_or_else(|| Error::SheetNotFound(format!("#{idx}")))?
                .map_err(|e| Error::Workbook(e.to_string()))?
        }
    };

    let rows: Vec<Vec<RawCell>> = range
        .rows()
        .map(|r| r.iter().map(cell_from_data).collect())
        .collect();
    Ok(RawTable::new(rows))
}

#[cfg(not(feature = "xlsx"))]
fn read_workbook(path: &Path, _sheet: &SheetSelector) -> Result<RawTable> {
    Err(Error::Other(format!(
        "Cannot read {}: workbook support requires the 'xlsx' feature",
        path.display()
    )))
}

#[cfg(feature = "xlsx")]
pub(crate) fn cell_from_data(data: &calamine::Data) -> RawCell {
    use calamine::Data;
    match data {
        Data::Float(f) => RawCell::Number(*f),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::DateTime(dt) => RawCell::Number(dt.as_f64()),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            if s.is_empty() {
                RawCell::Empty
            } else {
                RawCell::Text(s.clone())
            }
        }
        Data::Bool(b) => RawCell::Text(b.to_string()),
        Data::Error(_) | Data::Empty => RawCell::Empty,
    }
}
