use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::DateOrdering;
use crate::period::Granularity;

pub const CONFIG_DIR_ENV: &str = "LEDGERBOARD_CONFIG_DIR";

pub const KEYS: &[&str] = &["source", "sheet", "date_format", "period", "currency", "refresh_secs"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Default spreadsheet or CSV path when none is given on the command line.
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub sheet: Option<String>,
    #[serde(default)]
    pub date_format: DateOrdering,
    #[serde(default)]
    pub period: Granularity,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

fn default_currency() -> String {
    "₹".to_string()
}

fn default_refresh_secs() -> u64 {
    60
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: None,
            sheet: None,
            date_format: DateOrdering::default(),
            period: Granularity::default(),
            currency: default_currency(),
            refresh_secs: default_refresh_secs(),
        }
    }
}

impl Settings {
    /// Update one setting from its textual form. An empty value clears the
    /// optional keys.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        let optional = |v: &str| if v.is_empty() { None } else { Some(v.to_string()) };
        match key {
            "source" => self.source = optional(value).map(|p| shellexpand_path(&p)),
            "sheet" => self.sheet = optional(value),
            "date_format" => {
                self.date_format = DateOrdering::from_key(value)
                    .ok_or_else(|| Error::Settings(format!("date_format must be dmy or mdy, got '{value}'")))?;
            }
            "period" => {
                self.period = Granularity::from_key(value).ok_or_else(|| {
                    Error::Settings(format!("period must be week, month or quarter, got '{value}'"))
                })?;
            }
            "currency" => self.currency = value.to_string(),
            "refresh_secs" => {
                self.refresh_secs = value
                    .parse()
                    .ok()
                    .filter(|s| *s > 0)
                    .ok_or_else(|| Error::Settings(format!("refresh_secs must be a positive integer, got '{value}'")))?;
            }
            other => {
                return Err(Error::Settings(format!(
                    "Unknown setting '{other}'. Valid keys: {}",
                    KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }
}

pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("ledgerboard")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        match serde_json::from_str(&content) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("ignoring unreadable settings file {}: {e}", path.display());
                Settings::default()
            }
        }
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings).map_err(|e| Error::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
