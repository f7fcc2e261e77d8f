use crate::cli::ConfigCommands;
use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path, Settings};

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let settings = load_settings();
    println!("Settings file: {}", settings_path().display());
    println!("{}", render(&settings));
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut settings = load_settings();
    settings.set(key, value)?;
    save_settings(&settings)?;
    println!("Saved {key}.");
    Ok(())
}

fn render(settings: &Settings) -> String {
    let or_unset = |v: &Option<String>| v.clone().unwrap_or_else(|| "(not set)".to_string());
    [
        format!("source:        {}", or_unset(&settings.source)),
        format!("sheet:         {}", or_unset(&settings.sheet)),
        format!("date_format:   {}", settings.date_format.key()),
        format!("period:        {}", settings.period.key()),
        format!("currency:      {}", settings.currency),
        format!("refresh_secs:  {}", settings.refresh_secs),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_shows_every_key() {
        let mut settings = Settings::default();
        settings.set("sheet", "2").unwrap();
        let out = render(&settings);
        assert!(out.contains("source:        (not set)"));
        assert!(out.contains("sheet:         2"));
        assert!(out.contains("date_format:   dmy"));
        assert!(out.contains("period:        month"));
        assert!(out.contains("currency:      ₹"));
        assert!(out.contains("refresh_secs:  60"));
    }
}
