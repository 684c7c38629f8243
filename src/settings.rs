use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ImportError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub inbound_dir: String,
    pub archive_dir: String,
    pub log_dir: String,
    pub db_path: String,
    #[serde(default = "default_archive_retention")]
    pub archive_retention: usize,
    #[serde(default = "default_log_retention")]
    pub log_retention: usize,
    #[serde(default = "default_drivers")]
    pub drivers: Vec<String>,
}

fn default_archive_retention() -> usize {
    180
}

fn default_log_retention() -> usize {
    90
}

fn default_drivers() -> Vec<String> {
    vec!["sqlite3".to_string()]
}

impl Default for Settings {
    fn default() -> Self {
        Self::rooted_at(&default_data_dir())
    }
}

impl Settings {
    /// Derive the standard directory layout under one data directory.
    pub fn rooted_at(data_dir: &std::path::Path) -> Self {
        Self {
            inbound_dir: data_dir.join("inbound").to_string_lossy().to_string(),
            archive_dir: data_dir.join("archive").to_string_lossy().to_string(),
            log_dir: data_dir.join("logs").to_string_lossy().to_string(),
            db_path: data_dir
                .join("teller-totals.db")
                .to_string_lossy()
                .to_string(),
            archive_retention: default_archive_retention(),
            log_retention: default_log_retention(),
            drivers: default_drivers(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("teller-totals")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("teller-totals")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| ImportError::Settings(e.to_string()))?;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            inbound_dir: "/srv/teller/inbound".to_string(),
            archive_dir: "/srv/teller/archive".to_string(),
            log_dir: "/srv/teller/logs".to_string(),
            db_path: "/srv/teller/totals.db".to_string(),
            archive_retention: 30,
            log_retention: 14,
            drivers: vec!["sqlite3".to_string()],
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.inbound_dir, "/srv/teller/inbound");
        assert_eq!(loaded.archive_retention, 30);
        assert_eq!(loaded.drivers, vec!["sqlite3".to_string()]);
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.archive_retention, 180);
        assert_eq!(s.log_retention, 90);
        assert_eq!(s.drivers, vec!["sqlite3".to_string()]);
        assert!(!s.inbound_dir.is_empty());
    }

    #[test]
    fn test_load_merges_with_defaults() {
        // Retention caps and drivers fall back when absent from the file.
        let json = r#"{
            "inbound_dir": "/in",
            "archive_dir": "/arc",
            "log_dir": "/logs",
            "db_path": "/db/totals.db"
        }"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.archive_retention, 180);
        assert_eq!(s.log_retention, 90);
        assert_eq!(s.drivers, vec!["sqlite3".to_string()]);
    }

    #[test]
    fn test_rooted_at_layout() {
        let s = Settings::rooted_at(std::path::Path::new("/data/teller"));
        assert!(s.inbound_dir.ends_with("inbound"));
        assert!(s.archive_dir.ends_with("archive"));
        assert!(s.log_dir.ends_with("logs"));
        assert!(s.db_path.ends_with("teller-totals.db"));
    }
}
