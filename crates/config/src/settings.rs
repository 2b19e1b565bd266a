// Client settings
// Loaded from ~/.config/sheetbatch/settings.json

use serde::{Deserialize, Serialize};
use sheetbatch_core::value::Channel;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/v4";

/// Settings file template written by [`Settings::write_default`].
const DEFAULT_CONFIG: &str = r#"{
    // Service endpoint
    "api.baseUrl": "https://sheets.googleapis.com/v4",
    "api.timeoutSecs": 60,

    // Value channels: "userEntered", "effective" or "formatted"
    "values.readChannel": "effective",
    "values.writeChannel": "effective",

    // Log a warning when a commit holds partially overlapping requests
    "queue.warnOnOverlap": true,

    // Grid size of newly created tabs
    "tab.defaultRows": 1000,
    "tab.defaultColumns": 26
}
"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // API
    #[serde(rename = "api.baseUrl")]
    pub api_base_url: String,

    #[serde(rename = "api.timeoutSecs")]
    pub timeout_secs: u64,

    // Values
    #[serde(rename = "values.readChannel")]
    pub read_channel: Channel,

    #[serde(rename = "values.writeChannel")]
    pub write_channel: Channel,

    // Queue
    #[serde(rename = "queue.warnOnOverlap")]
    pub warn_on_overlap: bool,

    // New tabs
    #[serde(rename = "tab.defaultRows")]
    pub default_rows: u32,

    #[serde(rename = "tab.defaultColumns")]
    pub default_columns: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE.to_string(),
            timeout_secs: 60,
            read_channel: Channel::Effective,
            write_channel: Channel::Effective,
            warn_on_overlap: true,
            default_rows: 1000,
            default_columns: 26,
        }
    }
}

/// The part of [`Settings`] a view consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSettings {
    pub read_channel: Channel,
    pub write_channel: Channel,
    pub warn_on_overlap: bool,
    pub default_rows: u32,
    pub default_columns: u32,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Settings::default().view_settings()
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sheetbatch");
        config_dir.join("settings.json")
    }

    /// Load settings from the default path, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`, falling back to defaults when the file is
    /// missing or unreadable
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No settings file at {}, using defaults", path.display());
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("Error parsing {}: {}; using default settings", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Error reading {}: {}; using default settings", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned)
    }

    /// Save current settings to the default path
    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::config_path())
    }

    /// Save current settings to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Write the commented default settings file to `path`
    pub fn write_default(path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        fs::write(path, DEFAULT_CONFIG).map_err(|e| e.to_string())
    }

    pub fn view_settings(&self) -> ViewSettings {
        ViewSettings {
            read_channel: self.read_channel,
            write_channel: self.write_channel,
            warn_on_overlap: self.warn_on_overlap,
            default_rows: self.default_rows,
            default_columns: self.default_columns,
        }
    }

    /// Get the config file path for display
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.api_base_url, "https://sheets.googleapis.com/v4");
        assert_eq!(s.timeout_secs, 60);
        assert_eq!(s.read_channel, Channel::Effective);
        assert_eq!(s.write_channel, Channel::Effective);
        assert!(s.warn_on_overlap);
        assert_eq!((s.default_rows, s.default_columns), (1000, 26));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let s = Settings::parse(r#"{"values.writeChannel": "userEntered", "tab.defaultRows": 50}"#).unwrap();
        assert_eq!(s.write_channel, Channel::UserEntered);
        assert_eq!(s.default_rows, 50);
        assert_eq!(s.read_channel, Channel::Effective);
        assert_eq!(s.default_columns, 26);
    }

    #[test]
    fn test_comment_lines_are_stripped() {
        let s = Settings::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_load_from_missing_or_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert_eq!(Settings::load_from(&missing), Settings::default());

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&bad), Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/settings.json");

        let mut s = Settings::default();
        s.api_base_url = "http://localhost:9000".into();
        s.warn_on_overlap = false;
        s.read_channel = Channel::Formatted;
        s.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded, s);
        assert!(!loaded.view_settings().warn_on_overlap);
        assert_eq!(loaded.view_settings().read_channel, Channel::Formatted);
    }

    #[test]
    fn test_write_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        Settings::write_default(&path).unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_config_path() {
        let path = Settings::config_path();
        assert!(path.to_string_lossy().contains("sheetbatch"));
        assert!(path.ends_with("settings.json"));
    }
}
