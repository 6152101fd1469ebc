// Configuration file handling
//
// The rc file lives at ~/.tahap/rc and holds `key=value` lines:
//   data.location=<path to ledger database>
//   log.level=<env_logger filter, e.g. debug or tahap=info>
// Blank lines and lines starting with '#' are ignored.

use std::path::{Path, PathBuf};
use anyhow::{Context, Result};

const APP_DIR: &str = ".tahap";

/// Resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_location: PathBuf,
    pub log_level: Option<String>,
    /// Unrecognised keys, reported once logging is up
    pub ignored_keys: Vec<String>,
}

impl Config {
    /// Directory holding the rc file and the default database
    pub fn app_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(APP_DIR))
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("rc"))
    }

    /// Load the rc file, falling back to defaults when it does not exist
    pub fn load() -> Result<Self> {
        let app_dir = Self::app_dir()?;
        let config_path = Self::config_path()?;
        let defaults = Self::defaults(&app_dir);

        if !config_path.exists() {
            return Ok(defaults);
        }
        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        Self::parse(&contents, &app_dir, defaults)
    }

    fn defaults(app_dir: &Path) -> Self {
        Self {
            data_location: app_dir.join("ledger.db"),
            log_level: None,
            ignored_keys: Vec::new(),
        }
    }

    /// Parse rc contents; relative paths resolve against `base_dir`
    pub fn parse(contents: &str, base_dir: &Path, defaults: Self) -> Result<Self> {
        let mut config = defaults;
        for (line_no, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .with_context(|| format!("Invalid config line {}: '{}' (expected key=value)", line_no + 1, line))?;
            let value = value.trim();
            match key.trim() {
                "data.location" => {
                    let path = PathBuf::from(value);
                    config.data_location = if path.is_relative() {
                        base_dir.join(path)
                    } else {
                        path
                    };
                }
                "log.level" => config.log_level = Some(value.to_string()),
                other => config.ignored_keys.push(other.to_string()),
            }
        }
        Ok(config)
    }
}
