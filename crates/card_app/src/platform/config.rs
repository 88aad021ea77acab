//! Application configuration, read from an optional RON file.
//!
//! The file is `card_app.ron` in the working directory unless
//! `CARD_APP_CONFIG` names another path. Every field is optional.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use card_core::CoreConfig;
use card_engine::FetchSettings;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LogDestination;

pub const CONFIG_ENV: &str = "CARD_APP_CONFIG";
const CONFIG_FILENAME: &str = "card_app.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config from {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Origin of the image endpoint, e.g. `https://card.example`.
    pub endpoint_origin: String,
    pub settle_delay_ms: u64,
    pub notification_ttl_ms: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_image_bytes: u64,
    /// Where "Save image" writes files.
    pub output_dir: PathBuf,
    pub log_destination: LogDestination,
    pub log_level: String,
    pub languages_path: Option<PathBuf>,
    pub timezones_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let core = CoreConfig::default();
        let fetch = FetchSettings::default();
        Self {
            endpoint_origin: core.origin,
            settle_delay_ms: core.settle_delay.as_millis() as u64,
            notification_ttl_ms: core.notification_ttl.as_millis() as u64,
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            request_timeout_secs: fetch.request_timeout.as_secs(),
            max_image_bytes: fetch.max_bytes,
            output_dir: PathBuf::from("output"),
            log_destination: LogDestination::default(),
            log_level: "info".to_string(),
            languages_path: None,
            timezones_path: None,
        }
    }
}

impl AppConfig {
    pub fn core_config(&self) -> CoreConfig {
        CoreConfig {
            origin: self.endpoint_origin.clone(),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            notification_ttl: Duration::from_millis(self.notification_ttl_ms),
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            origin: self.endpoint_origin.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_bytes: self.max_image_bytes,
            ..FetchSettings::default()
        }
    }

    pub fn level_filter(&self) -> LevelFilter {
        card_logging::parse_level(&self.log_level).unwrap_or(LevelFilter::Info)
    }
}

/// Path of the config file: `$CARD_APP_CONFIG` or `./card_app.ron`.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME))
}

/// Reads the config at `path`. A missing file is not an error and yields `None`.
pub fn load_from(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    ron::from_str(&content)
        .map(Some)
        .map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
}

/// Loads the config, falling back to defaults. Any error is returned alongside
/// so it can be logged once logging is up.
pub fn load_or_default(path: &Path) -> (AppConfig, Option<ConfigError>) {
    match load_from(path) {
        Ok(Some(config)) => (config, None),
        Ok(None) => (AppConfig::default(), None),
        Err(err) => (AppConfig::default(), Some(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let (config, err) = load_or_default(&temp.path().join("card_app.ron"));
        assert!(err.is_none());
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("card_app.ron");
        fs::write(
            &path,
            r#"(endpoint_origin: "https://card.example", settle_delay_ms: 250, log_destination: Both)"#,
        )
        .unwrap();

        let config = load_from(&path).unwrap().unwrap();
        assert_eq!(config.endpoint_origin, "https://card.example");
        assert_eq!(config.log_destination, LogDestination::Both);
        assert_eq!(config.core_config().settle_delay, Duration::from_millis(250));
        assert_eq!(config.fetch_settings().origin, "https://card.example");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn malformed_file_falls_back_with_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("card_app.ron");
        fs::write(&path, "(settle_delay_ms: \"soon\")").unwrap();

        let (config, err) = load_or_default(&path);
        assert_eq!(config, AppConfig::default());
        assert!(matches!(err, Some(ConfigError::Parse { .. })));
    }

    #[test]
    fn unknown_level_defaults_to_info() {
        let config = AppConfig {
            log_level: "chatty".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(config.level_filter(), LevelFilter::Info);
    }
}
