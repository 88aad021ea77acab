//! Static lookup tables for the language and timezone pickers.
//!
//! Both tables ship embedded in the binary and can be replaced by JSON files
//! with the same shape.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

const EMBEDDED_LANGUAGES: &str = include_str!("../data/languages.json");
const EMBEDDED_TIMEZONES: &str = include_str!("../data/timezones.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed {table} table: {source}")]
    Parse {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Language {
    pub code: String,
    pub local_name: String,
}

impl Language {
    /// Picker label, e.g. `English (en)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.local_name, self.code)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimezoneEntry {
    /// Offset from UTC in hours; may be fractional (`5.5`, `5.75`).
    pub offset: f64,
    pub text: String,
}

impl TimezoneEntry {
    pub fn offset_minutes(&self) -> i32 {
        (self.offset * 60.0).round() as i32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub languages: Vec<Language>,
    pub timezones: Vec<TimezoneEntry>,
}

impl Catalog {
    pub fn embedded() -> Result<Self, CatalogError> {
        Ok(Self {
            languages: parse_languages(EMBEDDED_LANGUAGES)?,
            timezones: parse_timezones(EMBEDDED_TIMEZONES)?,
        })
    }

    /// Loads the embedded tables, replacing each one whose override path is given.
    pub fn load(
        languages_path: Option<&Path>,
        timezones_path: Option<&Path>,
    ) -> Result<Self, CatalogError> {
        let languages = match languages_path {
            Some(path) => parse_languages(&read(path)?)?,
            None => parse_languages(EMBEDDED_LANGUAGES)?,
        };
        let timezones = match timezones_path {
            Some(path) => parse_timezones(&read(path)?)?,
            None => parse_timezones(EMBEDDED_TIMEZONES)?,
        };
        Ok(Self {
            languages,
            timezones,
        })
    }

    pub fn language(&self, code: &str) -> Option<&Language> {
        self.languages.iter().find(|language| language.code == code)
    }

    /// First timezone entry with the given offset, used as the picker label.
    pub fn timezone(&self, offset_minutes: i32) -> Option<&TimezoneEntry> {
        self.timezones
            .iter()
            .find(|timezone| timezone.offset_minutes() == offset_minutes)
    }
}

fn read(path: &Path) -> Result<String, CatalogError> {
    fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.display().to_string(),
        source,
    })
}

pub fn parse_languages(json: &str) -> Result<Vec<Language>, CatalogError> {
    serde_json::from_str(json).map_err(|source| CatalogError::Parse {
        table: "language",
        source,
    })
}

pub fn parse_timezones(json: &str) -> Result<Vec<TimezoneEntry>, CatalogError> {
    serde_json::from_str(json).map_err(|source| CatalogError::Parse {
        table: "timezone",
        source,
    })
}
