//! Runtime configuration
//!
//! Built once by the binary and handed to stores and services by value.

use std::env;
use std::path::PathBuf;

use chrono::Weekday;
use directories::BaseDirs;
use tracing::debug;

use crate::types::{HydroError, Result};

const DATA_DIR_ENV: &str = "HYDROTRACK_DATA_DIR";
const LOCALE_ENV: &str = "HYDROTRACK_LOCALE";

/// Language used for weekday names in weekly reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "en" | "en_us" | "en-us" => Ok(Self::En),
            "es" | "es_es" | "es-es" => Ok(Self::Es),
            other => Err(HydroError::Config(format!(
                "unsupported locale {:?} (expected \"en\" or \"es\")",
                other
            ))),
        }
    }

    pub fn weekday_name(self, weekday: Weekday) -> &'static str {
        match self {
            Self::En => match weekday {
                Weekday::Mon => "Monday",
                Weekday::Tue => "Tuesday",
                Weekday::Wed => "Wednesday",
                Weekday::Thu => "Thursday",
                Weekday::Fri => "Friday",
                Weekday::Sat => "Saturday",
                Weekday::Sun => "Sunday",
            },
            Self::Es => match weekday {
                Weekday::Mon => "lunes",
                Weekday::Tue => "martes",
                Weekday::Wed => "miércoles",
                Weekday::Thu => "jueves",
                Weekday::Fri => "viernes",
                Weekday::Sat => "sábado",
                Weekday::Sun => "domingo",
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding `records.json` and `profiles.json`
    pub data_dir: PathBuf,
    pub locale: Locale,
}

impl Config {
    /// Resolve configuration: explicit override, then environment, then `~/.hydrotrack`.
    pub fn load(data_dir_override: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir_override {
            Some(dir) => dir,
            None => match env::var_os(DATA_DIR_ENV) {
                Some(dir) if !dir.is_empty() => PathBuf::from(dir),
                _ => Self::default_data_dir()?,
            },
        };

        let locale = match env::var(LOCALE_ENV) {
            Ok(raw) if !raw.trim().is_empty() => Locale::parse(&raw)?,
            _ => Locale::default(),
        };

        debug!(data_dir = %data_dir.display(), ?locale, "configuration loaded");
        Ok(Self { data_dir, locale })
    }

    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            locale: Locale::default(),
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    fn default_data_dir() -> Result<PathBuf> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| HydroError::Config("Cannot determine home directory".into()))?;
        Ok(base_dirs.home_dir().join(".hydrotrack"))
    }
}
