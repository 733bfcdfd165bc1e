use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ConfigError;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_MAX_RESULTS: u32 = 5;

/// Language tag sent with every request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "fr" => Ok(Language::Fr),
            _ => Err(ConfigError::UnknownLanguage(s.to_string())),
        }
    }
}

/// On-disk configuration, every field optional
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub backend_url: Option<String>,
    pub language: Option<String>,
    pub max_results: Option<u32>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("medicare").join("config.json"))
    }
}

/// Values that override the config file (CLI flags, environment)
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub backend_url: Option<String>,
    pub language: Option<String>,
    pub max_results: Option<u32>,
}

impl Overrides {
    /// Read `MEDICARE_BACKEND_URL` and `MEDICARE_LANGUAGE`
    pub fn from_env() -> Self {
        Self {
            backend_url: std::env::var("MEDICARE_BACKEND_URL").ok(),
            language: std::env::var("MEDICARE_LANGUAGE").ok(),
            max_results: None,
        }
    }

    /// Layer `self` over `lower`; values set here win.
    pub fn or(self, lower: Overrides) -> Overrides {
        Overrides {
            backend_url: self.backend_url.or(lower.backend_url),
            language: self.language.or(lower.language),
            max_results: self.max_results.or(lower.max_results),
        }
    }
}

/// Resolved settings handed to every workflow
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub backend_url: String,
    pub language: Language,
    pub max_results: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            language: Language::En,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl Settings {
    pub fn resolve(config: &Config, overrides: Overrides) -> Result<Self, ConfigError> {
        let backend_url = overrides
            .backend_url
            .or_else(|| config.backend_url.clone())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        let language = match overrides.language.or_else(|| config.language.clone()) {
            Some(tag) => tag.parse()?,
            None => Language::default(),
        };

        let max_results = overrides
            .max_results
            .or(config.max_results)
            .unwrap_or(DEFAULT_MAX_RESULTS);
        if max_results == 0 {
            return Err(ConfigError::InvalidMaxResults(max_results));
        }

        Ok(Self {
            backend_url: backend_url.trim_end_matches('/').to_string(),
            language,
            max_results,
        })
    }
}
