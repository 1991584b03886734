//! Process configuration assembled from environment variables.
//!
//! # Responsibility
//! - Resolve database, classifier and logging settings once at startup.
//! - Keep environment access behind a lookup function so callers and tests
//!   can inject values.
//!
//! # Invariants
//! - A missing or blank API key is not an error; the classifier then runs in
//!   fallback-only mode.
//! - The API key never appears in `Debug` output.

use crate::db::{DbTarget, DEFAULT_POOL_SIZE};
use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "TASKLIST_DB_PATH";
pub const ENV_DB_POOL_SIZE: &str = "TASKLIST_DB_POOL_SIZE";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_GEMINI_MODEL: &str = "GEMINI_MODEL";
pub const ENV_GEMINI_BASE_URL: &str = "GEMINI_BASE_URL";
pub const ENV_LOG_LEVEL: &str = "TASKLIST_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TASKLIST_LOG_DIR";

pub const DEFAULT_DB_PATH: &str = "tasklist.sqlite3";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-lite";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const MEMORY_DB_PATH: &str = ":memory:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid value `{value}` for {key}: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Storage settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub target: DbTarget,
    pub pool_size: usize,
}

/// Text-generation settings for the classifier.
#[derive(Clone, PartialEq, Eq)]
pub struct ClassifierConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Debug for ClassifierConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }
}

/// Logging settings; file logging is off when `log_dir` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: &'static str,
    pub log_dir: Option<PathBuf>,
}

/// Full process configuration owned by the composition root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db: DbConfig,
    pub classifier: ClassifierConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let target = match get(ENV_DB_PATH) {
            Some(path) if path == MEMORY_DB_PATH => DbTarget::Memory,
            Some(path) => DbTarget::File(PathBuf::from(path)),
            None => DbTarget::File(PathBuf::from(DEFAULT_DB_PATH)),
        };

        let pool_size = match get(ENV_DB_POOL_SIZE) {
            Some(raw) => parse_pool_size(&raw)?,
            None => DEFAULT_POOL_SIZE,
        };

        let classifier = ClassifierConfig {
            api_key: get(ENV_GEMINI_API_KEY),
            model: get(ENV_GEMINI_MODEL).unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            base_url: get(ENV_GEMINI_BASE_URL)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
        };

        let level = match get(ENV_LOG_LEVEL) {
            Some(raw) => normalize_level(&raw).map_err(|reason| ConfigError::InvalidValue {
                key: ENV_LOG_LEVEL,
                value: raw.clone(),
                reason,
            })?,
            None => default_log_level(),
        };

        let log_dir = match get(ENV_LOG_DIR) {
            Some(raw) => {
                let path = PathBuf::from(&raw);
                if !path.is_absolute() {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_LOG_DIR,
                        value: raw,
                        reason: "must be an absolute path".to_string(),
                    });
                }
                Some(path)
            }
            None => None,
        };

        Ok(Self {
            db: DbConfig { target, pool_size },
            classifier,
            logging: LoggingConfig { level, log_dir },
        })
    }
}

fn parse_pool_size(raw: &str) -> Result<usize, ConfigError> {
    match raw.parse::<usize>() {
        Ok(size) if size >= 1 => Ok(size),
        Ok(_) => Err(ConfigError::InvalidValue {
            key: ENV_DB_POOL_SIZE,
            value: raw.to_string(),
            reason: "must be at least 1".to_string(),
        }),
        Err(err) => Err(ConfigError::InvalidValue {
            key: ENV_DB_POOL_SIZE,
            value: raw.to_string(),
            reason: err.to_string(),
        }),
    }
}
