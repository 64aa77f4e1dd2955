//! Configuration handling for the scraper.
//!
//! Everything is read from environment variables with development defaults,
//! mirroring how the binary is normally run (`docscrape <mode>` from a
//! project directory). `Config::from_env` performs the loading and the
//! validation; `Config::new` builds one explicitly for tests.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use url::Url;

/// Environment variable names. Public so integration tests can refer to them.
pub const ENV_DOCS_URL: &str = "DOCSCRAPE_DOCS_URL";
pub const ENV_PEPS_URL: &str = "DOCSCRAPE_PEPS_URL";
pub const ENV_BASE_DIR: &str = "DOCSCRAPE_BASE_DIR";
pub const ENV_MAX_RETRIES: &str = "DOCSCRAPE_MAX_RETRIES";

/// Default development values used when environment variables are absent.
const DEFAULT_DOCS_URL: &str = "https://docs.python.org/3/";
const DEFAULT_PEPS_URL: &str = "https://peps.python.org/";
const DEFAULT_BASE_DIR: &str = ".";
const DEFAULT_MAX_RETRIES: u32 = 0;
const MAX_RETRIES_LIMIT: u32 = 5;

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    docs_url: Url,
    peps_url: Url,
    base_dir: PathBuf,
    max_retries: u32,
}

impl Config {
    /// Create a new config explicitly. Roots are validated the same way
    /// `from_env` validates them.
    pub fn new(
        docs_url: &str,
        peps_url: &str,
        base_dir: impl Into<PathBuf>,
        max_retries: u32,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            docs_url: parse_root(ENV_DOCS_URL, docs_url)?,
            peps_url: parse_root(ENV_PEPS_URL, peps_url)?,
            base_dir: base_dir.into(),
            max_retries: check_retries(max_retries)?,
        })
    }

    /// Load from environment variables, falling back to development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let docs_url = env::var(ENV_DOCS_URL).unwrap_or_else(|_| DEFAULT_DOCS_URL.to_string());
        let peps_url = env::var(ENV_PEPS_URL).unwrap_or_else(|_| DEFAULT_PEPS_URL.to_string());
        let base_dir = env::var(ENV_BASE_DIR).unwrap_or_else(|_| DEFAULT_BASE_DIR.to_string());
        let max_retries = match env::var(ENV_MAX_RETRIES) {
            Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: ENV_MAX_RETRIES,
                reason: format!("'{}' is not a non-negative integer", raw),
            })?,
            Err(_) => DEFAULT_MAX_RETRIES,
        };

        Self::new(&docs_url, &peps_url, base_dir, max_retries)
    }

    /// Documentation root (`https://docs.python.org/3/` by default).
    pub fn docs_url(&self) -> &Url {
        &self.docs_url
    }
    /// Specifications (PEP) root.
    pub fn peps_url(&self) -> &Url {
        &self.peps_url
    }
    /// Directory under which cache, downloads, results and logs live.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.base_dir.join("cache")
    }
    pub fn downloads_dir(&self) -> PathBuf {
        self.base_dir.join("downloads")
    }
    pub fn results_dir(&self) -> PathBuf {
        self.base_dir.join("results")
    }
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// Development defaults (mirrors `from_env` with no env overrides).
    pub fn default() -> Self {
        Self {
            docs_url: Url::parse(DEFAULT_DOCS_URL).expect("default docs url is valid"),
            peps_url: Url::parse(DEFAULT_PEPS_URL).expect("default peps url is valid"),
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

fn parse_root(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
        field,
        reason: format!("'{}' is not an absolute url: {}", raw, e),
    })?;
    // Relative joins drop the last path segment unless it ends with a slash.
    if !url.path().ends_with('/') {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("'{}' must end with '/'", raw),
        });
    }
    Ok(url)
}

fn check_retries(max_retries: u32) -> Result<u32, ConfigError> {
    if max_retries > MAX_RETRIES_LIMIT {
        return Err(ConfigError::InvalidValue {
            field: ENV_MAX_RETRIES,
            reason: format!("{} exceeds the limit of {}", max_retries, MAX_RETRIES_LIMIT),
        });
    }
    Ok(max_retries)
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}
