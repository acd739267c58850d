//! # Configuration
//!
//! Every setting can come from a command-line flag or an environment variable, falling back
//! to a default. Flags win over the environment.
//!
//! | Flag | Variable | Default |
//! |------|----------|---------|
//! | `--base-url` | `BREEDS_BASE_URL` | `https://dog.ceo/api` |
//! | `--dogs-base-url` | `DOGS_BASE_URL` | same as `--base-url` |
//! | `--timeout-ms` | `BREEDS_REQUEST_TIMEOUT_MS` | `10000` |
//! | `--storage-path` | `BREEDS_STORAGE_PATH` | `.breed-browser/storage.json` |
//! | `--key-prefix` | `BREEDS_KEY_PREFIX` | none |

use clap::Args;
use effect_framework::cache::PREFIX_SEPARATOR;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://dog.ceo/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_STORAGE_PATH: &str = ".breed-browser/storage.json";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    EmptyUrl(&'static str),

    #[error("{name} must be an http(s) URL, got '{value}'")]
    UnsupportedScheme { name: &'static str, value: String },

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("key prefix '{0}' contains the reserved separator ':'")]
    ReservedInPrefix(String),
}

/// Settings as they arrive from the command line and environment.
#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Base URL of the breeds API
    #[arg(long, env = "BREEDS_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Base URL of the dogs API (defaults to the breeds API)
    #[arg(long, env = "DOGS_BASE_URL", global = true)]
    pub dogs_base_url: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, env = "BREEDS_REQUEST_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS, global = true)]
    pub timeout_ms: u64,

    /// File backing the local cache
    #[arg(long, env = "BREEDS_STORAGE_PATH", default_value = DEFAULT_STORAGE_PATH, global = true)]
    pub storage_path: PathBuf,

    /// Prefix for every cache key
    #[arg(long, env = "BREEDS_KEY_PREFIX", default_value = "", global = true)]
    pub key_prefix: String,
}

/// Validated application settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub base_url: String,
    pub dogs_base_url: String,
    pub request_timeout: Duration,
    pub storage_path: PathBuf,
    pub key_prefix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            dogs_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            key_prefix: String::new(),
        }
    }
}

impl AppConfig {
    pub fn from_args(args: ConfigArgs) -> Result<Self, ConfigError> {
        let base_url = trim_url(&args.base_url);
        let dogs_base_url = args
            .dogs_base_url
            .as_deref()
            .map(trim_url)
            .unwrap_or_else(|| base_url.clone());

        let config = Self {
            base_url,
            dogs_base_url,
            request_timeout: Duration::from_millis(args.timeout_ms),
            storage_path: args.storage_path,
            key_prefix: args.key_prefix,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("base URL", &self.base_url)?;
        check_url("dogs base URL", &self.dogs_base_url)?;
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.key_prefix.contains(PREFIX_SEPARATOR) {
            return Err(ConfigError::ReservedInPrefix(self.key_prefix.clone()));
        }
        Ok(())
    }
}

fn trim_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn check_url(name: &'static str, url: &str) -> Result<(), ConfigError> {
    if url.is_empty() {
        return Err(ConfigError::EmptyUrl(name));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::UnsupportedScheme {
            name,
            value: url.to_string(),
        });
    }
    Ok(())
}
