//! Configuration file
//!
//! ```json
//! {
//!   "data_dir": "./.data",
//!   "http": { "host": "0.0.0.0", "port": 3000, "cors_origins": [] },
//!   "token_ttl_secs": 3600,
//!   "hashing_secret": null,
//!   "log_level": "info"
//! }
//! ```
//!
//! Only `data_dir` is required.

use std::fs;
use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::auth::{SecretHasher, TokenConfig};
use crate::http_server::HttpServerConfig;
use crate::observability::Severity;

/// Longest accepted token lifetime (one year)
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root of the record collections (required)
    pub data_dir: String,

    /// HTTP bind address and CORS
    #[serde(default)]
    pub http: HttpServerConfig,

    /// Session token lifetime in seconds (default 1 hour)
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,

    /// Pepper mixed into every secret hash (default none)
    #[serde(default)]
    pub hashing_secret: Option<String>,

    /// Minimum log severity (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_token_ttl_secs() -> u64 {
    3600
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        Self::from_json(&content)
    }

    /// Parse and validate configuration text
    pub fn from_json(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }

        if self.token_ttl_secs == 0 {
            return Err(CliError::config_error("token_ttl_secs must be > 0"));
        }
        if self.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(CliError::config_error(format!(
                "token_ttl_secs must be <= {}",
                MAX_TOKEN_TTL_SECS
            )));
        }

        if self.http.port == 0 {
            return Err(CliError::config_error("http.port must be > 0"));
        }

        if matches!(&self.hashing_secret, Some(secret) if secret.is_empty()) {
            return Err(CliError::config_error(
                "hashing_secret must be null or a non-empty string",
            ));
        }

        self.severity()?;

        Ok(())
    }

    /// Get data directory as Path
    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    /// Minimum log severity
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level
            .parse()
            .map_err(|e: String| CliError::config_error(format!("Invalid log_level: {}", e)))
    }

    pub fn token_config(&self) -> TokenConfig {
        let secs = self.token_ttl_secs.min(MAX_TOKEN_TTL_SECS) as i64;
        TokenConfig {
            ttl: Duration::seconds(secs),
        }
    }

    pub fn secret_hasher(&self) -> SecretHasher {
        SecretHasher::new(self.hashing_secret.clone())
    }
}
