use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod validator;

use crate::cli::Cli;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_INTERVAL_MS: u64 = 200;
pub const DEFAULT_FAVORITES_PATH: &str = ".pumpflux/favorites.json";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiSettings {
    /// Root of the PumpFlux backend, without the `/api` suffix
    pub base_url: String,
    pub timeout_secs: u64,
    pub retry: RetrySettings,
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Backoff for the template list fetch
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_interval_ms: u64,
}

impl RetrySettings {
    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StorageSettings {
    pub favorites_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiSettings {
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
                retry: RetrySettings {
                    max_attempts: DEFAULT_MAX_ATTEMPTS,
                    initial_interval_ms: DEFAULT_INITIAL_INTERVAL_MS,
                },
            },
            storage: StorageSettings {
                favorites_path: PathBuf::from(DEFAULT_FAVORITES_PATH),
            },
        }
    }
}

impl Settings {
    /// Load `./pumpflux.toml` (if present) and `PUMPFLUX__*` environment overrides.
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::load(Path::new("pumpflux.toml"))
    }

    /// Create settings from CLI arguments (config file, environment, then CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::build(&cli.config)?;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);

        settings.validate()?;
        Ok(settings)
    }

    pub fn load(config_path: &Path) -> Result<Self, anyhow::Error> {
        let settings = Self::build(config_path)?;
        settings.validate()?;
        Ok(settings)
    }

    fn build(config_path: &Path) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .set_default("api.base_url", DEFAULT_BASE_URL)?
            .set_default("api.timeout_secs", DEFAULT_TIMEOUT_SECS as i64)?
            .set_default("api.retry.max_attempts", i64::from(DEFAULT_MAX_ATTEMPTS))?
            .set_default("api.retry.initial_interval_ms", DEFAULT_INITIAL_INTERVAL_MS as i64)?
            .set_default("storage.favorites_path", DEFAULT_FAVORITES_PATH)?
            .add_source(File::from(config_path.to_path_buf()).required(false))
            .add_source(
                Environment::with_prefix("PUMPFLUX")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(s.try_deserialize()?)
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(api_url) = &cli.api_url {
            self.api.base_url = api_url.clone();
        }
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }
}
