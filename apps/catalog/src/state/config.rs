//! # Configuration State
//!
//! Settings loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`CATALOG_*`)
//! 2. Config file (path in `CATALOG_CONFIG`, TOML)
//! 3. Defaults (this file)
//!
//! ## Config File Format
//! ```toml
//! taxRateBps = 2000
//! notificationTtlMs = 4000
//! timestampFormat = "%-m/%-d/%Y, %-I:%M:%S %p"
//! imageExtensions = ["PNG"]
//! ```
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use catalog_core::render::RenderOptions;
use catalog_core::{
    TaxRate, ValidatorRegistry, DEFAULT_EMPTY_MESSAGE, DEFAULT_FAILURE_MESSAGE,
    DEFAULT_IMAGE_EXTENSIONS, DEFAULT_NOTIFICATION_TTL_MS, DEFAULT_SUCCESS_MESSAGE,
    DEFAULT_TIMESTAMP_FORMAT,
};

use crate::error::{AppError, AppResult};

/// Environment variable naming the TOML config file.
pub const CONFIG_PATH_ENV: &str = "CATALOG_CONFIG";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigState {
    /// Tax added to prices, in basis points (2000 = 20%)
    pub tax_rate_bps: u32,

    /// How long a notification stays visible
    pub notification_ttl_ms: u64,

    /// strftime pattern for the table's timestamp column
    pub timestamp_format: String,

    /// Extensions accepted by the `image-format` validator
    pub image_extensions: Vec<String>,

    /// Banner after a product is added
    pub success_message: String,

    /// Banner after a rejected submission
    pub failure_message: String,

    /// Text of the "no results" row
    pub empty_message: String,
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState {
            tax_rate_bps: TaxRate::STANDARD.bps(),
            notification_ttl_ms: DEFAULT_NOTIFICATION_TTL_MS,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            image_extensions: DEFAULT_IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            success_message: DEFAULT_SUCCESS_MESSAGE.to_string(),
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
            empty_message: DEFAULT_EMPTY_MESSAGE.to_string(),
        }
    }
}

impl ConfigState {
    /// Loads configuration from all sources.
    ///
    /// Reads the file named by `CATALOG_CONFIG` if set, then applies
    /// environment overrides.
    pub fn load() -> AppResult<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => ConfigState::from_file(Path::new(&path))?,
            Err(_) => ConfigState::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Reads a TOML config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| AppError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: ConfigState = toml::from_str(&raw).map_err(|e| AppError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        info!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Applies overrides from an environment lookup.
    ///
    /// ## Environment Variables
    /// - `CATALOG_TAX_RATE`: percentage, e.g. `"20"` or `"8.25"`
    /// - `CATALOG_NOTIFICATION_TTL_MS`: milliseconds
    /// - `CATALOG_TIMESTAMP_FORMAT`: strftime pattern
    /// - `CATALOG_IMAGE_EXTENSIONS`: comma list, e.g. `"png,jpg"`
    ///
    /// Unparseable values are ignored with a warning.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("CATALOG_TAX_RATE") {
            match raw.trim().parse::<f64>() {
                Ok(pct) if pct >= 0.0 => {
                    self.tax_rate_bps = TaxRate::from_percentage(pct).bps();
                }
                _ => warn!(value = %raw, "Ignoring invalid CATALOG_TAX_RATE"),
            }
        }

        if let Some(raw) = lookup("CATALOG_NOTIFICATION_TTL_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) => self.notification_ttl_ms = ms,
                Err(_) => warn!(value = %raw, "Ignoring invalid CATALOG_NOTIFICATION_TTL_MS"),
            }
        }

        if let Some(format) = lookup("CATALOG_TIMESTAMP_FORMAT") {
            self.timestamp_format = format;
        }

        if let Some(raw) = lookup("CATALOG_IMAGE_EXTENSIONS") {
            let extensions: Vec<String> = raw
                .split(',')
                .map(|e| e.trim().trim_start_matches('.').to_uppercase())
                .filter(|e| !e.is_empty())
                .collect();
            if extensions.is_empty() {
                warn!(value = %raw, "Ignoring empty CATALOG_IMAGE_EXTENSIONS");
            } else {
                self.image_extensions = extensions;
            }
        }
    }

    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            timestamp_format: self.timestamp_format.clone(),
            empty_message: self.empty_message.clone(),
        }
    }

    /// Builds the validator registry for this configuration.
    pub fn validator_registry(&self) -> ValidatorRegistry {
        ValidatorRegistry::standard(&self.image_extensions)
    }
}
