use feeplus_admin::AdminApiConfig;
use feeplus_core::{ReconcileSettings, parse_price};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub admin: AdminApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub reconcile: ReconcileSettings,
    #[serde(default)]
    pub fee: FeeDefaults,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Admin validations
        if self.admin.timeout_ms == 0 {
            return Err("admin.timeout_ms must be > 0".into());
        }
        if self.admin.api_version.trim().is_empty() {
            return Err("admin.api_version must not be empty".into());
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        self.reconcile.validate()?;
        // Fee defaults
        if self.fee.title.trim().is_empty() {
            return Err("fee.title must not be empty".into());
        }
        if self.fee.label.trim().is_empty() {
            return Err("fee.label must not be empty".into());
        }
        parse_price(&self.fee.price).map_err(|e| format!("fee.price: {e}"))?;
        Ok(())
    }

    /// Checks the settings needed to reach a tenant's Admin API.
    pub fn require_credentials(&self) -> Result<(), String> {
        if self.admin.shop_domain.trim().is_empty() && self.admin.endpoint.is_none() {
            return Err("admin.shop_domain (or admin.endpoint) is required".into());
        }
        if self.admin.access_token.trim().is_empty() {
            return Err("admin.access_token is required".into());
        }
        Ok(())
    }

    /// Copy safe to print: the access token is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.admin.access_token.is_empty() {
            copy.admin.access_token = "********".into();
        }
        copy
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Defaults for `fee create` when flags are omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeDefaults {
    #[serde(default = "default_fee_title")]
    pub title: String,
    #[serde(default = "default_fee_label")]
    pub label: String,
    #[serde(default = "default_fee_price")]
    pub price: String,
}
fn default_fee_title() -> String {
    "Service fee".into()
}
fn default_fee_label() -> String {
    "Fee".into()
}
fn default_fee_price() -> String {
    "0.00".into()
}
impl Default for FeeDefaults {
    fn default() -> Self {
        Self {
            title: default_fee_title(),
            label: default_fee_label(),
            price: default_fee_price(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub const CONFIG_PATH_ENV: &str = "FEEPLUS_CONFIG";
    const DEFAULT_PATH: &str = "feeplus.toml";

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let explicit = path
            .map(str::to_string)
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok());
        match explicit {
            Some(p) => {
                let pathbuf = PathBuf::from(&p);
                if !pathbuf.exists() {
                    return Err(format!("config file not found: {p}"));
                }
                builder = builder.add_source(File::from(pathbuf));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_PATH);
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., FEEPLUS__ADMIN__SHOP_DOMAIN=example.myshopify.com
        builder = builder.add_source(
            Environment::with_prefix("FEEPLUS")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
