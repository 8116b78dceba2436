use serde::{Deserialize, Serialize};

fn default_handle() -> String {
    "custom-fee-plus".to_string()
}

fn default_block_on_failure() -> bool {
    true
}

fn default_namespace() -> String {
    crate::metadata::DEFAULT_NAMESPACE.to_string()
}

fn default_duplicate_tokens() -> Vec<String> {
    crate::classify::DEFAULT_DUPLICATE_TOKENS
        .iter()
        .map(|t| (*t).to_string())
        .collect()
}

fn default_storefront_channel() -> String {
    "online store".to_string()
}

fn default_option_name() -> String {
    "Fee".to_string()
}

fn default_page_size() -> u32 {
    50
}

/// Tunables shared by every reconciliation operation (`[reconcile]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileSettings {
    /// Function handle of the cart transform extension.
    #[serde(default = "default_handle")]
    pub handle: String,
    #[serde(default = "default_block_on_failure")]
    pub block_on_failure: bool,
    #[serde(default = "default_namespace")]
    pub metafield_namespace: String,
    /// Case-insensitive substrings that mark a rejection as "already exists".
    #[serde(default = "default_duplicate_tokens")]
    pub duplicate_tokens: Vec<String>,
    /// Substring identifying the storefront publication to publish to.
    #[serde(default = "default_storefront_channel")]
    pub storefront_channel: String,
    #[serde(default = "default_option_name")]
    pub option_name: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            handle: default_handle(),
            block_on_failure: default_block_on_failure(),
            metafield_namespace: default_namespace(),
            duplicate_tokens: default_duplicate_tokens(),
            storefront_channel: default_storefront_channel(),
            option_name: default_option_name(),
            page_size: default_page_size(),
        }
    }
}

impl ReconcileSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.handle.trim().is_empty() {
            return Err("reconcile.handle must not be empty".into());
        }
        if self.metafield_namespace.trim().is_empty() {
            return Err("reconcile.metafield_namespace must not be empty".into());
        }
        if self.option_name.trim().is_empty() {
            return Err("reconcile.option_name must not be empty".into());
        }
        if self.page_size == 0 || self.page_size > 250 {
            return Err("reconcile.page_size must be between 1 and 250".into());
        }
        if self.duplicate_tokens.iter().all(|t| t.trim().is_empty()) {
            return Err("reconcile.duplicate_tokens must name at least one token".into());
        }
        Ok(())
    }
}
