use std::path::Path;

use serde::{Deserialize, Serialize};

/// Service endpoints for the content store and the index service.
///
/// Passed explicitly to every HTTP backend, so several environments can be
/// used side by side in one process.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the API serving store, list, and insert requests.
    pub api_url: String,
    /// Base URL of the read mirror serving `/ipfs/<cid>`.
    pub mirror_url: String,
}

impl ServiceConfig {
    pub const PRODUCTION_API: &'static str = "https://fms.zippie.org";
    pub const PRODUCTION_MIRROR: &'static str = "https://permastore2.zippie.org";

    /// The production endpoints.
    pub fn production() -> Self {
        Self {
            api_url: Self::PRODUCTION_API.into(),
            mirror_url: Self::PRODUCTION_MIRROR.into(),
        }
    }

    /// Both services behind one base URL (handy for local deployments).
    pub fn single_host(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            api_url: base_url.clone(),
            mirror_url: base_url,
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_mirror_url(mut self, url: impl Into<String>) -> Self {
        self.mirror_url = url.into();
        self
    }

    /// Parse from TOML. Missing keys fall back to production values.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let partial: PartialConfig =
            toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let defaults = Self::production();
        let config = Self {
            api_url: partial.api_url.unwrap_or(defaults.api_url),
            mirror_url: partial.mirror_url.unwrap_or(defaults.mirror_url),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check that both URLs are absolute http(s) URLs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for url in [&self.api_url, &self.mirror_url] {
            let parsed = reqwest::Url::parse(url)
                .map_err(|e| ConfigError::InvalidUrl(format!("{url}: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidUrl(format!("{url}: unsupported scheme")));
            }
        }
        Ok(())
    }

    pub fn store_endpoint(&self) -> String {
        format!("{}/ipfs_store_v2", self.api_url.trim_end_matches('/'))
    }

    pub fn fetch_endpoint(&self, cid: &str) -> String {
        format!("{}/ipfs/{cid}", self.mirror_url.trim_end_matches('/'))
    }

    pub fn list_endpoint(&self) -> String {
        format!("{}/perma_list_v2", self.api_url.trim_end_matches('/'))
    }

    pub fn insert_endpoint(&self) -> String {
        format!("{}/perma_store_v2", self.api_url.trim_end_matches('/'))
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::production()
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    api_url: Option<String>,
    mirror_url: Option<String>,
}

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(String),
    #[error("invalid URL {0}")]
    InvalidUrl(String),
}
