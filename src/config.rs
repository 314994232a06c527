//! Application configuration

use api_client::ApiClientConfig;
use app_state::ToastConfig;
use serde::Deserialize;
use storage::{KvConfig, Namespace};

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "GOBARBER_API_URL";

/// Environment variable overriding the storage path
pub const STORAGE_PATH_ENV: &str = "GOBARBER_STORAGE_PATH";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration document could not be parsed
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// An override variable was set but empty
    #[error("{0} is set but empty")]
    EmptyVar(&'static str),
}

/// Top-level client configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP client settings
    pub api: ApiClientConfig,
    /// Durable storage settings
    pub storage: KvConfig,
    /// Prefix for persisted keys
    pub namespace: String,
    /// Toast settings
    pub toast: ToastConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiClientConfig::default(),
            storage: KvConfig::default(),
            namespace: Namespace::default().prefix().to_string(),
            toast: ToastConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse a JSON configuration document; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Defaults, with overrides taken from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply `GOBARBER_*` overrides read through `lookup`
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV) {
            if url.trim().is_empty() {
                return Err(ConfigError::EmptyVar(API_URL_ENV));
            }
            self.api.base_url = url;
        }
        if let Some(path) = lookup(STORAGE_PATH_ENV) {
            if path.trim().is_empty() {
                return Err(ConfigError::EmptyVar(STORAGE_PATH_ENV));
            }
            self.storage.path = path;
        }
        Ok(self)
    }

    /// Set the API configuration
    pub fn with_api(mut self, api: ApiClientConfig) -> Self {
        self.api = api;
        self
    }

    /// Set the storage configuration
    pub fn with_storage(mut self, storage: KvConfig) -> Self {
        self.storage = storage;
        self
    }

    /// Set the key namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the toast configuration
    pub fn with_toast(mut self, toast: ToastConfig) -> Self {
        self.toast = toast;
        self
    }
}
