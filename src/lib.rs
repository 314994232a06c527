//! GoBarber client
//!
//! Wires durable storage, the HTTP API client, the session and toast stores
//! and the auth flows into a single [`App`].

#![warn(missing_docs)]

pub mod config;

use std::sync::Arc;

pub use api_client::{ApiClient, ApiClientConfig, ApiError, AuthApi, Credentials, User};
pub use app_core::{AuthFlows, FieldErrors, FlowError, ForgotPasswordForm, Route, SignInForm, SignUpForm};
pub use app_state::{
    try_use_auth, try_use_toast, use_auth, use_toast, AppProvider, ProviderGuard, SessionStore,
    ToastMessage, ToastStore, ToastType,
};
pub use config::{AppConfig, ConfigError};
pub use storage::{KvConfig, KvStore, LocalStorage, Namespace, StorageError};

/// Startup errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Durable storage could not be opened
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The HTTP client could not be built
    #[error("API client error: {0}")]
    Api(#[from] ApiError),
}

/// Result type for application startup
pub type Result<T> = std::result::Result<T, AppError>;

/// Initialize logging
///
/// Honors `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}

/// A fully wired client
pub struct App {
    config: AppConfig,
    storage: KvStore,
    api: ApiClient,
    provider: AppProvider,
    flows: AuthFlows,
}

impl App {
    /// Open storage, build the API client and restore any persisted session
    pub fn bootstrap(config: AppConfig) -> Result<Self> {
        let storage = KvStore::new(config.storage.clone())?;
        Self::with_storage(config, storage)
    }

    /// Like [`App::bootstrap`], over an already opened store
    pub fn with_storage(config: AppConfig, storage: KvStore) -> Result<Self> {
        let api = ApiClient::new(config.api.clone())?;
        let auth_api: Arc<dyn AuthApi> = Arc::new(api.clone());

        let session = SessionStore::with_namespace(
            Arc::new(storage.clone()),
            auth_api.clone(),
            Namespace::new(config.namespace.clone()),
        );
        let toast = ToastStore::new(config.toast.clone());
        let provider = AppProvider::new(session, toast);
        let flows = AuthFlows::from_provider(&provider, auth_api);

        tracing::info!(
            base_url = %config.api.base_url,
            authenticated = provider.auth().is_authenticated(),
            "client started"
        );

        Ok(Self { config, storage, api, provider, flows })
    }

    /// Active configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Durable storage
    pub fn storage(&self) -> &KvStore {
        &self.storage
    }

    /// HTTP client
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Session and toast stores
    pub fn provider(&self) -> &AppProvider {
        &self.provider
    }

    /// Session store
    pub fn auth(&self) -> &SessionStore {
        self.provider.auth()
    }

    /// Toast store
    pub fn toast(&self) -> &ToastStore {
        self.provider.toast()
    }

    /// Auth screen flows
    pub fn flows(&self) -> &AuthFlows {
        &self.flows
    }

    /// Enter the provider scope on the current thread
    #[must_use = "the provider scope ends when the guard is dropped"]
    pub fn enter(&self) -> ProviderGuard {
        self.provider.enter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_in_memory() {
        let app = App::with_storage(AppConfig::default(), KvStore::in_memory().unwrap()).unwrap();

        assert!(!app.auth().is_authenticated());
        assert!(app.toast().is_empty());
        assert_eq!(app.api().base_url(), "http://localhost:3333");
    }

    #[test]
    fn test_bootstrap_rejects_bad_url() {
        let config = AppConfig::default().with_api(ApiClientConfig::new("ftp://nope"));
        let err = App::with_storage(config, KvStore::in_memory().unwrap()).err().unwrap();
        assert!(matches!(err, AppError::Api(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn test_enter_installs_provider() {
        let app = App::with_storage(AppConfig::default(), KvStore::in_memory().unwrap()).unwrap();
        {
            let _scope = app.enter();
            assert!(!use_auth().is_authenticated());
        }
        assert!(try_use_toast().is_err());
    }
}
