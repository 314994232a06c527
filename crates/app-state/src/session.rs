//! Session state management
//!
//! [`SessionStore`] owns the authenticated user and bearer token. It is
//! restored synchronously from local storage at construction, updated by
//! sign-in / sign-out / profile updates, and mirrors every change back to
//! storage under the namespaced `token` and `user` keys.

use api_client::{ApiError, AuthApi, Credentials, SessionResponse, User};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storage::{LocalStorage, Namespace, StorageError};
use tokio::sync::watch;

/// Storage key (within the namespace) holding the raw bearer token
pub const TOKEN_KEY: &str = "token";

/// Storage key (within the namespace) holding the JSON-encoded user
pub const USER_KEY: &str = "user";

/// Session-related errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The authentication request failed; the API error is passed through
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Persisting the session failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Encoding the user failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The operation needs a signed-in user
    #[error("No current session")]
    NoSession,
}

/// Result type for session state operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Authenticated session: token and user always travel together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token
    pub token: String,
    /// Signed-in user
    pub user: User,
}

struct Inner {
    storage: Arc<dyn LocalStorage>,
    api: Arc<dyn AuthApi>,
    namespace: Namespace,
    state: RwLock<Option<Session>>,
    changes: watch::Sender<Option<Session>>,
}

/// Session store
///
/// Cloning is cheap; all clones share the same session.
///
/// # Example
///
/// ```rust
/// use app_state::SessionStore;
/// use api_client::{ApiClient, ApiClientConfig};
/// use std::sync::Arc;
/// use storage::MemoryStorage;
///
/// let api = ApiClient::new(ApiClientConfig::default()).unwrap();
/// let store = SessionStore::new(Arc::new(MemoryStorage::new()), Arc::new(api));
/// assert!(!store.is_authenticated());
/// ```
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    /// Create a session store under the default `@GoBarber` namespace
    ///
    /// Persisted state is read synchronously; no network call is made.
    pub fn new(storage: Arc<dyn LocalStorage>, api: Arc<dyn AuthApi>) -> Self {
        Self::with_namespace(storage, api, Namespace::default())
    }

    /// Create a session store with a custom key namespace
    pub fn with_namespace(
        storage: Arc<dyn LocalStorage>,
        api: Arc<dyn AuthApi>,
        namespace: Namespace,
    ) -> Self {
        let restored = load_session(storage.as_ref(), &namespace);

        if let Some(session) = &restored {
            tracing::debug!(user_id = %session.user.id, "restored persisted session");
            api.set_bearer_token(Some(session.token.clone()));
        }

        let (changes, _) = watch::channel(restored.clone());

        Self {
            inner: Arc::new(Inner {
                storage,
                api,
                namespace,
                state: RwLock::new(restored),
                changes,
            }),
        }
    }

    /// Sign in with credentials
    ///
    /// Storage is written (token first, then user) only after the
    /// authentication request resolves, and in-memory state is replaced
    /// last. A failed request leaves both untouched and is returned as
    /// [`SessionError::Api`] with the original error inside. If the user
    /// cannot be written, the token key is put back as it was so storage
    /// never pairs one account's token with another's profile.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<()> {
        let SessionResponse { user, token } = self.inner.api.create_session(credentials).await?;

        let user_json = serde_json::to_string(&user)?;
        let token_key = self.key(TOKEN_KEY);
        let previous_token = self.inner.storage.get_item(&token_key)?;

        self.inner.storage.set_item(&token_key, &token)?;
        if let Err(e) = self.inner.storage.set_item(&self.key(USER_KEY), &user_json) {
            self.restore_token(&token_key, previous_token.as_deref());
            return Err(e.into());
        }

        self.inner.api.set_bearer_token(Some(token.clone()));
        tracing::info!(user_id = %user.id, "signed in");
        self.replace(Some(Session { token, user }));

        Ok(())
    }

    /// Sign out
    ///
    /// Both persisted keys are always removed and in-memory state is always
    /// cleared; the first storage error, if any, is reported afterwards.
    pub fn sign_out(&self) -> Result<()> {
        let token_removed = self.inner.storage.remove_item(&self.key(TOKEN_KEY));
        let user_removed = self.inner.storage.remove_item(&self.key(USER_KEY));

        self.inner.api.set_bearer_token(None);
        self.replace(None);
        tracing::info!("signed out");

        token_removed?;
        user_removed?;
        Ok(())
    }

    /// Replace the signed-in user's profile, keeping the token
    pub fn update_user(&self, user: User) -> Result<()> {
        if self.inner.state.read().is_none() {
            return Err(SessionError::NoSession);
        }

        let user_json = serde_json::to_string(&user)?;
        self.inner.storage.set_item(&self.key(USER_KEY), &user_json)?;

        let snapshot = {
            let mut state = self.inner.state.write();
            match state.as_mut() {
                Some(session) => session.user = user,
                None => return Err(SessionError::NoSession),
            }
            state.clone()
        };

        self.inner.changes.send_replace(snapshot);
        Ok(())
    }

    /// The signed-in user, if any
    pub fn user(&self) -> Option<User> {
        self.inner.state.read().as_ref().map(|s| s.user.clone())
    }

    /// The bearer token, if any
    pub fn token(&self) -> Option<String> {
        self.inner.state.read().as_ref().map(|s| s.token.clone())
    }

    /// Full session snapshot
    pub fn session(&self) -> Option<Session> {
        self.inner.state.read().clone()
    }

    /// Whether a user is signed in
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.read().is_some()
    }

    /// Subscribe to session changes
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.inner.changes.subscribe()
    }

    fn key(&self, name: &str) -> String {
        self.inner.namespace.key(name)
    }

    fn restore_token(&self, token_key: &str, previous: Option<&str>) {
        let restored = match previous {
            Some(token) => self.inner.storage.set_item(token_key, token),
            None => self.inner.storage.remove_item(token_key).map(|_| ()),
        };
        if let Err(e) = restored {
            tracing::warn!(error = %e, "failed to roll back token after partial sign-in");
        }
    }

    fn replace(&self, session: Option<Session>) {
        *self.inner.state.write() = session.clone();
        self.inner.changes.send_replace(session);
    }
}

/// Read a persisted session, treating anything missing or unreadable as
/// signed out.
fn load_session(storage: &dyn LocalStorage, namespace: &Namespace) -> Option<Session> {
    let read = |name: &str| match storage.get_item(&namespace.key(name)) {
        Ok(value) => value.filter(|v| !v.is_empty()),
        Err(e) => {
            tracing::warn!(key = name, error = %e, "failed to read persisted session");
            None
        }
    };

    let token = read(TOKEN_KEY)?;
    let raw_user = read(USER_KEY)?;

    match serde_json::from_str::<User>(&raw_user) {
        Ok(user) => Some(Session { token, user }),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring malformed persisted user");
            None
        }
    }
}
