//! Provider scope
//!
//! An [`AppProvider`] bundles the session store and the toast store. It can
//! be handed around explicitly, or entered for the current thread so that
//! deeply nested presentation code can reach the stores through
//! [`use_auth`] / [`use_toast`] without threading handles through every
//! layer. Reaching for a store outside any entered provider is a bug in the
//! caller, so the `use_*` functions panic instead of returning a default.

use std::cell::RefCell;
use std::marker::PhantomData;

use crate::session::SessionStore;
use crate::toast::ToastStore;

/// Provider lookup errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// No provider has been entered on this thread
    #[error("{hook} must be used within an AppProvider scope")]
    OutsideProvider {
        /// Name of the accessor that was called
        hook: &'static str,
    },
}

thread_local! {
    static SCOPES: RefCell<Vec<AppProvider>> = const { RefCell::new(Vec::new()) };
}

/// The application's state containers
#[derive(Clone)]
pub struct AppProvider {
    auth: SessionStore,
    toast: ToastStore,
}

impl AppProvider {
    /// Bundle a session store and a toast store
    pub fn new(auth: SessionStore, toast: ToastStore) -> Self {
        Self { auth, toast }
    }

    /// The session store
    pub fn auth(&self) -> &SessionStore {
        &self.auth
    }

    /// The toast store
    pub fn toast(&self) -> &ToastStore {
        &self.toast
    }

    /// Make this provider current for the calling thread until the guard is
    /// dropped. Scopes nest; the innermost one wins.
    #[must_use = "the provider scope ends when the guard is dropped"]
    pub fn enter(&self) -> ProviderGuard {
        SCOPES.with(|scopes| scopes.borrow_mut().push(self.clone()));
        tracing::debug!("entered provider scope");
        ProviderGuard { _not_send: PhantomData }
    }
}

/// Keeps a provider scope open; dropping it restores the enclosing scope
pub struct ProviderGuard {
    _not_send: PhantomData<*const ()>,
}

impl Drop for ProviderGuard {
    fn drop(&mut self) {
        SCOPES.with(|scopes| {
            scopes.borrow_mut().pop();
        });
        tracing::debug!("left provider scope");
    }
}

fn current(hook: &'static str) -> Result<AppProvider, ProviderError> {
    SCOPES
        .with(|scopes| scopes.borrow().last().cloned())
        .ok_or(ProviderError::OutsideProvider { hook })
}

/// The session store of the current provider scope
pub fn try_use_auth() -> Result<SessionStore, ProviderError> {
    current("use_auth").map(|p| p.auth)
}

/// The toast store of the current provider scope
pub fn try_use_toast() -> Result<ToastStore, ProviderError> {
    current("use_toast").map(|p| p.toast)
}

/// The session store of the current provider scope
///
/// # Panics
///
/// Panics when called outside an entered [`AppProvider`].
pub fn use_auth() -> SessionStore {
    match try_use_auth() {
        Ok(store) => store,
        Err(e) => panic!("{e}"),
    }
}

/// The toast store of the current provider scope
///
/// # Panics
///
/// Panics when called outside an entered [`AppProvider`].
pub fn use_toast() -> ToastStore {
    match try_use_toast() {
        Ok(store) => store,
        Err(e) => panic!("{e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toast::{NewToast, ToastConfig};
    use api_client::MockAuthApi;
    use std::sync::Arc;
    use storage::MemoryStorage;

    fn provider() -> AppProvider {
        let auth = SessionStore::new(Arc::new(MemoryStorage::new()), Arc::new(MockAuthApi::new()));
        AppProvider::new(auth, ToastStore::new(ToastConfig::default()))
    }

    #[test]
    fn test_outside_scope_is_an_error() {
        assert_eq!(
            try_use_auth().err(),
            Some(ProviderError::OutsideProvider { hook: "use_auth" })
        );
        assert!(try_use_toast().is_err());
    }

    #[test]
    #[should_panic(expected = "use_auth must be used within an AppProvider scope")]
    fn test_use_auth_outside_scope_panics() {
        let _ = use_auth();
    }

    #[test]
    #[should_panic(expected = "use_toast must be used within an AppProvider scope")]
    fn test_use_toast_outside_scope_panics() {
        let _ = use_toast();
    }

    #[test]
    fn test_scope_exposes_shared_stores() {
        let provider = provider();
        let _guard = provider.enter();

        let id = use_toast().add_toast(NewToast::info("hello"));
        assert!(provider.toast().get(&id).is_some());
        assert!(!use_auth().is_authenticated());
    }

    #[test]
    fn test_guard_drop_tears_down_scope() {
        let provider = provider();
        {
            let _guard = provider.enter();
            assert!(try_use_auth().is_ok());
        }
        assert!(try_use_auth().is_err());
    }

    #[test]
    fn test_nested_scopes_restore_outer() {
        let outer = provider();
        let inner = provider();

        let _outer_guard = outer.enter();
        {
            let _inner_guard = inner.enter();
            use_toast().add_toast(NewToast::info("inner"));
            assert_eq!(inner.toast().len(), 1);
            assert_eq!(outer.toast().len(), 0);
        }

        use_toast().add_toast(NewToast::info("outer"));
        assert_eq!(outer.toast().len(), 1);
        assert_eq!(inner.toast().len(), 1);
    }

    #[test]
    fn test_scope_is_per_thread() {
        let provider = provider();
        let _guard = provider.enter();

        let seen_elsewhere = std::thread::spawn(|| try_use_auth().is_ok()).join().unwrap();
        assert!(!seen_elsewhere);
    }
}
