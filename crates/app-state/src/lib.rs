//! Application state for the GoBarber client
//!
//! This crate provides the two process-wide state containers, the session
//! store and the toast store, plus the provider scope through which
//! presentation code reaches them.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod provider;
pub mod session;
pub mod toast;

pub use provider::{try_use_auth, try_use_toast, use_auth, use_toast, AppProvider, ProviderError, ProviderGuard};
pub use session::{Session, SessionError, SessionStore};
pub use toast::{NewToast, ToastConfig, ToastMessage, ToastStore, ToastType, DEFAULT_TOAST_DURATION};
