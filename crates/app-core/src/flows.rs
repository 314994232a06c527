//! Sign-in, sign-up and forgot-password flows
//!
//! Each flow validates its form, performs the request, reports the outcome
//! through the toast store and returns the route to navigate to. Validation
//! failures are returned to the caller for display next to the fields and
//! never produce a toast; request failures push an error toast before being
//! returned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use api_client::{ApiError, AuthApi};
use app_state::{AppProvider, NewToast, SessionError, SessionStore, ToastStore};

use crate::forms::{FieldErrors, ForgotPasswordForm, SignInForm, SignUpForm};

/// Screens reachable from the auth flows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Sign-in screen
    SignIn,
    /// Sign-up screen
    SignUp,
    /// Forgot-password screen
    ForgotPassword,
    /// Landing page for signed-in users
    Dashboard,
}

impl Route {
    /// Path of the route
    pub fn path(&self) -> &'static str {
        match self {
            Route::SignIn => "/",
            Route::SignUp => "/signup",
            Route::ForgotPassword => "/forgot",
            Route::Dashboard => "/dashboard",
        }
    }
}

/// A request made by a flow failed
#[derive(Debug, thiserror::Error)]
pub enum RequestFailure {
    /// Signing in through the session store failed
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A direct API call failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Flow errors
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// The form did not pass validation; nothing was sent
    #[error("Invalid form: {0}")]
    Validation(FieldErrors),

    /// The request failed; an error toast has been shown
    #[error("Request failed: {0}")]
    Request(#[source] RequestFailure),
}

impl FlowError {
    /// Field errors, when validation failed
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            FlowError::Validation(errors) => Some(errors),
            FlowError::Request(_) => None,
        }
    }
}

/// Result type for flows
pub type Result<T> = std::result::Result<T, FlowError>;

/// Clears the loading flag when the request ends, however it ends
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The auth screens' behaviour, detached from any rendering
pub struct AuthFlows {
    session: SessionStore,
    toast: ToastStore,
    api: Arc<dyn AuthApi>,
    loading: AtomicBool,
}

impl AuthFlows {
    /// Create flows over the given stores and API
    pub fn new(session: SessionStore, toast: ToastStore, api: Arc<dyn AuthApi>) -> Self {
        Self { session, toast, api, loading: AtomicBool::new(false) }
    }

    /// Create flows over a provider's stores
    pub fn from_provider(provider: &AppProvider, api: Arc<dyn AuthApi>) -> Self {
        Self::new(provider.auth().clone(), provider.toast().clone(), api)
    }

    /// Whether a request is in flight
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Sign in, then go to the dashboard
    pub async fn sign_in(&self, form: &SignInForm) -> Result<Route> {
        form.validate().map_err(FlowError::Validation)?;

        let _loading = LoadingGuard::start(&self.loading);
        match self.session.sign_in(&form.credentials()).await {
            Ok(()) => Ok(Route::Dashboard),
            Err(e) => Err(self.fail(
                e.into(),
                NewToast::error("Authentication error").with_description(
                    "An error occurred while signing in, check your credentials",
                ),
            )),
        }
    }

    /// Register, then go back to sign-in
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<Route> {
        form.validate().map_err(FlowError::Validation)?;

        let _loading = LoadingGuard::start(&self.loading);
        match self.api.create_user(&form.new_user()).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "registered");
                self.toast.add_toast(
                    NewToast::success("Registration complete")
                        .with_description("You can now sign in to GoBarber"),
                );
                Ok(Route::SignIn)
            }
            Err(e) => Err(self.fail(
                e.into(),
                NewToast::error("Registration error")
                    .with_description("An error occurred while signing up, please try again"),
            )),
        }
    }

    /// Request a password recovery e-mail
    pub async fn forgot_password(&self, form: &ForgotPasswordForm) -> Result<()> {
        form.validate().map_err(FlowError::Validation)?;

        let _loading = LoadingGuard::start(&self.loading);
        match self.api.forgot_password(&form.email).await {
            Ok(()) => {
                self.toast.add_toast(NewToast::success("Recovery e-mail sent").with_description(
                    "We sent you an e-mail to confirm the password recovery, check your inbox",
                ));
                Ok(())
            }
            Err(e) => Err(self.fail(
                e.into(),
                NewToast::error("Authentication error").with_description(
                    "An error occurred while requesting password recovery, please try again",
                ),
            )),
        }
    }

    fn fail(&self, failure: RequestFailure, toast: NewToast) -> FlowError {
        tracing::warn!(error = %failure, "auth request failed");
        self.toast.add_toast(toast);
        FlowError::Request(failure)
    }
}
