//! Core application logic for the GoBarber client
//!
//! Form validation and the sign-in, sign-up and forgot-password flows.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod flows;
pub mod forms;

pub use flows::{AuthFlows, FlowError, RequestFailure, Route};
pub use forms::{is_valid_email, FieldErrors, ForgotPasswordForm, SignInForm, SignUpForm};
