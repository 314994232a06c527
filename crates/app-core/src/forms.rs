//! Auth form validation
//!
//! Every rule of every field is checked (no early abort) and each failing
//! field reports one message: the first rule it broke.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use api_client::{Credentials, NewUser};

/// Field name → message for every field that failed validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Create an empty set of errors
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field unless it already has one
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    /// Message for a field
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether any field failed
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over `(field, message)` pairs in field-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

enum Rule {
    Required(&'static str),
    Email(&'static str),
    MinLength(usize, &'static str),
}

impl Rule {
    fn message_if_broken(&self, value: &str) -> Option<&'static str> {
        match self {
            Rule::Required(msg) => value.is_empty().then_some(*msg),
            Rule::Email(msg) => (!is_valid_email(value)).then_some(*msg),
            Rule::MinLength(min, msg) => (value.chars().count() < *min).then_some(*msg),
        }
    }
}

fn check(errors: &mut FieldErrors, field: &str, value: &str, rules: &[Rule]) {
    if let Some(message) = rules.iter().find_map(|rule| rule.message_if_broken(value)) {
        errors.add(field, message);
    }
}

/// Check e-mail syntax
pub fn is_valid_email(value: &str) -> bool {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL_REGEX.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
    re.is_match(value)
}

const EMAIL_REQUIRED: &str = "E-mail is required";
const EMAIL_INVALID: &str = "Enter a valid e-mail";

/// Sign-in form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInForm {
    /// E-mail address
    pub email: String,
    /// Password
    pub password: String,
}

impl SignInForm {
    /// Validate all fields
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check(
            &mut errors,
            "email",
            &self.email,
            &[Rule::Required(EMAIL_REQUIRED), Rule::Email(EMAIL_INVALID)],
        );
        check(&mut errors, "password", &self.password, &[Rule::Required("Password is required")]);
        errors.into_result()
    }

    /// Credentials to send to `POST sessions`
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.email.clone(), self.password.clone())
    }
}

/// Sign-up form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpForm {
    /// Display name
    pub name: String,
    /// E-mail address
    pub email: String,
    /// Password
    pub password: String,
}

impl SignUpForm {
    /// Validate all fields
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check(&mut errors, "name", &self.name, &[Rule::Required("Name is required")]);
        check(
            &mut errors,
            "email",
            &self.email,
            &[Rule::Required(EMAIL_REQUIRED), Rule::Email(EMAIL_INVALID)],
        );
        check(
            &mut errors,
            "password",
            &self.password,
            &[Rule::MinLength(6, "At least 6 characters")],
        );
        errors.into_result()
    }

    /// Payload for `POST users`
    pub fn new_user(&self) -> NewUser {
        NewUser {
            name: self.name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

/// Forgot-password form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgotPasswordForm {
    /// E-mail address
    pub email: String,
}

impl ForgotPasswordForm {
    /// Validate all fields
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check(
            &mut errors,
            "email",
            &self.email,
            &[Rule::Required(EMAIL_REQUIRED), Rule::Email(EMAIL_INVALID)],
        );
        errors.into_result()
    }
}
