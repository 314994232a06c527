//! Authentication endpoints
//!
//! The [`AuthApi`] trait is the seam between the session store and the
//! network: production code uses [`ApiClient`], tests substitute a mock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{ApiClient, Result};

/// Authenticated user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User id
    pub id: String,
    /// Display name
    pub name: String,
    /// E-mail address
    pub email: String,
    /// Avatar URL, when the user uploaded one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Sign-in credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// E-mail address
    pub email: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Create credentials
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }
}

/// Sign-up payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    /// Display name
    pub name: String,
    /// E-mail address
    pub email: String,
    /// Password
    pub password: String,
}

/// Response of `POST sessions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResponse {
    /// The signed-in user
    pub user: User,
    /// Bearer token for subsequent requests
    pub token: String,
}

#[derive(Serialize)]
struct ForgotPasswordBody<'a> {
    email: &'a str,
}

/// Authentication collaborator used by the session store and auth flows
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST sessions`: exchange credentials for a user and token
    async fn create_session(&self, credentials: &Credentials) -> Result<SessionResponse>;

    /// `POST users`: register a new account
    async fn create_user(&self, new_user: &NewUser) -> Result<User>;

    /// `POST password/forgot`: request a password recovery e-mail
    async fn forgot_password(&self, email: &str) -> Result<()>;

    /// Attach (or clear) the bearer token used for authenticated requests
    fn set_bearer_token(&self, token: Option<String>);
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn create_session(&self, credentials: &Credentials) -> Result<SessionResponse> {
        tracing::debug!(email = %credentials.email, "creating session");
        self.post("sessions", credentials).await
    }

    async fn create_user(&self, new_user: &NewUser) -> Result<User> {
        tracing::debug!(email = %new_user.email, "creating user");
        self.post("users", new_user).await
    }

    async fn forgot_password(&self, email: &str) -> Result<()> {
        self.post_no_content("password/forgot", &ForgotPasswordBody { email })
            .await
    }

    fn set_bearer_token(&self, token: Option<String>) {
        self.set_token(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serialization_omits_missing_avatar() {
        let user = User {
            id: "user13".to_string(),
            name: "John Doe".to_string(),
            email: "johndoe@email.com".to_string(),
            avatar_url: None,
        };
        assert_eq!(
            serde_json::to_string(&user).unwrap(),
            r#"{"id":"user13","name":"John Doe","email":"johndoe@email.com"}"#
        );
    }

    #[test]
    fn test_user_serialization_keeps_avatar() {
        let user = User {
            id: "user13".to_string(),
            name: "John Doe".to_string(),
            email: "johndoe@email.com".to_string(),
            avatar_url: Some("image.jpg".to_string()),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.ends_with(r#""avatar_url":"image.jpg"}"#));
    }

    #[test]
    fn test_session_response_ignores_unknown_user_fields() {
        let json = r#"{
            "user": {"id":"u1","name":"Ana","email":"ana@example.com","created_at":"2020-01-01"},
            "token": "jwt"
        }"#;
        let response: SessionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.token, "jwt");
        assert_eq!(response.user.avatar_url, None);
    }

    #[test]
    fn test_credentials_body_shape() {
        let creds = Credentials::new("a@b.com", "secret");
        assert_eq!(
            serde_json::to_value(&creds).unwrap(),
            serde_json::json!({"email": "a@b.com", "password": "secret"})
        );
    }
}
