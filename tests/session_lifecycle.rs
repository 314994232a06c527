//! Session persistence across restarts
//!
//! Signs in against a wiremock backend with a sled store on disk, drops the
//! client, reopens it over the same directory and checks the session comes
//! back without any network traffic.

use gobarber_client::{
    ApiClientConfig, App, AppConfig, Credentials, ForgotPasswordForm, KvConfig, KvStore,
    LocalStorage, User,
};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, dir: &TempDir) -> AppConfig {
    let db_path = dir.path().join("session.db");
    AppConfig::default()
        .with_api(ApiClientConfig::new(server.uri()))
        .with_storage(KvConfig::new(db_path.to_string_lossy()))
}

async fn mount_sessions(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"id": "user13", "name": "John Doe", "email": "johndoe@email.com"},
            "token": "token-123"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_session_survives_restart() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_sessions(&server, 1).await;

    {
        let app = App::bootstrap(config_for(&server, &dir)).unwrap();
        assert!(!app.auth().is_authenticated());

        app.auth()
            .sign_in(&Credentials::new("johndoe@email.com", "123456"))
            .await
            .unwrap();

        assert_eq!(app.auth().token().as_deref(), Some("token-123"));
        let stored = app.storage().get_item("@GoBarber:user").unwrap().unwrap();
        let stored: User = serde_json::from_str(&stored).unwrap();
        assert_eq!(stored.name, "John Doe");
    }

    let app = App::bootstrap(config_for(&server, &dir)).unwrap();
    let user = app.auth().user().unwrap();
    assert_eq!(user.id, "user13");
    assert_eq!(app.auth().token().as_deref(), Some("token-123"));
    assert_eq!(app.api().token().as_deref(), Some("token-123"));
}

#[tokio::test]
async fn test_restored_token_is_sent_as_bearer() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    {
        let storage = KvStore::new(config_for(&server, &dir).storage).unwrap();
        storage.set_item("@GoBarber:token", "persisted-token").unwrap();
        storage
            .set_item(
                "@GoBarber:user",
                r#"{"id":"user13","name":"John Doe","email":"johndoe@email.com"}"#,
            )
            .unwrap();
    }

    Mock::given(method("POST"))
        .and(path("/password/forgot"))
        .and(header("authorization", "Bearer persisted-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let app = App::bootstrap(config_for(&server, &dir)).unwrap();
    assert!(app.auth().is_authenticated());

    let form = ForgotPasswordForm { email: "johndoe@email.com".to_string() };
    app.flows().forgot_password(&form).await.unwrap();
}

#[tokio::test]
async fn test_sign_out_clears_persisted_keys() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_sessions(&server, 1).await;

    {
        let app = App::bootstrap(config_for(&server, &dir)).unwrap();
        app.auth()
            .sign_in(&Credentials::new("johndoe@email.com", "123456"))
            .await
            .unwrap();
        app.auth().sign_out().unwrap();

        assert!(!app.storage().contains("@GoBarber:token").unwrap());
        assert!(!app.storage().contains("@GoBarber:user").unwrap());
        assert_eq!(app.api().token(), None);
    }

    let app = App::bootstrap(config_for(&server, &dir)).unwrap();
    assert!(!app.auth().is_authenticated());
}

#[tokio::test]
async fn test_corrupted_user_starts_signed_out() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    {
        let storage = KvStore::new(config_for(&server, &dir).storage).unwrap();
        storage.set_item("@GoBarber:token", "persisted-token").unwrap();
        storage.set_item("@GoBarber:user", "{not json").unwrap();
    }

    let app = App::bootstrap(config_for(&server, &dir)).unwrap();
    assert!(!app.auth().is_authenticated());
    assert!(app.storage().contains("@GoBarber:user").unwrap());
}

#[tokio::test]
async fn test_custom_namespace() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_sessions(&server, 1).await;

    let app = App::bootstrap(config_for(&server, &dir).with_namespace("@Staging")).unwrap();
    app.auth()
        .sign_in(&Credentials::new("johndoe@email.com", "123456"))
        .await
        .unwrap();

    assert!(app.storage().contains("@Staging:token").unwrap());
    assert!(!app.storage().contains("@GoBarber:token").unwrap());
}
