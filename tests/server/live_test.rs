use serde_json::json;
use std::sync::Arc;

use khazaana::client::{ApiClient, ClientError};
use khazaana::config::Repositories;
use khazaana::modules::admin::model::OtpPurpose;
use khazaana::probe::{discover, run_checks, PROBE_TIMEOUT};
use khazaana::services::server::bind_with_retry;
use khazaana::AppState;

use crate::common::{test_config, test_email, test_password, RecordingMailer};

/// Serves the app on a real socket and returns the bound port.
async fn spawn_app() -> (u16, Arc<RecordingMailer>) {
    spawn_app_from(0).await
}

/// Serves the app on the first free port at or above `start_port`.
async fn spawn_app_from(start_port: u16) -> (u16, Arc<RecordingMailer>) {
    let config = test_config();
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState::new(Repositories::in_memory(), mailer.clone(), &config);
    let app = khazaana::create_app(state, &config);

    let listener = bind_with_retry("127.0.0.1", start_port).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (port, mailer)
}

async fn unused_port() -> u16 {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn discover_finds_server_on_later_port() {
    let (port, _) = spawn_app().await;
    let dead = unused_port().await;

    let base = discover("127.0.0.1", &[dead, port], PROBE_TIMEOUT).await.unwrap();
    assert_eq!(base, format!("http://127.0.0.1:{port}"));

    let outcomes = run_checks(&base).await.unwrap();
    let health = outcomes.iter().find(|o| o.name == "health").unwrap();
    assert!(health.passed);
    let signup = outcomes.iter().find(|o| o.name == "admin signup rejects GET").unwrap();
    assert!(signup.passed);
}

#[tokio::test]
async fn discover_reports_missing_server() {
    let dead = unused_port().await;

    assert!(discover("127.0.0.1", &[dead], PROBE_TIMEOUT).await.is_err());
}

#[tokio::test]
async fn server_on_occupied_port_is_reachable_on_next_port() {
    let occupied = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let taken = occupied.local_addr().unwrap().port();
    if taken == u16::MAX {
        return;
    }

    let (port, _) = spawn_app_from(taken).await;
    assert!(port > taken);

    let base = discover("127.0.0.1", &[port], PROBE_TIMEOUT).await.unwrap();
    let health: serde_json::Value = reqwest::get(format!("{base}/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["message"], "Server is running!");
    drop(occupied);
}

#[tokio::test]
async fn client_drives_full_admin_and_data_flow() {
    let (port, mailer) = spawn_app().await;
    let mut client = ApiClient::new(format!("http://127.0.0.1:{port}/api")).unwrap();
    let email = test_email();

    let health = client.health().await.unwrap();
    assert_eq!(health["database"], "Connected");

    client.signup(&email, test_password()).await.unwrap();
    let code = mailer.last_code(&email, OtpPurpose::Signup).unwrap();
    client.verify_otp(&email, &code).await.unwrap();

    client.login(&email, test_password()).await.unwrap();
    let code = mailer.last_code(&email, OtpPurpose::Login).unwrap();
    client.verify_login_otp(&email, &code).await.unwrap();
    assert!(client.token().is_some());

    let me = client.me().await.unwrap();
    assert_eq!(me["admin"]["email"], email.as_str());

    let created = client.create_data(&json!({ "name": "Turmeric" })).await.unwrap();
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let updated = client.update_data(&id, &json!({ "name": "Turmeric root" })).await.unwrap();
    assert_eq!(updated["data"]["name"], "Turmeric root");

    let list = client.list_data().await.unwrap();
    assert_eq!(list["count"], 1);

    client.delete_data(&id).await.unwrap();
    let err = client.delete_data(&id).await.unwrap_err();
    assert!(matches!(err, ClientError::Api { ref message, .. } if message == "Data not found"));
    assert_eq!(err.status(), Some(reqwest::StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn client_surfaces_api_error_message() {
    let (port, _) = spawn_app().await;
    let client = ApiClient::new(format!("http://127.0.0.1:{port}/api")).unwrap();

    let err = client.login(&test_email(), test_password()).await.unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, reqwest::StatusCode::UNAUTHORIZED);
            assert_eq!(message, "Invalid email or password");
        }
        other => panic!("unexpected error: {other}"),
    }
}
