//! HTTP surface checks that never touch the database.

use serde_json::Value;
use session_auth::configuration::get_configuration;
use session_auth::startup::run;
use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;

fn spawn_app() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let configuration = get_configuration().expect("Failed to read configuration.");
    let pool = PgPoolOptions::new()
        .connect_lazy(&configuration.database.connection_string())
        .expect("Failed to build lazy pool");

    let server = run(listener, pool, &configuration).expect("Failed to create server");
    let _ = tokio::spawn(server);

    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn health_check_works() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/healthz", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "API is healthy");
    assert_eq!(body["data"]["status"], "healthy");
}

#[tokio::test]
async fn home_reports_running_version() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "API is running.");
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn unknown_route_returns_not_found_envelope() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/does-not-exist", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(404, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn users_me_without_bearer_is_unauthorized() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/users/me", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(401, response.status().as_u16());
    assert!(response.headers().contains_key("x-request-id"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn malformed_login_body_is_validation_error() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .post(&format!("{}/login", addr))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn login_with_missing_fields_reports_each_field() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .post(&format!("{}/login", addr))
        .json(&serde_json::json!({ "email": "not-an-email" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["details"]["email"][0]["rule"], "email");
    assert_eq!(body["error"]["details"]["password"][0]["rule"], "required");
}

#[tokio::test]
async fn refresh_without_cookie_is_rejected() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .post(&format!("{}/refresh", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "no_refresh_token");
}
