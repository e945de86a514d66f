//! Integration tests for registration and login.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - The API server running (cargo run -p galeria-api)
//!
//! Run with: cargo test -p galeria-integration-tests -- --ignored

use galeria_integration_tests::{api_base_url, client, unique_email};
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "Requires running API server"]
async fn health_endpoints_respond() {
    let client = client();
    let base_url = api_base_url();

    let resp = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to reach health endpoint");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .expect("Failed to reach readiness endpoint");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn register_then_login() {
    let client = client();
    let base_url = api_base_url();
    let email = unique_email();

    let resp = client
        .post(format!("{base_url}/register/"))
        .json(&json!({
            "nombre": "Cliente de Prueba",
            "email": email,
            "password": "contrasena-segura",
            "telefono": "3001234567",
        }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("Invalid register response");
    assert_eq!(body["rol"], "cliente");
    assert_eq!(body["email"], email);

    let resp = client
        .post(format!("{base_url}/login/"))
        .json(&json!({ "email": email, "password": "contrasena-segura" }))
        .send()
        .await
        .expect("Failed to login");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Invalid login response");
    assert!(body["access"].is_string());
    assert_eq!(body["role"], "cliente");
    assert_eq!(body["nombre"], "Cliente de Prueba");
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn duplicate_email_conflicts() {
    let client = client();
    let base_url = api_base_url();
    let email = unique_email();

    let payload = json!({
        "nombre": "Cliente",
        "email": email,
        "password": "contrasena-segura",
        "telefono": "3001234567",
    });

    let resp = client
        .post(format!("{base_url}/register/"))
        .json(&payload)
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .post(format!("{base_url}/register/"))
        .json(&payload)
        .send()
        .await
        .expect("Failed to register twice");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let body: Value = resp.json().await.expect("Invalid error body");
    assert!(body["detail"].is_string());
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn wrong_password_is_unauthorized() {
    let client = client();
    let base_url = api_base_url();
    let email = unique_email();

    client
        .post(format!("{base_url}/register/"))
        .json(&json!({
            "nombre": "Cliente",
            "email": email,
            "password": "contrasena-segura",
            "telefono": "3001234567",
        }))
        .send()
        .await
        .expect("Failed to register");

    let resp = client
        .post(format!("{base_url}/login/"))
        .json(&json!({ "email": email, "password": "incorrecta-incorrecta" }))
        .send()
        .await
        .expect("Failed to login");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn protected_routes_reject_missing_token() {
    let client = client();
    let base_url = api_base_url();

    for path in ["/productos/", "/carrito/", "/usuarios/", "/pedidos/"] {
        let resp = client
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("Failed to reach endpoint");
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "path {path}");
    }
}
