//! Integration tests for the shopping flow.
//!
//! These tests require a running `PostgreSQL` database and API server.
//! They register a fresh customer per test so they do not depend on
//! seeded data, and they never reach the real payment provider.
//!
//! Run with: cargo test -p galeria-integration-tests -- --ignored

use galeria_integration_tests::{api_base_url, client, unique_email};
use reqwest::StatusCode;
use serde_json::{Value, json};

/// Register a customer and return a bearer token.
async fn customer_token(client: &reqwest::Client, base_url: &str) -> String {
    let email = unique_email();

    let resp = client
        .post(format!("{base_url}/register/"))
        .json(&json!({
            "nombre": "Compradora",
            "email": email,
            "password": "contrasena-segura",
            "telefono": "3001234567",
        }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .post(format!("{base_url}/login/"))
        .json(&json!({ "email": email, "password": "contrasena-segura" }))
        .send()
        .await
        .expect("Failed to login");
    let body: Value = resp.json().await.expect("Invalid login response");
    body["access"]
        .as_str()
        .expect("Missing access token")
        .to_owned()
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn fresh_customer_has_empty_cart() {
    let client = client();
    let base_url = api_base_url();
    let token = customer_token(&client, &base_url).await;

    let resp = client
        .get(format!("{base_url}/carrito/"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get cart");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Invalid cart body");
    assert_eq!(body["cliente"], "Compradora");
    assert_eq!(body["productos"], json!([]));
    assert_eq!(body["total"], "0.00");
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn adding_unknown_product_is_not_found() {
    let client = client();
    let base_url = api_base_url();
    let token = customer_token(&client, &base_url).await;

    let resp = client
        .post(format!("{base_url}/carrito/agregar/"))
        .bearer_auth(&token)
        .json(&json!({ "producto_id": 999_999_999i64, "cantidad": 1 }))
        .send()
        .await
        .expect("Failed to post cart add");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn customer_cannot_manage_catalog_or_orders() {
    let client = client();
    let base_url = api_base_url();
    let token = customer_token(&client, &base_url).await;

    let resp = client
        .post(format!("{base_url}/productos/crear/"))
        .bearer_auth(&token)
        .json(&json!({
            "nombre": "Cuadro",
            "categoria": "pintura",
            "stock": 5,
            "precio": "120000",
            "imagen": "https://example.com/cuadro.jpg",
        }))
        .send()
        .await
        .expect("Failed to post product");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = client
        .get(format!("{base_url}/pedidos/"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get orders");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = client
        .get(format!("{base_url}/usuarios/"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get users");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

/// Log in as staff using `GALERIA_ADMIN_EMAIL` / `GALERIA_ADMIN_PASSWORD`.
async fn admin_token(client: &reqwest::Client, base_url: &str) -> String {
    let email = std::env::var("GALERIA_ADMIN_EMAIL").expect("GALERIA_ADMIN_EMAIL not set");
    let password = std::env::var("GALERIA_ADMIN_PASSWORD").expect("GALERIA_ADMIN_PASSWORD not set");

    let resp = client
        .post(format!("{base_url}/login/"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to login as admin");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Invalid login response");
    body["access"]
        .as_str()
        .expect("Missing access token")
        .to_owned()
}

#[tokio::test]
#[ignore = "Requires running API server and admin credentials in the environment"]
async fn concurrent_adds_reserve_stock_without_lost_updates() {
    const CUSTOMERS: usize = 3;
    const PER_CUSTOMER: i64 = 10;

    let client = client();
    let base_url = api_base_url();
    let admin = admin_token(&client, &base_url).await;

    let resp = client
        .post(format!("{base_url}/productos/crear/"))
        .bearer_auth(&admin)
        .json(&json!({
            "nombre": format!("Litografía {}", uuid::Uuid::new_v4()),
            "categoria": "grabado",
            "stock": CUSTOMERS as i64 * PER_CUSTOMER,
            "precio": "45000",
            "imagen": "https://example.com/litografia.jpg",
        }))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let producto: Value = resp.json().await.expect("Invalid product body");
    let producto_id = producto["id"].as_i64().expect("Missing product id");

    let mut tokens = Vec::with_capacity(CUSTOMERS);
    for _ in 0..CUSTOMERS {
        tokens.push(customer_token(&client, &base_url).await);
    }

    let mut handles = Vec::with_capacity(CUSTOMERS);
    for token in tokens {
        let client = client.clone();
        let base_url = base_url.clone();
        handles.push(tokio::spawn(async move {
            client
                .post(format!("{base_url}/carrito/agregar/"))
                .bearer_auth(&token)
                .json(&json!({ "producto_id": producto_id, "cantidad": PER_CUSTOMER }))
                .send()
                .await
                .expect("Failed to post cart add")
        }));
    }

    for handle in handles {
        let resp = handle.await.expect("Add task panicked");
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = resp.json().await.expect("Invalid cart body");
        assert_eq!(body["productos"][0]["cantidad"], PER_CUSTOMER);
    }

    // Every reservation landed: the remaining stock is exactly zero.
    let resp = client
        .get(format!("{base_url}/productos/{producto_id}/"))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to get product");
    assert_eq!(resp.status(), StatusCode::OK);

    let detail: Value = resp.json().await.expect("Invalid product detail");
    assert_eq!(detail["stock"], 0);
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn checkout_with_empty_cart_is_rejected() {
    let client = client();
    let base_url = api_base_url();
    let token = customer_token(&client, &base_url).await;

    let resp = client
        .post(format!("{base_url}/pagos/crear/"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to post payment create");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.expect("Invalid error body");
    assert!(body["detail"].is_string());
}
