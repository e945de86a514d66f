//! Integration tests for Galería.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and the API server
//! docker compose up -d db
//! cargo run -p galeria-api
//!
//! # Run the live tests (ignored by default)
//! GALERIA_BASE_URL=http://localhost:8000 cargo test -p galeria-integration-tests -- --ignored
//! ```
//!
//! Tests that talk to a running server are `#[ignore]`d so that a plain
//! `cargo test` stays hermetic. Tests against the library types run always.

use reqwest::Client;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("GALERIA_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// HTTP client for live tests.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique throwaway email for registration tests.
#[must_use]
pub fn unique_email() -> String {
    format!("test-{}@example.com", uuid::Uuid::new_v4())
}
