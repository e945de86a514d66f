//! Galería Core - Shared types library.
//!
//! This crate provides the domain vocabulary shared between the API server
//! and the integration test harness:
//!
//! - [`types::id`] - Newtype wrappers for type-safe entity IDs
//! - [`types::email`] - Validated email addresses
//! - [`types::money`] - Decimal money and settlement-currency conversion
//! - [`types::role`] - The closed set of user roles and the access policy
//! - [`types::status`] - Order and payment lifecycle statuses
//! - [`types::rating`] - Review ratings constrained to 1..=5
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. The `postgres` feature adds sqlx `Type` impls so the same types
//! can be bound directly in queries.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
