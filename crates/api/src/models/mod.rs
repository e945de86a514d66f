//! Domain models for the Galería backend.
//!
//! These are validated domain types, separate from the row types the
//! repositories read out of PostgreSQL.

pub mod cart;
pub mod order;
pub mod payment;
pub mod product;
pub mod review;
pub mod user;

pub use cart::{Cart, CartError, CartLine};
pub use order::Order;
pub use payment::Payment;
pub use product::Product;
pub use review::Review;
pub use user::User;
