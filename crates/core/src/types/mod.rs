//! Core types for Galería.

pub mod email;
pub mod id;
pub mod money;
pub mod rating;
pub mod role;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{ExchangeRate, format_amount};
pub use rating::{Rating, RatingError};
pub use role::Role;
pub use status::{OrderStatus, PaymentState};
