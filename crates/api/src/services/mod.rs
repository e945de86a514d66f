//! External-facing services: authentication and the payment provider.

pub mod auth;
pub mod paypal;

pub use auth::{AuthError, AuthService, Claims};
pub use paypal::{CreatedPayment, PayPalClient, PayPalError};
