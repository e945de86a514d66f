//! User accounts.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use galeria_core::{Email, Role, UserId};

/// A user account.
///
/// The password hash never leaves the auth service; this type is what the
/// rest of the application sees.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub nombre: String,
    pub email: Email,
    pub telefono: String,
    pub rol: Role,
    /// Customer-only: stored payment method label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metodo_de_pago: Option<String>,
    /// Customer-only: birth date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_nacimiento: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}
