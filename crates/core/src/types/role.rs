//! User roles and the endpoint access policy.
//!
//! Roles form a closed set; capability checks live here as small policy
//! methods instead of string comparisons scattered across handlers.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The role attached to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A shopper. Owns a cart, can review products and check out.
    Cliente,
    /// Store staff. Can update catalog entries and manage orders.
    Empleado,
    /// Full access, including catalog and user administration.
    Administrador,
}

impl Role {
    /// Whether this role may create or delete catalog products.
    #[must_use]
    pub const fn can_administer_catalog(&self) -> bool {
        matches!(self, Self::Administrador)
    }

    /// Whether this role may update existing catalog products.
    #[must_use]
    pub const fn can_update_catalog(&self) -> bool {
        matches!(self, Self::Administrador | Self::Empleado)
    }

    /// Whether this role may manage user accounts.
    #[must_use]
    pub const fn can_administer_users(&self) -> bool {
        matches!(self, Self::Administrador)
    }

    /// Whether this role may view and update order fulfillment status.
    #[must_use]
    pub const fn can_manage_orders(&self) -> bool {
        matches!(self, Self::Administrador | Self::Empleado)
    }

    /// Whether this role owns a shopping cart and may check out.
    #[must_use]
    pub const fn can_shop(&self) -> bool {
        matches!(self, Self::Cliente)
    }

    /// The role's wire name (also the value stored in the database).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cliente => "cliente",
            Self::Empleado => "empleado",
            Self::Administrador => "administrador",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cliente" => Ok(Self::Cliente),
            "empleado" => Ok(Self::Empleado),
            "administrador" => Ok(Self::Administrador),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Role {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<'_, sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}
