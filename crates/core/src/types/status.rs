//! Lifecycle statuses for orders and checkout attempts.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Fulfillment status of an order.
///
/// Statuses are labels mutated by staff; there is no automatic transition
/// logic in the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pendiente,
    Procesando,
    Enviado,
    Entregado,
    Cancelado,
}

impl OrderStatus {
    /// The status' wire name (also the value stored in the database).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pendiente => "pendiente",
            Self::Procesando => "procesando",
            Self::Enviado => "enviado",
            Self::Entregado => "entregado",
            Self::Cancelado => "cancelado",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pendiente" => Ok(Self::Pendiente),
            "procesando" => Ok(Self::Procesando),
            "enviado" => Ok(Self::Enviado),
            "entregado" => Ok(Self::Entregado),
            "cancelado" => Ok(Self::Cancelado),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// State of one checkout attempt against the payment provider.
///
/// A checkout moves `Creado` → `PendienteAprobacion` once the provider has
/// issued a redirect URL, then to exactly one of `Capturado`, `Cancelado`
/// or `Error`. `Ejecutando` is the short-lived claim an approval callback
/// takes before calling the provider, so two concurrent callbacks can never
/// both execute the same payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    Creado,
    PendienteAprobacion,
    Ejecutando,
    Capturado,
    Cancelado,
    Error,
}

impl PaymentState {
    /// The state's wire name (also the value stored in the database).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Creado => "creado",
            Self::PendienteAprobacion => "pendiente_aprobacion",
            Self::Ejecutando => "ejecutando",
            Self::Capturado => "capturado",
            Self::Cancelado => "cancelado",
            Self::Error => "error",
        }
    }

    /// Whether the attempt has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Capturado | Self::Cancelado | Self::Error)
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "creado" => Ok(Self::Creado),
            "pendiente_aprobacion" => Ok(Self::PendienteAprobacion),
            "ejecutando" => Ok(Self::Ejecutando),
            "capturado" => Ok(Self::Capturado),
            "cancelado" => Ok(Self::Cancelado),
            "error" => Ok(Self::Error),
            _ => Err(format!("invalid payment state: {s}")),
        }
    }
}

macro_rules! text_sqlx_type {
    ($name:ident) => {
        #[cfg(feature = "postgres")]
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }
        }

        #[cfg(feature = "postgres")]
        impl sqlx::Encode<'_, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as sqlx::Encode<'_, sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <&str as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
                Ok(s.parse()?)
            }
        }
    };
}

text_sqlx_type!(OrderStatus);
text_sqlx_type!(PaymentState);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_round_trips() {
        for s in ["pendiente", "procesando", "enviado", "entregado", "cancelado"] {
            assert_eq!(s.parse::<OrderStatus>().unwrap().as_str(), s);
        }
        assert!("perdido".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn payment_terminal_states() {
        assert!(!PaymentState::Creado.is_terminal());
        assert!(!PaymentState::PendienteAprobacion.is_terminal());
        assert!(!PaymentState::Ejecutando.is_terminal());
        assert!(PaymentState::Capturado.is_terminal());
        assert!(PaymentState::Cancelado.is_terminal());
        assert!(PaymentState::Error.is_terminal());
    }

    #[test]
    fn default_order_status_is_pendiente() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pendiente);
    }
}
