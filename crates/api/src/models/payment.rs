//! Checkout attempts (pagos).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use galeria_core::{CartId, PaymentId, PaymentState};

/// One checkout attempt against the payment provider.
///
/// Keyed by the provider's `payment_id` so that a replayed approval
/// callback can be answered idempotently instead of re-executing the
/// transaction.
#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: PaymentId,
    pub carro_id: CartId,
    /// The provider-issued payment identifier.
    pub payment_id: String,
    pub estado: PaymentState,
    /// Settlement-currency amount sent to the provider.
    pub monto: Decimal,
    pub created_at: DateTime<Utc>,
    pub captured_at: Option<DateTime<Utc>>,
}
