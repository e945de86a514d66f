//! Payment (checkout attempt) repository.
//!
//! Rows are keyed by the provider's `payment_id`. An approval callback must
//! first claim the attempt (`pendiente_aprobacion` → `ejecutando`) before
//! calling the provider; the claim is a single conditional UPDATE, so of two
//! concurrent callbacks exactly one wins and the other sees the attempt
//! already claimed or settled.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use galeria_core::{CartId, OrderStatus, PaymentId, PaymentState, UserId};

use super::RepositoryError;
use crate::models::Payment;

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: i32,
    carro_id: i32,
    payment_id: String,
    estado: String,
    monto: Decimal,
    created_at: DateTime<Utc>,
    captured_at: Option<DateTime<Utc>>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = RepositoryError;

    fn try_from(r: PaymentRow) -> Result<Self, Self::Error> {
        let estado: PaymentState = r.estado.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid payment state in database: {e}"))
        })?;

        Ok(Self {
            id: PaymentId::new(r.id),
            carro_id: CartId::new(r.carro_id),
            payment_id: r.payment_id,
            estado,
            monto: r.monto,
            created_at: r.created_at,
            captured_at: r.captured_at,
        })
    }
}

const PAYMENT_COLUMNS: &str =
    "id, carro_id, payment_id, estado, monto, created_at, captured_at";

/// Repository for checkout attempts.
pub struct PaymentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentRepository<'a> {
    /// Create a new payment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a new checkout attempt in `pendiente_aprobacion`.
    pub async fn create(
        &self,
        carro_id: CartId,
        payment_id: &str,
        monto: Decimal,
    ) -> Result<Payment, RepositoryError> {
        let row: PaymentRow = sqlx::query_as(&format!(
            "INSERT INTO pago (carro_id, payment_id, estado, monto)
             VALUES ($1, $2, 'pendiente_aprobacion', $3)
             RETURNING {PAYMENT_COLUMNS}"
        ))
        .bind(carro_id)
        .bind(payment_id)
        .bind(monto)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "payment already recorded"))?;

        row.try_into()
    }

    /// Find an attempt by the provider's payment ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the payment is unknown.
    pub async fn find(&self, payment_id: &str) -> Result<Payment, RepositoryError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM pago WHERE payment_id = $1"
        ))
        .bind(payment_id)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Atomically claim a pending attempt for execution.
    ///
    /// Moves the row `pendiente_aprobacion` → `ejecutando` in one conditional
    /// UPDATE. Returns `false` when the attempt is unknown or no longer
    /// pending; callers then re-read the row to decide how to answer.
    pub async fn claim_for_execution(&self, payment_id: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE pago SET estado = 'ejecutando'
             WHERE payment_id = $1 AND estado = 'pendiente_aprobacion'",
        )
        .bind(payment_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Move a non-terminal attempt to `cancelado` or `error`.
    ///
    /// The UPDATE is conditional on the row not having settled yet, so a
    /// late or replayed callback can never overwrite a terminal state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the payment is unknown and
    /// `RepositoryError::Conflict` if it already reached a terminal state.
    pub async fn mark_state(
        &self,
        payment_id: &str,
        estado: PaymentState,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE pago SET estado = $2
             WHERE payment_id = $1
               AND estado IN ('creado', 'pendiente_aprobacion', 'ejecutando')",
        )
        .bind(payment_id)
        .bind(estado)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let exists: Option<(i32,)> =
                sqlx::query_as("SELECT id FROM pago WHERE payment_id = $1")
                    .bind(payment_id)
                    .fetch_optional(self.pool)
                    .await?;

            return Err(match exists {
                Some(_) => RepositoryError::Conflict("payment already settled".into()),
                None => RepositoryError::NotFound,
            });
        }

        Ok(())
    }

    /// Finalize a captured payment.
    ///
    /// In one transaction: marks the claimed attempt `capturado`, marks the
    /// cart consumed (`pagado`), and creates the order in `pendiente`. The
    /// customer's next add-to-cart will lazily create a fresh cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the attempt is not currently
    /// claimed via [`Self::claim_for_execution`].
    pub async fn finalize_capture(
        &self,
        payment_id: &str,
        direccion: &str,
    ) -> Result<Payment, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "UPDATE pago SET estado = 'capturado', captured_at = now()
             WHERE payment_id = $1 AND estado = 'ejecutando'
             RETURNING {PAYMENT_COLUMNS}"
        ))
        .bind(payment_id)
        .fetch_optional(&mut *tx)
        .await?;

        let row = row.ok_or_else(|| {
            RepositoryError::Conflict("payment is not claimed for capture".into())
        })?;
        let carro_id = CartId::new(row.carro_id);

        sqlx::query("UPDATE carro SET pagado = TRUE WHERE id = $1")
            .bind(carro_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO pedido (carro_id, estado, direccion)
             VALUES ($1, $2, $3)
             ON CONFLICT (carro_id) DO NOTHING",
        )
        .bind(carro_id)
        .bind(OrderStatus::Pendiente)
        .bind(direccion)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        row.try_into()
    }

    /// Whether the cart behind an attempt belongs to the given customer.
    pub async fn belongs_to(
        &self,
        payment_id: &str,
        cliente_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let row: Option<(i32,)> = sqlx::query_as(
            "SELECT c.cliente_id
             FROM pago p JOIN carro c ON c.id = p.carro_id
             WHERE p.payment_id = $1",
        )
        .bind(payment_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.is_some_and(|(owner,)| owner == cliente_id.as_i32()))
    }
}
