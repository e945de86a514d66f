//! Checkout handlers.
//!
//! Checkout is a three-step dance with the payment provider:
//!
//! 1. `POST /pagos/crear/` creates a provider payment for the cart total and
//!    hands the customer the approval URL.
//! 2. The provider redirects the approved customer to `GET /pagos/aprobar/`
//!    with `paymentId` and `PayerID`; the handler executes the payment and
//!    finalizes checkout in one transaction.
//! 3. A customer who backs out lands on `GET /pagos/cancelar/`.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use galeria_core::{PaymentState, Role, format_amount};

use crate::db::{CartRepository, PaymentRepository, RepositoryError};
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ApproveParams {
    #[serde(rename = "paymentId")]
    pub payment_id: String,
    #[serde(rename = "PayerID")]
    pub payer_id: String,
    /// Shipping address captured at approval time.
    #[serde(default)]
    pub direccion: String,
}

#[derive(Debug, Deserialize)]
pub struct CancelParams {
    #[serde(rename = "paymentId")]
    pub payment_id: String,
}

#[derive(Debug, Serialize)]
pub struct CreatePaymentResponse {
    pub payment_id: String,
    pub approval_url: String,
    /// Settlement-currency amount, two fraction digits.
    pub monto: String,
}

/// Start a provider payment for the customer's active cart.
#[instrument(skip(state, user))]
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<(StatusCode, Json<CreatePaymentResponse>), ApiError> {
    user.require(Role::can_shop)?;

    let cart = match CartRepository::new(state.pool()).get_active(user.id).await {
        Ok(cart) if !cart.is_empty() => cart,
        Ok(_) | Err(RepositoryError::NotFound) => {
            return Err(ApiError::Validation("el carro está vacío".to_owned()));
        }
        Err(e) => return Err(e.into()),
    };

    let description = format!(
        "Compra en {} por {}",
        state.config().paypal.display_name,
        format_amount(cart.total)
    );

    let created = state.paypal().create_payment(cart.total, &description).await?;

    PaymentRepository::new(state.pool())
        .create(cart.id, &created.payment_id, created.monto)
        .await?;

    tracing::info!(
        usuario_id = %user.id,
        carro_id = %cart.id,
        payment_id = %created.payment_id,
        "payment created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatePaymentResponse {
            payment_id: created.payment_id,
            approval_url: created.approval_url,
            monto: format_amount(created.monto),
        }),
    ))
}

/// What a redirect callback may do given the state the attempt is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallbackDisposition {
    /// The attempt is still open; the callback may move it.
    Proceed,
    /// The attempt already reached the callback's target state.
    AlreadyDone,
    /// The attempt settled differently or is being executed right now.
    Rejected,
}

/// Decide how to answer a callback that wants to move an attempt to `target`.
///
/// `ejecutando` counts as rejected for both callbacks: the executing request
/// owns the attempt and will settle it itself.
fn callback_disposition(estado: PaymentState, target: PaymentState) -> CallbackDisposition {
    if estado == target {
        CallbackDisposition::AlreadyDone
    } else if matches!(
        estado,
        PaymentState::Creado | PaymentState::PendienteAprobacion
    ) {
        CallbackDisposition::Proceed
    } else {
        CallbackDisposition::Rejected
    }
}

/// Approval callback: execute the payment and finalize checkout.
///
/// The handler first claims the attempt (`pendiente_aprobacion` →
/// `ejecutando`) in one conditional UPDATE, so of two concurrent callbacks
/// only one ever calls the provider's execute. Replays of a captured payment
/// are answered idempotently without touching the provider again.
#[instrument(skip(state, user, params), fields(payment_id = %params.payment_id))]
pub async fn approve(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<ApproveParams>,
) -> Result<Json<Value>, ApiError> {
    user.require(Role::can_shop)?;

    let payments = PaymentRepository::new(state.pool());

    if !payments.belongs_to(&params.payment_id, user.id).await? {
        return Err(ApiError::NotFound("pago"));
    }

    if !payments.claim_for_execution(&params.payment_id).await? {
        // Lost the claim: the attempt is unknown, settled, or owned by a
        // concurrent callback. Re-read to pick the answer.
        let payment = payments
            .find(&params.payment_id)
            .await
            .map_err(|e| ApiError::from_repo(e, "pago"))?;

        return match callback_disposition(payment.estado, PaymentState::Capturado) {
            CallbackDisposition::AlreadyDone => {
                tracing::info!("approval replayed for captured payment");
                Ok(Json(json!({
                    "detail": "pago ya procesado",
                    "payment_id": payment.payment_id,
                })))
            }
            _ => Err(ApiError::Conflict(
                "el pago ya no puede ser aprobado".to_owned(),
            )),
        };
    }

    if let Err(e) = state
        .paypal()
        .execute_payment(&params.payment_id, &params.payer_id)
        .await
    {
        payments
            .mark_state(&params.payment_id, PaymentState::Error)
            .await?;
        return Err(e.into());
    }

    let captured = payments
        .finalize_capture(&params.payment_id, &params.direccion)
        .await?;

    tracing::info!(usuario_id = %user.id, "payment captured, order created");

    Ok(Json(json!({
        "detail": "pago aprobado",
        "payment_id": captured.payment_id,
        "monto": format_amount(captured.monto),
    })))
}

/// Cancel callback: mark the attempt cancelled, leave the cart untouched.
///
/// A cancel redirect that arrives after the payment settled (captured, or
/// cancelled by an earlier redirect) must not move the attempt again; the
/// conditional UPDATE in the repository backs the same rule at the database.
#[instrument(skip(state, user, params), fields(payment_id = %params.payment_id))]
pub async fn cancel(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<CancelParams>,
) -> Result<Json<Value>, ApiError> {
    user.require(Role::can_shop)?;

    let payments = PaymentRepository::new(state.pool());

    if !payments.belongs_to(&params.payment_id, user.id).await? {
        return Err(ApiError::NotFound("pago"));
    }

    let payment = payments
        .find(&params.payment_id)
        .await
        .map_err(|e| ApiError::from_repo(e, "pago"))?;

    match callback_disposition(payment.estado, PaymentState::Cancelado) {
        CallbackDisposition::AlreadyDone => {
            tracing::info!("cancel replayed for cancelled payment");
            return Ok(Json(json!({ "detail": "pago cancelado" })));
        }
        CallbackDisposition::Rejected => {
            return Err(ApiError::Conflict(
                "el pago ya no puede ser cancelado".to_owned(),
            ));
        }
        CallbackDisposition::Proceed => (),
    }

    payments
        .mark_state(&params.payment_id, PaymentState::Cancelado)
        .await
        .map_err(|e| ApiError::from_repo(e, "pago"))?;

    tracing::info!(usuario_id = %user.id, "payment cancelled");

    Ok(Json(json!({ "detail": "pago cancelado" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_after_capture_is_rejected() {
        assert_eq!(
            callback_disposition(PaymentState::Capturado, PaymentState::Cancelado),
            CallbackDisposition::Rejected
        );
        assert_eq!(
            callback_disposition(PaymentState::Error, PaymentState::Cancelado),
            CallbackDisposition::Rejected
        );
    }

    #[test]
    fn replayed_callbacks_are_idempotent() {
        assert_eq!(
            callback_disposition(PaymentState::Cancelado, PaymentState::Cancelado),
            CallbackDisposition::AlreadyDone
        );
        assert_eq!(
            callback_disposition(PaymentState::Capturado, PaymentState::Capturado),
            CallbackDisposition::AlreadyDone
        );
    }

    #[test]
    fn open_attempts_may_move() {
        assert_eq!(
            callback_disposition(PaymentState::PendienteAprobacion, PaymentState::Cancelado),
            CallbackDisposition::Proceed
        );
        assert_eq!(
            callback_disposition(PaymentState::Creado, PaymentState::Cancelado),
            CallbackDisposition::Proceed
        );
    }

    #[test]
    fn executing_attempt_is_owned_by_its_claimer() {
        assert_eq!(
            callback_disposition(PaymentState::Ejecutando, PaymentState::Cancelado),
            CallbackDisposition::Rejected
        );
        assert_eq!(
            callback_disposition(PaymentState::Ejecutando, PaymentState::Capturado),
            CallbackDisposition::Rejected
        );
    }
}
