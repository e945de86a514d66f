//! PayPal REST API client for checkout.
//!
//! Implements the two calls the checkout flow needs: creating a sale
//! payment (which yields the approval redirect URL) and executing it once
//! the customer has approved. Credentials, mode, and the settlement
//! exchange rate are injected through [`PayPalConfig`]; nothing here reads
//! process-wide state.

use reqwest::StatusCode;
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{Value, json};

use galeria_core::money::format_amount;

use crate::config::{PayPalConfig, PayPalMode};

/// Settlement currency required by the provider.
const SETTLEMENT_CURRENCY: &str = "USD";

/// Errors from the PayPal API.
#[derive(Debug, thiserror::Error)]
pub enum PayPalError {
    /// HTTP transport failure (including timeouts). The payment must be
    /// treated as failed/unknown, never as successful.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the call; `body` is its error payload,
    /// passed through to the client verbatim.
    #[error("provider error ({status})")]
    Api { status: u16, body: Value },

    /// The provider's response did not include an approval link.
    #[error("payment response missing approval_url")]
    MissingApprovalUrl,

    /// Failed to parse a provider response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// A created payment awaiting customer approval.
#[derive(Debug, Clone)]
pub struct CreatedPayment {
    /// Provider payment identifier (used later to execute).
    pub payment_id: String,
    /// Settlement-currency amount sent to the provider.
    pub monto: Decimal,
    /// Redirect URL for the customer to authorize the payment.
    pub approval_url: String,
}

/// PayPal REST API client.
#[derive(Clone)]
pub struct PayPalClient {
    client: reqwest::Client,
    config: PayPalConfig,
    api_base: &'static str,
}

impl PayPalClient {
    /// Create a new client from configuration.
    #[must_use]
    pub fn new(config: PayPalConfig) -> Self {
        let api_base = match config.mode {
            PayPalMode::Sandbox => "https://api.sandbox.paypal.com",
            PayPalMode::Live => "https://api.paypal.com",
        };

        Self {
            client: reqwest::Client::new(),
            config,
            api_base,
        }
    }

    /// Obtain an OAuth2 access token via client credentials.
    async fn access_token(&self) -> Result<String, PayPalError> {
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
        }

        let response = self
            .client
            .post(format!("{}/v1/oauth2/token", self.api_base))
            .basic_auth(
                &self.config.client_id,
                Some(self.config.client_secret.expose_secret()),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status, response.text().await.unwrap_or_default()));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| PayPalError::Parse(e.to_string()))?;
        Ok(token.access_token)
    }

    /// Create a sale payment for a base-currency total.
    ///
    /// The total is converted to the settlement currency with the
    /// configured fixed exchange rate and formatted to two decimals. On
    /// success the provider's approval redirect URL is returned; nothing
    /// local is considered paid until the payment is executed.
    pub async fn create_payment(
        &self,
        total_base: Decimal,
        description: &str,
    ) -> Result<CreatedPayment, PayPalError> {
        let monto = self.config.exchange_rate.convert(total_base);
        let body = sale_payment_body(
            &format_amount(monto),
            description,
            &self.config.return_url,
            &self.config.cancel_url,
        );

        let token = self.access_token().await?;
        let response = self
            .client
            .post(format!("{}/v1/payments/payment", self.api_base))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| PayPalError::Parse(e.to_string()))?;

        if !status.is_success() {
            return Err(PayPalError::Api {
                status: status.as_u16(),
                body: payload,
            });
        }

        let payment_id = payload
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| PayPalError::Parse("payment response missing id".to_owned()))?
            .to_owned();
        let approval_url = approval_url(&payload).ok_or(PayPalError::MissingApprovalUrl)?;

        Ok(CreatedPayment {
            payment_id,
            monto,
            approval_url,
        })
    }

    /// Execute (capture) an approved payment.
    pub async fn execute_payment(
        &self,
        payment_id: &str,
        payer_id: &str,
    ) -> Result<(), PayPalError> {
        let token = self.access_token().await?;
        let response = self
            .client
            .post(format!(
                "{}/v1/payments/payment/{payment_id}/execute",
                self.api_base
            ))
            .bearer_auth(token)
            .json(&json!({ "payer_id": payer_id }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status, response.text().await.unwrap_or_default()));
        }

        Ok(())
    }
}

fn api_error(status: StatusCode, body: String) -> PayPalError {
    let body = serde_json::from_str(&body).unwrap_or(Value::String(body));
    PayPalError::Api {
        status: status.as_u16(),
        body,
    }
}

/// Build the create-payment request body for a sale via the redirect flow.
fn sale_payment_body(amount: &str, description: &str, return_url: &str, cancel_url: &str) -> Value {
    json!({
        "intent": "sale",
        "payer": { "payment_method": "paypal" },
        "redirect_urls": {
            "return_url": return_url,
            "cancel_url": cancel_url,
        },
        "transactions": [{
            "amount": {
                "total": amount,
                "currency": SETTLEMENT_CURRENCY,
            },
            "description": description,
        }],
    })
}

/// Extract the `approval_url` link from a created-payment response.
fn approval_url(payload: &Value) -> Option<String> {
    payload
        .get("links")?
        .as_array()?
        .iter()
        .find(|link| link.get("rel").and_then(Value::as_str) == Some("approval_url"))?
        .get("href")?
        .as_str()
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_body_has_provider_shape() {
        let body = sale_payment_body(
            "25.00",
            "Compra en Galería",
            "https://tienda.example/pagos/aprobar/",
            "https://tienda.example/pagos/cancelar/",
        );

        assert_eq!(body["intent"], "sale");
        assert_eq!(body["payer"]["payment_method"], "paypal");
        assert_eq!(body["transactions"][0]["amount"]["total"], "25.00");
        assert_eq!(body["transactions"][0]["amount"]["currency"], "USD");
        assert_eq!(
            body["redirect_urls"]["return_url"],
            "https://tienda.example/pagos/aprobar/"
        );
        assert_eq!(
            body["redirect_urls"]["cancel_url"],
            "https://tienda.example/pagos/cancelar/"
        );
    }

    #[test]
    fn approval_url_is_found_among_links() {
        let payload = json!({
            "id": "PAY-123",
            "links": [
                { "rel": "self", "href": "https://api.sandbox.paypal.com/v1/payments/payment/PAY-123" },
                { "rel": "approval_url", "href": "https://www.sandbox.paypal.com/cgi-bin/webscr?cmd=_express-checkout&token=EC-1" },
                { "rel": "execute", "href": "https://api.sandbox.paypal.com/v1/payments/payment/PAY-123/execute" }
            ]
        });

        assert_eq!(
            approval_url(&payload).unwrap(),
            "https://www.sandbox.paypal.com/cgi-bin/webscr?cmd=_express-checkout&token=EC-1"
        );
    }

    #[test]
    fn missing_approval_url_is_none() {
        let payload = json!({ "id": "PAY-123", "links": [] });
        assert!(approval_url(&payload).is_none());
    }
}
