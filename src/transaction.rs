//! Client side of the create-transaction endpoint.
//!
//! `POST {create_endpoint}` with `{ "plan": "<key>" }` answers either
//! `{ transactionId, base0, base12, description }` or, with a non-2xx status,
//! `{ error }`.

use gloo_net::http::Request;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::PlanKey;
use crate::error::PayboxError;

/// Message used when an error response carries no `error` field.
pub const DEFAULT_CREATE_ERROR: &str = "Error creating transaction";

/// Body of the create-transaction request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub plan: PlanKey,
}

/// Server-computed amounts for one payment attempt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPayload {
    pub transaction_id: String,
    /// Amount exempt from VAT.
    pub base0: f64,
    /// Amount subject to VAT.
    pub base12: f64,
    pub description: String,
}

/// Error body of the create-transaction endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Source of transaction parameters for the payment flow.
#[allow(async_fn_in_trait)]
pub trait TransactionApi {
    async fn create_transaction(&self, plan: PlanKey) -> Result<TransactionPayload, PayboxError>;
}

/// `TransactionApi` backed by `fetch`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpTransactionApi {
    endpoint: String,
}

impl HttpTransactionApi {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl TransactionApi for HttpTransactionApi {
    async fn create_transaction(&self, plan: PlanKey) -> Result<TransactionPayload, PayboxError> {
        let response = Request::post(&self.endpoint)
            .json(&CreateTransactionRequest { plan })?
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(status, body = %body, "create-transaction response");
        parse_create_response(status, &body)
    }
}

/// Interpret a create-transaction response.
///
/// Non-2xx statuses become [`PayboxError::Server`] carrying the body's
/// `error` field; a body that is not JSON at all is a decode error either way.
pub fn parse_create_response(status: u16, body: &str) -> Result<TransactionPayload, PayboxError> {
    let json: serde_json::Value =
        serde_json::from_str(body).map_err(|e| PayboxError::Decode(e.to_string()))?;

    if !(200..300).contains(&status) {
        let message = serde_json::from_value::<ApiErrorBody>(json)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_CREATE_ERROR.to_string());
        return Err(PayboxError::Server { status, message });
    }

    serde_json::from_value(json).map_err(|e| PayboxError::Decode(e.to_string()))
}
