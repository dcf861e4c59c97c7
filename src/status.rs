//! What the user reads under the pay button.

use gloo_utils::format::JsValueSerdeExt;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use wasm_bindgen::JsValue;

use crate::error::PayboxError;

/// Shown when the vendor reports `status: "succeeded"`.
pub const AUTHORIZED_MESSAGE: &str = "Pago autorizado";
/// Stand-in for a missing status or error message.
pub const UNKNOWN: &str = "desconocido";

const SUCCEEDED: &str = "succeeded";

/// Argument the vendor script passes to `onAuthorize`.
///
/// Only `status` is interpreted; everything else is kept for logging and for
/// listeners of the widget.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorizeResponse {
    /// Non-string statuses (numbers, booleans, ...) are kept in their JSON
    /// text form.
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

fn lenient_status<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(status) => Some(status),
        other => Some(other.to_string()),
    })
}

impl AuthorizeResponse {
    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            extra: serde_json::Map::new(),
        }
    }

    /// Read the vendor's response; anything unreadable counts as a response
    /// without a status.
    pub fn from_js(value: &JsValue) -> Self {
        value
            .into_serde::<Value>()
            .map(Self::from_json)
            .unwrap_or_default()
    }

    /// Interpret an already-decoded response. A bare non-object value is
    /// taken as the status itself.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            Value::Null => Self::default(),
            Value::String(status) => Self::with_status(status),
            other => Self::with_status(other.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(SUCCEEDED)
    }

    /// Status line for this response.
    pub fn message(&self) -> String {
        if self.is_success() {
            AUTHORIZED_MESSAGE.to_string()
        } else {
            format!(
                "Pago fallido o cancelado: {}",
                self.status.as_deref().unwrap_or(UNKNOWN)
            )
        }
    }
}

/// Status line for a failure before the vendor took over.
pub fn error_message(err: &PayboxError) -> String {
    let text = err.to_string();
    if text.is_empty() {
        format!("Error: {}", UNKNOWN)
    } else {
        format!("Error: {}", text)
    }
}
