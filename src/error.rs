//! Error type shared by every layer of the Paybox integration.
//!
//! Every variant ends up as a plain status line in the widget; none of them is
//! fatal to the page and none is retried automatically.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Failure while preparing or handing off a Paybox payment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayboxError {
    /// The create-transaction request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// A response arrived but its body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),

    /// The endpoint answered with a non-2xx status.
    ///
    /// Displays as the server's own message so it can be shown verbatim.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// A plan key outside the compiled-in catalog.
    #[error("unknown plan `{0}`")]
    UnknownPlan(String),

    /// The browser side of the handoff failed (no `window`, a rejected
    /// `Reflect.set`, a serialization error, ...).
    #[error("browser integration failed: {0}")]
    Host(String),
}

impl PayboxError {
    /// Best-effort conversion of a thrown JS value.
    pub(crate) fn from_js(value: JsValue) -> Self {
        PayboxError::Host(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

impl From<serde_wasm_bindgen::Error> for PayboxError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        PayboxError::Host(err.to_string())
    }
}

impl From<gloo_net::Error> for PayboxError {
    fn from(err: gloo_net::Error) -> Self {
        PayboxError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_displays_message_only() {
        let err = PayboxError::Server {
            status: 400,
            message: "bad plan".into(),
        };
        assert_eq!(err.to_string(), "bad plan");
    }

    #[test]
    fn unknown_plan_names_the_key() {
        assert_eq!(
            PayboxError::UnknownPlan("gold".into()).to_string(),
            "unknown plan `gold`"
        );
    }
}
