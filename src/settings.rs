//! Static configuration of the Paybox integration.
//!
//! Defaults target the PagoPlux sandbox. Every field can be overridden at
//! build time through the matching `PAYBOX_*` environment variable, since a
//! wasm bundle has no process environment to read at runtime.

use serde::{Deserialize, Serialize};

/// jQuery build required by the Paybox script.
pub const JQUERY_SRC: &str = "https://ajax.googleapis.com/ajax/libs/jquery/3.4.1/jquery.min.js";
/// Paybox script served by the sandbox origin.
pub const SANDBOX_SCRIPT_SRC: &str = "https://sandbox-paybox.pagoplux.com/paybox/index.js";
/// Id of the button the Paybox script binds to.
pub const DEFAULT_BUTTON_ID: &str = "paybox-pay-button";
/// Create-transaction endpoint, relative to the page origin.
pub const DEFAULT_CREATE_ENDPOINT: &str = "/api/payoplux/create";

/// Which PagoPlux environment the widget talks to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Sandbox => "sandbox",
            Environment::Production => "production",
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Lenient parse used for build-time overrides; anything unrecognised
    /// stays on the sandbox.
    fn from_override(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Sandbox,
        }
    }
}

/// Merchant identity sent with every payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merchant {
    pub email: String,
    pub name: String,
}

/// One `<script>` the widget injects into `<head>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalScript {
    /// DOM id, used to detect an earlier injection.
    pub id: &'static str,
    pub src: String,
    /// Human-readable name for logs.
    pub label: &'static str,
}

/// Everything the widget needs to know that is not per-attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PayboxSettings {
    pub merchant: Merchant,
    pub environment: Environment,
    /// Language of the Paybox modal.
    pub language: String,
    /// DOM id of the pay button; must match `PayboxIdElement`.
    pub button_id: String,
    pub create_endpoint: String,
    pub jquery_src: String,
    pub paybox_src: String,
}

impl Default for PayboxSettings {
    fn default() -> Self {
        Self {
            merchant: Merchant {
                email: "merchant@example.com".into(),
                name: "Demo Merchant".into(),
            },
            environment: Environment::Sandbox,
            language: "es".into(),
            button_id: DEFAULT_BUTTON_ID.into(),
            create_endpoint: DEFAULT_CREATE_ENDPOINT.into(),
            jquery_src: JQUERY_SRC.into(),
            paybox_src: SANDBOX_SCRIPT_SRC.into(),
        }
    }
}

impl PayboxSettings {
    /// Defaults with any `PAYBOX_*` variables present at compile time applied.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| match key {
            "PAYBOX_MERCHANT_EMAIL" => option_env!("PAYBOX_MERCHANT_EMAIL"),
            "PAYBOX_MERCHANT_NAME" => option_env!("PAYBOX_MERCHANT_NAME"),
            "PAYBOX_ENVIRONMENT" => option_env!("PAYBOX_ENVIRONMENT"),
            "PAYBOX_CREATE_ENDPOINT" => option_env!("PAYBOX_CREATE_ENDPOINT"),
            "PAYBOX_SCRIPT_URL" => option_env!("PAYBOX_SCRIPT_URL"),
            _ => None,
        })
    }

    /// Apply overrides from `lookup`; empty values are ignored.
    pub fn with_overrides<'a>(mut self, lookup: impl Fn(&str) -> Option<&'a str>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(email) = get("PAYBOX_MERCHANT_EMAIL") {
            self.merchant.email = email.to_string();
        }
        if let Some(name) = get("PAYBOX_MERCHANT_NAME") {
            self.merchant.name = name.to_string();
        }
        if let Some(env) = get("PAYBOX_ENVIRONMENT") {
            self.environment = Environment::from_override(env);
        }
        if let Some(endpoint) = get("PAYBOX_CREATE_ENDPOINT") {
            self.create_endpoint = endpoint.to_string();
        }
        if let Some(src) = get("PAYBOX_SCRIPT_URL") {
            self.paybox_src = src.to_string();
        }
        self
    }

    /// The two scripts the vendor integration needs, in execution order.
    pub fn scripts(&self) -> [ExternalScript; 2] {
        [
            ExternalScript {
                id: "paybox-jquery",
                src: self.jquery_src.clone(),
                label: "jQuery",
            },
            ExternalScript {
                id: "paybox-index",
                src: self.paybox_src.clone(),
                label: "Paybox script",
            },
        ]
    }
}
