//! The handoff between the widget and the vendor's Paybox script.
//!
//! The vendor reads one configuration object and one callback from the global
//! scope, then takes over the click on the bound button. [`PayboxHost`] is the
//! seam for all of that: a single-writer, single-reader slot that each attempt
//! overwrites, plus the deferred activation of the trigger element.
//! [`WindowHost`] is the browser implementation.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::JsValue;

use crate::bindings;
use crate::error::PayboxError;
use crate::settings::PayboxSettings;
use crate::status::AuthorizeResponse;
use crate::transaction::TransactionPayload;

/// The `data` object expected by the Paybox script. Field names are the
/// vendor's and must not change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayboxData {
    #[serde(rename = "PayboxRemail")]
    pub merchant_email: String,
    #[serde(rename = "PayboxRename")]
    pub merchant_name: String,
    /// Amount exempt from VAT, as a decimal string.
    #[serde(rename = "PayboxBase0")]
    pub base0: String,
    /// Amount subject to VAT, as a decimal string.
    #[serde(rename = "PayboxBase12")]
    pub base12: String,
    #[serde(rename = "PayboxDescription")]
    pub description: String,
    #[serde(rename = "PayboxLanguage")]
    pub language: String,
    #[serde(rename = "PayboxDirection")]
    pub direction: String,
    #[serde(rename = "PayBoxClientPhone")]
    pub client_phone: String,
    #[serde(rename = "PayboxProduction")]
    pub production: bool,
    #[serde(rename = "PayboxEnvironment")]
    pub environment: String,
    /// `true` selects a merchant-provided trigger button.
    #[serde(rename = "PayboxPagoPlux")]
    pub custom_button: bool,
    #[serde(rename = "PayboxIdElement")]
    pub element_id: String,
    /// Opaque value echoed back by the vendor; carries our transaction id.
    #[serde(rename = "PayboxExtras")]
    pub extras: String,
}

impl PayboxData {
    pub fn new(settings: &PayboxSettings, payload: &TransactionPayload) -> Self {
        Self {
            merchant_email: settings.merchant.email.clone(),
            merchant_name: settings.merchant.name.clone(),
            base0: format_amount(payload.base0),
            base12: format_amount(payload.base12),
            description: payload.description.clone(),
            language: settings.language.clone(),
            direction: String::new(),
            client_phone: String::new(),
            production: settings.environment.is_production(),
            environment: settings.environment.as_str().to_string(),
            custom_button: true,
            element_id: settings.button_id.clone(),
            extras: payload.transaction_id.clone(),
        }
    }
}

/// Shortest decimal form of an amount: `10`, `10.5`, `0`.
fn format_amount(amount: f64) -> String {
    amount.to_string()
}

/// Callback handed to the vendor for one attempt.
pub type AuthorizeHandler = Box<dyn Fn(AuthorizeResponse)>;

/// Deferred work scheduled by the payment flow.
pub type DeferredTask = Box<dyn FnOnce()>;

/// Boundary between the payment flow and the external payment script.
pub trait PayboxHost {
    /// Overwrite the configuration object and the authorization callback.
    fn publish(&self, data: &PayboxData, on_authorize: AuthorizeHandler) -> Result<(), PayboxError>;

    /// Whether the trigger element the vendor binds to is present.
    fn has_trigger(&self, element_id: &str) -> bool;

    /// Run `task` once the current synchronous block has completed.
    fn defer(&self, task: DeferredTask);

    /// Activate the trigger element so the vendor's listener sees it.
    fn activate(&self, element_id: &str);
}

/// Holds the installed value and the one it replaced.
///
/// The vendor may still call a callback it read before the last publish, so
/// a replaced entry lives until the publish after next.
pub(crate) struct CallbackSlot<T> {
    current: Option<T>,
    previous: Option<T>,
}

impl<T> Default for CallbackSlot<T> {
    fn default() -> Self {
        Self {
            current: None,
            previous: None,
        }
    }
}

impl<T> CallbackSlot<T> {
    /// Install `value`; returns the entry released by this install, if any.
    pub(crate) fn install(&mut self, value: T) -> Option<T> {
        let released = self.previous.take();
        self.previous = self.current.replace(value);
        released
    }
}

/// `PayboxHost` writing to `window` and the live DOM.
#[derive(Clone, Default)]
pub struct WindowHost {
    on_authorize: Rc<RefCell<CallbackSlot<Closure<dyn Fn(JsValue)>>>>,
}

impl WindowHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PayboxHost for WindowHost {
    fn publish(&self, data: &PayboxData, on_authorize: AuthorizeHandler) -> Result<(), PayboxError> {
        let data_js = serde_wasm_bindgen::to_value(data)?;
        bindings::set_global(bindings::DATA_GLOBAL, &data_js)?;

        let closure = Closure::<dyn Fn(JsValue)>::new(move |raw: JsValue| {
            let response = AuthorizeResponse::from_js(&raw);
            debug!(?response, "onAuthorize invoked");
            on_authorize(response);
        });
        bindings::set_global(bindings::ON_AUTHORIZE_GLOBAL, closure.as_ref())?;
        if self.on_authorize.borrow_mut().install(closure).is_some() {
            debug!("released onAuthorize from two attempts ago");
        }
        Ok(())
    }

    fn has_trigger(&self, element_id: &str) -> bool {
        bindings::html_element_by_id(element_id).is_some()
    }

    fn defer(&self, task: DeferredTask) {
        // A zero timeout lands on the next macrotask, after the vendor script
        // has had a chance to attach its listener.
        Timeout::new(0, task).forget();
    }

    fn activate(&self, element_id: &str) {
        if !bindings::click_element(element_id) {
            warn!(element_id, "trigger element disappeared before activation");
        }
    }
}
