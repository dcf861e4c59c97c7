//! yew_paybox/src/bindings.rs
//!
//! Low-level access to the page's global scope and DOM for the Paybox script.
//!
//! The vendor script has no module interface: it reads `window.data` and calls
//! `window.onAuthorize`, and binds itself to a button by id. These helpers are
//! the only place that touches those globals; the typed handoff lives in
//! `handoff.rs`.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Reflect;
use web_sys::{Document, HtmlElement, Window};

use crate::error::PayboxError;

/// Name of the configuration object the Paybox script reads.
pub const DATA_GLOBAL: &str = "data";
/// Name of the callback the Paybox script invokes with its result.
pub const ON_AUTHORIZE_GLOBAL: &str = "onAuthorize";

pub(crate) fn window() -> Result<Window, PayboxError> {
    web_sys::window().ok_or_else(|| PayboxError::Host("no window".into()))
}

pub(crate) fn document() -> Result<Document, PayboxError> {
    window()?
        .document()
        .ok_or_else(|| PayboxError::Host("no document".into()))
}

/// `window[name] = value`
pub fn set_global(name: &str, value: &JsValue) -> Result<(), PayboxError> {
    let window = window()?;
    let written = Reflect::set(&window, &JsValue::from_str(name), value)
        .map_err(PayboxError::from_js)?;
    if written {
        Ok(())
    } else {
        Err(PayboxError::Host(format!("window.{} is read-only", name)))
    }
}

/// Element with the given id, if it is an `HTMLElement`.
pub fn html_element_by_id(id: &str) -> Option<HtmlElement> {
    document()
        .ok()?
        .get_element_by_id(id)?
        .dyn_into::<HtmlElement>()
        .ok()
}

/// Dispatch a click on the element; returns `false` when it is gone.
///
/// `HTMLElement.click()` dispatches synchronously, so every listener has run
/// by the time this returns.
pub fn click_element(id: &str) -> bool {
    match html_element_by_id(id) {
        Some(el) => {
            el.click();
            true
        }
        None => false,
    }
}
