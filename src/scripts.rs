//! scripts.rs
//!
//! Custom Yew hooks loading the Paybox dependencies at runtime (no inline JS).
//!
//! # Overview
//! `use_paybox_scripts()` injects, on first use and after the page is
//! interactive,
//! `<script id="paybox-jquery" src="…/jquery/3.4.1/jquery.min.js">` and
//! `<script id="paybox-index" src="…/paybox/index.js">` into `<head>`. Both
//! are inserted with `async = false` so jQuery runs first. The hook returns
//! `false` until both `load` events fired, then `true`.
//!
//! Scripts are looked up by id before injecting, so any number of widgets on
//! the same page share one copy of each.
//!
//! # Usage
//! ```rust,ignore
//! use yew::prelude::*;
//! use yew_paybox::{use_paybox_scripts, PayboxSettings};
//!
//! #[function_component(App)]
//! fn app() -> Html {
//!     let settings = PayboxSettings::from_env();
//!     let ready = use_paybox_scripts(&settings);
//!     html! {
//!         if ready {
//!             <p>{"Paybox listo"}</p>
//!         } else {
//!             <p>{"Cargando Paybox..."}</p>
//!         }
//!     }
//! }
//! ```

use tracing::{info, warn};
use wasm_bindgen::{prelude::Closure, JsCast};
use web_sys::{Document, HtmlScriptElement};
use yew::functional::hook;
use yew::prelude::*;

use crate::bindings;
use crate::error::PayboxError;
use crate::settings::{ExternalScript, PayboxSettings};

/// Attribute set on a script element once it has loaded, so a widget mounted
/// later sees it as ready.
const LOADED_ATTR: &str = "data-paybox-loaded";

/// Load both Paybox dependencies; `true` once both have loaded.
#[hook]
pub fn use_paybox_scripts(settings: &PayboxSettings) -> bool {
    let [jquery, paybox] = settings.scripts();
    let jquery_ready = use_external_script(jquery);
    let paybox_ready = use_external_script(paybox);
    jquery_ready && paybox_ready
}

/// Load one external script exactly once per page and track readiness.
#[hook]
pub fn use_external_script(script: ExternalScript) -> bool {
    let loaded = use_state(|| {
        bindings::document()
            .ok()
            .and_then(|doc| doc.get_element_by_id(script.id))
            .map(|el| el.has_attribute(LOADED_ATTR))
            .unwrap_or(false)
    });

    {
        let loaded = loaded.clone();
        use_effect_with((), move |_| {
            if !*loaded {
                let label = script.label;
                let src = script.src.clone();
                let on_load = move || {
                    info!(script = label, src = %src, "external script loaded");
                    loaded.set(true);
                };
                if let Err(err) = bindings::document().and_then(|doc| ensure_script(&doc, &script, on_load)) {
                    warn!(script = script.label, %err, "could not inject external script");
                }
            }
            || ()
        });
    }

    *loaded
}

/// Insert `script` unless an element with its id exists, and call `on_load`
/// once it has loaded. Returns whether a new element was inserted.
fn ensure_script(
    document: &Document,
    script: &ExternalScript,
    on_load: impl FnOnce() + 'static,
) -> Result<bool, PayboxError> {
    let (element, inserted) = match document.get_element_by_id(script.id) {
        Some(existing) => {
            let element = existing
                .dyn_into::<HtmlScriptElement>()
                .map_err(|_| PayboxError::Host(format!("#{} is not a <script>", script.id)))?;
            (element, false)
        }
        None => {
            let element: HtmlScriptElement = document
                .create_element("script")
                .map_err(PayboxError::from_js)?
                .dyn_into()
                .map_err(|_| PayboxError::Host("created element is not a <script>".into()))?;
            element.set_id(script.id);
            element.set_src(&script.src);
            element.set_async(false);
            (element, true)
        }
    };

    let marker = element.clone();
    let listener = Closure::once_into_js(move || {
        if let Err(err) = marker.set_attribute(LOADED_ATTR, "") {
            warn!(attr = LOADED_ATTR, ?err, "could not mark script as loaded");
        }
        on_load();
    });
    element
        .add_event_listener_with_callback("load", listener.unchecked_ref())
        .map_err(PayboxError::from_js)?;

    if inserted {
        document
            .head()
            .ok_or_else(|| PayboxError::Host("head missing".into()))?
            .append_child(&element)
            .map_err(PayboxError::from_js)?;
    }
    Ok(inserted)
}
