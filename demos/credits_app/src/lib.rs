//! Two-page demo buying credit packages with PagoPlux Paybox.
//!
//! Run `mock_paybox_server`, then `trunk serve` from this directory.

mod app;
mod logging;
mod pages;

use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    logging::init();
    yew::Renderer::<app::App>::new().render();
}
