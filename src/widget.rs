//! A drop-in Yew widget for buying prepaid credits through PagoPlux Paybox.
//!
//! The widget loads the Paybox dependencies, lets the user pick a plan, and on
//! click prepares the transaction on the server, publishes `data` and
//! `onAuthorize` for the vendor script, then re-activates its own button on the
//! next tick so the vendor's listener opens the Paybox modal.

use tracing::warn;
use yew::prelude::*;

use crate::components::{PayButton, PlanSelect, StatusLine};
use crate::handoff::WindowHost;
use crate::scripts::use_paybox_scripts;
use crate::session::{Activation, PaymentSession, SessionCallbacks};
use crate::settings::PayboxSettings;
use crate::status::AuthorizeResponse;
use crate::transaction::HttpTransactionApi;

/// Session type used by the browser widget.
pub type WidgetSession = PaymentSession<HttpTransactionApi, WindowHost>;

/// Properties for the [`PayboxWidget`] component.
///
/// Props are read once, when the widget mounts.
///
/// # Fields
///
/// * `settings` – Merchant, environment and endpoint configuration
///   (default: [`PayboxSettings::from_env`]).
/// * `on_authorize` – Invoked with the vendor's raw response after each
///   authorization.
/// * `button_label` – Override the pay button text (default: `"Pagar ahora"`).
/// * `children` – Extra nodes rendered above the plan selector.
#[derive(Properties, PartialEq, Clone)]
pub struct PayboxWidgetProps {
    #[prop_or_else(PayboxSettings::from_env)]
    pub settings: PayboxSettings,
    #[prop_or_default]
    pub on_authorize: Callback<AuthorizeResponse>,
    #[prop_or_default]
    pub button_label: Option<AttrValue>,
    #[prop_or_default]
    pub children: Children,
}

/// Plan selector, pay button and status line wired to a [`WidgetSession`].
///
/// # Example
///
/// ```rust,ignore
/// use yew::prelude::*;
/// use yew_paybox::{AuthorizeResponse, PayboxWidget};
///
/// #[function_component(Credits)]
/// fn credits() -> Html {
///     let on_authorize = Callback::from(|response: AuthorizeResponse| {
///         tracing::info!(?response, "paybox finished");
///     });
///     html! { <PayboxWidget {on_authorize} /> }
/// }
/// ```
#[function_component(PayboxWidget)]
pub fn paybox_widget(props: &PayboxWidgetProps) -> Html {
    let scripts_ready = use_paybox_scripts(&props.settings);
    let status = use_state(|| None::<String>);

    let session = {
        let status = status.setter();
        let settings = props.settings.clone();
        let on_authorize = props.on_authorize.clone();
        use_memo((), move |_| {
            let api = HttpTransactionApi::new(settings.create_endpoint.clone());
            let callbacks = SessionCallbacks {
                on_status: Callback::from(move |message: Option<String>| status.set(message)),
                on_authorize,
            };
            WidgetSession::new(api, WindowHost::new(), settings, callbacks)
        })
    };
    let plan = use_state(|| session.selected_plan());

    let on_plan_change = {
        let session = session.clone();
        let plan = plan.clone();
        Callback::from(move |value: String| match session.select_plan_key(&value) {
            Ok(key) => plan.set(key),
            Err(err) => warn!(%err, "plan change rejected"),
        })
    };

    let on_click = {
        let session = session.clone();
        Callback::from(move |e: MouseEvent| match session.activate() {
            // the vendor's listener on the same button handles this one
            Activation::Vendor => {}
            Activation::Busy => e.prevent_default(),
            Activation::Started(attempt) => {
                e.prevent_default();
                wasm_bindgen_futures::spawn_local(async move {
                    attempt.run().await;
                });
            }
        })
    };

    let label = props
        .button_label
        .clone()
        .unwrap_or(AttrValue::Static("Pagar ahora"));

    html! {
        <div class="paybox-widget">
            { for props.children.iter() }
            <h2>{ "Selecciona tu paquete de créditos" }</h2>
            <div class="paybox-plan">
                <label for="plan-select">{ "Plan:" }</label>{ " " }
                <PlanSelect value={*plan} onchange={on_plan_change} />
            </div>
            <PayButton
                id={AttrValue::from(props.settings.button_id.clone())}
                {label}
                onclick={on_click}
            />
            if !scripts_ready {
                <p class="paybox-loading">{ "Cargando Paybox…" }</p>
            }
            <StatusLine message={(*status).clone()} />
        </div>
    }
}
