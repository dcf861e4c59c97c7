use yew::prelude::*;
use web_sys::*;

use crate::catalog::{PlanKey, PRICING};


/// The button the Paybox script binds to.
#[derive(Properties, PartialEq)]
pub struct PayButtonProps {
    /// DOM id; must equal `PayboxIdElement`.
    pub id: AttrValue,
    /// Button label text
    pub label: AttrValue,
    /// Click handler
    pub onclick: Callback<MouseEvent>,
}

#[function_component(PayButton)]
pub fn pay_button(props: &PayButtonProps) -> Html {
    html! {
        <button
            id={props.id.clone()}
            type="button"
            onclick={props.onclick.clone()}
            class="paybox-button"
        >
            { props.label.to_string() }
        </button>
    }
}

/// A controlled `<select>` over the plan catalog.
#[derive(Properties, PartialEq)]
pub struct PlanSelectProps {
    /// Currently selected plan
    pub value: PlanKey,
    /// Emits the raw option value on change
    pub onchange: Callback<String>,
    #[prop_or(AttrValue::Static("plan-select"))]
    pub id: AttrValue,
}

#[function_component(PlanSelect)]
pub fn plan_select(props: &PlanSelectProps) -> Html {
    let onchange = props.onchange.clone();
    html! {
        <select
            id={props.id.clone()}
            class="paybox-plan-select"
            onchange={Callback::from(move |e: Event| {
                let select: HtmlSelectElement = e.target_unchecked_into();
                onchange.emit(select.value());
            })}
        >
            { for PRICING.iter().map(|plan| html! {
                <option
                    key={plan.key.as_str()}
                    value={plan.key.as_str()}
                    selected={plan.key == props.value}
                >
                    { plan.label() }
                </option>
            }) }
        </select>
    }
}

/// Status line under the button; renders nothing without a message.
#[derive(Properties, PartialEq)]
pub struct StatusLineProps {
    #[prop_or_default]
    pub message: Option<String>,
}

#[function_component(StatusLine)]
pub fn status_line(props: &StatusLineProps) -> Html {
    match &props.message {
        Some(msg) => html! { <p class="paybox-status" aria-live="polite">{ msg }</p> },
        None => Html::default(),
    }
}
