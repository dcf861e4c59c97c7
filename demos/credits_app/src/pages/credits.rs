//! Credits page. Only composes the UI; all payment logic lives in the widget.

use tracing::info;
use yew::prelude::*;
use yew_paybox::{AuthorizeResponse, PayboxWidget};

#[function_component(CreditsPage)]
pub fn credits_page() -> Html {
    let on_authorize = Callback::from(|response: AuthorizeResponse| {
        info!(success = response.is_success(), "paybox flow finished");
    });

    html! {
        <main>
            <h1>{ "Compra de créditos" }</h1>
            <p>{ "Selecciona un paquete y paga con Paybox." }</p>
            <PayboxWidget {on_authorize} />
        </main>
    }
}
