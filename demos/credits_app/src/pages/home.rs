use yew::prelude::*;
use yew_router::prelude::*;

use crate::app::Route;

#[function_component(HomePage)]
pub fn home_page() -> Html {
    html! {
        <main>
            <h1>{ "Página principal" }</h1>
            <p>{ "Bienvenido a la demostración de PagoPlux/Paybox." }</p>
            <p>
                <Link<Route> to={Route::Credits}>{ "Ir a comprar créditos" }</Link<Route>>
            </p>
        </main>
    }
}
