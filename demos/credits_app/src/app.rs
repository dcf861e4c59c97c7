use yew::prelude::*;
use yew_router::prelude::*;

use crate::pages::{CreditsPage, HomePage};

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/credits")]
    Credits,
    #[not_found]
    #[at("/404")]
    NotFound,
}

fn switch(route: Route) -> Html {
    match route {
        Route::Home => html! { <HomePage /> },
        Route::Credits => html! { <CreditsPage /> },
        Route::NotFound => html! {
            <main>
                <h1>{ "Página no encontrada" }</h1>
                <Link<Route> to={Route::Home}>{ "Volver al inicio" }</Link<Route>>
            </main>
        },
    }
}

#[function_component(App)]
pub fn app() -> Html {
    html! {
        <BrowserRouter>
            <Switch<Route> render={switch} />
        </BrowserRouter>
    }
}
