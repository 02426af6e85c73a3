use crate::pages::HomePage;
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    let state = AppState::new();
    state.persist();
    provide_context(AppContext(state));

    // IMPORTANT:
    // - Leptos CSR requires the `csr` feature on `leptos`.
    // - router hooks require a <Router> context.
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-gray-500">"Not found"</div> }>
                <Route path=path!("") view=HomePage />
                <Route path=path!(":username") view=HomePage />
            </Routes>
        </Router>
    }
}
