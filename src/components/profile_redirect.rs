//! Role-dispatch redirect view.
//!
//! A routeless view whose sole job is to resolve the verdict once and
//! forward: unauthenticated to the landing page, otherwise to the role's own
//! profile route. Gives the UI a stable "go to my profile" link target that
//! does not need to know the visitor's role ahead of time.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::state::session::probe;
use crate::state::store::BrowserStore;

#[component]
pub fn ProfileRedirect() -> impl IntoView {
    let navigate = use_navigate();

    Effect::new(move || {
        let verdict = probe(&BrowserStore);
        navigate(verdict.profile_route(), NavigateOptions::default());
    });

    view! { <div class="guard-loading">"Loading..."</div> }
}
