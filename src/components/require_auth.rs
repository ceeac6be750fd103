//! Bare authentication guard.
//!
//! Wraps a protected subtree. Children are only rendered after the verdict
//! has resolved to an authenticated role; until then a placeholder holds
//! the slot, so protected content never flashes, not even for one frame.
//! Unauthenticated visitors are sent to the public landing route.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::state::profile::SessionState;
use crate::state::session::{SessionVerdict, probe};
use crate::state::store::BrowserStore;

/// Guard for routes any authenticated visitor may see, whichever of the two
/// roles they hold.
#[component]
pub fn RequireAuth(children: ChildrenFn) -> impl IntoView {
    let session = expect_context::<RwSignal<SessionState>>();
    let navigate = use_navigate();

    // Unresolved until the mount-time probe has run; distinct from the
    // verdict itself so "not yet decided" can never read as "allowed".
    let resolved = RwSignal::new(None::<SessionVerdict>);

    // Tracks the session signal, so a logout or a poll-detected store change
    // re-resolves the guard.
    Effect::new(move || {
        session.track();
        let verdict = probe(&BrowserStore);
        if !verdict.is_authenticated() {
            navigate("/", NavigateOptions::default());
        }
        resolved.set(Some(verdict));
    });

    view! {
        <Show
            when=move || resolved.get().is_some_and(SessionVerdict::is_authenticated)
            fallback=|| view! { <div class="guard-loading">"Loading..."</div> }
        >
            {children()}
        </Show>
    }
}
