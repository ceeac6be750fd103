//! Role-restricted guard.
//!
//! Same probe as `RequireAuth`, stricter policy: the configured set of
//! permitted roles must contain the resolved verdict. A misrouted
//! authenticated visitor is bounced to the profile route they do belong on,
//! deliberately not the landing page, and deliberately not logged out.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::state::profile::SessionState;
use crate::state::session::{SessionVerdict, probe, role_redirect};
use crate::state::store::BrowserStore;

/// Guard for routes restricted to a subset of the authenticated roles.
#[component]
pub fn RequireRole(
    /// Roles permitted to see the children.
    allowed: &'static [SessionVerdict],
    children: ChildrenFn,
) -> impl IntoView {
    let session = expect_context::<RwSignal<SessionState>>();
    let navigate = use_navigate();

    let resolved = RwSignal::new(None::<SessionVerdict>);

    Effect::new(move || {
        session.track();
        let verdict = probe(&BrowserStore);
        if let Some(target) = role_redirect(verdict, allowed) {
            navigate(target, NavigateOptions::default());
        }
        resolved.set(Some(verdict));
    });

    view! {
        <Show
            when=move || resolved.get().is_some_and(|v| allowed.contains(&v))
            fallback=|| view! { <div class="guard-loading">"Loading..."</div> }
        >
            {children()}
        </Show>
    }
}
