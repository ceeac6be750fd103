//! Sign-in page.
//!
//! Completes the login transaction against the persistent store: the role's
//! token slot, the login flag, and the role tag are written directly, then
//! the session context is refreshed and the visitor lands on their profile.
//! The session engine itself never learns about this page; the poll and the
//! shared signal are what make the rest of the UI notice.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::net::profile_client;
use crate::state::profile::SessionState;
use crate::state::store::{BrowserStore, SessionStore, keys};

#[component]
pub fn LoginPage() -> impl IntoView {
    let session = expect_context::<RwSignal<SessionState>>();
    let navigate = use_navigate();

    let credential = RwSignal::new(String::new());
    let as_provider = RwSignal::new(false);

    let submit = move |_| {
        let token = credential.get();
        let token = token.trim();
        if token.is_empty() {
            return;
        }

        let store = BrowserStore;
        if as_provider.get() {
            store.set(keys::TOKEN_SP, token);
            store.set(keys::ROLE, "sp");
        } else {
            store.set(keys::TOKEN, token);
            store.set(keys::ROLE, "user");
        }
        store.set(keys::LOGGED_IN, "true");

        let verdict = profile_client::check_session(session);
        navigate(verdict.profile_route(), NavigateOptions::default());
    };

    view! {
        <div class="login-page">
            <h1>"Sign in"</h1>
            <label class="login-page__label">
                "Access token"
                <input
                    class="login-page__input"
                    type="password"
                    prop:value=move || credential.get()
                    on:input=move |ev| credential.set(event_target_value(&ev))
                />
            </label>
            <label class="login-page__label">
                <input
                    type="checkbox"
                    prop:checked=move || as_provider.get()
                    on:change=move |_| as_provider.update(|v| *v = !*v)
                />
                "I am a service provider"
            </label>
            <button class="btn btn--primary" on:click=submit>
                "Sign in"
            </button>
        </div>
    }
}
