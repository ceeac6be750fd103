//! Service-provider profile page.
//!
//! Reached only through the `RequireRole` guard for providers. The fetch
//! behind this page may resolve from the cached blob when the provider
//! read model is temporarily inconsistent; the page renders whatever record
//! the context settled on.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::net::profile_client;
use crate::state::profile::{FetchPhase, SessionState};

#[component]
pub fn ProviderProfilePage() -> impl IntoView {
    let session = expect_context::<RwSignal<SessionState>>();
    let navigate = use_navigate();

    profile_client::spawn_fetch_profile(session);

    let retry = move |_| profile_client::spawn_fetch_profile(session);
    let on_logout = move |_| {
        profile_client::logout(session);
        navigate("/", NavigateOptions::default());
    };

    view! {
        <div class="profile-page profile-page--provider">
            <h1>"Your provider profile"</h1>
            {move || {
                let state = session.get();
                match state.phase {
                    FetchPhase::Idle | FetchPhase::Fetching => {
                        view! { <p>"Loading profile..."</p> }.into_any()
                    }
                    FetchPhase::Failed => {
                        let message = state
                            .error
                            .map(|e| e.to_string())
                            .unwrap_or_else(|| "profile fetch failed".to_owned());
                        view! {
                            <div class="profile-page__error">
                                <p>{message}</p>
                                <button class="btn" on:click=retry>
                                    "Retry"
                                </button>
                            </div>
                        }
                            .into_any()
                    }
                    FetchPhase::Ready => {
                        let record = state.profile.unwrap_or_default();
                        view! {
                            <dl class="profile-page__fields">
                                <dt>"Name"</dt>
                                <dd>{record.name.unwrap_or_default()}</dd>
                                <dt>"Email"</dt>
                                <dd>{record.email.unwrap_or_default()}</dd>
                                <dt>"Phone"</dt>
                                <dd>{record.phone.unwrap_or_default()}</dd>
                                <dt>"Subscription"</dt>
                                <dd>{record.subscription_status.unwrap_or_else(|| "none".to_owned())}</dd>
                            </dl>
                        }
                            .into_any()
                    }
                }
            }}
            <button class="btn" on:click=on_logout>
                "Log out"
            </button>
        </div>
    }
}
