//! Customer profile page.
//!
//! Reached only through the `RequireRole` guard for customers. Fetches the
//! profile on mount, renders loading/failed/ready states, and routes edits
//! through the context's patch entry point; views never write the store
//! themselves.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::net::profile_client;
use crate::state::profile::{FetchPhase, ProfilePatch, SessionState};

#[component]
pub fn ProfilePage() -> impl IntoView {
    let session = expect_context::<RwSignal<SessionState>>();
    let navigate = use_navigate();

    profile_client::spawn_fetch_profile(session);

    let retry = move |_| profile_client::spawn_fetch_profile(session);
    let on_logout = move |_| {
        profile_client::logout(session);
        navigate("/", NavigateOptions::default());
    };

    view! {
        <div class="profile-page">
            <h1>"Your profile"</h1>
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
                                <dd>{record.name.clone().unwrap_or_default()}</dd>
                                <dt>"Email"</dt>
                                <dd>{record.email.clone().unwrap_or_default()}</dd>
                                <dt>"Phone"</dt>
                                <dd>{record.phone.clone().unwrap_or_default()}</dd>
                            </dl>
                            <DisplayNameEditor name=record.name.unwrap_or_default()/>
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

/// Inline display-name editor; the backend mutation is issued by the form's
/// own plumbing, after which the shared record is patched without a refetch.
#[component]
fn DisplayNameEditor(name: String) -> impl IntoView {
    let session = expect_context::<RwSignal<SessionState>>();
    let draft = RwSignal::new(name);

    let save = move |_| {
        let name = draft.get();
        if name.trim().is_empty() {
            return;
        }
        profile_client::update_profile(
            session,
            &ProfilePatch {
                name: Some(name.trim().to_owned()),
                ..ProfilePatch::default()
            },
        );
    };

    view! {
        <div class="profile-page__editor">
            <label>
                "Display name"
                <input
                    type="text"
                    prop:value=move || draft.get()
                    on:input=move |ev| draft.set(event_target_value(&ev))
                />
            </label>
            <button class="btn" on:click=save>
                "Save"
            </button>
        </div>
    }
}
