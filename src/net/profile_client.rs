//! Profile session context operations over the shared session signal.
//!
//! This is the async half of the profile session context: the synchronous
//! state machine lives in `state::profile`, and this module drives it against
//! the browser store and the REST endpoints. The profile fetch is the only
//! suspending operation in the engine; the store verdict is re-probed after
//! the await, never carried across it.
//!
//! The session signal doubles as the subscription interface for store
//! reactivity: guards and views subscribe to it, and the poll spawned by the
//! shell is one concrete adapter feeding it. A storage-event adapter could
//! replace the poll without touching any subscriber, as long as it preserves
//! the one-tick latency bound.

use leptos::prelude::*;

use crate::state::profile::{self, ProfilePatch, SessionState};
#[cfg(feature = "hydrate")]
use crate::state::session::probe;
use crate::state::session::SessionVerdict;
use crate::state::store::{BrowserStore, SessionStore};

/// Poll period for out-of-band store mutations (a login form completing in a
/// sibling UI flow has no event bus to announce itself on).
pub const SESSION_POLL_MS: u64 = 1000;

/// Re-read the store, refresh the derived booleans, return the verdict.
pub fn check_session(session: RwSignal<SessionState>) -> SessionVerdict {
    session
        .try_update(|s| profile::check_session(s, &BrowserStore))
        .unwrap_or_default()
}

/// Clear the persistent session and all in-memory session state. After this
/// returns, `check_session` observes `Unauthenticated` and any in-flight
/// profile response will be discarded on arrival.
pub fn logout(session: RwSignal<SessionState>) {
    session.update(|s| profile::logout(s, &BrowserStore));
}

/// Shallow-merge a patch into the fetched record, no network call. Views use
/// this after performing their own mutation request. The role's cache slot
/// is rewritten so the identity fallback chain stays current.
pub fn update_profile(session: RwSignal<SessionState>, patch: &ProfilePatch) {
    session.update(|s| s.apply_patch(patch));
    persist_cache(session);
}

fn persist_cache(session: RwSignal<SessionState>) {
    let Some(state) = session.try_get_untracked() else {
        return;
    };
    let Some(record) = state.profile else {
        return;
    };
    let verdict = if state.is_service_provider {
        SessionVerdict::ServiceProvider
    } else if state.is_logged_in {
        SessionVerdict::Customer
    } else {
        return;
    };
    if let Some(key) = profile::cache_key(verdict) {
        if let Ok(blob) = serde_json::to_string(&record) {
            BrowserStore.set(key, &blob);
        }
    }
}

/// Spawn a profile fetch for the current session. A call arriving while a
/// fetch is outstanding is a no-op: the in-flight fetch resolves the signal
/// for every subscriber and no second network call is issued.
#[cfg(feature = "hydrate")]
pub fn spawn_fetch_profile(session: RwSignal<SessionState>) {
    leptos::task::spawn_local(fetch_profile(session));
}

/// No network off-browser; views still render from whatever state holds.
#[cfg(not(feature = "hydrate"))]
pub fn spawn_fetch_profile(session: RwSignal<SessionState>) {
    let _ = session;
}

#[cfg(feature = "hydrate")]
async fn fetch_profile(session: RwSignal<SessionState>) {
    let store = BrowserStore;

    let plan = match profile::plan_fetch(&store) {
        Ok(Some(plan)) => plan,
        Ok(None) => {
            // Unauthenticated: drop any cached record and stop. Not an error.
            session.update(|s| {
                s.apply_verdict(SessionVerdict::Unauthenticated);
                s.clear_profile();
            });
            return;
        }
        Err(err) => {
            leptos::logging::warn!("profile fetch aborted: {err}");
            session.update(|s| s.record_failure(err));
            return;
        }
    };

    let Some(seq) = session
        .try_update(|s| {
            s.apply_verdict(plan.verdict);
            s.begin_fetch()
        })
        .flatten()
    else {
        return;
    };

    let outcome = match plan.verdict {
        SessionVerdict::ServiceProvider => {
            crate::net::api::get_provider_profile(&plan.identity, &plan.token).await
        }
        _ => crate::net::api::get_customer_profile(&plan.identity, &plan.token).await,
    };
    let result = profile::interpret_fetch(plan.verdict, outcome, &store);

    // The store may have changed while we were suspended.
    let verdict_now = probe(&store);
    let fresh = result.clone();
    let applied = session
        .try_update(|s| s.finish_fetch(seq, plan.verdict, verdict_now, result))
        .unwrap_or(false);

    if applied {
        if let Ok(record) = fresh {
            if let Some(key) = profile::cache_key(plan.verdict) {
                if let Ok(blob) = serde_json::to_string(&record) {
                    store.set(key, &blob);
                }
            }
        }
    }
}

/// Spawn the recurring session poll for the lifetime of the shell.
///
/// The store can be mutated by sibling UI flows with no shared notification
/// mechanism; four key reads per second buys correctness cheaply. The signal
/// is only written when the derived booleans actually changed, so idle ticks
/// wake no subscribers. The loop ends when the signal is disposed.
#[cfg(feature = "hydrate")]
pub fn spawn_session_poll(session: RwSignal<SessionState>) {
    leptos::task::spawn_local(async move {
        loop {
            gloo_timers::future::sleep(std::time::Duration::from_millis(SESSION_POLL_MS)).await;

            let Some(state) = session.try_get_untracked() else {
                break;
            };
            let verdict = probe(&BrowserStore);
            if state.is_logged_in != verdict.is_authenticated()
                || state.is_service_provider != verdict.is_provider()
            {
                session.update(|s| s.apply_verdict(verdict));
            }
        }
    });
}

#[cfg(not(feature = "hydrate"))]
pub fn spawn_session_poll(session: RwSignal<SessionState>) {
    let _ = session;
}
