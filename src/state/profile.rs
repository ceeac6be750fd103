//! Profile session context core: the fetched profile record, the fetch state
//! machine, and the pure planning/interpretation halves of the profile fetch
//! workflow.
//!
//! DESIGN
//! ======
//! Everything here is synchronous and store-parameterized so it runs under
//! plain `cargo test` against `MemoryStore`. The only suspending step, the
//! HTTP call itself, lives in `net::profile_client`, which drives this
//! module's state machine:
//!
//! `Idle → Fetching → {Ready | Failed}`, with `reset()` (logout) returning to
//! `Idle` from any state. Fetches are serialized by an in-flight flag and
//! tagged with a monotonic sequence number; a response whose sequence is no
//! longer the latest issued, or whose verdict no longer matches the verdict
//! at request time, is discarded (stale-response guard).

#[cfg(test)]
#[path = "profile_test.rs"]
mod profile_test;

use crate::state::session::{SessionVerdict, StoredSession};
use crate::state::store::{SessionStore, keys};

/// Session-engine error taxonomy.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No identity derivable from any fallback source. The previously
    /// fetched record, if any, is left untouched.
    #[error("no identity could be resolved for the active session")]
    IdentityUnresolved,
    /// Non-success HTTP status from the profile endpoint.
    #[error("profile fetch failed with status {status}")]
    FetchFailed { status: u16 },
    /// Response body did not match any documented envelope shape.
    #[error("profile response had an unrecognized shape")]
    MalformedResponse,
    /// Network calls are only available in the browser build.
    #[error("profile fetch is not available off-browser")]
    Unavailable,
}

/// Profile record for the active role.
///
/// Known fields are typed; everything else the backend sends is preserved in
/// `extra` so a re-serialized record round-trips.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProfileRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Provider-only: current subscription status, when the backend sends it.
    #[serde(default, rename = "subscriptionStatus")]
    pub subscription_status: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Shallow patch applied by views after their own mutation request; no
/// network call is made here.
#[derive(Clone, Debug, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subscription_status: Option<String>,
}

impl ProfileRecord {
    /// Shallow-merge: fields present in the patch overwrite, absent fields
    /// are kept.
    pub fn apply(&mut self, patch: &ProfilePatch) {
        if let Some(name) = &patch.name {
            self.name = Some(name.clone());
        }
        if let Some(email) = &patch.email {
            self.email = Some(email.clone());
        }
        if let Some(phone) = &patch.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(status) = &patch.subscription_status {
            self.subscription_status = Some(status.clone());
        }
    }
}

/// Where the fetch workflow currently stands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FetchPhase {
    #[default]
    Idle,
    Fetching,
    Ready,
    Failed,
}

/// Process-wide session state, held in an `RwSignal` and provided via
/// context. Views receive read-only snapshots; mutation goes through the
/// operations in `net::profile_client`.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    pub profile: Option<ProfileRecord>,
    pub phase: FetchPhase,
    pub error: Option<SessionError>,
    pub is_logged_in: bool,
    pub is_service_provider: bool,
    fetch_in_flight: bool,
    fetch_seq: u64,
}

impl SessionState {
    /// `checkSession`'s in-memory half: update the two derived booleans.
    /// Idempotent; no other field is touched.
    pub fn apply_verdict(&mut self, verdict: SessionVerdict) {
        self.is_logged_in = verdict.is_authenticated();
        self.is_service_provider = verdict.is_provider();
    }

    /// Drop the record without recording an error (used when the verdict
    /// transitions to unauthenticated outside of logout).
    pub fn clear_profile(&mut self) {
        self.profile = None;
        self.phase = FetchPhase::Idle;
        self.error = None;
    }

    /// Claim the fetch slot. Returns the sequence number of the new fetch,
    /// or `None` when one is already outstanding; the second caller must
    /// not issue a network call of its own.
    pub fn begin_fetch(&mut self) -> Option<u64> {
        if self.fetch_in_flight {
            return None;
        }
        self.fetch_in_flight = true;
        self.fetch_seq += 1;
        self.phase = FetchPhase::Fetching;
        Some(self.fetch_seq)
    }

    /// Commit a fetch outcome. Returns `false` when the response was
    /// discarded as stale: either `seq` is no longer the latest issued
    /// (a reset intervened) or the verdict changed across the suspension.
    ///
    /// On failure the previous record is kept; a transient fault must not
    /// destroy a still-useful profile.
    pub fn finish_fetch(
        &mut self,
        seq: u64,
        verdict_at_request: SessionVerdict,
        verdict_now: SessionVerdict,
        result: Result<ProfileRecord, SessionError>,
    ) -> bool {
        if seq != self.fetch_seq {
            log::debug!("discarding superseded profile response (seq {seq})");
            return false;
        }
        self.fetch_in_flight = false;
        if verdict_now != verdict_at_request {
            log::debug!("discarding profile response fetched under a stale verdict");
            self.phase = FetchPhase::Idle;
            return false;
        }
        match result {
            Ok(record) => {
                self.profile = Some(record);
                self.phase = FetchPhase::Ready;
                self.error = None;
            }
            Err(err) => {
                self.phase = FetchPhase::Failed;
                self.error = Some(err);
            }
        }
        true
    }

    /// Record a failure that happened before any network call was issued
    /// (identity resolution). The record is left untouched.
    pub fn record_failure(&mut self, err: SessionError) {
        self.phase = FetchPhase::Failed;
        self.error = Some(err);
    }

    /// Shallow-merge a patch into the current record, if any.
    pub fn apply_patch(&mut self, patch: &ProfilePatch) {
        if let Some(record) = self.profile.as_mut() {
            record.apply(patch);
        }
    }

    /// Logout's in-memory half: back to `Idle`, booleans forced to their
    /// unauthenticated values synchronously. Bumping the sequence makes any
    /// in-flight response stale on arrival.
    pub fn reset(&mut self) {
        self.profile = None;
        self.phase = FetchPhase::Idle;
        self.error = None;
        self.is_logged_in = false;
        self.is_service_provider = false;
        self.fetch_in_flight = false;
        self.fetch_seq += 1;
    }

    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.fetch_in_flight
    }
}

/// Re-read the store, update the derived booleans, return the verdict.
pub fn check_session(state: &mut SessionState, store: &dyn SessionStore) -> SessionVerdict {
    let verdict = crate::state::session::probe(store);
    state.apply_verdict(verdict);
    verdict
}

/// The logout transaction: clear every session key, then drop all in-memory
/// session state. The store clear is fully applied before this returns, so
/// an immediate `check_session` observes `Unauthenticated`. In-memory state
/// is reset even if individual store writes fault (worst case is a partial
/// clear, which rule 1 still reads as logged out).
pub fn logout(state: &mut SessionState, store: &dyn SessionStore) {
    crate::state::store::clear_session(store);
    state.reset();
}

/// Everything the network step needs, resolved from one store snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchPlan {
    pub verdict: SessionVerdict,
    pub token: String,
    pub identity: String,
}

/// Resolve verdict, bearer token, and identity for a profile fetch.
///
/// `Ok(None)` means the session is unauthenticated: the caller clears any
/// cached record and returns early; that is not an error. An authenticated
/// session with no derivable identity is `IdentityUnresolved`.
pub fn plan_fetch(store: &dyn SessionStore) -> Result<Option<FetchPlan>, SessionError> {
    let snapshot = StoredSession::read(store);
    let verdict = snapshot.verdict();
    if !verdict.is_authenticated() {
        return Ok(None);
    }

    // The role's own slot wins; the other slot covers transient dual-token
    // states where only one credential was actually written.
    let token = if verdict.is_provider() {
        snapshot.token_provider.or(snapshot.token_customer)
    } else {
        snapshot.token_customer.or(snapshot.token_provider)
    };
    let Some(token) = token else {
        return Ok(None);
    };

    let identity = resolve_identity(verdict, store).ok_or(SessionError::IdentityUnresolved)?;
    Ok(Some(FetchPlan { verdict, token, identity }))
}

/// Identity fallback chain: the cached profile blob's `_id`, else the legacy
/// plain-id slot for the role. Malformed blobs count as absent.
pub fn resolve_identity(verdict: SessionVerdict, store: &dyn SessionStore) -> Option<String> {
    let (cache_key, legacy_key) = match verdict {
        SessionVerdict::ServiceProvider => (keys::SP_USER_DATA, keys::SERVICE_PROVIDER_ID),
        SessionVerdict::Customer => (keys::USER_DATA, keys::USER_ID),
        SessionVerdict::Unauthenticated => return None,
    };
    cached_identity(store, cache_key)
        .or_else(|| store.get(legacy_key).filter(|id| !id.is_empty()))
}

fn cached_identity(store: &dyn SessionStore, key: &str) -> Option<String> {
    let blob = store.get(key)?;
    let value: serde_json::Value = serde_json::from_str(&blob).ok()?;
    value
        .get("_id")
        .and_then(|v| v.as_str())
        .filter(|id| !id.is_empty())
        .map(ToOwned::to_owned)
}

/// The store slot caching the last-fetched profile for a verdict.
#[must_use]
pub fn cache_key(verdict: SessionVerdict) -> Option<&'static str> {
    match verdict {
        SessionVerdict::Customer => Some(keys::USER_DATA),
        SessionVerdict::ServiceProvider => Some(keys::SP_USER_DATA),
        SessionVerdict::Unauthenticated => None,
    }
}

/// Parse the cached profile blob for a verdict, if present and well-formed.
pub fn cached_profile(store: &dyn SessionStore, verdict: SessionVerdict) -> Option<ProfileRecord> {
    let blob = store.get(cache_key(verdict)?)?;
    serde_json::from_str(&blob).ok()
}

/// Probe the documented response envelope shapes in fixed priority order:
/// `customer`, `professional`, `data`, then the record fields at the top
/// level. The first shape that yields a record with an `_id` wins.
pub fn extract_record(envelope: &serde_json::Value) -> Option<ProfileRecord> {
    for key in ["customer", "professional", "data"] {
        if let Some(candidate) = envelope.get(key) {
            if let Ok(record) = serde_json::from_value::<ProfileRecord>(candidate.clone()) {
                return Some(record);
            }
        }
    }
    serde_json::from_value(envelope.clone()).ok()
}

/// Turn a raw fetch outcome into the record the caller observes.
///
/// Providers get served the cached profile blob when the endpoint fails or
/// returns an unrecognized shape: stale but plausible beats an error while
/// the read model is inconsistent. Customer errors propagate.
pub fn interpret_fetch(
    verdict: SessionVerdict,
    outcome: Result<serde_json::Value, SessionError>,
    store: &dyn SessionStore,
) -> Result<ProfileRecord, SessionError> {
    let resolved =
        outcome.and_then(|envelope| extract_record(&envelope).ok_or(SessionError::MalformedResponse));
    match resolved {
        Ok(record) => Ok(record),
        Err(err) => {
            if verdict.is_provider() {
                if let Some(cached) = cached_profile(store, verdict) {
                    log::debug!("provider profile fetch failed ({err}); serving cached record");
                    return Ok(cached);
                }
            }
            Err(err)
        }
    }
}
