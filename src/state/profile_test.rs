use super::*;
use crate::state::store::MemoryStore;
use serde_json::json;

fn customer_store() -> MemoryStore {
    MemoryStore::with_entries(&[
        (keys::TOKEN, "t1"),
        (keys::LOGGED_IN, "true"),
        (keys::USER_DATA, r#"{"_id":"c1","name":"Ada"}"#),
    ])
}

fn provider_store() -> MemoryStore {
    MemoryStore::with_entries(&[
        (keys::TOKEN_SP, "t2"),
        (keys::LOGGED_IN, "true"),
        (keys::ROLE, "sp"),
        (keys::SP_USER_DATA, r#"{"_id":"p1","name":"Acme"}"#),
    ])
}

fn record(id: &str) -> ProfileRecord {
    ProfileRecord {
        id: id.to_owned(),
        ..ProfileRecord::default()
    }
}

// =============================================================
// Envelope probing
// =============================================================

#[test]
fn extract_record_reads_customer_envelope() {
    let envelope = json!({"customer": {"_id": "c1", "name": "Ada"}});
    let rec = extract_record(&envelope).expect("record");
    assert_eq!(rec.id, "c1");
    assert_eq!(rec.name.as_deref(), Some("Ada"));
}

#[test]
fn extract_record_reads_professional_envelope() {
    let envelope = json!({"professional": {"_id": "p1", "subscriptionStatus": "active"}});
    let rec = extract_record(&envelope).expect("record");
    assert_eq!(rec.id, "p1");
    assert_eq!(rec.subscription_status.as_deref(), Some("active"));
}

#[test]
fn extract_record_reads_data_envelope_and_top_level() {
    let rec = extract_record(&json!({"data": {"_id": "x1"}})).expect("data envelope");
    assert_eq!(rec.id, "x1");

    let rec = extract_record(&json!({"_id": "x2", "email": "a@b.c"})).expect("top level");
    assert_eq!(rec.id, "x2");
    assert_eq!(rec.email.as_deref(), Some("a@b.c"));
}

#[test]
fn extract_record_priority_is_customer_first() {
    let envelope = json!({
        "customer": {"_id": "c1"},
        "data": {"_id": "other"}
    });
    assert_eq!(extract_record(&envelope).expect("record").id, "c1");
}

#[test]
fn extract_record_skips_unparseable_candidates() {
    // "customer" lacks _id, so the probe falls through to "data".
    let envelope = json!({
        "customer": {"name": "no id"},
        "data": {"_id": "d1"}
    });
    assert_eq!(extract_record(&envelope).expect("record").id, "d1");
}

#[test]
fn extract_record_rejects_shapes_without_identity() {
    assert!(extract_record(&json!({"message": "ok"})).is_none());
    assert!(extract_record(&json!({"data": {"name": "no id"}})).is_none());
}

#[test]
fn extract_record_preserves_unmodeled_fields() {
    let envelope = json!({"customer": {"_id": "c1", "loyaltyTier": "gold"}});
    let rec = extract_record(&envelope).expect("record");
    assert_eq!(rec.extra.get("loyaltyTier"), Some(&json!("gold")));
}

// =============================================================
// Fetch planning
// =============================================================

#[test]
fn plan_fetch_unauthenticated_is_none_not_an_error() {
    let store = MemoryStore::new();
    assert_eq!(plan_fetch(&store).expect("ok"), None);
}

#[test]
fn plan_fetch_customer_uses_cached_blob_identity() {
    let plan = plan_fetch(&customer_store()).expect("ok").expect("plan");
    assert_eq!(plan.verdict, SessionVerdict::Customer);
    assert_eq!(plan.token, "t1");
    assert_eq!(plan.identity, "c1");
}

#[test]
fn plan_fetch_customer_falls_back_to_legacy_user_id() {
    let store = MemoryStore::with_entries(&[
        (keys::TOKEN, "t1"),
        (keys::LOGGED_IN, "true"),
        (keys::USER_ID, "legacy-c"),
    ]);
    let plan = plan_fetch(&store).expect("ok").expect("plan");
    assert_eq!(plan.identity, "legacy-c");
}

#[test]
fn plan_fetch_provider_uses_cached_blob_identity() {
    let plan = plan_fetch(&provider_store()).expect("ok").expect("plan");
    assert_eq!(plan.verdict, SessionVerdict::ServiceProvider);
    assert_eq!(plan.token, "t2");
    assert_eq!(plan.identity, "p1");
}

#[test]
fn plan_fetch_provider_falls_back_to_legacy_provider_id() {
    let store = MemoryStore::with_entries(&[
        (keys::TOKEN_SP, "t2"),
        (keys::LOGGED_IN, "true"),
        (keys::SERVICE_PROVIDER_ID, "legacy-p"),
    ]);
    let plan = plan_fetch(&store).expect("ok").expect("plan");
    assert_eq!(plan.identity, "legacy-p");
}

#[test]
fn plan_fetch_ignores_malformed_cache_blob() {
    let store = MemoryStore::with_entries(&[
        (keys::TOKEN, "t1"),
        (keys::LOGGED_IN, "true"),
        (keys::USER_DATA, "{not json"),
        (keys::USER_ID, "legacy-c"),
    ]);
    let plan = plan_fetch(&store).expect("ok").expect("plan");
    assert_eq!(plan.identity, "legacy-c");
}

#[test]
fn plan_fetch_with_no_identity_source_is_identity_unresolved() {
    let store = MemoryStore::with_entries(&[(keys::TOKEN, "t1"), (keys::LOGGED_IN, "true")]);
    assert_eq!(plan_fetch(&store), Err(SessionError::IdentityUnresolved));
}

#[test]
fn plan_fetch_provider_without_own_token_borrows_customer_slot() {
    // Role tag says sp but only the customer token was written; the fetch
    // still presents a credential rather than failing.
    let store = MemoryStore::with_entries(&[
        (keys::TOKEN, "t1"),
        (keys::LOGGED_IN, "true"),
        (keys::ROLE, "sp"),
        (keys::SERVICE_PROVIDER_ID, "p9"),
    ]);
    let plan = plan_fetch(&store).expect("ok").expect("plan");
    assert_eq!(plan.verdict, SessionVerdict::ServiceProvider);
    assert_eq!(plan.token, "t1");
}

// =============================================================
// Fetch interpretation
// =============================================================

#[test]
fn provider_http_failure_falls_back_to_cached_record() {
    let store = provider_store();
    let outcome = Err(SessionError::FetchFailed { status: 404 });
    let rec = interpret_fetch(SessionVerdict::ServiceProvider, outcome, &store).expect("cached");
    assert_eq!(rec.id, "p1");
    assert_eq!(rec.name.as_deref(), Some("Acme"));
}

#[test]
fn provider_malformed_response_also_falls_back() {
    let store = provider_store();
    let outcome = Ok(json!({"message": "eventually consistent"}));
    let rec = interpret_fetch(SessionVerdict::ServiceProvider, outcome, &store).expect("cached");
    assert_eq!(rec.id, "p1");
}

#[test]
fn provider_failure_without_cache_propagates() {
    let store = MemoryStore::with_entries(&[(keys::TOKEN_SP, "t2"), (keys::LOGGED_IN, "true")]);
    let outcome = Err(SessionError::FetchFailed { status: 404 });
    assert_eq!(
        interpret_fetch(SessionVerdict::ServiceProvider, outcome, &store),
        Err(SessionError::FetchFailed { status: 404 })
    );
}

#[test]
fn customer_failure_propagates_even_with_cache() {
    let store = customer_store();
    let outcome = Err(SessionError::FetchFailed { status: 500 });
    assert_eq!(
        interpret_fetch(SessionVerdict::Customer, outcome, &store),
        Err(SessionError::FetchFailed { status: 500 })
    );
}

#[test]
fn successful_fetch_wins_over_cache() {
    let store = provider_store();
    let outcome = Ok(json!({"professional": {"_id": "p-fresh"}}));
    let rec = interpret_fetch(SessionVerdict::ServiceProvider, outcome, &store).expect("record");
    assert_eq!(rec.id, "p-fresh");
}

// =============================================================
// State machine: fetch serialization and stale responses
// =============================================================

#[test]
fn begin_fetch_refuses_while_one_is_outstanding() {
    let mut state = SessionState::default();
    let seq = state.begin_fetch().expect("first fetch claims the slot");
    assert_eq!(state.begin_fetch(), None, "second caller must be a no-op");
    assert_eq!(state.phase, FetchPhase::Fetching);

    let applied = state.finish_fetch(
        seq,
        SessionVerdict::Customer,
        SessionVerdict::Customer,
        Ok(record("c1")),
    );
    assert!(applied);
    assert!(state.begin_fetch().is_some(), "slot is free again");
}

#[test]
fn finish_fetch_applies_matching_response() {
    let mut state = SessionState::default();
    let seq = state.begin_fetch().expect("seq");
    assert!(state.finish_fetch(
        seq,
        SessionVerdict::Customer,
        SessionVerdict::Customer,
        Ok(record("c1")),
    ));
    assert_eq!(state.phase, FetchPhase::Ready);
    assert_eq!(state.profile.as_ref().map(|r| r.id.as_str()), Some("c1"));
    assert_eq!(state.error, None);
}

#[test]
fn finish_fetch_discards_response_after_reset() {
    let mut state = SessionState::default();
    let seq = state.begin_fetch().expect("seq");
    state.reset();

    let applied = state.finish_fetch(
        seq,
        SessionVerdict::Customer,
        SessionVerdict::Customer,
        Ok(record("stale")),
    );
    assert!(!applied);
    assert_eq!(state.profile, None);
    assert_eq!(state.phase, FetchPhase::Idle);
}

#[test]
fn finish_fetch_discards_response_when_verdict_changed() {
    let mut state = SessionState::default();
    let seq = state.begin_fetch().expect("seq");

    // Fetched as customer, but by arrival time the session is a provider.
    let applied = state.finish_fetch(
        seq,
        SessionVerdict::Customer,
        SessionVerdict::ServiceProvider,
        Ok(record("stale")),
    );
    assert!(!applied);
    assert_eq!(state.profile, None);
    assert!(!state.is_fetching(), "slot must be released");
}

#[test]
fn fetch_failure_keeps_previous_record() {
    let mut state = SessionState::default();
    let seq = state.begin_fetch().expect("seq");
    state.finish_fetch(
        seq,
        SessionVerdict::Customer,
        SessionVerdict::Customer,
        Ok(record("c1")),
    );

    let seq = state.begin_fetch().expect("seq");
    state.finish_fetch(
        seq,
        SessionVerdict::Customer,
        SessionVerdict::Customer,
        Err(SessionError::FetchFailed { status: 500 }),
    );
    assert_eq!(state.phase, FetchPhase::Failed);
    assert_eq!(state.error, Some(SessionError::FetchFailed { status: 500 }));
    assert_eq!(
        state.profile.as_ref().map(|r| r.id.as_str()),
        Some("c1"),
        "a transient failure must not destroy a good record"
    );
}

#[test]
fn record_failure_leaves_record_untouched() {
    let mut state = SessionState {
        profile: Some(record("c1")),
        phase: FetchPhase::Ready,
        ..SessionState::default()
    };
    state.record_failure(SessionError::IdentityUnresolved);
    assert_eq!(state.phase, FetchPhase::Failed);
    assert_eq!(state.error, Some(SessionError::IdentityUnresolved));
    assert!(state.profile.is_some());
}

// =============================================================
// check_session / logout
// =============================================================

#[test]
fn check_session_updates_booleans_and_is_idempotent() {
    let store = provider_store();
    let mut state = SessionState::default();

    let first = check_session(&mut state, &store);
    assert_eq!(first, SessionVerdict::ServiceProvider);
    assert!(state.is_logged_in);
    assert!(state.is_service_provider);

    let snapshot = state.clone();
    let second = check_session(&mut state, &store);
    assert_eq!(second, first);
    assert_eq!(state.phase, snapshot.phase);
    assert_eq!(state.profile, snapshot.profile);
}

#[test]
fn logout_then_check_session_is_unauthenticated() {
    let store = customer_store();
    let mut state = SessionState::default();
    check_session(&mut state, &store);
    assert!(state.is_logged_in);

    logout(&mut state, &store);
    assert!(!state.is_logged_in);
    assert!(!state.is_service_provider);
    assert_eq!(state.profile, None);
    assert_eq!(check_session(&mut state, &store), SessionVerdict::Unauthenticated);
}

#[test]
fn logout_invalidates_in_flight_fetch() {
    let store = customer_store();
    let mut state = SessionState::default();
    let seq = state.begin_fetch().expect("seq");

    logout(&mut state, &store);

    let applied = state.finish_fetch(
        seq,
        SessionVerdict::Customer,
        SessionVerdict::Customer,
        Ok(record("late")),
    );
    assert!(!applied, "response issued under the old identity is discarded");
    assert_eq!(state.profile, None);
}

// =============================================================
// Patching
// =============================================================

#[test]
fn apply_patch_shallow_merges_present_fields() {
    let mut state = SessionState {
        profile: Some(ProfileRecord {
            id: "c1".to_owned(),
            name: Some("Ada".to_owned()),
            email: Some("ada@example.com".to_owned()),
            ..ProfileRecord::default()
        }),
        ..SessionState::default()
    };

    state.apply_patch(&ProfilePatch {
        name: Some("Ada L.".to_owned()),
        ..ProfilePatch::default()
    });

    let rec = state.profile.expect("record");
    assert_eq!(rec.name.as_deref(), Some("Ada L."));
    assert_eq!(rec.email.as_deref(), Some("ada@example.com"), "absent fields kept");
}

#[test]
fn apply_patch_without_record_is_a_no_op() {
    let mut state = SessionState::default();
    state.apply_patch(&ProfilePatch {
        name: Some("nobody".to_owned()),
        ..ProfilePatch::default()
    });
    assert_eq!(state.profile, None);
}

// =============================================================
// Cached profile parsing
// =============================================================

#[test]
fn cached_profile_parses_the_role_slot() {
    let store = provider_store();
    let rec = cached_profile(&store, SessionVerdict::ServiceProvider).expect("record");
    assert_eq!(rec.id, "p1");
    assert_eq!(cached_profile(&store, SessionVerdict::Customer), None);
    assert_eq!(cached_profile(&store, SessionVerdict::Unauthenticated), None);
}

#[test]
fn cached_profile_rejects_blob_without_identity() {
    let store = MemoryStore::with_entries(&[(keys::SP_USER_DATA, r#"{"name":"Acme"}"#)]);
    assert_eq!(cached_profile(&store, SessionVerdict::ServiceProvider), None);
}
