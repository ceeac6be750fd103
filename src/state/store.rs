//! Persistent client store abstraction.
//!
//! The session engine reads and writes a handful of string keys that survive
//! page reloads. The store is shared, unsynchronized state: a login form in a
//! sibling UI flow may write tokens directly, so every read must be treated
//! as possibly reflecting a concurrent external write.
//!
//! DESIGN
//! ======
//! `SessionStore` is a small injected interface rather than a singleton so
//! the probe and the profile context are testable against `MemoryStore`.
//! `BrowserStore` is the localStorage adapter; it is total: a storage fault
//! is logged and reported as "absent", never propagated (fail closed).

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

/// String keys used by the session engine in the persistent store.
pub mod keys {
    /// Opaque bearer credential for customer-role requests.
    pub const TOKEN: &str = "token";
    /// Opaque bearer credential for service-provider-role requests.
    pub const TOKEN_SP: &str = "token-sp";
    /// Explicit login confirmation ("true" or absent). A token's mere
    /// presence is not proof of an active session.
    pub const LOGGED_IN: &str = "isLoggedIn";
    /// Authoritative role hint ("user" | "sp") when present.
    pub const ROLE: &str = "userRole";
    /// Last-fetched customer profile JSON (must contain `_id`).
    pub const USER_DATA: &str = "userData";
    /// Last-fetched provider profile JSON (must contain `_id`).
    pub const SP_USER_DATA: &str = "spUserData";
    /// Legacy plain provider-identity fallback slot.
    pub const SERVICE_PROVIDER_ID: &str = "serviceProviderId";
    /// Legacy plain customer-identity fallback slot.
    pub const USER_ID: &str = "userId";

    /// Every key the logout transaction clears.
    pub const ALL: [&str; 8] = [
        TOKEN,
        TOKEN_SP,
        LOGGED_IN,
        ROLE,
        USER_DATA,
        SP_USER_DATA,
        SERVICE_PROVIDER_ID,
        USER_ID,
    ];
}

/// Key-value store surviving page reloads.
///
/// Implementations must be total: a failed read is reported as `None`, a
/// failed write is dropped. Callers never see a storage fault.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Remove every session key in one pass.
///
/// This is the store half of the logout transaction; it is fully applied
/// before returning, so any probe read issued afterward observes an
/// unauthenticated session.
pub fn clear_session(store: &dyn SessionStore) {
    for key in keys::ALL {
        store.remove(key);
    }
}

/// In-memory store for tests and native embeddings.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: std::cell::RefCell<std::collections::HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated from `(key, value)` pairs.
    #[must_use]
    pub fn with_entries(pairs: &[(&str, &str)]) -> Self {
        let store = Self::new();
        for (key, value) in pairs {
            store.set(key, value);
        }
        store
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

/// localStorage-backed store. Requires a browser environment; on non-hydrate
/// builds every read is absent and every write is a no-op.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStore;

#[cfg(feature = "hydrate")]
fn local_storage() -> Option<web_sys::Storage> {
    match web_sys::window()?.local_storage() {
        Ok(storage) => storage,
        Err(_) => {
            log::warn!("localStorage unavailable; treating session as absent");
            None
        }
    }
}

impl SessionStore for BrowserStore {
    #[allow(unused_variables)]
    fn get(&self, key: &str) -> Option<String> {
        #[cfg(feature = "hydrate")]
        {
            match local_storage()?.get_item(key) {
                Ok(value) => value,
                Err(_) => {
                    log::warn!("store read fault on {key}; treating as absent");
                    None
                }
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            None
        }
    }

    #[allow(unused_variables)]
    fn set(&self, key: &str, value: &str) {
        #[cfg(feature = "hydrate")]
        {
            if let Some(storage) = local_storage() {
                if storage.set_item(key, value).is_err() {
                    log::warn!("store write fault on {key}; value dropped");
                }
            }
        }
    }

    #[allow(unused_variables)]
    fn remove(&self, key: &str) {
        #[cfg(feature = "hydrate")]
        {
            if let Some(storage) = local_storage() {
                if storage.remove_item(key).is_err() {
                    log::warn!("store remove fault on {key}");
                }
            }
        }
    }
}
