//! Session probe: derive an authentication/role verdict from the store.
//!
//! The verdict is a pure function of four store fields read at a single
//! instant. The probe snapshots all fields before deciding, so a concurrent
//! external write can never produce a verdict derived from a partial read.
//! It is total: malformed entries count as absent and the result degrades to
//! `Unauthenticated` (fail closed).

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use crate::state::store::{SessionStore, keys};

/// Tri-state authentication/role outcome, derived and never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionVerdict {
    #[default]
    Unauthenticated,
    Customer,
    ServiceProvider,
}

impl SessionVerdict {
    #[must_use]
    pub fn is_authenticated(self) -> bool {
        self != Self::Unauthenticated
    }

    #[must_use]
    pub fn is_provider(self) -> bool {
        self == Self::ServiceProvider
    }

    /// The canonical route for this verdict: a misrouted authenticated user
    /// is bounced to the profile page they do belong on, not logged out.
    #[must_use]
    pub fn profile_route(self) -> &'static str {
        match self {
            Self::Unauthenticated => "/",
            Self::Customer => "/profile",
            Self::ServiceProvider => "/profile-sp",
        }
    }
}

/// Single-instant snapshot of the session-relevant store fields.
///
/// Both token slots may coexist transiently (role switching); the snapshot
/// carries both and lets the ordered verdict rules arbitrate.
#[derive(Clone, Debug, Default)]
pub struct StoredSession {
    pub token_customer: Option<String>,
    pub token_provider: Option<String>,
    pub logged_in: bool,
    pub role_tag: Option<String>,
}

impl StoredSession {
    /// Read every field before any decision is made.
    pub fn read(store: &dyn SessionStore) -> Self {
        Self {
            token_customer: non_empty(store.get(keys::TOKEN)),
            token_provider: non_empty(store.get(keys::TOKEN_SP)),
            logged_in: store.get(keys::LOGGED_IN).as_deref() == Some("true"),
            role_tag: non_empty(store.get(keys::ROLE)),
        }
    }

    /// Any token present and the login flag set. A raw coarse bit: it says
    /// nothing about which role the session holds.
    #[must_use]
    pub fn has_active_login(&self) -> bool {
        self.logged_in && (self.token_customer.is_some() || self.token_provider.is_some())
    }

    /// Ordered derivation rules:
    ///
    /// 1. no token, or login flag absent → `Unauthenticated`
    /// 2. `userRole == "sp"` → `ServiceProvider`
    /// 3. no role tag but a provider token → `ServiceProvider` (legacy
    ///    sessions written before the role tag existed)
    /// 4. otherwise → `Customer`
    #[must_use]
    pub fn verdict(&self) -> SessionVerdict {
        if !self.has_active_login() {
            return SessionVerdict::Unauthenticated;
        }
        if self.role_tag.as_deref() == Some("sp") {
            return SessionVerdict::ServiceProvider;
        }
        if self.role_tag.is_none() && self.token_provider.is_some() {
            return SessionVerdict::ServiceProvider;
        }
        SessionVerdict::Customer
    }
}

/// Where a role-restricted guard must send a visitor, if anywhere.
///
/// Unauthenticated goes to the landing route; an authenticated role outside
/// the permitted set goes to its own profile route, never the landing page.
/// `None` means the children may render.
#[must_use]
pub fn role_redirect(
    verdict: SessionVerdict,
    allowed: &[SessionVerdict],
) -> Option<&'static str> {
    if !verdict.is_authenticated() {
        Some("/")
    } else if allowed.contains(&verdict) {
        None
    } else {
        Some(verdict.profile_route())
    }
}

/// Read the store and derive the current verdict.
///
/// Cheap (four key reads), synchronous, and total; called on every guard
/// render and every poll tick.
pub fn probe(store: &dyn SessionStore) -> SessionVerdict {
    StoredSession::read(store).verdict()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
