//! Route guards built on the session probe.
//!
//! Three policies over the same underlying probe: `RequireAuth` (any
//! authenticated role), `RequireRole` (a configured subset of roles), and
//! `ProfileRedirect` (resolve and dispatch). All of them fail closed:
//! nothing protected is rendered before the verdict has resolved, and any
//! ambiguity reads as unauthenticated.

pub mod profile_redirect;
pub mod require_auth;
pub mod require_role;
