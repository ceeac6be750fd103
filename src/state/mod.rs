//! Session engine state modules.
//!
//! DESIGN
//! ======
//! Split by concern so each piece stays small and testable on its own:
//! `store` is the persistent key-value abstraction, `session` the pure
//! probe/verdict derivation, `profile` the profile record and fetch state
//! machine. Nothing in here suspends; the async glue lives in `net`.

pub mod profile;
pub mod session;
pub mod store;
