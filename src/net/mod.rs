//! Network layer: REST helpers and the profile fetch orchestration.

pub mod api;
pub mod profile_client;
