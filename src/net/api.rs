//! REST API helpers for the profile endpoints.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`, presenting the
//! role's bearer credential. Server-side / native: stubs returning
//! `Unavailable` since these endpoints are only meaningful in the browser.
//!
//! Both endpoints return a JSON envelope whose payload may sit under one of
//! several keys; decoding stops at `serde_json::Value` here and the shape
//! probing happens in `state::profile::extract_record`.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use crate::state::profile::SessionError;

/// Customer profile endpoint for an identity.
#[must_use]
pub fn customer_profile_url(identity: &str) -> String {
    format!("/customer/{identity}/getProfile")
}

/// Provider profile endpoint for an identity.
/// The backend route spells "professsional" with three s's.
#[must_use]
pub fn provider_profile_url(identity: &str) -> String {
    format!("/professional/get-professsional/{identity}")
}

/// Fetch the customer profile envelope with the customer bearer token.
///
/// # Errors
///
/// `FetchFailed` on non-success status (status 0 when the request never got
/// an HTTP response), `MalformedResponse` when the body is not JSON.
pub async fn get_customer_profile(
    identity: &str,
    token: &str,
) -> Result<serde_json::Value, SessionError> {
    get_json(&customer_profile_url(identity), token).await
}

/// Fetch the provider profile envelope with the provider bearer token.
///
/// # Errors
///
/// Same taxonomy as [`get_customer_profile`]; the provider cache fallback is
/// applied by the caller, not here.
pub async fn get_provider_profile(
    identity: &str,
    token: &str,
) -> Result<serde_json::Value, SessionError> {
    get_json(&provider_profile_url(identity), token).await
}

#[allow(unused_variables)]
async fn get_json(url: &str, token: &str) -> Result<serde_json::Value, SessionError> {
    #[cfg(feature = "hydrate")]
    {
        let resp = gloo_net::http::Request::get(url)
            .header("Authorization", &format!("Bearer {token}"))
            .send()
            .await
            .map_err(|e| {
                leptos::logging::warn!("profile request to {url} failed: {e}");
                SessionError::FetchFailed { status: 0 }
            })?;
        if !resp.ok() {
            return Err(SessionError::FetchFailed { status: resp.status() });
        }
        resp.json::<serde_json::Value>()
            .await
            .map_err(|_| SessionError::MalformedResponse)
    }
    #[cfg(not(feature = "hydrate"))]
    {
        Err(SessionError::Unavailable)
    }
}
