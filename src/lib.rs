//! # marketplace-client
//!
//! Leptos + WASM frontend for the marketplace application. Visitors hold one
//! of two mutually exclusive account kinds (customer or service provider),
//! and every protected route is gated by the session engine in `state` and
//! `components`: a pure probe over the persistent browser store, three route
//! guards built on it, and a profile session context that owns the fetch and
//! logout workflows.
//!
//! The `hydrate` feature gates everything that needs a browser (localStorage,
//! HTTP, timers); the default build is a plain native library so the session
//! core is testable with `cargo test` and no browser in sight.

pub mod app;
pub mod components;
pub mod net;
pub mod pages;
pub mod state;

/// WASM entry point: wire up logging and hydrate the application shell.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::hydrate_body(app::App);
}
