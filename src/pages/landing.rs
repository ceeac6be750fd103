//! Public landing page.

use leptos::prelude::*;

/// Landing page — the redirect target for every negative guard verdict.
#[component]
pub fn LandingPage() -> impl IntoView {
    view! {
        <div class="landing-page">
            <h1>"Marketplace"</h1>
            <p>"Find a service, or offer one."</p>
            <nav class="landing-page__nav">
                <a href="/login">"Sign in"</a>
                <a href="/account">"My profile"</a>
                <a href="/orders">"My orders"</a>
            </nav>
        </div>
    }
}
