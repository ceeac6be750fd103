//! Root application component: routing, session context, and the store poll.

use leptos::prelude::*;
use leptos_meta::{Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::components::profile_redirect::ProfileRedirect;
use crate::components::require_auth::RequireAuth;
use crate::components::require_role::RequireRole;
use crate::net::profile_client;
use crate::pages::{
    landing::LandingPage, login::LoginPage, orders::OrdersPage, profile::ProfilePage,
    profile_sp::ProviderProfilePage,
};
use crate::state::profile::SessionState;
use crate::state::session::SessionVerdict;

const CUSTOMER_ONLY: &[SessionVerdict] = &[SessionVerdict::Customer];
const PROVIDER_ONLY: &[SessionVerdict] = &[SessionVerdict::ServiceProvider];

/// Root application component.
///
/// Provides the shared session signal, resolves the verdict once at startup,
/// and spawns the recurring store poll so out-of-band login/logout flows are
/// noticed within one tick. Guards compose around the protected routes here;
/// nothing below this level knows the route table.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let session = RwSignal::new(SessionState::default());
    provide_context(session);

    profile_client::check_session(session);
    profile_client::spawn_session_poll(session);

    view! {
        <Stylesheet id="leptos" href="/pkg/marketplace-client.css"/>
        <Title text="Marketplace"/>

        <Router>
            <Routes fallback=|| "Page not found.".into_view()>
                <Route path=StaticSegment("") view=LandingPage/>
                <Route path=StaticSegment("login") view=LoginPage/>
                <Route path=StaticSegment("account") view=ProfileRedirect/>
                <Route
                    path=StaticSegment("profile")
                    view=|| {
                        view! {
                            <RequireRole allowed=CUSTOMER_ONLY>
                                <ProfilePage/>
                            </RequireRole>
                        }
                    }
                />
                <Route
                    path=StaticSegment("profile-sp")
                    view=|| {
                        view! {
                            <RequireRole allowed=PROVIDER_ONLY>
                                <ProviderProfilePage/>
                            </RequireRole>
                        }
                    }
                />
                <Route
                    path=StaticSegment("orders")
                    view=|| {
                        view! {
                            <RequireAuth>
                                <OrdersPage/>
                            </RequireAuth>
                        }
                    }
                />
            </Routes>
        </Router>
    }
}
