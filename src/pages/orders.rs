//! Order history page, gated by the bare authentication guard: both account
//! kinds have orders.

use leptos::prelude::*;

#[component]
pub fn OrdersPage() -> impl IntoView {
    view! {
        <div class="orders-page">
            <h1>"Your orders"</h1>
            <p>"No orders yet."</p>
        </div>
    }
}
