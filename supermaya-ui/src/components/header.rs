//! Chat Header
//!
//! Workspace title bar with the logout button.

use leptos::*;

use crate::state::GlobalState;

#[component]
pub fn Header() -> impl IntoView {
    let state = expect_context::<GlobalState>();

    let on_logout = move |_| state.logout();

    view! {
        <header class="bg-gray-800 border-b border-gray-700">
            <div class="container mx-auto px-4">
                <div class="flex items-center justify-between h-16">
                    <div class="flex items-center space-x-3">
                        <span class="text-2xl">"✨"</span>
                        <h1 class="text-xl font-bold text-white">"SuperMaya Workspace"</h1>
                    </div>

                    <button
                        class="px-4 py-2 rounded-lg text-gray-300 hover:text-white hover:bg-gray-700 transition-colors"
                        on:click=on_logout
                    >
                        "Logout"
                    </button>
                </div>
            </div>
        </header>
    }
}
