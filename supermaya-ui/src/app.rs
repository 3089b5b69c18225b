//! App Root Component
//!
//! Routing and global providers. The session phase picks the screen: each
//! route redirects to the other one when it doesn't match.

use leptos::*;
use leptos_router::*;
use supermaya::Screen;

use crate::components::Toast;
use crate::pages::{ChatPage, LoginPage};
use crate::state::{provide_global_state, GlobalState};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    provide_global_state();

    view! {
        <Router>
            <div class="min-h-screen bg-gray-900 text-white flex flex-col">
                <main class="flex-1">
                    <Routes>
                        <Route path="/" view=ChatRoute />
                        <Route path="/login" view=LoginRoute />
                        <Route path="/*any" view=NotFound />
                    </Routes>
                </main>

                <Toast />
            </div>
        </Router>
    }
}

#[component]
fn ChatRoute() -> impl IntoView {
    let state = expect_context::<GlobalState>();

    view! {
        <Show
            when=move || state.screen() == Screen::Chat
            fallback=|| view! { <Redirect path="/login" /> }
        >
            <ChatPage />
        </Show>
    }
}

#[component]
fn LoginRoute() -> impl IntoView {
    let state = expect_context::<GlobalState>();

    view! {
        <Show
            when=move || state.screen() == Screen::Auth
            fallback=|| view! { <Redirect path="/" /> }
        >
            <LoginPage />
        </Show>
    }
}

/// 404 Not Found page
#[component]
fn NotFound() -> impl IntoView {
    view! {
        <div class="flex flex-col items-center justify-center min-h-[60vh] text-center">
            <div class="text-6xl mb-4">"🔍"</div>
            <h1 class="text-3xl font-bold mb-2">"Page Not Found"</h1>
            <p class="text-gray-400 mb-6">"The page you're looking for doesn't exist."</p>
            <A
                href="/"
                class="px-6 py-3 bg-primary-600 hover:bg-primary-700 rounded-lg font-medium transition-colors"
            >
                "Back to chat"
            </A>
        </div>
    }
}
