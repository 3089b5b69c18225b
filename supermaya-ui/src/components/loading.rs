//! Loading Indicators

use leptos::*;

/// Three pulsing dots shown as an AI message while a reply is pending
#[component]
pub fn Thinking() -> impl IntoView {
    view! {
        <div class="message ai thinking flex space-x-1 bg-gray-800 rounded-lg px-4 py-3 w-fit">
            {(0..3).map(|i| view! {
                <span
                    class="w-2 h-2 bg-gray-400 rounded-full animate-pulse"
                    style=format!("animation-delay: {}ms", i * 200)
                />
            }).collect_view()}
        </div>
    }
}

/// Inline loading spinner
#[component]
pub fn InlineLoading() -> impl IntoView {
    view! {
        <span class="inline-block loading-spinner w-4 h-4" />
    }
}
