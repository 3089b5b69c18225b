//! Login Page
//!
//! Login and registration form. Register mode registers and then logs in with
//! the same credentials.

use leptos::*;
use supermaya::auth::{self, AuthMode, Credentials};

use crate::api;
use crate::components::InlineLoading;
use crate::state::GlobalState;

#[component]
pub fn LoginPage() -> impl IntoView {
    let state = expect_context::<GlobalState>();

    let (email, set_email) = create_signal(String::new());
    let (password, set_password) = create_signal(String::new());
    let (mode, set_mode) = create_signal(AuthMode::Login);
    let (error, set_error) = create_signal(None::<String>);

    let state_for_submit = state.clone();
    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        set_error.set(None);

        if !state_for_submit.begin_login() {
            return;
        }

        let credentials = Credentials::new(email.get(), password.get());
        let mode = mode.get();
        let state = state_for_submit.clone();
        spawn_local(async move {
            match auth::authenticate(&state.backend, mode, &credentials).await {
                Ok(token) => state.finish_login(token),
                Err(failure) => {
                    state.fail_login();
                    set_error.set(Some(failure.to_string()));
                }
            }
        });
    };

    let logging_in = move || state.is_logging_in();

    view! {
        <div class="login-container min-h-screen flex items-center justify-center px-4">
            <form on:submit=on_submit class="login-form w-full max-w-sm bg-gray-800 rounded-xl p-6 space-y-4">
                <h2 class="text-2xl font-bold text-center">{move || mode.get().title()}</h2>

                <input
                    type="email"
                    placeholder="Email"
                    required
                    class="w-full bg-gray-700 rounded-lg px-4 py-2"
                    prop:value=move || email.get()
                    on:input=move |ev| set_email.set(event_target_value(&ev))
                />
                <input
                    type="password"
                    placeholder="Password"
                    required
                    class="w-full bg-gray-700 rounded-lg px-4 py-2"
                    prop:value=move || password.get()
                    on:input=move |ev| set_password.set(event_target_value(&ev))
                />

                <button
                    type="submit"
                    disabled=logging_in.clone()
                    class="w-full py-2 bg-primary-600 hover:bg-primary-700 rounded-lg font-medium disabled:opacity-50"
                >
                    {move || if logging_in() {
                        view! { <InlineLoading /> }.into_view()
                    } else {
                        mode.get().submit_label().into_view()
                    }}
                </button>

                {move || error.get().map(|message| view! {
                    <p class="error-message text-red-400 text-sm text-center">{message}</p>
                })}

                <button
                    type="button"
                    class="toggle-auth w-full text-sm text-gray-400 hover:text-white"
                    on:click=move |_| set_mode.update(|m| *m = m.toggled())
                >
                    {move || mode.get().toggle_hint()}
                </button>

                <ApiServerSetting />
            </form>
        </div>
    }
}

/// Backend URL override, kept in local storage
#[component]
fn ApiServerSetting() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let (api_url, set_api_url) = create_signal(api::get_api_base());

    let save_url = move |_| {
        api::set_api_base(&api_url.get());
        set_api_url.set(api::get_api_base());
        state.show_success("API URL saved");
    };

    view! {
        <details class="text-sm text-gray-400">
            <summary class="cursor-pointer">"Server"</summary>
            <div class="flex space-x-2 mt-2">
                <input
                    type="url"
                    class="flex-1 bg-gray-700 rounded-lg px-3 py-1"
                    prop:value=move || api_url.get()
                    on:input=move |ev| set_api_url.set(event_target_value(&ev))
                />
                <button type="button" class="px-3 py-1 bg-gray-700 hover:bg-gray-600 rounded-lg" on:click=save_url>
                    "Save"
                </button>
            </div>
        </details>
    }
}
