//! Global Application State
//!
//! Reactive state management using Leptos signals.

use leptos::*;
use supermaya::{AccessToken, ChatState, Screen, Session};

use super::storage::LocalStorageTokenStore;
use crate::api::HttpBackend;

/// Global application state provided to all components
#[derive(Clone)]
pub struct GlobalState {
    /// Login lifecycle; its phase decides which page is shown
    pub session: RwSignal<Session<LocalStorageTokenStore>>,
    /// Transcript, input line and pending attachment
    pub chat: RwSignal<ChatState>,
    pub backend: HttpBackend,
    /// Error message to display
    pub error: RwSignal<Option<String>>,
    /// Success message (for toasts)
    pub success: RwSignal<Option<String>>,
}

/// Provide global state to the component tree
pub fn provide_global_state() {
    let state = GlobalState {
        session: create_rw_signal(Session::restore(LocalStorageTokenStore)),
        chat: create_rw_signal(ChatState::new()),
        backend: HttpBackend::new(),
        error: create_rw_signal(None),
        success: create_rw_signal(None),
    };

    provide_context(state);
}

impl GlobalState {
    pub fn screen(&self) -> Screen {
        self.session.with(|session| session.screen())
    }

    pub fn is_logging_in(&self) -> bool {
        self.session.with(|session| session.is_logging_in())
    }

    /// Enter the logging-in phase; false if a login is already running
    pub fn begin_login(&self) -> bool {
        match self.session.try_update(|session| session.begin_login()) {
            Some(Ok(())) => true,
            Some(Err(e)) => {
                web_sys::console::warn_1(&e.to_string().into());
                false
            }
            None => false,
        }
    }

    /// Persist the token and switch to the chat screen
    pub fn finish_login(&self, token: AccessToken) {
        let result = self.session.try_update(|session| session.finish_login(token));
        if let Some(Err(e)) = result {
            web_sys::console::error_1(&format!("Failed to store session: {}", e).into());
            self.session.update(|session| {
                let _ = session.fail_login();
            });
            self.show_error("Could not save your session.");
        }
    }

    pub fn fail_login(&self) {
        self.session.update(|session| {
            let _ = session.fail_login();
        });
    }

    /// Drop the in-flight request, clear the transcript and forget the token
    pub fn logout(&self) {
        self.chat.update(|chat| chat.reset());

        let result = self.session.try_update(|session| session.logout());
        if let Some(Err(e)) = result {
            web_sys::console::error_1(&format!("Logout failed: {}", e).into());
            self.show_error("Logout failed.");
        }
    }

    /// Show a success message (auto-clears after timeout)
    pub fn show_success(&self, message: &str) {
        self.success.set(Some(message.to_string()));

        let success_signal = self.success;
        gloo_timers::callback::Timeout::new(3000, move || {
            success_signal.set(None);
        })
        .forget();
    }

    /// Show an error message (auto-clears after timeout)
    pub fn show_error(&self, message: &str) {
        self.error.set(Some(message.to_string()));

        let error_signal = self.error;
        gloo_timers::callback::Timeout::new(5000, move || {
            error_signal.set(None);
        })
        .forget();
    }
}
