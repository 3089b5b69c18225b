//! SuperMaya Web
//!
//! Chat front-end for the SuperMaya AI assistant built with Leptos (WASM).
//!
//! # Features
//!
//! - Login and registration
//! - Text and image questions
//! - Charts, image analyses and rich text answers
//! - Thumbs-up / thumbs-down feedback
//!
//! # Architecture
//!
//! This is a client-side rendered (CSR) Leptos application that compiles to
//! WebAssembly. Session, transcript and answer parsing come from the shared
//! `supermaya` core; this crate adds the browser HTTP client, local storage and
//! the views.

use leptos::*;

mod api;
mod app;
mod components;
mod pages;
mod state;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    mount_to_body(|| view! { <app::App /> });
}
