//! Chat Page
//!
//! Transcript, input row and image attachment.

use leptos::*;
use supermaya::chat::{self, SendRejected};
use supermaya::{Attachment, ChatBackend, HistoryPage};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::components::{ChatMessage, Header, Thinking};
use crate::state::GlobalState;

#[component]
pub fn ChatPage() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let chat = state.chat;

    let bottom_ref = create_node_ref::<html::Div>();
    let file_input_ref = create_node_ref::<html::Input>();

    // Keep the newest message in view
    create_effect(move |_| {
        let _ = chat.with(|chat| (chat.messages().len(), chat.is_busy()));
        if let Some(bottom) = bottom_ref.get() {
            bottom.scroll_into_view();
        }
    });

    let on_tag_click = {
        let state = state.clone();
        Callback::new(move |tag: String| send(&state, Some(chat::tag_query(&tag))))
    };

    let state_for_key = state.clone();
    let on_keydown = move |ev: web_sys::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            send(&state_for_key, None);
        }
    };

    let state_for_click = state.clone();
    let on_send = move |_| send(&state_for_click, None);

    let state_for_file = state.clone();
    let on_file_change = move |ev: web_sys::Event| {
        let Some(input) = ev
            .target()
            .and_then(|target| target.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            return;
        };
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            return;
        };
        // Reset so picking the same file again still fires `change`
        input.set_value("");

        let state = state_for_file.clone();
        spawn_local(async move {
            match read_attachment(&file).await {
                Ok(attachment) => chat.update(|chat| chat.attach(attachment)),
                Err(e) => {
                    web_sys::console::error_2(&"Failed to read image:".into(), &e);
                    state.show_error("Could not read that image.");
                }
            }
        });
    };

    let state_for_history = state.clone();
    let history_page = create_rw_signal(0u32);
    let load_history = move |_| {
        if chat.with_untracked(|chat| chat.is_busy()) {
            return;
        }
        let state = state_for_history.clone();
        let page = HistoryPage {
            skip: history_page.get_untracked() * HistoryPage::default().limit,
            ..HistoryPage::default()
        };
        spawn_local(async move {
            match state.backend.history(page).await {
                Ok(records) if records.is_empty() => state.show_success("No more history"),
                Ok(records) => match chat.try_update(|chat| chat.replay_history(&records)) {
                    Some(Ok(_)) => history_page.update(|page| *page += 1),
                    Some(Err(SendRejected::Busy)) => state.show_error("Wait for the current answer first."),
                    _ => {}
                },
                Err(e) => {
                    web_sys::console::error_1(&format!("History failed: {}", e).into());
                    state.show_error("Could not load history.");
                }
            }
        });
    };

    let is_busy = move || chat.with(|chat| chat.is_busy());

    view! {
        <div class="chat-container min-h-screen flex flex-col">
            <Header />

            <div class="chat-messages flex-1 overflow-y-auto container mx-auto px-4 py-6 space-y-4">
                <div class="text-center">
                    <button
                        class="text-sm text-gray-400 hover:text-white disabled:opacity-50"
                        disabled=is_busy
                        on:click=load_history
                    >
                        "Load history"
                    </button>
                </div>

                <For
                    each=move || chat.with(|chat| chat.messages().iter().cloned().enumerate().collect::<Vec<_>>())
                    key=|(index, _)| *index
                    children=move |(_, message)| view! {
                        <ChatMessage message=message on_tag_click=on_tag_click />
                    }
                />

                <Show when=is_busy>
                    <Thinking />
                </Show>

                <div node_ref=bottom_ref />
            </div>

            <div class="chat-input-area sticky bottom-0 bg-gray-800 border-t border-gray-700 px-4 py-3">
                {move || chat.with(|chat| chat.attachment().map(|a| a.file_name.clone())).map(|name| view! {
                    <div class="flex items-center space-x-2 text-sm text-gray-300 mb-2">
                        <span>{format!("📎 {}", name)}</span>
                        <button class="text-gray-400 hover:text-white" on:click=move |_| {
                            chat.update(|chat| { chat.detach(); });
                        }>"✕"</button>
                    </div>
                })}

                <div class="container mx-auto flex items-center space-x-2">
                    <input
                        type="file"
                        accept="image/*"
                        class="hidden"
                        node_ref=file_input_ref
                        on:change=on_file_change
                    />
                    <button
                        class="px-3 py-2 bg-gray-700 hover:bg-gray-600 rounded-lg"
                        disabled=is_busy
                        on:click=move |_| {
                            if let Some(input) = file_input_ref.get() {
                                input.click();
                            }
                        }
                    >
                        "📎"
                    </button>
                    <input
                        type="text"
                        class="flex-1 bg-gray-700 rounded-lg px-4 py-2 disabled:opacity-50"
                        placeholder=move || chat.with(|chat| chat.input_placeholder())
                        disabled=is_busy
                        prop:value=move || chat.with(|chat| chat.input().to_string())
                        on:input=move |ev| chat.update(|chat| chat.set_input(event_target_value(&ev)))
                        on:keydown=on_keydown
                    />
                    <button
                        class="px-4 py-2 bg-primary-600 hover:bg-primary-700 rounded-lg font-medium disabled:opacity-50"
                        disabled=is_busy
                        on:click=on_send
                    >
                        "Send"
                    </button>
                </div>
            </div>
        </div>
    }
}

/// Start a send, run it in the background and apply the answer.
///
/// Rejections (busy, nothing typed) are silent; the controls are disabled
/// while busy anyway.
fn send(state: &GlobalState, query_override: Option<String>) {
    let chat = state.chat;
    let pending = match chat.try_update(|chat| chat.begin_send(query_override.as_deref())) {
        Some(Ok(pending)) => pending,
        _ => return,
    };

    let backend = state.backend.clone();
    spawn_local(async move {
        let outcome = chat::dispatch(&backend, &pending).await;
        chat.update(|chat| {
            chat.complete(pending.generation, outcome);
        });
    });
}

async fn read_attachment(file: &web_sys::File) -> Result<Attachment, wasm_bindgen::JsValue> {
    let buffer = JsFuture::from(file.array_buffer()).await?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();

    let content_type = match file.type_() {
        t if t.is_empty() => Attachment::image_content_type(&file.name())
            .unwrap_or("application/octet-stream")
            .to_string(),
        t => t,
    };

    Ok(Attachment::new(file.name(), content_type, bytes))
}
