//! Chat Message Component
//!
//! Picks the layout for one transcript entry. User messages are shown as typed;
//! AI messages go through the response dispatcher.

use leptos::*;
use supermaya::api::InteractionId;
use supermaya::chat::{self, FeedbackOutcome, Message, Vote};
use supermaya::response::{ChartResponse, RichTextResponse, VisionResponse};
use supermaya::AiResponse;

use super::chart::VegaChart;
use crate::state::GlobalState;

#[component]
pub fn ChatMessage(message: Message, #[prop(into)] on_tag_click: Callback<String>) -> impl IntoView {
    let Some(response) = message.response() else {
        return view! {
            <div class="message user ml-auto max-w-[80%] bg-primary-600 text-white rounded-lg px-4 py-3 whitespace-pre-wrap">
                {message.text.unwrap_or_default()}
            </div>
        }
        .into_view();
    };

    let id = message.interaction_id;
    match response {
        AiResponse::Chart(chart) => view! { <ChartAnswer chart=chart id=id /> }.into_view(),
        AiResponse::Vision(vision) => view! { <VisionAnswer vision=vision id=id on_tag_click=on_tag_click /> }.into_view(),
        AiResponse::RichText(rich) => view! { <RichTextAnswer rich=rich id=id /> }.into_view(),
        AiResponse::Raw(text) => view! {
            <div class=AI_CLASS>{text}</div>
        }
        .into_view(),
    }
}

const AI_CLASS: &str = "message ai max-w-[80%] bg-gray-800 text-gray-100 rounded-lg px-4 py-3 whitespace-pre-wrap";

#[component]
fn ChartAnswer(chart: ChartResponse, id: Option<InteractionId>) -> impl IntoView {
    view! {
        <div class=AI_CLASS>
            {chart.caption.map(|caption| view! { <p>{caption}</p> })}
            <VegaChart spec=chart.spec />
            <FeedbackButtons id=id />
        </div>
    }
}

#[component]
fn VisionAnswer(
    vision: VisionResponse,
    id: Option<InteractionId>,
    on_tag_click: Callback<String>,
) -> impl IntoView {
    view! {
        <div class=format!("{} vision-response", AI_CLASS)>
            <p><strong>"Image Analysis: "</strong>{vision.description}</p>
            <p><strong>"Answer: "</strong>{vision.answer.unwrap_or_default()}</p>
            <div class="object-tags flex flex-wrap gap-2 mt-2">
                {vision.tags.into_iter().map(|tag| {
                    let label = tag.clone();
                    view! {
                        <button
                            class="tag-button px-3 py-1 rounded-full bg-gray-700 hover:bg-gray-600 text-sm"
                            on:click=move |_| on_tag_click.call(tag.clone())
                        >
                            {label}
                        </button>
                    }
                }).collect_view()}
            </div>
            <FeedbackButtons id=id />
        </div>
    }
}

#[component]
fn RichTextAnswer(rich: RichTextResponse, id: Option<InteractionId>) -> impl IntoView {
    let links = (!rich.reference_links.is_empty()).then(|| view! {
        <div class="reference-links mt-3 text-sm">
            <strong>"Learn More:"</strong>
            <ul class="list-disc list-inside">
                {rich.reference_links.into_iter().map(|link| view! {
                    <li>
                        <a href=link.clone() target="_blank" rel="noopener noreferrer" class="text-primary-400 hover:underline">
                            {link}
                        </a>
                    </li>
                }).collect_view()}
            </ul>
        </div>
    });

    view! {
        <div class=AI_CLASS>
            {rich.text}
            {rich.image_url.map(|url| view! {
                <img src=url alt="AI generated visual" class="ai-image mt-3 rounded-lg max-w-full" />
            })}
            {links}
            <FeedbackButtons id=id />
        </div>
    }
}

/// Thumbs up / down. The acknowledgement waits for the backend.
#[component]
fn FeedbackButtons(id: Option<InteractionId>) -> impl IntoView {
    let state = expect_context::<GlobalState>();

    let vote = move |vote: Vote| {
        let state = state.clone();
        let id = id.clone();
        spawn_local(async move {
            match chat::submit_feedback(&state.backend, id.as_ref(), vote).await {
                FeedbackOutcome::Submitted => state.show_success(chat::FEEDBACK_SUBMITTED),
                FeedbackOutcome::Failed => state.show_error(chat::FEEDBACK_FAILED),
                FeedbackOutcome::Skipped => {}
            }
        });
    };
    let vote_good = vote.clone();

    view! {
        <div class="feedback-buttons flex space-x-2 mt-2 text-lg">
            <button class="hover:scale-110 transition-transform" on:click=move |_| vote_good(Vote::Good)>"👍"</button>
            <button class="hover:scale-110 transition-transform" on:click=move |_| vote(Vote::Bad)>"👎"</button>
        </div>
    }
}
