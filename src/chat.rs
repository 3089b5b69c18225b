//! Chat Transcript State
//!
//! [`ChatState`] owns the transcript, the input line and the pending image. It
//! guarantees a single request in flight using a generation counter: a send is
//! started with [`ChatState::begin_send`], the backend call is made with
//! [`dispatch`] while no borrow of the state is held, and the result is applied
//! with [`ChatState::complete`]. Completions for an older generation (for
//! example after [`ChatState::abandon`] on logout) are dropped.

use thiserror::Error;

use crate::api::{Attachment, ChatBackend, Interaction, InteractionId, QueryResponse};
use crate::error::ClientResult;
use crate::response::AiResponse;

/// AI message appended when a send fails for any reason
pub const SEND_FAILED_MESSAGE: &str = "An error occurred. Please check the console and backend logs.";

pub const FEEDBACK_SUBMITTED: &str = "Feedback submitted!";
pub const FEEDBACK_FAILED: &str = "Feedback could not be submitted.";

/// Follow-up query issued when a vision tag is chosen
pub fn tag_query(tag: &str) -> String {
    format!("Tell me more about {}", tag)
}

// ============ Messages ============

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub sender: Sender,
    pub text: Option<String>,
    /// Set on AI messages that answer a stored exchange
    pub interaction_id: Option<InteractionId>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: Some(text.into()),
            interaction_id: None,
        }
    }

    pub fn ai(text: Option<String>, interaction_id: Option<InteractionId>) -> Self {
        Self {
            sender: Sender::Ai,
            text,
            interaction_id,
        }
    }

    /// Presentation of an AI message; `None` for user messages, which are shown literally
    pub fn response(&self) -> Option<AiResponse> {
        match self.sender {
            Sender::Ai => Some(AiResponse::from_message_text(self.text.as_deref())),
            Sender::User => None,
        }
    }
}

// ============ Sending ============

/// A send accepted by [`ChatState::begin_send`], not yet dispatched
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSend {
    pub generation: u64,
    pub query: String,
    pub attachment: Option<Attachment>,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendRejected {
    #[error("A request is already in flight")]
    Busy,

    #[error("Nothing to send")]
    Empty,
}

#[derive(Debug, Clone, Default)]
pub struct ChatState {
    messages: Vec<Message>,
    input: String,
    attachment: Option<Attachment>,
    generation: u64,
    in_flight: Option<u64>,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// Replace the pending image; only one is kept
    pub fn attach(&mut self, attachment: Attachment) {
        self.attachment = Some(attachment);
    }

    pub fn detach(&mut self) -> Option<Attachment> {
        self.attachment.take()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Hint shown in the empty input box
    pub fn input_placeholder(&self) -> String {
        match &self.attachment {
            Some(attachment) => format!("Ask about {}...", attachment.file_name),
            None => "Ask anything or attach an image...".to_string(),
        }
    }

    /// Start a send.
    ///
    /// A non-empty `query_override` replaces the input text. On success the user
    /// message is already in the transcript and the input and attachment are cleared.
    pub fn begin_send(&mut self, query_override: Option<&str>) -> Result<PendingSend, SendRejected> {
        if self.is_busy() {
            return Err(SendRejected::Busy);
        }

        let query = match query_override {
            Some(query) if !query.is_empty() => query.to_string(),
            _ => self.input.clone(),
        };
        if query.trim().is_empty() && self.attachment.is_none() {
            return Err(SendRejected::Empty);
        }

        self.messages.push(Message::user(query.clone()));
        self.input.clear();
        let attachment = self.attachment.take();

        self.generation += 1;
        self.in_flight = Some(self.generation);

        tracing::debug!(
            generation = self.generation,
            with_image = attachment.is_some(),
            "Send started"
        );

        Ok(PendingSend {
            generation: self.generation,
            query,
            attachment,
        })
    }

    /// Apply the outcome of a dispatched send.
    ///
    /// Returns `false` and changes nothing when `generation` is not the one in
    /// flight.
    pub fn complete(&mut self, generation: u64, outcome: ClientResult<QueryResponse>) -> bool {
        if self.in_flight != Some(generation) {
            tracing::debug!(generation, in_flight = ?self.in_flight, "Ignoring stale response");
            return false;
        }
        self.in_flight = None;

        let message = match outcome {
            Ok(response) => Message::ai(response.ai_response, Some(response.id)),
            Err(e) => {
                tracing::error!(error = %e, generation, "Chat request failed");
                Message::ai(Some(SEND_FAILED_MESSAGE.to_string()), None)
            }
        };
        self.messages.push(message);
        true
    }

    /// Forget the request in flight so its response is discarded
    pub fn abandon(&mut self) {
        if let Some(generation) = self.in_flight.take() {
            tracing::debug!(generation, "Abandoned request in flight");
        }
    }

    /// Start an empty transcript, abandoning any request in flight.
    ///
    /// The generation keeps counting so a response from before the reset can
    /// never match a later send.
    pub fn reset(&mut self) {
        self.abandon();
        self.messages.clear();
        self.input.clear();
        self.attachment = None;
    }

    /// Append stored exchanges, oldest first.
    ///
    /// The history endpoint returns newest first, so the page is replayed in
    /// reverse. Refused while a send is in flight.
    pub fn replay_history(&mut self, records: &[Interaction]) -> Result<usize, SendRejected> {
        if self.is_busy() {
            return Err(SendRejected::Busy);
        }

        for record in records.iter().rev() {
            self.messages.push(Message::user(record.user_query.clone()));
            self.messages
                .push(Message::ai(record.ai_response.clone(), Some(record.id.clone())));
        }
        Ok(records.len())
    }

    /// Start a send, dispatch it and apply the result in one step.
    ///
    /// Holds `&mut self` across the call, which suits the terminal loop; the web
    /// front-end drives the three steps itself.
    pub async fn send<B>(&mut self, backend: &B, query_override: Option<&str>) -> Result<bool, SendRejected>
    where
        B: ChatBackend + ?Sized,
    {
        let pending = self.begin_send(query_override)?;
        let outcome = dispatch(backend, &pending).await;
        Ok(self.complete(pending.generation, outcome))
    }
}

/// Issue the single backend call for a pending send
pub async fn dispatch<B>(backend: &B, pending: &PendingSend) -> ClientResult<QueryResponse>
where
    B: ChatBackend + ?Sized,
{
    match &pending.attachment {
        Some(image) => backend.image_query(&pending.query, image).await,
        None => backend.text_query(&pending.query).await,
    }
}

// ============ Feedback ============

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Good,
    Bad,
}

impl Vote {
    pub fn is_good(self) -> bool {
        self == Vote::Good
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackOutcome {
    /// No interaction id, nothing was sent
    Skipped,
    Submitted,
    Failed,
}

impl FeedbackOutcome {
    /// Acknowledgement to show the user, if any
    pub fn message(self) -> Option<&'static str> {
        match self {
            FeedbackOutcome::Skipped => None,
            FeedbackOutcome::Submitted => Some(FEEDBACK_SUBMITTED),
            FeedbackOutcome::Failed => Some(FEEDBACK_FAILED),
        }
    }
}

/// Vote on an AI message. Never retried.
pub async fn submit_feedback<B>(
    backend: &B,
    interaction_id: Option<&InteractionId>,
    vote: Vote,
) -> FeedbackOutcome
where
    B: ChatBackend + ?Sized,
{
    let Some(id) = interaction_id else {
        return FeedbackOutcome::Skipped;
    };

    match backend.submit_feedback(id, vote.is_good()).await {
        Ok(()) => {
            tracing::info!(interaction_id = %id, is_good = vote.is_good(), "Feedback submitted");
            FeedbackOutcome::Submitted
        }
        Err(e) => {
            tracing::error!(interaction_id = %id, error = %e, "Failed to submit feedback");
            FeedbackOutcome::Failed
        }
    }
}
