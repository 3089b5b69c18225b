//! SuperMaya Backend Contract
//!
//! Wire types, endpoint paths and the [`ChatBackend`] trait implemented by the
//! native reqwest client ([`client::ApiClient`]) and by the browser client in
//! `supermaya-ui`.

pub mod endpoints;

#[cfg(feature = "native")]
pub mod client;

#[cfg(feature = "native")]
pub use client::ApiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ClientResult;

/// Default backend base URL
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

// ============ Identifiers ============

/// Opaque identifier of one chat exchange, used to key feedback votes.
///
/// The backend sends an integer today; strings are accepted as well and both are
/// kept in their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawInteractionId", into = "String")]
pub struct InteractionId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInteractionId {
    Int(i64),
    Text(String),
}

impl From<RawInteractionId> for InteractionId {
    fn from(raw: RawInteractionId) -> Self {
        match raw {
            RawInteractionId::Int(n) => InteractionId(n.to_string()),
            RawInteractionId::Text(s) => InteractionId(s),
        }
    }
}

impl From<InteractionId> for String {
    fn from(id: InteractionId) -> Self {
        id.0
    }
}

impl InteractionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InteractionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============ Request Types ============

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct TextQueryRequest<'a> {
    pub user_query: &'a str,
}

/// An image selected for an image query
#[derive(Clone, PartialEq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Guess an image MIME type from a file name; `None` for anything that is not an image
    pub fn image_content_type(file_name: &str) -> Option<&'static str> {
        let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some("image/png"),
            "jpg" | "jpeg" => Some("image/jpeg"),
            "gif" => Some("image/gif"),
            "webp" => Some("image/webp"),
            "bmp" => Some("image/bmp"),
            _ => None,
        }
    }

    /// Load an image from disk
    #[cfg(feature = "native")]
    pub async fn from_path(path: &std::path::Path) -> ClientResult<Self> {
        use crate::error::ClientError;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| ClientError::Attachment(format!("{:?} is not a file", path)))?;
        let content_type = Self::image_content_type(&file_name)
            .ok_or_else(|| ClientError::Attachment(format!("{} is not an image", file_name)))?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ClientError::Attachment(format!("{}: {}", file_name, e)))?;

        Ok(Self::new(file_name, content_type, bytes))
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Paging window for the history endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryPage {
    pub skip: u32,
    pub limit: u32,
}

impl Default for HistoryPage {
    fn default() -> Self {
        Self { skip: 0, limit: 10 }
    }
}

// ============ Response Types ============

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Answer to a text or image query
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    pub id: InteractionId,
    #[serde(default)]
    pub ai_response: Option<String>,
}

/// One stored exchange returned by the history endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    pub id: InteractionId,
    pub user_query: String,
    #[serde(default)]
    pub ai_response: Option<String>,
    #[serde(default)]
    pub created_at: Option<chrono::NaiveDateTime>,
    #[serde(default)]
    pub owner_id: Option<i64>,
    /// -1 bad, 0 none, 1 good
    #[serde(default)]
    pub feedback_score: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub system_prompt: String,
}

/// Reduce an error body to something readable.
///
/// FastAPI answers `{"detail": "..."}` or `{"detail": [{"msg": ...}, ...]}`;
/// anything else is returned trimmed, or the fallback when empty.
pub fn error_message(body: &str, fallback: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        match value.get("detail") {
            Some(serde_json::Value::String(detail)) => return detail.clone(),
            Some(serde_json::Value::Array(items)) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                if !messages.is_empty() {
                    return messages.join("; ");
                }
            }
            _ => {}
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

// ============ Backend Contract ============

/// One call per backend operation.
///
/// Implementations attach the stored bearer token to every call except
/// [`register`](ChatBackend::register), log failures and hand them back unchanged.
/// They never retry.
#[async_trait(?Send)]
pub trait ChatBackend {
    /// Create an account. Never authenticated.
    async fn register(&self, email: &str, password: &str) -> ClientResult<()>;

    /// Exchange credentials for an access token (multipart `username`/`password`)
    async fn login(&self, email: &str, password: &str) -> ClientResult<LoginResponse>;

    async fn text_query(&self, query: &str) -> ClientResult<QueryResponse>;

    /// Ask about an image (multipart `user_query`/`image`)
    async fn image_query(&self, query: &str, image: &Attachment) -> ClientResult<QueryResponse>;

    async fn submit_feedback(&self, interaction_id: &InteractionId, is_good: bool) -> ClientResult<()>;

    async fn history(&self, page: HistoryPage) -> ClientResult<Vec<Interaction>>;

    async fn profile(&self) -> ClientResult<UserProfile>;

    /// Replace the per-user system prompt (multipart `prompt`)
    async fn update_system_prompt(&self, prompt: &str) -> ClientResult<UserProfile>;
}
