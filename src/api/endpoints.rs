//! Endpoint paths, shared by every client so the two front-ends cannot drift.

use super::{HistoryPage, InteractionId};

pub const REGISTER: &str = "/auth/register";
pub const TOKEN: &str = "/auth/token";
pub const CHAT_TEXT: &str = "/chat/text";
pub const CHAT_IMAGE: &str = "/chat/image";
pub const PROFILE: &str = "/users/me";
pub const SYSTEM_PROMPT: &str = "/users/me/prompt";

/// `/chat/feedback?interaction_id=..&is_good=..`
pub fn feedback(interaction_id: &InteractionId, is_good: bool) -> String {
    format!(
        "/chat/feedback?interaction_id={}&is_good={}",
        urlencoding::encode(interaction_id.as_str()),
        is_good
    )
}

/// `/chat/history?skip=..&limit=..`
pub fn history(page: HistoryPage) -> String {
    format!("/chat/history?skip={}&limit={}", page.skip, page.limit)
}

/// Join a base URL and a path, tolerating a trailing slash on the base
pub fn url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
