//! UI Components
//!
//! Reusable Leptos components for the chat screen.

pub mod chart;
pub mod chat_message;
pub mod header;
pub mod loading;
pub mod toast;

pub use chart::VegaChart;
pub use chat_message::ChatMessage;
pub use header::Header;
pub use loading::{InlineLoading, Thinking};
pub use toast::Toast;
