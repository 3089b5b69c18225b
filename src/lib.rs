//! # SuperMaya
//!
//! Client core for the SuperMaya AI assistant: a chat front-end that logs in to
//! the SuperMaya backend, sends text and image questions, and presents the
//! structured answers as charts, image analyses or rich text.
//!
//! ## Modules
//!
//! - [`api`]: wire types, endpoint paths and the [`ChatBackend`] contract
//! - [`session`]: token storage and the login state machine
//! - [`auth`]: login / registration flow
//! - [`chat`]: transcript state with single-flight sending and feedback
//! - [`response`]: classification of AI answers
//! - [`chart`]: dark chart theme and text rendering of simple charts
//!
//! With the default `native` feature the crate also provides the reqwest
//! [`ApiClient`], configuration, logging setup and the terminal front-end used by
//! the `supermaya` binary. The browser front-end (`supermaya-ui`) builds on the
//! core with default features off.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use supermaya::{ApiClient, ChatState, MemoryTokenStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new("http://localhost:8000", Arc::new(MemoryTokenStore::new()));
//!
//!     let mut chat = ChatState::new();
//!     chat.set_input("How did the NIFTY 50 do this month?");
//!     chat.send(&client, None).await?;
//!
//!     for message in chat.messages() {
//!         println!("{:?}", message.response());
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod chart;
pub mod chat;
pub mod error;
pub mod response;
pub mod session;

#[cfg(feature = "native")]
pub mod config;
#[cfg(feature = "native")]
pub mod logging;
#[cfg(feature = "native")]
pub mod terminal;

#[cfg(test)]
pub(crate) mod testing;

// Re-export top-level types for convenience
pub use api::{
    Attachment, ChatBackend, HistoryPage, Interaction, InteractionId, QueryResponse, UserProfile,
};

#[cfg(feature = "native")]
pub use api::ApiClient;

pub use auth::{authenticate, AuthFailure, AuthMode, Credentials};

pub use chart::{themed_spec, TextChart};

pub use chat::{ChatState, FeedbackOutcome, Message, PendingSend, SendRejected, Sender, Vote};

pub use error::{ClientError, ClientResult};

pub use response::AiResponse;

pub use session::{AccessToken, MemoryTokenStore, Screen, Session, SessionError, TokenStore};

#[cfg(feature = "native")]
pub use session::FileTokenStore;

#[cfg(feature = "native")]
pub use config::{Config, ConfigError};
