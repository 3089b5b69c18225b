//! Session State
//!
//! The stored access token is the single source of truth for which screen is
//! active. [`Session`] wraps a [`TokenStore`] and makes the login lifecycle an
//! explicit state machine:
//!
//! ```text
//! LoggedOut --begin_login--> LoggingIn --finish_login--> LoggedIn
//!     ^                          |                           |
//!     +-------fail_login---------+                           |
//!     +------------------------logout------------------------+
//! ```

use std::fmt;
use std::sync::{Arc, RwLock};
use thiserror::Error;

use crate::error::{ClientError, ClientResult};

/// Storage key / file stem used for the persisted token
pub const TOKEN_KEY: &str = "supermaya_token";

/// Bearer credential issued at login
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Persistent home of the session token.
///
/// Read by the HTTP client before every request and written only on login and
/// logout.
pub trait TokenStore {
    fn load(&self) -> Option<AccessToken>;
    fn save(&self, token: &AccessToken) -> ClientResult<()>;
    fn clear(&self) -> ClientResult<()>;
}

impl<T: TokenStore + ?Sized> TokenStore for Arc<T> {
    fn load(&self) -> Option<AccessToken> {
        (**self).load()
    }

    fn save(&self, token: &AccessToken) -> ClientResult<()> {
        (**self).save(token)
    }

    fn clear(&self) -> ClientResult<()> {
        (**self).clear()
    }
}

/// Process-local store, used by tests and by embedders that manage persistence themselves
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<AccessToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(AccessToken::new(token))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<AccessToken> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    fn save(&self, token: &AccessToken) -> ClientResult<()> {
        let mut slot = self
            .token
            .write()
            .map_err(|e| ClientError::Storage(format!("Lock poisoned: {}", e)))?;
        *slot = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        let mut slot = self
            .token
            .write()
            .map_err(|e| ClientError::Storage(format!("Lock poisoned: {}", e)))?;
        *slot = None;
        Ok(())
    }
}

/// Token kept in a single file (`<config_dir>/supermaya/token` by default)
#[cfg(feature = "native")]
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: std::path::PathBuf,
}

#[cfg(feature = "native")]
impl FileTokenStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(feature = "native")]
impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<AccessToken> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                if token.is_empty() {
                    None
                } else {
                    Some(AccessToken::new(token))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = ?self.path, error = %e, "Failed to read token file");
                None
            }
        }
    }

    fn save(&self, token: &AccessToken) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token.as_str())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============ State Machine ============

/// Where the session is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    LoggedOut,
    LoggingIn,
    LoggedIn(AccessToken),
}

/// Which top-level screen to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Auth,
    Chat,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Cannot {action} while {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: &'static str,
    },

    #[error(transparent)]
    Storage(#[from] ClientError),
}

/// Login lifecycle over a token store
#[derive(Debug)]
pub struct Session<S: TokenStore> {
    store: S,
    phase: SessionPhase,
}

impl<S: TokenStore> Session<S> {
    /// Start from whatever the store holds: a stored token means logged in
    pub fn restore(store: S) -> Self {
        let phase = match store.load() {
            Some(token) => SessionPhase::LoggedIn(token),
            None => SessionPhase::LoggedOut,
        };
        tracing::debug!(phase = phase_name(&phase), "Session restored");
        Self { store, phase }
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn screen(&self) -> Screen {
        match self.phase {
            SessionPhase::LoggedIn(_) => Screen::Chat,
            SessionPhase::LoggedOut | SessionPhase::LoggingIn => Screen::Auth,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.phase, SessionPhase::LoggedIn(_))
    }

    pub fn is_logging_in(&self) -> bool {
        self.phase == SessionPhase::LoggingIn
    }

    pub fn token(&self) -> Option<&AccessToken> {
        match &self.phase {
            SessionPhase::LoggedIn(token) => Some(token),
            _ => None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// LoggedOut -> LoggingIn
    pub fn begin_login(&mut self) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::LoggedOut => {
                self.phase = SessionPhase::LoggingIn;
                Ok(())
            }
            _ => Err(self.invalid("log in")),
        }
    }

    /// LoggingIn -> LoggedIn, persisting the token first
    pub fn finish_login(&mut self, token: AccessToken) -> Result<(), SessionError> {
        if self.phase != SessionPhase::LoggingIn {
            return Err(self.invalid("finish login"));
        }
        self.store.save(&token)?;
        self.phase = SessionPhase::LoggedIn(token);
        tracing::info!("Logged in");
        Ok(())
    }

    /// LoggingIn -> LoggedOut
    pub fn fail_login(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::LoggingIn {
            return Err(self.invalid("abort login"));
        }
        self.phase = SessionPhase::LoggedOut;
        Ok(())
    }

    /// LoggedIn -> LoggedOut, deleting the stored token
    pub fn logout(&mut self) -> Result<(), SessionError> {
        if !self.is_logged_in() {
            return Err(self.invalid("log out"));
        }
        self.store.clear()?;
        self.phase = SessionPhase::LoggedOut;
        tracing::info!("Logged out");
        Ok(())
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            action,
            phase: phase_name(&self.phase),
        }
    }
}

fn phase_name(phase: &SessionPhase) -> &'static str {
    match phase {
        SessionPhase::LoggedOut => "logged out",
        SessionPhase::LoggingIn => "logging in",
        SessionPhase::LoggedIn(_) => "logged in",
    }
}
