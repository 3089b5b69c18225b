//! Terminal Front-End
//!
//! [`App`] ties the configuration, the persisted session and a backend together
//! for the `supermaya` binary. Every command that talks to the chat endpoints
//! goes through [`App::require_chat`], so nothing is sent while the session is
//! on the auth screen.

pub mod render;
pub mod repl;

use anyhow::{bail, Result};
use std::sync::Arc;

use crate::api::{ApiClient, ChatBackend};
use crate::auth::{self, AuthMode, Credentials};
use crate::config::Config;
use crate::error::ClientError;
use crate::session::{FileTokenStore, Screen, Session, TokenStore};

/// Token store shared between the session and the HTTP client
pub type SharedTokenStore = Arc<dyn TokenStore + Send + Sync>;

pub struct App<B> {
    pub config: Config,
    pub session: Session<SharedTokenStore>,
    pub backend: B,
}

impl App<ApiClient> {
    /// Build the app against the real backend, restoring the token file
    pub fn from_config(config: Config) -> Self {
        let store: SharedTokenStore = Arc::new(FileTokenStore::new(config.session.token_file.clone()));
        let client = ApiClient::new(config.api.base_url.clone(), store.clone());
        tracing::debug!(base_url = %config.api.base_url, "Using backend");
        Self::new(config, store, client)
    }
}

impl<B: ChatBackend> App<B> {
    pub fn new(config: Config, store: SharedTokenStore, backend: B) -> Self {
        Self {
            config,
            session: Session::restore(store),
            backend,
        }
    }

    /// Fail unless a token is stored
    pub fn require_chat(&self) -> Result<()> {
        if self.session.screen() == Screen::Auth {
            bail!("Not logged in. Run `supermaya login` or `supermaya register` first.");
        }
        Ok(())
    }

    /// Log in or register, persisting the token on success.
    ///
    /// A token already on disk is discarded first; it may have expired on the
    /// server.
    pub async fn authenticate(&mut self, mode: AuthMode, credentials: &Credentials) -> Result<()> {
        if !credentials.is_complete() {
            bail!("Email and password are required.");
        }

        if self.session.is_logged_in() {
            tracing::info!("Replacing stored session token");
            self.session.logout()?;
        }

        self.session.begin_login()?;
        match auth::authenticate(&self.backend, mode, credentials).await {
            Ok(token) => {
                self.session.finish_login(token)?;
                Ok(())
            }
            Err(failure) => {
                self.session.fail_login()?;
                Err(failure.into())
            }
        }
    }

    pub fn logout(&mut self) -> Result<()> {
        self.session.logout()?;
        Ok(())
    }
}

/// Follow-up advice for a failed command, if there is any
pub fn error_hint(err: &anyhow::Error) -> Option<&'static str> {
    err.downcast_ref::<ClientError>()
        .filter(|e| e.is_unauthorized())
        .map(|_| "Your session may have expired. Run `supermaya login` again.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryTokenStore;
    use crate::testing::{Call, FakeBackend};

    fn app(store: MemoryTokenStore, backend: FakeBackend) -> App<FakeBackend> {
        App::new(Config::default(), Arc::new(store), backend)
    }

    #[tokio::test]
    async fn test_login_persists_token() {
        let mut app = app(MemoryTokenStore::new(), FakeBackend::default());
        assert!(app.require_chat().is_err());

        app.authenticate(AuthMode::Login, &Credentials::new("maya@example.com", "pw"))
            .await
            .unwrap();

        assert!(app.require_chat().is_ok());
        assert_eq!(
            app.session.store().load().map(|t| t.as_str().to_string()),
            Some("test-token".to_string())
        );
    }

    #[tokio::test]
    async fn test_login_replaces_stored_token() {
        let mut app = app(MemoryTokenStore::with_token("expired"), FakeBackend::default());
        assert!(app.require_chat().is_ok());

        app.authenticate(AuthMode::Login, &Credentials::new("maya@example.com", "pw"))
            .await
            .unwrap();

        assert_eq!(
            app.session.store().load().map(|t| t.as_str().to_string()),
            Some("test-token".to_string())
        );
        assert_eq!(app.backend.calls(), vec![Call::Login("maya@example.com".to_string())]);
    }

    #[tokio::test]
    async fn test_blank_credentials_never_reach_backend() {
        let mut app = app(MemoryTokenStore::new(), FakeBackend::default());
        let err = app
            .authenticate(AuthMode::Register, &Credentials::new("", ""))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Email and password are required.");
        assert!(app.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_login_stays_on_auth() {
        let backend = FakeBackend {
            fail_login: true,
            ..Default::default()
        };
        let mut app = app(MemoryTokenStore::new(), backend);

        let err = app
            .authenticate(AuthMode::Login, &Credentials::new("maya@example.com", "bad"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Login failed. Invalid credentials.");
        assert_eq!(app.session.screen(), Screen::Auth);
        assert_eq!(app.backend.calls(), vec![Call::Login("maya@example.com".to_string())]);
    }

    #[test]
    fn test_rejected_token_suggests_login() {
        let err: anyhow::Error = ClientError::Api {
            status: 401,
            message: "Could not validate credentials".to_string(),
        }
        .into();
        assert!(error_hint(&err).is_some());

        let err: anyhow::Error = ClientError::Network("refused".to_string()).into();
        assert_eq!(error_hint(&err), None);
        assert_eq!(error_hint(&anyhow::anyhow!("other")), None);
    }

    #[test]
    fn test_logout_returns_to_auth() {
        let mut app = app(MemoryTokenStore::with_token("abc"), FakeBackend::default());
        app.logout().unwrap();

        assert_eq!(app.session.screen(), Screen::Auth);
        assert!(app.session.store().load().is_none());
        assert!(app.logout().is_err());
    }
}
