//! Login / Registration Flow

use thiserror::Error;

use crate::api::ChatBackend;
use crate::session::AccessToken;

/// Which form the auth screen shows. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            AuthMode::Login => "SuperMaya AI Login",
            AuthMode::Register => "Register for SuperMaya",
        }
    }

    pub fn submit_label(self) -> &'static str {
        match self {
            AuthMode::Login => "Login",
            AuthMode::Register => "Register & Login",
        }
    }

    /// Text of the button that switches to the other mode
    pub fn toggle_hint(self) -> &'static str {
        match self {
            AuthMode::Login => "Don't have an account? Register",
            AuthMode::Register => "Already have an account? Login",
        }
    }
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Both fields non-blank
    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Failure shown on the auth screen. The cause is logged, not displayed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("Registration failed.")]
    Registration,

    #[error("Login failed. Invalid credentials.")]
    Login,
}

impl AuthFailure {
    pub fn for_mode(mode: AuthMode) -> Self {
        match mode {
            AuthMode::Login => AuthFailure::Login,
            AuthMode::Register => AuthFailure::Registration,
        }
    }
}

/// Run the submit action for `mode` and return the issued token.
///
/// Register mode registers and then logs in with the same credentials. If
/// registration fails, login is not attempted. Any failure maps to the
/// mode's message.
pub async fn authenticate<B>(
    backend: &B,
    mode: AuthMode,
    credentials: &Credentials,
) -> Result<AccessToken, AuthFailure>
where
    B: ChatBackend + ?Sized,
{
    let failure = AuthFailure::for_mode(mode);

    if mode == AuthMode::Register {
        if let Err(e) = backend.register(&credentials.email, &credentials.password).await {
            tracing::error!(email = %credentials.email, error = %e, "Registration failed");
            return Err(failure);
        }
        tracing::info!(email = %credentials.email, "Registered");
    }

    match backend.login(&credentials.email, &credentials.password).await {
        Ok(response) => Ok(AccessToken::new(response.access_token)),
        Err(e) => {
            tracing::error!(email = %credentials.email, error = %e, "Login failed");
            Err(failure)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeBackend};

    fn credentials() -> Credentials {
        Credentials::new("maya@example.com", "hunter2")
    }

    #[tokio::test]
    async fn test_login_mode_logs_in_directly() {
        let backend = FakeBackend::default();
        let token = authenticate(&backend, AuthMode::Login, &credentials()).await.unwrap();

        assert_eq!(token.as_str(), "test-token");
        assert_eq!(backend.calls(), vec![Call::Login("maya@example.com".to_string())]);
    }

    #[tokio::test]
    async fn test_register_mode_registers_then_logs_in() {
        let backend = FakeBackend::default();
        authenticate(&backend, AuthMode::Register, &credentials()).await.unwrap();

        assert_eq!(
            backend.calls(),
            vec![
                Call::Register("maya@example.com".to_string()),
                Call::Login("maya@example.com".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_register_failure_skips_login() {
        let backend = FakeBackend {
            fail_register: true,
            ..Default::default()
        };
        let err = authenticate(&backend, AuthMode::Register, &credentials())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Registration failed.");
        assert_eq!(backend.calls(), vec![Call::Register("maya@example.com".to_string())]);
    }

    #[tokio::test]
    async fn test_login_failure_messages_follow_mode() {
        let backend = FakeBackend {
            fail_login: true,
            ..Default::default()
        };

        let err = authenticate(&backend, AuthMode::Login, &credentials()).await.unwrap_err();
        assert_eq!(err.to_string(), "Login failed. Invalid credentials.");

        // Registration succeeded but the follow-up login did not
        let err = authenticate(&backend, AuthMode::Register, &credentials())
            .await
            .unwrap_err();
        assert_eq!(err, AuthFailure::Registration);
    }

    #[test]
    fn test_mode_labels() {
        let mode = AuthMode::default();
        assert_eq!(mode.title(), "SuperMaya AI Login");
        assert_eq!(mode.submit_label(), "Login");
        assert_eq!(mode.toggle_hint(), "Don't have an account? Register");

        let mode = mode.toggled();
        assert_eq!(mode.title(), "Register for SuperMaya");
        assert_eq!(mode.submit_label(), "Register & Login");
        assert_eq!(mode.toggle_hint(), "Already have an account? Login");
        assert_eq!(mode.toggled(), AuthMode::Login);
    }

    #[test]
    fn test_credentials_completeness_and_debug() {
        assert!(credentials().is_complete());
        assert!(!Credentials::new("  ", "pw").is_complete());
        assert!(!Credentials::new("a@b.c", "").is_complete());
        assert!(!format!("{:?}", credentials()).contains("hunter2"));
    }
}
