//! Client error types
//!
//! Every backend call funnels its failures into [`ClientError`]. Errors carry
//! strings rather than transport-specific sources so the same type works for the
//! native reqwest client and the browser client.

use thiserror::Error;

/// Errors that can occur while talking to the SuperMaya backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The request could not be constructed (bad header, invalid multipart part, ...)
    #[error("Request build error: {0}")]
    Request(String),

    /// Transport failure: connection refused, DNS, TLS, aborted fetch
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-2xx status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// The session token could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// The selected attachment is unreadable or not an image
    #[error("Invalid attachment: {0}")]
    Attachment(String),
}

impl ClientError {
    /// Status code for backend rejections, if this error is one
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend rejected the credentials (401/403)
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::Api {
            status: 401,
            message: "Incorrect email or password".to_string(),
        };
        assert_eq!(err.to_string(), "API error 401: Incorrect email or password");

        let err = ClientError::Network("connection refused".to_string());
        assert_eq!(err.to_string(), "Network error: connection refused");
    }

    #[test]
    fn test_unauthorized_detection() {
        let err = ClientError::Api {
            status: 401,
            message: String::new(),
        };
        assert!(err.is_unauthorized());
        assert!(!ClientError::Network("x".to_string()).is_unauthorized());
        assert_eq!(ClientError::Parse("x".to_string()).status(), None);
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ClientError = json_err.into();
        assert!(matches!(err, ClientError::Parse(_)));
    }
}
