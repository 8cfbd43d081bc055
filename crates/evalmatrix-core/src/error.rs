//! Error types.
//!
//! `ValidationError` covers local edits that are rejected before touching the
//! matrix. `BackendError` covers failures at the remote API boundary; it is
//! defined here so the grading session can report a batch-level failure
//! without depending on the HTTP client crate.

use thiserror::Error;

/// Rejected edit. The matrix is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Input is not a number or lies outside [0, 20].
    #[error("invalid score '{input}': expected a number between 0 and 20")]
    InvalidScore { input: String },

    /// The participant is not part of this session's roster.
    #[error("unknown participant: {0}")]
    UnknownParticipant(String),

    /// The competency is not part of this session's matrix.
    #[error("unknown competency: {0}")]
    UnknownCompetency(String),
}

/// Generic fallback shown when the server gives no message of its own.
pub const MSG_SERVER_ERROR: &str = "Une erreur est survenue.";
/// Shown when the server cannot be reached at all.
pub const MSG_NETWORK_ERROR: &str =
    "Impossible de se connecter au serveur. Veuillez vérifier votre connexion.";
/// Shown for anything else.
pub const MSG_UNEXPECTED_ERROR: &str = "Une erreur inattendue est survenue.";

/// Errors that can occur when talking to the training API.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The server answered with a non-2xx status.
    #[error("API error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// The server could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The response body did not have the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The session is not known to the backend.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// Local storage behind an offline backend failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl BackendError {
    /// Message suitable for showing to the person using the app.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Server { message, .. } if !message.trim().is_empty() => message.clone(),
            BackendError::Server { .. } => MSG_SERVER_ERROR.to_string(),
            BackendError::Network(_) | BackendError::Timeout(_) => MSG_NETWORK_ERROR.to_string(),
            BackendError::SessionNotFound(_) => MSG_SERVER_ERROR.to_string(),
            BackendError::Decode(_) | BackendError::Storage(_) => MSG_UNEXPECTED_ERROR.to_string(),
        }
    }

    /// HTTP status code, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_is_passed_through() {
        let err = BackendError::Server {
            status: 422,
            message: "Score manquant".into(),
        };
        assert_eq!(err.user_message(), "Score manquant");
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn empty_server_message_falls_back() {
        let err = BackendError::Server {
            status: 500,
            message: "  ".into(),
        };
        assert_eq!(err.user_message(), MSG_SERVER_ERROR);
    }

    #[test]
    fn transport_failures_use_network_message() {
        assert_eq!(
            BackendError::Network("refused".into()).user_message(),
            MSG_NETWORK_ERROR
        );
        assert_eq!(BackendError::Timeout(30).user_message(), MSG_NETWORK_ERROR);
        assert_eq!(BackendError::Timeout(30).status(), None);
    }

    #[test]
    fn validation_error_display() {
        let err = ValidationError::InvalidScore {
            input: "abc".into(),
        };
        assert!(err.to_string().contains("'abc'"));
    }
}
