use thiserror::Error;

/// Errors returned by the FastEdge API client.
///
/// Every variant carries plain text so that one outcome can be handed to
/// several awaiting callers of a shared request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The request could not be sent, the server answered with a
    /// non-success status, or the response body could not be decoded.
    #[error("{context}: {message}")]
    Request {
        /// Operation label, e.g. "Error fetching application".
        context: &'static str,
        /// HTTP status code, when a response was received.
        status: Option<u16>,
        /// Status text or the lower-level error message.
        message: String,
    },

    /// A lookup by name matched nothing.
    #[error("{kind} with name \"{name}\" not found")]
    NotFound {
        /// Resource kind, e.g. "Application".
        kind: &'static str,
        /// The name that was searched for.
        name: String,
    },

    /// The underlying HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl Error {
    /// Whether this error is a name lookup that found nothing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// HTTP status code attached to a failed request.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Request { status, .. } => *status,
            _ => None,
        }
    }
}

/// Result type for fastedge-api operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Request {
            context: "Error fetching application",
            status: Some(404),
            message: "Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "Error fetching application: Not Found");
        assert_eq!(err.status(), Some(404));

        let err = Error::NotFound {
            kind: "Secret",
            name: "db-password".to_string(),
        };
        assert_eq!(err.to_string(), "Secret with name \"db-password\" not found");
        assert!(err.is_not_found());
        assert_eq!(err.status(), None);
    }
}
