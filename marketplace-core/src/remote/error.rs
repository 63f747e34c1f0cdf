//! Remote API error types.

use thiserror::Error;

/// Errors returned by a [`RemoteClient`](super::RemoteClient).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// 401/403: the token is missing, expired or lacks the role.
    #[error("Not authorized: {}", .0.as_deref().unwrap_or("session rejected by server"))]
    Unauthorized(Option<String>),

    /// 404: the entity no longer exists on the server.
    #[error("Not found: {}", .0.as_deref().unwrap_or("entity no longer exists"))]
    NotFound(Option<String>),

    /// Any other non-success status.
    #[error("Server returned status {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Server { status: u16, message: Option<String> },

    /// The request never produced a response.
    #[error("Request failed: {0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Message supplied by the server in its error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            RemoteError::Unauthorized(message) | RemoteError::NotFound(message) => {
                message.as_deref()
            }
            RemoteError::Server { message, .. } => message.as_deref(),
            RemoteError::Transport(_) | RemoteError::Decode(_) => None,
        }
    }

    /// Classifies a non-success HTTP status and its optional error message.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            401 | 403 => RemoteError::Unauthorized(message),
            404 => RemoteError::NotFound(message),
            _ => RemoteError::Server { status, message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert_eq!(
            RemoteError::from_status(401, None),
            RemoteError::Unauthorized(None)
        );
        assert_eq!(
            RemoteError::from_status(403, Some("Unauthorized".into())),
            RemoteError::Unauthorized(Some("Unauthorized".into()))
        );
        assert_eq!(
            RemoteError::from_status(404, None),
            RemoteError::NotFound(None)
        );
        assert_eq!(
            RemoteError::from_status(422, Some("Invalid data".into())),
            RemoteError::Server {
                status: 422,
                message: Some("Invalid data".into())
            }
        );
    }

    #[test]
    fn test_server_message() {
        let err = RemoteError::from_status(400, Some("Email already registered".into()));
        assert_eq!(err.server_message(), Some("Email already registered"));
        assert_eq!(RemoteError::Transport("refused".into()).server_message(), None);
    }

    #[test]
    fn test_display() {
        let err = RemoteError::Server {
            status: 500,
            message: None,
        };
        assert_eq!(err.to_string(), "Server returned status 500: no details");
        assert_eq!(
            RemoteError::NotFound(Some("Item not found".into())).to_string(),
            "Not found: Item not found"
        );
    }
}
