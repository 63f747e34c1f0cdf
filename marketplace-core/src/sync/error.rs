//! The user-facing failure signal of synchronizer operations.

use std::fmt;

use crate::remote::RemoteError;

/// Failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad local input; nothing was sent.
    Validation,
    /// No session, or the server rejected it.
    Auth,
    /// The entity vanished server-side (or is unknown locally).
    NotFound,
    /// Network or server failure.
    Transport,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Auth => write!(f, "auth"),
            ErrorKind::NotFound => write!(f, "not found"),
            ErrorKind::Transport => write!(f, "transport"),
        }
    }
}

impl From<&RemoteError> for ErrorKind {
    fn from(err: &RemoteError) -> Self {
        match err {
            RemoteError::Unauthorized(_) => ErrorKind::Auth,
            RemoteError::NotFound(_) => ErrorKind::NotFound,
            RemoteError::Server { .. } | RemoteError::Transport(_) | RemoteError::Decode(_) => {
                ErrorKind::Transport
            }
        }
    }
}

/// The operation boundary a failure was reported at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Register,
    Login,
    Browse,
    FetchCart,
    AddToCart,
    UpdateCart,
    RemoveCartLine,
    LoadInventory,
    CreateShop,
    DeleteShop,
    CreateItem,
    UpdateItem,
    DeleteItem,
}

impl Operation {
    /// Message shown when the server gives no better one.
    pub fn generic_message(self) -> &'static str {
        match self {
            Operation::Register => "Registration failed",
            Operation::Login => "Login failed",
            Operation::Browse => "Failed to fetch items",
            Operation::FetchCart => "Failed to fetch cart items",
            Operation::AddToCart => "Failed to add item to cart",
            Operation::UpdateCart => "Failed to update cart",
            Operation::RemoveCartLine => "Failed to remove item from cart",
            Operation::LoadInventory => "Failed to fetch shops and items",
            Operation::CreateShop => "Failed to create shop",
            Operation::DeleteShop => "Failed to delete shop",
            Operation::CreateItem => "Failed to add item",
            Operation::UpdateItem => "Failed to update item",
            Operation::DeleteItem => "Failed to delete item",
        }
    }
}

/// A single user-facing notification: which operation failed, how, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub operation: Operation,
    pub kind: ErrorKind,
    pub message: String,
}

impl Failure {
    pub fn new(operation: Operation, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
        }
    }

    /// Bad local input. Reported before any request is made.
    pub fn validation(operation: Operation, message: impl Into<String>) -> Self {
        Self::new(operation, ErrorKind::Validation, message)
    }

    pub fn not_found(operation: Operation, message: impl Into<String>) -> Self {
        Self::new(operation, ErrorKind::NotFound, message)
    }

    /// No session to take a token from.
    pub fn signed_out(operation: Operation) -> Self {
        Self::new(operation, ErrorKind::Auth, "Please log in first")
    }

    /// Wraps a remote error, preferring the server's own message.
    pub fn from_remote(operation: Operation, err: &RemoteError) -> Self {
        let message = err
            .server_message()
            .unwrap_or(operation.generic_message())
            .to_string();
        Self::new(operation, ErrorKind::from(err), message)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Failure {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_remote_prefers_server_message() {
        let err = RemoteError::Server {
            status: 400,
            message: Some("Shop name already used".into()),
        };
        let failure = Failure::from_remote(Operation::CreateShop, &err);
        assert_eq!(failure.kind, ErrorKind::Transport);
        assert_eq!(failure.to_string(), "Shop name already used");
    }

    #[test]
    fn test_from_remote_falls_back_to_generic() {
        let err = RemoteError::Transport("connection refused".into());
        let failure = Failure::from_remote(Operation::CreateShop, &err);
        assert_eq!(failure.message, "Failed to create shop");
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            ErrorKind::from(&RemoteError::Unauthorized(None)),
            ErrorKind::Auth
        );
        assert_eq!(
            ErrorKind::from(&RemoteError::NotFound(None)),
            ErrorKind::NotFound
        );
        assert_eq!(
            ErrorKind::from(&RemoteError::Decode("eof".into())),
            ErrorKind::Transport
        );
    }
}
