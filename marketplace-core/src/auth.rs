//! Account registration, login and logout.

use std::sync::Arc;

use crate::models::{Role, Session};
use crate::remote::{Account, RemoteClient};
use crate::session::{SessionError, SessionStore};
use crate::sync::{Failure, Operation};

/// Signs users in and out of the shared [`SessionStore`].
pub struct Authenticator {
    remote: Arc<dyn RemoteClient>,
    session: Arc<SessionStore>,
}

impl Authenticator {
    pub fn new(remote: Arc<dyn RemoteClient>, session: Arc<SessionStore>) -> Self {
        Self { remote, session }
    }

    /// Creates an account. Does not sign in.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Account, AuthError> {
        let (email, password) = credentials(Operation::Register, email, password)?;
        let account = self
            .remote
            .register(email, password, role)
            .await
            .map_err(|e| Failure::from_remote(Operation::Register, &e))?;
        tracing::info!(email = %account.email, role = %account.role, "account registered");
        Ok(account)
    }

    /// Signs in and stores the session.
    ///
    /// On failure the previous session, if any, is left untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let (email, password) = credentials(Operation::Login, email, password)?;
        let session = self
            .remote
            .login(email, password)
            .await
            .map_err(|e| Failure::from_remote(Operation::Login, &e))?;
        self.session.set(&session)?;
        tracing::info!(email = %session.email, role = %session.role, "signed in");
        Ok(session)
    }

    /// Forgets the stored session.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.session.clear()?;
        Ok(())
    }
}

fn credentials<'a>(
    operation: Operation,
    email: &'a str,
    password: &'a str,
) -> Result<(&'a str, &'a str), Failure> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(Failure::validation(
            operation,
            "Email and password are required",
        ));
    }
    Ok((email, password))
}

/// Errors from [`Authenticator`].
#[derive(Debug)]
pub enum AuthError {
    /// The request was rejected or never sent.
    Failure(Failure),
    /// Signed in, but the session could not be stored or removed.
    SessionError(SessionError),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Failure(failure) => write!(f, "{}", failure),
            AuthError::SessionError(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::Failure(failure) => Some(failure),
            AuthError::SessionError(e) => Some(e),
        }
    }
}

impl From<Failure> for AuthError {
    fn from(failure: Failure) -> Self {
        AuthError::Failure(failure)
    }
}

impl From<SessionError> for AuthError {
    fn from(e: SessionError) -> Self {
        AuthError::SessionError(e)
    }
}
