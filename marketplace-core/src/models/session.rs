use serde::{Deserialize, Serialize};
use std::fmt;

use super::Role;

/// The authenticated identity of this client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub email: String,
    pub role: Role,
}

impl Session {
    pub fn new(token: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            token: token.into(),
            email: email.into(),
            role,
        }
    }

    /// Token with everything but the ends masked, for status output.
    pub fn masked_token(&self) -> String {
        let token = &self.token;
        if token.len() > 8 && token.is_ascii() {
            format!("{}...{}", &token[..4], &token[token.len() - 4..])
        } else {
            "****".to_string()
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.email, self.role)
    }
}
