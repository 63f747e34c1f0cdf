//! Role-based access decisions for views.

use std::fmt;

use crate::models::{Role, Session};
use crate::session::SessionStore;

/// What a view requires of the signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    RequiresCustomer,
    RequiresSeller,
    /// Any signed-in role.
    Public,
}

impl Capability {
    fn permits(self, role: Role) -> bool {
        match self {
            Capability::RequiresCustomer => role == Role::Customer,
            Capability::RequiresSeller => role == Role::Seller,
            Capability::Public => true,
        }
    }
}

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectToLogin,
    RedirectToHome,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow => write!(f, "allow"),
            Decision::RedirectToLogin => write!(f, "redirect to login"),
            Decision::RedirectToHome => write!(f, "redirect to home"),
        }
    }
}

/// Decides whether a protected view may render.
pub struct AccessGuard;

impl AccessGuard {
    /// Pure decision over a capability and an optional session.
    pub fn decide(capability: Capability, session: Option<&Session>) -> Decision {
        match session {
            None => Decision::RedirectToLogin,
            Some(session) if !capability.permits(session.role) => Decision::RedirectToHome,
            Some(_) => Decision::Allow,
        }
    }

    /// Reads the current session from `store` and decides.
    pub fn check(store: &SessionStore, capability: Capability) -> Decision {
        let decision = Self::decide(capability, store.get().as_ref());
        tracing::debug!(?capability, %decision, "access check");
        decision
    }
}
