//! Authenticated request identity.
//!
//! The auth collaborator verifies a credential, then constructs a
//! [`Session`] and passes it through the request context. Services that
//! need the caller's identity or role take `&Session` explicitly; there is
//! no ambient global state. Logout is dropping the value.

use serde::{Deserialize, Serialize};
use crate::id::UserId;
use crate::user::{Role, User};
use crate::Time;

/// An authenticated caller, as established by the external auth provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The authenticated account
    pub user_id: UserId,

    /// Role at the time of authentication
    pub role: Role,

    /// When the session was established
    pub issued_at: Time,
}

impl Session {
    /// Build a session for a verified account.
    pub fn for_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            issued_at: chrono::Utc::now(),
        }
    }

    /// Whether the caller may perform admin operations.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
