//! Caller identity passed explicitly into workflows

use crate::core::error::{AdminError, AdminResult};
use uuid::Uuid;

/// Identity of whoever triggered a workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    /// Authenticated user
    User { user_id: Uuid },

    /// No authentication (public access)
    Anonymous,
}

impl AuthContext {
    pub fn user(user_id: Uuid) -> Self {
        AuthContext::User { user_id }
    }

    /// Get user_id if available
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            AuthContext::User { user_id } => Some(*user_id),
            AuthContext::Anonymous => None,
        }
    }

    /// The user id for audit fields, or an unauthorized error
    pub fn require_user(&self) -> AdminResult<Uuid> {
        self.user_id().ok_or_else(|| AdminError::Unauthorized {
            message: "a signed-in user is required to record createdBy/updatedBy".to_string(),
        })
    }
}
