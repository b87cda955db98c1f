use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::{ROLE_SUPER_ADMIN, ROLE_TICKETING_ADMIN};

/// The clinician making the request, as established by the bearer token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Stable user identifier; stored on tickets as creator, modifier and assignee
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    /// Check if user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_super_admin(&self) -> bool {
        self.has_role(ROLE_SUPER_ADMIN)
    }

    /// Queue set configuration is open to super admins and ticketing admins
    pub fn can_configure_queues(&self) -> bool {
        self.is_super_admin() || self.has_role(ROLE_TICKETING_ADMIN)
    }
}
