//! Role-based authorization guards.
//!
//! Processing tickets is gated per queue set by the queue set authorizer;
//! these guards only cover configuration of the registry itself.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Guard for queue registry configuration.
///
/// Allows users with the "super_admin" or "ticketing_admin" roles.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireTicketingAdmin(user): RequireTicketingAdmin) { ... }
/// ```
pub struct RequireTicketingAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireTicketingAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))?;

        if !user.can_configure_queues() {
            return Err(AppError::Forbidden(
                "Ticketing admin access required".to_string(),
            ));
        }

        Ok(RequireTicketingAdmin(user.clone()))
    }
}
