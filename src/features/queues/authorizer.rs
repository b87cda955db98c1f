use std::sync::Arc;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::queues::models::QueueSet;
use crate::features::queues::store::QueueStore;

/// Decides whether a user may process (not just view) tickets in a queue set
#[async_trait]
pub trait QueueSetAuthorizer: Send + Sync {
    async fn is_permissioned_for_user(
        &self,
        queue_set: &QueueSet,
        user: &AuthenticatedUser,
    ) -> Result<bool>;
}

/// Grants super admins, and users explicitly added to the queue set
pub struct MembershipAuthorizer {
    store: Arc<dyn QueueStore>,
}

impl MembershipAuthorizer {
    pub fn new(store: Arc<dyn QueueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl QueueSetAuthorizer for MembershipAuthorizer {
    async fn is_permissioned_for_user(
        &self,
        queue_set: &QueueSet,
        user: &AuthenticatedUser,
    ) -> Result<bool> {
        if user.is_super_admin() {
            return Ok(true);
        }
        if !queue_set.active {
            return Ok(false);
        }
        self.store.is_queue_set_user(queue_set.id, &user.sub).await
    }
}
