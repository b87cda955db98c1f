//! Persistence for the queue registry.

mod pg;

#[cfg(test)]
pub mod memory;

pub use pg::PgQueueStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::queues::models::{
    NewQueue, NewQueueSet, Priority, Queue, QueueSet, QueueSetCategory,
};

#[async_trait]
pub trait QueueStore: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<QueueSetCategory>>;

    /// Priorities in display order
    async fn list_priorities(&self) -> Result<Vec<Priority>>;

    async fn priority(&self, id: i32) -> Result<Option<Priority>>;

    /// Active queue sets ordered by name
    async fn list_queue_sets(&self) -> Result<Vec<QueueSet>>;

    async fn queue_set(&self, id: Uuid) -> Result<Option<QueueSet>>;

    async fn queue(&self, id: Uuid) -> Result<Option<Queue>>;

    /// Every queue of the set, active or not, ordered by creation
    async fn queues_in_set(&self, queue_set_id: Uuid) -> Result<Vec<Queue>>;

    /// Outcome queues of a queue in display order
    async fn outcomes_of(&self, queue_id: Uuid) -> Result<Vec<Queue>>;

    /// Create a queue set together with its initial queue in one transaction
    async fn create_queue_set(
        &self,
        queue_set: NewQueueSet,
        initial_queue: NewQueue,
    ) -> Result<(QueueSet, Queue)>;

    async fn create_queue(&self, queue: NewQueue) -> Result<Queue>;

    /// Returns false if the outcome already exists
    async fn add_outcome(
        &self,
        queue_id: Uuid,
        outcome_queue_id: Uuid,
        display_order: i32,
    ) -> Result<bool>;

    async fn grant_user(&self, queue_set_id: Uuid, user_id: &str) -> Result<()>;

    async fn is_queue_set_user(&self, queue_set_id: Uuid, user_id: &str) -> Result<bool>;
}
