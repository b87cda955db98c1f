use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::queues::models::{
    NewQueue, NewQueueSet, Priority, Queue, QueueSet, QueueSetCategory,
};
use crate::features::queues::store::QueueStore;

#[derive(Default)]
struct Registry {
    categories: Vec<QueueSetCategory>,
    priorities: Vec<Priority>,
    queue_sets: HashMap<Uuid, QueueSet>,
    queues: HashMap<Uuid, Queue>,
    /// queue id -> (outcome queue id, display order)
    outcomes: HashMap<Uuid, Vec<(Uuid, i32)>>,
    users: HashSet<(Uuid, String)>,
}

/// Queue registry held in memory, used by service and handler tests
#[derive(Default)]
pub struct InMemoryQueueStore {
    registry: RwLock<Registry>,
}

impl InMemoryQueueStore {
    /// Store seeded with the same priorities as the migration
    pub fn with_default_priorities() -> Self {
        let priorities = [(1, "Red", "red"), (2, "Amber", "amber"), (3, "Green", "green")]
            .into_iter()
            .map(|(id, name, colour)| Priority {
                id,
                name: name.to_string(),
                colour: colour.to_string(),
                display_order: id,
            })
            .collect();

        Self {
            registry: RwLock::new(Registry {
                priorities,
                ..Registry::default()
            }),
        }
    }

    pub async fn add_category(&self, name: &str) -> QueueSetCategory {
        let category = QueueSetCategory {
            id: Uuid::new_v4(),
            name: name.to_string(),
            active: true,
        };
        self.registry.write().await.categories.push(category.clone());
        category
    }

    pub async fn deactivate_queue(&self, queue_id: Uuid) {
        if let Some(queue) = self.registry.write().await.queues.get_mut(&queue_id) {
            queue.active = false;
        }
    }
}

#[async_trait]
impl QueueStore for InMemoryQueueStore {
    async fn list_categories(&self) -> Result<Vec<QueueSetCategory>> {
        let registry = self.registry.read().await;
        Ok(registry
            .categories
            .iter()
            .filter(|c| c.active)
            .cloned()
            .collect())
    }

    async fn list_priorities(&self) -> Result<Vec<Priority>> {
        let mut priorities = self.registry.read().await.priorities.clone();
        priorities.sort_by_key(|p| (p.display_order, p.id));
        Ok(priorities)
    }

    async fn priority(&self, id: i32) -> Result<Option<Priority>> {
        let registry = self.registry.read().await;
        Ok(registry.priorities.iter().find(|p| p.id == id).cloned())
    }

    async fn list_queue_sets(&self) -> Result<Vec<QueueSet>> {
        let registry = self.registry.read().await;
        let mut sets: Vec<QueueSet> = registry
            .queue_sets
            .values()
            .filter(|s| s.active)
            .cloned()
            .collect();
        sets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sets)
    }

    async fn queue_set(&self, id: Uuid) -> Result<Option<QueueSet>> {
        Ok(self.registry.read().await.queue_sets.get(&id).cloned())
    }

    async fn queue(&self, id: Uuid) -> Result<Option<Queue>> {
        Ok(self.registry.read().await.queues.get(&id).cloned())
    }

    async fn queues_in_set(&self, queue_set_id: Uuid) -> Result<Vec<Queue>> {
        let registry = self.registry.read().await;
        let mut queues: Vec<Queue> = registry
            .queues
            .values()
            .filter(|q| q.queue_set_id == queue_set_id)
            .cloned()
            .collect();
        queues.sort_by_key(|q| (q.created_at, q.id));
        Ok(queues)
    }

    async fn outcomes_of(&self, queue_id: Uuid) -> Result<Vec<Queue>> {
        let registry = self.registry.read().await;
        let mut outcomes = registry.outcomes.get(&queue_id).cloned().unwrap_or_default();
        outcomes.sort_by_key(|(_, order)| *order);
        Ok(outcomes
            .into_iter()
            .filter_map(|(id, _)| registry.queues.get(&id).cloned())
            .collect())
    }

    async fn create_queue_set(
        &self,
        queue_set: NewQueueSet,
        initial_queue: NewQueue,
    ) -> Result<(QueueSet, Queue)> {
        let now = Utc::now();
        let queue_set = queue_set.into_queue_set(Uuid::now_v7(), now);
        let queue = NewQueue {
            queue_set_id: queue_set.id,
            is_initial: true,
            ..initial_queue
        }
        .into_queue(Uuid::now_v7(), now);

        let mut registry = self.registry.write().await;
        registry.queue_sets.insert(queue_set.id, queue_set.clone());
        registry.queues.insert(queue.id, queue.clone());
        Ok((queue_set, queue))
    }

    async fn create_queue(&self, queue: NewQueue) -> Result<Queue> {
        let queue = queue.into_queue(Uuid::now_v7(), Utc::now());
        self.registry
            .write()
            .await
            .queues
            .insert(queue.id, queue.clone());
        Ok(queue)
    }

    async fn add_outcome(
        &self,
        queue_id: Uuid,
        outcome_queue_id: Uuid,
        display_order: i32,
    ) -> Result<bool> {
        let mut registry = self.registry.write().await;
        let outcomes = registry.outcomes.entry(queue_id).or_default();
        if outcomes.iter().any(|(id, _)| *id == outcome_queue_id) {
            return Ok(false);
        }
        outcomes.push((outcome_queue_id, display_order));
        Ok(true)
    }

    async fn grant_user(&self, queue_set_id: Uuid, user_id: &str) -> Result<()> {
        self.registry
            .write()
            .await
            .users
            .insert((queue_set_id, user_id.to_string()));
        Ok(())
    }

    async fn is_queue_set_user(&self, queue_set_id: Uuid, user_id: &str) -> Result<bool> {
        Ok(self
            .registry
            .read()
            .await
            .users
            .contains(&(queue_set_id, user_id.to_string())))
    }
}
