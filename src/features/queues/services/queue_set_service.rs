use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::queues::authorizer::QueueSetAuthorizer;
use crate::features::queues::dtos::{
    AddOutcomeDto, CreateQueueDto, CreateQueueSetDto, QueueResponseDto, QueueSetCreatedDto,
    QueueSetDetailDto, QueueSetResponseDto, QueueWithOutcomesDto,
};
use crate::features::queues::models::{
    FilterSettings, NewQueue, NewQueueSet, Priority, Queue, QueueSet, QueueSetCategory,
};
use crate::features::queues::store::QueueStore;

/// Service for the queue registry: lookups used by tickets plus admin configuration
pub struct QueueSetService {
    store: Arc<dyn QueueStore>,
    authorizer: Arc<dyn QueueSetAuthorizer>,
}

impl QueueSetService {
    pub fn new(store: Arc<dyn QueueStore>, authorizer: Arc<dyn QueueSetAuthorizer>) -> Self {
        Self { store, authorizer }
    }

    // =========================================================================
    // REFERENCE DATA
    // =========================================================================

    pub async fn list_priorities(&self) -> Result<Vec<Priority>> {
        self.store.list_priorities().await
    }

    pub async fn priority(&self, id: i32) -> Result<Priority> {
        self.store
            .priority(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Priority {} not found", id)))
    }

    pub async fn list_categories(&self) -> Result<Vec<QueueSetCategory>> {
        self.store.list_categories().await
    }

    pub async fn list_queue_sets(&self) -> Result<Vec<QueueSetResponseDto>> {
        let sets = self.store.list_queue_sets().await?;
        Ok(sets.into_iter().map(Into::into).collect())
    }

    // =========================================================================
    // LOOKUPS
    // =========================================================================

    pub async fn get_queue_set(&self, id: Uuid) -> Result<QueueSet> {
        self.store
            .queue_set(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Queue set {} not found", id)))
    }

    pub async fn get_queue(&self, id: Uuid) -> Result<Queue> {
        self.store
            .queue(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Queue {} not found", id)))
    }

    pub async fn queue_set_for_queue(&self, queue: &Queue) -> Result<QueueSet> {
        self.get_queue_set(queue.queue_set_id).await
    }

    pub async fn queues_of(&self, queue_set_id: Uuid, include_inactive: bool) -> Result<Vec<Queue>> {
        let queues = self.store.queues_in_set(queue_set_id).await?;
        Ok(queues
            .into_iter()
            .filter(|q| include_inactive || q.active)
            .collect())
    }

    /// Active queues a patient can be added to
    pub async fn initial_queues_of(&self, queue_set_id: Uuid) -> Result<Vec<Queue>> {
        let queues = self.queues_of(queue_set_id, false).await?;
        Ok(queues.into_iter().filter(|q| q.is_initial).collect())
    }

    /// Queues a ticket in `queue_id` may move to. Empty means the queue is terminal.
    pub async fn outcomes_of(&self, queue_id: Uuid) -> Result<Vec<Queue>> {
        self.store.outcomes_of(queue_id).await
    }

    pub async fn is_terminal(&self, queue_id: Uuid) -> Result<bool> {
        Ok(self.outcomes_of(queue_id).await?.is_empty())
    }

    /// Ids of every queue in the set with no outcomes, inactive queues included
    pub async fn terminal_queue_ids(&self, queue_set_id: Uuid) -> Result<Vec<Uuid>> {
        let mut terminal = Vec::new();
        for queue in self.queues_of(queue_set_id, true).await? {
            if self.is_terminal(queue.id).await? {
                terminal.push(queue.id);
            }
        }
        Ok(terminal)
    }

    pub async fn filter_settings_of(&self, queue_set_id: Uuid) -> Result<FilterSettings> {
        Ok(self.get_queue_set(queue_set_id).await?.filter_settings())
    }

    pub async fn is_permissioned_for_user(
        &self,
        queue_set: &QueueSet,
        user: &AuthenticatedUser,
    ) -> Result<bool> {
        self.authorizer.is_permissioned_for_user(queue_set, user).await
    }

    /// Fail with `Forbidden` unless the user may process tickets in the set
    pub async fn ensure_permissioned(
        &self,
        queue_set: &QueueSet,
        user: &AuthenticatedUser,
    ) -> Result<()> {
        if self.is_permissioned_for_user(queue_set, user).await? {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Not permitted to process tickets in queue set '{}'",
                queue_set.name
            )))
        }
    }

    /// Queue set with its active queues, their outcomes, and the caller's permission
    pub async fn detail(
        &self,
        queue_set_id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<QueueSetDetailDto> {
        let queue_set = self.get_queue_set(queue_set_id).await?;
        let can_process = self.is_permissioned_for_user(&queue_set, user).await?;

        let mut queues = Vec::new();
        for queue in self.queues_of(queue_set_id, false).await? {
            let outcome_queue_ids: Vec<Uuid> = self
                .outcomes_of(queue.id)
                .await?
                .into_iter()
                .map(|q| q.id)
                .collect();
            queues.push(QueueWithOutcomesDto {
                is_terminal: outcome_queue_ids.is_empty(),
                outcome_queue_ids,
                queue: queue.into(),
            });
        }

        Ok(QueueSetDetailDto {
            queue_set: queue_set.into(),
            queues,
            can_process,
        })
    }

    // =========================================================================
    // ADMIN
    // =========================================================================

    /// Create a queue set along with the queue tickets first enter
    pub async fn create_queue_set(&self, dto: CreateQueueSetDto) -> Result<QueueSetCreatedDto> {
        if let Some(category_id) = dto.category_id {
            let categories = self.store.list_categories().await?;
            if !categories.iter().any(|c| c.id == category_id) {
                return Err(AppError::NotFound(format!(
                    "Queue set category {} not found",
                    category_id
                )));
            }
        }

        let summary_link = dto.summary_link;
        let new_set = NewQueueSet {
            category_id: dto.category_id,
            name: dto.name,
            description: dto.description,
            allow_null_priority: dto.allow_null_priority,
            summary_link,
            filter_settings: dto.filter_settings.unwrap_or_default(),
        };
        // queue_set_id is filled in by the store once the set has an id
        let initial_queue = Self::new_queue(Uuid::nil(), dto.initial_queue, summary_link, true);

        let (queue_set, queue) = self.store.create_queue_set(new_set, initial_queue).await?;
        tracing::info!(
            "Created queue set '{}' ({}) with initial queue '{}'",
            queue_set.name,
            queue_set.id,
            queue.name
        );

        Ok(QueueSetCreatedDto {
            queue_set: queue_set.into(),
            initial_queue: queue.into(),
        })
    }

    pub async fn add_queue(
        &self,
        queue_set_id: Uuid,
        dto: CreateQueueDto,
    ) -> Result<QueueResponseDto> {
        let queue_set = self.get_queue_set(queue_set_id).await?;
        let is_initial = dto.is_initial;
        let queue = self
            .store
            .create_queue(Self::new_queue(
                queue_set.id,
                dto,
                queue_set.summary_link,
                is_initial,
            ))
            .await?;
        tracing::info!("Added queue '{}' to queue set {}", queue.name, queue_set.id);
        Ok(queue.into())
    }

    /// Allow tickets in `queue_id` to move to the outcome queue; returns the
    /// queue's outcomes afterwards
    pub async fn add_outcome(
        &self,
        queue_id: Uuid,
        dto: AddOutcomeDto,
    ) -> Result<Vec<QueueResponseDto>> {
        if queue_id == dto.outcome_queue_id {
            return Err(AppError::Validation(
                "A queue cannot be its own outcome".to_string(),
            ));
        }

        let queue = self.get_queue(queue_id).await?;
        let outcome = self.get_queue(dto.outcome_queue_id).await?;
        if queue.queue_set_id != outcome.queue_set_id {
            return Err(AppError::Validation(
                "Outcome queue must belong to the same queue set".to_string(),
            ));
        }

        let added = self
            .store
            .add_outcome(queue.id, outcome.id, dto.display_order)
            .await?;
        if !added {
            return Err(AppError::Conflict(format!(
                "Queue '{}' is already an outcome of '{}'",
                outcome.name, queue.name
            )));
        }
        tracing::info!("Added outcome '{}' to queue '{}'", outcome.name, queue.name);

        let outcomes = self.outcomes_of(queue.id).await?;
        Ok(outcomes.into_iter().map(Into::into).collect())
    }

    pub async fn grant_user(&self, queue_set_id: Uuid, user_id: &str) -> Result<()> {
        let queue_set = self.get_queue_set(queue_set_id).await?;
        self.store.grant_user(queue_set.id, user_id).await?;
        tracing::info!("Granted user {} access to queue set {}", user_id, queue_set.id);
        Ok(())
    }

    fn new_queue(
        queue_set_id: Uuid,
        dto: CreateQueueDto,
        default_summary_link: bool,
        is_initial: bool,
    ) -> NewQueue {
        NewQueue {
            queue_set_id,
            name: dto.name,
            description: dto.description,
            is_initial,
            summary_link: dto.summary_link.unwrap_or(default_summary_link),
            report_definition: dto.report_definition,
            assignment_fields: dto.assignment_fields,
        }
    }
}
