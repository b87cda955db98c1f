use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::queues::models::{
    NewQueue, NewQueueSet, Priority, Queue, QueueSet, QueueSetCategory,
};
use crate::features::queues::store::QueueStore;

const QUEUE_COLUMNS: &str = r#"
    q.id, q.queue_set_id, q.name, q.description, q.active, q.is_initial,
    q.summary_link, q.report_definition, q.assignment_fields, q.created_at
"#;

const QUEUE_SET_COLUMNS: &str = r#"
    id, category_id, name, description, allow_null_priority, summary_link,
    filter_priority, filter_subspecialty, filter_firm, filter_my_tickets,
    filter_closed_tickets, active, created_at
"#;

/// Queue registry stored in PostgreSQL
pub struct PgQueueStore {
    pool: PgPool,
}

impl PgQueueStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_queue(tx: &mut Transaction<'_, Postgres>, queue: &Queue) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO queues (
                id, queue_set_id, name, description, active, is_initial,
                summary_link, report_definition, assignment_fields, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(queue.id)
        .bind(queue.queue_set_id)
        .bind(&queue.name)
        .bind(&queue.description)
        .bind(queue.active)
        .bind(queue.is_initial)
        .bind(queue.summary_link)
        .bind(&queue.report_definition)
        .bind(Json(&queue.assignment_fields.0))
        .bind(queue.created_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert queue: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(())
    }
}

#[async_trait]
impl QueueStore for PgQueueStore {
    async fn list_categories(&self) -> Result<Vec<QueueSetCategory>> {
        sqlx::query_as::<_, QueueSetCategory>(
            "SELECT id, name, active FROM queue_set_categories WHERE active = TRUE ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list queue set categories: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn list_priorities(&self) -> Result<Vec<Priority>> {
        sqlx::query_as::<_, Priority>(
            "SELECT id, name, colour, display_order FROM ticket_priorities ORDER BY display_order, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list priorities: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn priority(&self, id: i32) -> Result<Option<Priority>> {
        sqlx::query_as::<_, Priority>(
            "SELECT id, name, colour, display_order FROM ticket_priorities WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get priority: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn list_queue_sets(&self) -> Result<Vec<QueueSet>> {
        sqlx::query_as::<_, QueueSet>(&format!(
            "SELECT {} FROM queue_sets WHERE active = TRUE ORDER BY name",
            QUEUE_SET_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list queue sets: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn queue_set(&self, id: Uuid) -> Result<Option<QueueSet>> {
        sqlx::query_as::<_, QueueSet>(&format!(
            "SELECT {} FROM queue_sets WHERE id = $1",
            QUEUE_SET_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get queue set: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn queue(&self, id: Uuid) -> Result<Option<Queue>> {
        sqlx::query_as::<_, Queue>(&format!(
            "SELECT {} FROM queues q WHERE q.id = $1",
            QUEUE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get queue: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn queues_in_set(&self, queue_set_id: Uuid) -> Result<Vec<Queue>> {
        sqlx::query_as::<_, Queue>(&format!(
            "SELECT {} FROM queues q WHERE q.queue_set_id = $1 ORDER BY q.created_at, q.id",
            QUEUE_COLUMNS
        ))
        .bind(queue_set_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list queues for set: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn outcomes_of(&self, queue_id: Uuid) -> Result<Vec<Queue>> {
        sqlx::query_as::<_, Queue>(&format!(
            r#"
            SELECT {}
            FROM queue_outcomes o
            JOIN queues q ON q.id = o.outcome_queue_id
            WHERE o.queue_id = $1
            ORDER BY o.display_order, q.name
            "#,
            QUEUE_COLUMNS
        ))
        .bind(queue_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list outcomes for queue: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn create_queue_set(
        &self,
        queue_set: NewQueueSet,
        initial_queue: NewQueue,
    ) -> Result<(QueueSet, Queue)> {
        let now = Utc::now();
        let queue_set = queue_set.into_queue_set(Uuid::now_v7(), now);
        let initial_queue = NewQueue {
            queue_set_id: queue_set.id,
            is_initial: true,
            ..initial_queue
        }
        .into_queue(Uuid::now_v7(), now);

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query(
            r#"
            INSERT INTO queue_sets (
                id, category_id, name, description, allow_null_priority, summary_link,
                filter_priority, filter_subspecialty, filter_firm, filter_my_tickets,
                filter_closed_tickets, active, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(queue_set.id)
        .bind(queue_set.category_id)
        .bind(&queue_set.name)
        .bind(&queue_set.description)
        .bind(queue_set.allow_null_priority)
        .bind(queue_set.summary_link)
        .bind(queue_set.filter_priority)
        .bind(queue_set.filter_subspecialty)
        .bind(queue_set.filter_firm)
        .bind(queue_set.filter_my_tickets)
        .bind(queue_set.filter_closed_tickets)
        .bind(queue_set.active)
        .bind(queue_set.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert queue set: {:?}", e);
            AppError::Database(e)
        })?;

        Self::insert_queue(&mut tx, &initial_queue).await?;

        tx.commit().await.map_err(AppError::Database)?;

        Ok((queue_set, initial_queue))
    }

    async fn create_queue(&self, queue: NewQueue) -> Result<Queue> {
        let queue = queue.into_queue(Uuid::now_v7(), Utc::now());

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        Self::insert_queue(&mut tx, &queue).await?;
        tx.commit().await.map_err(AppError::Database)?;

        Ok(queue)
    }

    async fn add_outcome(
        &self,
        queue_id: Uuid,
        outcome_queue_id: Uuid,
        display_order: i32,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO queue_outcomes (queue_id, outcome_queue_id, display_order)
            VALUES ($1, $2, $3)
            ON CONFLICT (queue_id, outcome_queue_id) DO NOTHING
            "#,
        )
        .bind(queue_id)
        .bind(outcome_queue_id)
        .bind(display_order)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to add queue outcome: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(result.rows_affected() == 1)
    }

    async fn grant_user(&self, queue_set_id: Uuid, user_id: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO queue_set_users (queue_set_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (queue_set_id, user_id) DO NOTHING
            "#,
        )
        .bind(queue_set_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to grant queue set user: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(())
    }

    async fn is_queue_set_user(&self, queue_set_id: Uuid, user_id: &str) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM queue_set_users WHERE queue_set_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(queue_set_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check queue set user: {:?}", e);
            AppError::Database(e)
        })
    }
}
