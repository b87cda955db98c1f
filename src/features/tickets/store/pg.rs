use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::core::config::TicketSortOrder;
use crate::core::error::{AppError, Result};
use crate::features::tickets::models::{
    validate_append, NewQueueAssignment, NewTicket, QueueAssignment, Ticket, TicketSearch,
};
use crate::features::tickets::store::TicketStore;
use crate::shared::types::PageRequest;

const TICKET_COLUMNS: &str = r#"
    t.id, t.patient_id, t.priority_id, t.report, t.assignee_user_id, t.assignee_date,
    t.created_user_id, t.created_date, t.last_modified_user_id, t.last_modified_date,
    t.event_id, t.current_queue_id, t.current_assignment_id
"#;

const ASSIGNMENT_COLUMNS: &str = r#"
    id, ticket_id, queue_id, sequence, assignment_date, assignment_user_id,
    assignment_firm_id, notes, details
"#;

/// Shared WHERE clause for ticket searches.
///
/// $1 queue ids, $2 priority ids, $3 originating firm ids, $4 assignee, $5 patient
///
/// The in-memory store evaluates the same criteria through
/// `TicketSearch::matches`; a change here must be mirrored there.
const SEARCH_CONDITIONS: &str = r#"
    t.current_queue_id = ANY($1)
    AND ($2::INTEGER[] IS NULL OR t.priority_id = ANY($2))
    AND ($3::UUID[] IS NULL OR (
        SELECT a.assignment_firm_id
        FROM ticket_queue_assignments a
        WHERE a.ticket_id = t.id
        ORDER BY a.assignment_date, a.sequence
        LIMIT 1
    ) = ANY($3))
    AND ($4::TEXT IS NULL OR t.assignee_user_id = $4)
    AND ($5::UUID IS NULL OR t.patient_id = $5)
"#;

/// Mirrored by `TicketSearch::sort_tickets` for the in-memory store
fn order_clause(sort: TicketSortOrder) -> &'static str {
    match sort {
        TicketSortOrder::CreatedDesc => "t.created_date DESC, t.id DESC",
        TicketSortOrder::CreatedAsc => "t.created_date ASC, t.id ASC",
        TicketSortOrder::Priority => {
            "t.priority_id ASC NULLS LAST, t.created_date ASC, t.id ASC"
        }
    }
}

/// Ticket store backed by PostgreSQL
pub struct PgTicketStore {
    pool: PgPool,
}

impl PgTicketStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_assignment(
        tx: &mut Transaction<'_, Postgres>,
        assignment: &QueueAssignment,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ticket_queue_assignments (
                id, ticket_id, queue_id, sequence, assignment_date, assignment_user_id,
                assignment_firm_id, notes, details
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(assignment.id)
        .bind(assignment.ticket_id)
        .bind(assignment.queue_id)
        .bind(assignment.sequence)
        .bind(assignment.assignment_date)
        .bind(&assignment.assignment_user_id)
        .bind(assignment.assignment_firm_id)
        .bind(&assignment.notes)
        .bind(&assignment.details)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert queue assignment: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(())
    }
}

#[async_trait]
impl TicketStore for PgTicketStore {
    async fn create(
        &self,
        ticket: NewTicket,
        first_assignment: NewQueueAssignment,
    ) -> Result<(Ticket, QueueAssignment)> {
        let ticket_id = Uuid::now_v7();
        let assignment = first_assignment.into_assignment(Uuid::now_v7(), ticket_id, 1);
        let ticket = ticket.into_ticket(ticket_id, &assignment);

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query(
            r#"
            INSERT INTO tickets (
                id, patient_id, priority_id, report, assignee_user_id, assignee_date,
                created_user_id, created_date, last_modified_user_id, last_modified_date,
                event_id, current_queue_id, current_assignment_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(ticket.id)
        .bind(ticket.patient_id)
        .bind(ticket.priority_id)
        .bind(&ticket.report)
        .bind(&ticket.assignee_user_id)
        .bind(ticket.assignee_date)
        .bind(&ticket.created_user_id)
        .bind(ticket.created_date)
        .bind(&ticket.last_modified_user_id)
        .bind(ticket.last_modified_date)
        .bind(ticket.event_id)
        .bind(ticket.current_queue_id)
        .bind(ticket.current_assignment_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert ticket: {:?}", e);
            AppError::Database(e)
        })?;

        Self::insert_assignment(&mut tx, &assignment).await?;

        tx.commit().await.map_err(AppError::Database)?;

        Ok((ticket, assignment))
    }

    async fn ticket(&self, id: Uuid) -> Result<Option<Ticket>> {
        sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {} FROM tickets t WHERE t.id = $1",
            TICKET_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get ticket {}: {:?}", id, e);
            AppError::Database(e)
        })
    }

    async fn assignments(&self, ticket_id: Uuid) -> Result<Vec<QueueAssignment>> {
        sqlx::query_as::<_, QueueAssignment>(&format!(
            r#"
            SELECT {}
            FROM ticket_queue_assignments
            WHERE ticket_id = $1
            ORDER BY assignment_date, sequence
            "#,
            ASSIGNMENT_COLUMNS
        ))
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list assignments of ticket {}: {:?}", ticket_id, e);
            AppError::Database(e)
        })
    }

    async fn append_assignment(
        &self,
        ticket_id: Uuid,
        expected_current: Uuid,
        assignment: NewQueueAssignment,
        report: Option<String>,
    ) -> Result<(Ticket, QueueAssignment)> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Row lock serializes appends to the same ticket
        let locked = sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {} FROM tickets t WHERE t.id = $1 FOR UPDATE",
            TICKET_COLUMNS
        ))
        .bind(ticket_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to lock ticket {}: {:?}", ticket_id, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Ticket {} not found", ticket_id)))?;

        let current = sqlx::query_as::<_, QueueAssignment>(&format!(
            "SELECT {} FROM ticket_queue_assignments WHERE id = $1",
            ASSIGNMENT_COLUMNS
        ))
        .bind(locked.current_assignment_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get current assignment of {}: {:?}", ticket_id, e);
            AppError::Database(e)
        })?;

        let sequence = validate_append(
            current.as_ref(),
            Some(expected_current),
            assignment.assignment_date,
        )
        .inspect_err(|e| tracing::warn!("Rejected append to ticket {}: {}", ticket_id, e))?;

        let assignment = assignment.into_assignment(Uuid::now_v7(), ticket_id, sequence);
        Self::insert_assignment(&mut tx, &assignment).await?;

        let ticket = sqlx::query_as::<_, Ticket>(&format!(
            r#"
            UPDATE tickets t
            SET current_queue_id = $2,
                current_assignment_id = $3,
                last_modified_user_id = $4,
                last_modified_date = $5,
                report = COALESCE($6, t.report)
            WHERE t.id = $1
            RETURNING {}
            "#,
            TICKET_COLUMNS
        ))
        .bind(ticket_id)
        .bind(assignment.queue_id)
        .bind(assignment.id)
        .bind(&assignment.assignment_user_id)
        .bind(assignment.assignment_date)
        .bind(report)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update ticket {}: {:?}", ticket_id, e);
            AppError::Database(e)
        })?;

        tx.commit().await.map_err(AppError::Database)?;

        Ok((ticket, assignment))
    }

    async fn set_assignee(
        &self,
        ticket_id: Uuid,
        assignee_user_id: Option<&str>,
        modified_by: &str,
        at: DateTime<Utc>,
    ) -> Result<Ticket> {
        sqlx::query_as::<_, Ticket>(&format!(
            r#"
            UPDATE tickets t
            SET assignee_user_id = $2,
                assignee_date = CASE WHEN $2::TEXT IS NULL THEN NULL ELSE $4 END,
                last_modified_user_id = $3,
                last_modified_date = $4
            WHERE t.id = $1
            RETURNING {}
            "#,
            TICKET_COLUMNS
        ))
        .bind(ticket_id)
        .bind(assignee_user_id)
        .bind(modified_by)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to set assignee of ticket {}: {:?}", ticket_id, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Ticket {} not found", ticket_id)))
    }

    async fn search(&self, search: &TicketSearch, page: PageRequest) -> Result<(Vec<Ticket>, i64)> {
        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM tickets t WHERE {}",
            SEARCH_CONDITIONS
        ))
        .bind(&search.queue_ids)
        .bind(&search.priority_ids)
        .bind(&search.firm_ids)
        .bind(&search.assignee_user_id)
        .bind(search.patient_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count tickets: {:?}", e);
            AppError::Database(e)
        })?;

        let tickets = sqlx::query_as::<_, Ticket>(&format!(
            r#"
            SELECT {}
            FROM tickets t
            WHERE {}
            ORDER BY {}
            LIMIT $6 OFFSET $7
            "#,
            TICKET_COLUMNS,
            SEARCH_CONDITIONS,
            order_clause(search.sort)
        ))
        .bind(&search.queue_ids)
        .bind(&search.priority_ids)
        .bind(&search.firm_ids)
        .bind(&search.assignee_user_id)
        .bind(search.patient_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to search tickets: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((tickets, total))
    }
}
