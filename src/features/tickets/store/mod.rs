//! Persistence for tickets and their queue assignments.

mod pg;

#[cfg(test)]
pub mod memory;

pub use pg::PgTicketStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::tickets::models::{
    NewQueueAssignment, NewTicket, QueueAssignment, Ticket, TicketSearch,
};
use crate::shared::types::PageRequest;

#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Write a ticket and its first assignment atomically
    async fn create(
        &self,
        ticket: NewTicket,
        first_assignment: NewQueueAssignment,
    ) -> Result<(Ticket, QueueAssignment)>;

    async fn ticket(&self, id: Uuid) -> Result<Option<Ticket>>;

    /// Assignments ordered by `(assignment_date, sequence)`
    async fn assignments(&self, ticket_id: Uuid) -> Result<Vec<QueueAssignment>>;

    /// Compare-and-append a new assignment.
    ///
    /// Fails with `ConcurrentModification` when `expected_current` is no longer
    /// the current assignment or the new assignment predates it. The ticket's
    /// current pointers, last-modified fields, and `report` (when given) are
    /// written in the same transaction.
    async fn append_assignment(
        &self,
        ticket_id: Uuid,
        expected_current: Uuid,
        assignment: NewQueueAssignment,
        report: Option<String>,
    ) -> Result<(Ticket, QueueAssignment)>;

    /// Set or clear (`None`) the assignee
    async fn set_assignee(
        &self,
        ticket_id: Uuid,
        assignee_user_id: Option<&str>,
        modified_by: &str,
        at: DateTime<Utc>,
    ) -> Result<Ticket>;

    /// One page of matching tickets plus the total match count
    async fn search(&self, search: &TicketSearch, page: PageRequest) -> Result<(Vec<Ticket>, i64)>;
}
