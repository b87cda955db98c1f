use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::tickets::models::{
    AssignmentHistory, NewQueueAssignment, QueueAssignment, Ticket,
};
use crate::features::tickets::store::TicketStore;

/// Queue-assignment history of tickets
pub struct HistoryService {
    store: Arc<dyn TicketStore>,
}

impl HistoryService {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self { store }
    }

    /// Append an assignment after `expected_current`; see [`TicketStore::append_assignment`]
    pub async fn append(
        &self,
        ticket_id: Uuid,
        expected_current: Uuid,
        assignment: NewQueueAssignment,
        report: Option<String>,
    ) -> Result<(Ticket, QueueAssignment)> {
        let queue_id = assignment.queue_id;
        let (ticket, assignment) = self
            .store
            .append_assignment(ticket_id, expected_current, assignment, report)
            .await?;
        tracing::info!(
            "Ticket {} assigned to queue {} (sequence {})",
            ticket_id,
            queue_id,
            assignment.sequence
        );
        Ok((ticket, assignment))
    }

    pub async fn history(&self, ticket_id: Uuid) -> Result<AssignmentHistory> {
        Ok(AssignmentHistory::new(self.store.assignments(ticket_id).await?))
    }

    /// Ticket and its history; `NotFound` if the ticket does not exist
    pub async fn load(&self, ticket_id: Uuid) -> Result<(Ticket, AssignmentHistory)> {
        let ticket = self
            .store
            .ticket(ticket_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ticket {} not found", ticket_id)))?;
        let history = self.history(ticket_id).await?;
        Ok((ticket, history))
    }
}
