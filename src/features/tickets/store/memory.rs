use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::tickets::models::{
    AssignmentHistory, NewQueueAssignment, NewTicket, QueueAssignment, Ticket, TicketSearch,
};
use crate::features::tickets::store::TicketStore;
use crate::shared::types::PageRequest;

/// Tickets held in memory, used by service and handler tests.
///
/// The write lock plays the part of the row lock taken by the PostgreSQL store.
#[derive(Default)]
pub struct InMemoryTicketStore {
    tickets: RwLock<HashMap<Uuid, (Ticket, AssignmentHistory)>>,
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn create(
        &self,
        ticket: NewTicket,
        first_assignment: NewQueueAssignment,
    ) -> Result<(Ticket, QueueAssignment)> {
        let ticket_id = Uuid::now_v7();
        let mut history = AssignmentHistory::default();
        let assignment = history.append(ticket_id, None, first_assignment)?.clone();
        let ticket = ticket.into_ticket(ticket_id, &assignment);

        self.tickets
            .write()
            .await
            .insert(ticket_id, (ticket.clone(), history));
        Ok((ticket, assignment))
    }

    async fn ticket(&self, id: Uuid) -> Result<Option<Ticket>> {
        Ok(self
            .tickets
            .read()
            .await
            .get(&id)
            .map(|(ticket, _)| ticket.clone()))
    }

    async fn assignments(&self, ticket_id: Uuid) -> Result<Vec<QueueAssignment>> {
        Ok(self
            .tickets
            .read()
            .await
            .get(&ticket_id)
            .map(|(_, history)| history.all().to_vec())
            .unwrap_or_default())
    }

    async fn append_assignment(
        &self,
        ticket_id: Uuid,
        expected_current: Uuid,
        assignment: NewQueueAssignment,
        report: Option<String>,
    ) -> Result<(Ticket, QueueAssignment)> {
        let mut tickets = self.tickets.write().await;
        let (ticket, history) = tickets
            .get_mut(&ticket_id)
            .ok_or_else(|| AppError::NotFound(format!("Ticket {} not found", ticket_id)))?;

        let assignment = history
            .append(ticket_id, Some(expected_current), assignment)?
            .clone();
        ticket.current_queue_id = assignment.queue_id;
        ticket.current_assignment_id = assignment.id;
        ticket.last_modified_user_id = assignment.assignment_user_id.clone();
        ticket.last_modified_date = assignment.assignment_date;
        if report.is_some() {
            ticket.report = report;
        }
        Ok((ticket.clone(), assignment))
    }

    async fn set_assignee(
        &self,
        ticket_id: Uuid,
        assignee_user_id: Option<&str>,
        modified_by: &str,
        at: DateTime<Utc>,
    ) -> Result<Ticket> {
        let mut tickets = self.tickets.write().await;
        let (ticket, _) = tickets
            .get_mut(&ticket_id)
            .ok_or_else(|| AppError::NotFound(format!("Ticket {} not found", ticket_id)))?;

        ticket.assignee_user_id = assignee_user_id.map(str::to_string);
        ticket.assignee_date = assignee_user_id.map(|_| at);
        ticket.last_modified_user_id = modified_by.to_string();
        ticket.last_modified_date = at;
        Ok(ticket.clone())
    }

    async fn search(&self, search: &TicketSearch, page: PageRequest) -> Result<(Vec<Ticket>, i64)> {
        let tickets = self.tickets.read().await;
        let mut matching = Vec::new();
        for (ticket, history) in tickets.values() {
            if search.matches(ticket, history.initial()?.assignment_firm_id) {
                matching.push(ticket.clone());
            }
        }
        search.sort_tickets(&mut matching);

        let total = matching.len() as i64;
        let page_of = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((page_of, total))
    }
}
