use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::tickets::models::QueueAssignment;

/// Database model for ticket
#[derive(Debug, Clone, FromRow)]
pub struct Ticket {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub priority_id: Option<i32>,
    pub report: Option<String>,
    pub assignee_user_id: Option<String>,
    pub assignee_date: Option<DateTime<Utc>>,
    pub created_user_id: String,
    pub created_date: DateTime<Utc>,
    pub last_modified_user_id: String,
    pub last_modified_date: DateTime<Utc>,
    /// Clinical event the ticket was raised from, if any
    pub event_id: Option<Uuid>,
    /// Queue of the latest assignment
    pub current_queue_id: Uuid,
    pub current_assignment_id: Uuid,
}

/// Insert model for ticket; the current pointers come from the first assignment
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub patient_id: Uuid,
    pub priority_id: Option<i32>,
    pub report: Option<String>,
    pub event_id: Option<Uuid>,
    pub created_user_id: String,
}

impl NewTicket {
    pub fn into_ticket(self, id: Uuid, first: &QueueAssignment) -> Ticket {
        Ticket {
            id,
            patient_id: self.patient_id,
            priority_id: self.priority_id,
            report: self.report,
            assignee_user_id: None,
            assignee_date: None,
            last_modified_user_id: self.created_user_id.clone(),
            created_user_id: self.created_user_id,
            created_date: first.assignment_date,
            last_modified_date: first.assignment_date,
            event_id: self.event_id,
            current_queue_id: first.queue_id,
            current_assignment_id: first.id,
        }
    }
}
