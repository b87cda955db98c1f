use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a ticket's stay in a queue
#[derive(Debug, Clone, FromRow)]
pub struct QueueAssignment {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub queue_id: Uuid,
    /// 1-based insertion order within the ticket; breaks timestamp ties
    pub sequence: i32,
    pub assignment_date: DateTime<Utc>,
    pub assignment_user_id: String,
    pub assignment_firm_id: Uuid,
    pub notes: Option<String>,
    /// Values captured by the queue's assignment fields
    pub details: Option<serde_json::Value>,
}

/// Insert model for queue assignment
#[derive(Debug, Clone)]
pub struct NewQueueAssignment {
    pub queue_id: Uuid,
    pub assignment_date: DateTime<Utc>,
    pub assignment_user_id: String,
    pub assignment_firm_id: Uuid,
    pub notes: Option<String>,
    pub details: Option<serde_json::Value>,
}

impl NewQueueAssignment {
    pub fn into_assignment(self, id: Uuid, ticket_id: Uuid, sequence: i32) -> QueueAssignment {
        QueueAssignment {
            id,
            ticket_id,
            queue_id: self.queue_id,
            sequence,
            assignment_date: self.assignment_date,
            assignment_user_id: self.assignment_user_id,
            assignment_firm_id: self.assignment_firm_id,
            notes: self.notes,
            details: self.details,
        }
    }
}
