use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A value captured when a ticket enters a queue.
///
/// Fields naming a `widget` are extracted and validated by that widget;
/// plain fields are captured as free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AssignmentField {
    /// Key in the submitted form data and in the report template context
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<String>,
    #[serde(default)]
    pub required: bool,
}

/// Database model for queue
#[derive(Debug, Clone, FromRow)]
pub struct Queue {
    pub id: Uuid,
    pub queue_set_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub is_initial: bool,
    /// Summary queues link ticket sources to the episode rather than the event
    pub summary_link: bool,
    pub report_definition: Option<String>,
    pub assignment_fields: Json<Vec<AssignmentField>>,
    pub created_at: DateTime<Utc>,
}

/// Insert model for queue
#[derive(Debug, Clone)]
pub struct NewQueue {
    pub queue_set_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_initial: bool,
    pub summary_link: bool,
    pub report_definition: Option<String>,
    pub assignment_fields: Vec<AssignmentField>,
}

impl NewQueue {
    pub fn into_queue(self, id: Uuid, created_at: DateTime<Utc>) -> Queue {
        Queue {
            id,
            queue_set_id: self.queue_set_id,
            name: self.name,
            description: self.description,
            active: true,
            is_initial: self.is_initial,
            summary_link: self.summary_link,
            report_definition: self.report_definition,
            assignment_fields: Json(self.assignment_fields),
            created_at,
        }
    }
}
