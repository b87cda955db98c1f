use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::queues::models::{AssignmentField, FilterSettings, Queue, QueueSet};

/// Response DTO for queue set
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueueSetResponseDto {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub allow_null_priority: bool,
    pub summary_link: bool,
    pub filter_settings: FilterSettings,
    pub active: bool,
}

impl From<QueueSet> for QueueSetResponseDto {
    fn from(s: QueueSet) -> Self {
        let filter_settings = s.filter_settings();
        Self {
            id: s.id,
            category_id: s.category_id,
            name: s.name,
            description: s.description,
            allow_null_priority: s.allow_null_priority,
            summary_link: s.summary_link,
            filter_settings,
            active: s.active,
        }
    }
}

/// Response DTO for queue
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueueResponseDto {
    pub id: Uuid,
    pub queue_set_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub is_initial: bool,
    pub summary_link: bool,
    pub report_definition: Option<String>,
    pub assignment_fields: Vec<AssignmentField>,
}

impl From<Queue> for QueueResponseDto {
    fn from(q: Queue) -> Self {
        Self {
            id: q.id,
            queue_set_id: q.queue_set_id,
            name: q.name,
            description: q.description,
            active: q.active,
            is_initial: q.is_initial,
            summary_link: q.summary_link,
            report_definition: q.report_definition,
            assignment_fields: q.assignment_fields.0,
        }
    }
}

/// A queue with the ids of the queues tickets may move to from it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueueWithOutcomesDto {
    pub queue: QueueResponseDto,
    pub outcome_queue_ids: Vec<Uuid>,
    /// True when the queue has no outcomes; tickets here are closed
    pub is_terminal: bool,
}

/// Queue set with its queues and the caller's processing permission
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueueSetDetailDto {
    pub queue_set: QueueSetResponseDto,
    pub queues: Vec<QueueWithOutcomesDto>,
    pub can_process: bool,
}

/// Queue set together with its initial queue, as created
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueueSetCreatedDto {
    pub queue_set: QueueSetResponseDto,
    pub initial_queue: QueueResponseDto,
}

/// Request DTO for a queue
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateQueueDto {
    #[validate(length(min = 1, max = 255, message = "Queue name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(max = 2000, message = "Description must not exceed 2000 characters"))]
    pub description: Option<String>,

    /// Jinja2 template rendered into the ticket report when a ticket enters the queue
    #[validate(length(max = 10000, message = "Report definition must not exceed 10000 characters"))]
    pub report_definition: Option<String>,

    #[serde(default)]
    pub assignment_fields: Vec<AssignmentField>,

    /// Defaults to the queue set's summary link setting
    pub summary_link: Option<bool>,

    /// Only meaningful when adding a queue to an existing set
    #[serde(default)]
    pub is_initial: bool,
}

/// Request DTO for creating a queue set with its initial queue
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateQueueSetDto {
    pub category_id: Option<Uuid>,

    #[validate(length(min = 1, max = 255, message = "Queue set name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(max = 2000, message = "Description must not exceed 2000 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    pub allow_null_priority: bool,

    #[serde(default)]
    pub summary_link: bool,

    /// All filters enabled when omitted
    pub filter_settings: Option<FilterSettings>,

    #[validate(nested)]
    pub initial_queue: CreateQueueDto,
}

/// Request DTO for adding an outcome to a queue
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddOutcomeDto {
    pub outcome_queue_id: Uuid,
    #[serde(default)]
    pub display_order: i32,
}

/// Request DTO for granting a user processing rights on a queue set
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct GrantQueueSetUserDto {
    #[validate(length(min = 1, max = 255, message = "User id is required"))]
    pub user_id: String,
}
