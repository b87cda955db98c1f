use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::queues::dtos::QueueResponseDto;
use crate::features::tickets::models::{QueueAssignment, Ticket, TicketFilter, TicketView};

/// Response DTO for ticket
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TicketResponseDto {
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
    pub event_id: Option<Uuid>,
    pub current_queue_id: Uuid,
}

impl From<Ticket> for TicketResponseDto {
    fn from(t: Ticket) -> Self {
        Self {
            id: t.id,
            patient_id: t.patient_id,
            priority_id: t.priority_id,
            report: t.report,
            assignee_user_id: t.assignee_user_id,
            assignee_date: t.assignee_date,
            created_user_id: t.created_user_id,
            created_date: t.created_date,
            last_modified_user_id: t.last_modified_user_id,
            last_modified_date: t.last_modified_date,
            event_id: t.event_id,
            current_queue_id: t.current_queue_id,
        }
    }
}

/// Response DTO for one entry of a ticket's queue history
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueueAssignmentDto {
    pub id: Uuid,
    pub queue_id: Uuid,
    pub queue_name: Option<String>,
    pub sequence: i32,
    pub assignment_date: DateTime<Utc>,
    pub assignment_user_id: String,
    pub assignment_firm_id: Uuid,
    pub notes: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

impl QueueAssignmentDto {
    pub fn new(a: &QueueAssignment, queue_name: Option<String>) -> Self {
        Self {
            id: a.id,
            queue_id: a.queue_id,
            queue_name,
            sequence: a.sequence,
            assignment_date: a.assignment_date,
            assignment_user_id: a.assignment_user_id.clone(),
            assignment_firm_id: a.assignment_firm_id,
            notes: a.notes.clone(),
            details: a.details.clone(),
        }
    }
}

/// Ticket with everything needed to display and process it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TicketDetailDto {
    pub ticket: TicketResponseDto,
    pub patient_name: String,
    pub source_link: String,
    pub source_label: String,
    /// "Firm (Subspecialty)" of the initial assignment
    pub originating_firm: String,
    pub current_queue: QueueResponseDto,
    /// Queues the ticket may move to next
    pub outcomes: Vec<QueueResponseDto>,
    pub current_assignment: QueueAssignmentDto,
    pub past_assignments: Vec<QueueAssignmentDto>,
    pub has_history: bool,
    pub is_complete: bool,
    pub notes: Option<String>,
}

impl TicketDetailDto {
    pub fn from_view(view: &TicketView) -> Result<Self> {
        let assignment_dto = |a: &QueueAssignment| {
            QueueAssignmentDto::new(a, view.queue(a.queue_id).ok().map(|q| q.name.clone()))
        };

        Ok(Self {
            ticket: view.ticket.clone().into(),
            patient_name: view.patient_name()?.to_string(),
            source_link: view.source_link()?,
            source_label: view.source_label()?,
            originating_firm: view.originating_firm()?.name_and_subspecialty(),
            current_queue: view.current_queue()?.clone().into(),
            outcomes: view
                .current_outcomes()
                .iter()
                .cloned()
                .map(Into::into)
                .collect(),
            current_assignment: assignment_dto(view.current_assignment()?),
            past_assignments: view.past_assignments().iter().map(assignment_dto).collect(),
            has_history: view.has_history(),
            is_complete: view.is_complete()?,
            notes: view.notes()?.map(str::to_string),
        })
    }
}

/// One row of a queue set's ticket listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TicketListItemDto {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: Option<String>,
    pub priority_id: Option<i32>,
    pub current_queue_id: Uuid,
    pub current_queue_name: Option<String>,
    pub assignee_user_id: Option<String>,
    pub created_date: DateTime<Utc>,
    pub report: Option<String>,
}

/// Request DTO for adding a patient to a queue
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTicketDto {
    pub patient_id: Uuid,
    /// Initial queue the ticket starts in
    pub queue_id: Uuid,
    /// Firm taking on the ticket
    pub firm_id: Uuid,
    pub priority_id: Option<i32>,
    /// Clinical event the ticket is raised from
    pub event_id: Option<Uuid>,
    #[validate(length(max = 4000, message = "Notes must not exceed 4000 characters"))]
    pub notes: Option<String>,
    /// Values for the queue's assignment fields
    #[serde(default)]
    #[schema(value_type = Object)]
    pub fields: Map<String, Value>,
}

/// Request DTO for moving a ticket to an outcome of its current queue
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct MoveTicketDto {
    /// Queue the caller saw the ticket in; a mismatch means someone moved it first
    pub from_queue_id: Uuid,
    pub to_queue_id: Uuid,
    pub firm_id: Uuid,
    #[validate(length(max = 4000, message = "Notes must not exceed 4000 characters"))]
    pub notes: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub fields: Map<String, Value>,
}

/// Request DTO for setting (or clearing, with null) a ticket's assignee
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AssignTicketDto {
    #[validate(length(min = 1, max = 255, message = "Assignee must be 1-255 characters"))]
    pub assignee_user_id: Option<String>,
}

/// Query params for a queue set's ticket listing.
///
/// List criteria are comma-separated ids.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct TicketListQuery {
    /// Only tickets currently in these queues, e.g. `id1,id2`
    pub queue_ids: Option<String>,
    /// Only tickets with these priorities, e.g. `1,2`
    pub priority_ids: Option<String>,
    /// Only tickets whose originating firm belongs to the subspecialty
    pub subspecialty_id: Option<Uuid>,
    /// Only tickets whose originating firm is this firm
    pub firm_id: Option<Uuid>,
    /// Only tickets assigned to the caller
    pub my_tickets: Option<bool>,
    /// `false` hides tickets in terminal queues
    pub closed_tickets: Option<bool>,
    pub patient_id: Option<Uuid>,
}

/// Query params for checking whether a patient may be added to a queue
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct CanAddPatientQuery {
    pub patient_id: Uuid,
}

/// False when the patient already has an open ticket in the queue's set
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CanAddPatientDto {
    pub can_add: bool,
}

fn parse_list<T: std::str::FromStr>(name: &str, raw: Option<&str>) -> Result<Vec<T>> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<T>()
                .map_err(|_| AppError::BadRequest(format!("Invalid value '{}' in {}", s, name)))
        })
        .collect()
}

impl TicketListQuery {
    pub fn to_filter(&self) -> Result<TicketFilter> {
        Ok(TicketFilter {
            queue_ids: parse_list("queue_ids", self.queue_ids.as_deref())?,
            priority_ids: parse_list("priority_ids", self.priority_ids.as_deref())?,
            subspecialty_id: self.subspecialty_id,
            firm_id: self.firm_id,
            my_tickets: self.my_tickets.unwrap_or(false),
            closed_tickets: self.closed_tickets,
            patient_id: self.patient_id,
        })
    }
}
