use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::core::error::{AppError, FieldErrors, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::directory::Directories;
use crate::features::queues::models::{Queue, QueueSet};
use crate::features::queues::QueueSetService;
use crate::features::tickets::dtos::{
    CreateTicketDto, MoveTicketDto, QueueAssignmentDto, TicketDetailDto, TicketResponseDto,
};
use crate::features::tickets::models::{
    NewQueueAssignment, NewTicket, Ticket, TicketSearch, TicketSummary, TicketView, ViewLookups,
};
use crate::features::tickets::services::HistoryService;
use crate::features::tickets::store::TicketStore;
use crate::features::tickets::widgets::{capture_fields, CapturedFields};
use crate::shared::templates::render_report;
use crate::shared::types::PageRequest;

/// Service for the ticket lifecycle: creation, moves between queues, assignment
pub struct TicketService {
    store: Arc<dyn TicketStore>,
    history: Arc<HistoryService>,
    queues: Arc<QueueSetService>,
    directory: Directories,
}

impl TicketService {
    pub fn new(
        store: Arc<dyn TicketStore>,
        history: Arc<HistoryService>,
        queues: Arc<QueueSetService>,
        directory: Directories,
    ) -> Self {
        Self {
            store,
            history,
            queues,
            directory,
        }
    }

    // =========================================================================
    // CREATE
    // =========================================================================

    /// False if the patient already has an open ticket in the queue's set
    pub async fn can_add_patient_to_queue(&self, patient_id: Uuid, queue_id: Uuid) -> Result<bool> {
        let queue = self.queues.get_queue(queue_id).await?;
        let queue_set = self.queues.queue_set_for_queue(&queue).await?;
        Ok(self.open_ticket_in_set(patient_id, &queue_set).await?.is_none())
    }

    async fn open_ticket_in_set(
        &self,
        patient_id: Uuid,
        queue_set: &QueueSet,
    ) -> Result<Option<Ticket>> {
        let terminal = self.queues.terminal_queue_ids(queue_set.id).await?;
        let open_queue_ids = self
            .queues
            .queues_of(queue_set.id, true)
            .await?
            .into_iter()
            .map(|q| q.id)
            .filter(|id| !terminal.contains(id))
            .collect();

        let search = TicketSearch {
            patient_id: Some(patient_id),
            ..TicketSearch::in_queues(open_queue_ids)
        };
        let (tickets, _) = self
            .store
            .search(&search, PageRequest { page: 1, page_size: 1 })
            .await?;
        Ok(tickets.into_iter().next())
    }

    /// Raise a ticket for a patient in an initial queue
    pub async fn add_patient_to_queue(
        &self,
        user: &AuthenticatedUser,
        dto: CreateTicketDto,
    ) -> Result<TicketDetailDto> {
        let queue = self.queues.get_queue(dto.queue_id).await?;
        if !queue.active {
            return Err(AppError::Validation(format!(
                "Queue '{}' is not active",
                queue.name
            )));
        }
        if !queue.is_initial {
            return Err(AppError::Validation(format!(
                "Patients cannot be added directly to queue '{}'",
                queue.name
            )));
        }

        let queue_set = self.queues.queue_set_for_queue(&queue).await?;
        if !queue_set.active {
            return Err(AppError::Validation(format!(
                "Queue set '{}' is not active",
                queue_set.name
            )));
        }
        self.queues.ensure_permissioned(&queue_set, user).await?;

        if self
            .directory
            .patients
            .patient_name(dto.patient_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "Patient {} not found",
                dto.patient_id
            )));
        }
        self.ensure_firm(dto.firm_id).await?;
        if let Some(event_id) = dto.event_id {
            if self.directory.events.event(event_id).await?.is_none() {
                return Err(AppError::NotFound(format!("Event {} not found", event_id)));
            }
        }

        let mut errors = FieldErrors::new();
        self.check_priority(&queue_set, dto.priority_id, &mut errors)
            .await?;
        let captured = capture_fields(&queue.assignment_fields.0, &dto.fields, &mut errors)?;
        if !errors.is_empty() {
            return Err(AppError::ValidationFailed(errors));
        }

        if let Some(open) = self.open_ticket_in_set(dto.patient_id, &queue_set).await? {
            return Err(AppError::Conflict(format!(
                "Patient already has open ticket {} in queue set '{}'",
                open.id, queue_set.name
            )));
        }

        let report = Self::render(&queue, &captured)?;
        let (ticket, _) = self
            .store
            .create(
                NewTicket {
                    patient_id: dto.patient_id,
                    priority_id: dto.priority_id,
                    report,
                    event_id: dto.event_id,
                    created_user_id: user.sub.clone(),
                },
                NewQueueAssignment {
                    queue_id: queue.id,
                    assignment_date: Utc::now(),
                    assignment_user_id: user.sub.clone(),
                    assignment_firm_id: dto.firm_id,
                    notes: dto.notes,
                    details: captured.details(),
                },
            )
            .await?;

        tracing::info!(
            "Ticket {} created for patient {} in queue '{}'",
            ticket.id,
            ticket.patient_id,
            queue.name
        );

        self.detail(ticket.id).await
    }

    // =========================================================================
    // MOVE
    // =========================================================================

    /// Move a ticket to an outcome of its current queue.
    ///
    /// A conflicting concurrent append is retried once against fresh state.
    pub async fn move_ticket(
        &self,
        user: &AuthenticatedUser,
        ticket_id: Uuid,
        dto: MoveTicketDto,
    ) -> Result<TicketDetailDto> {
        let ticket = match self.try_move(user, ticket_id, &dto).await {
            Err(AppError::ConcurrentModification(reason)) => {
                tracing::warn!(
                    "Move of ticket {} conflicted ({}), retrying with fresh state",
                    ticket_id,
                    reason
                );
                self.try_move(user, ticket_id, &dto).await?
            }
            other => other?,
        };

        self.detail(ticket.id).await
    }

    async fn try_move(
        &self,
        user: &AuthenticatedUser,
        ticket_id: Uuid,
        dto: &MoveTicketDto,
    ) -> Result<Ticket> {
        let (ticket, history) = self.history.load(ticket_id).await?;
        let current = history.current()?;
        if current.queue_id != dto.from_queue_id {
            return Err(AppError::ConcurrentModification(
                "Ticket is no longer in the queue it was being moved from".to_string(),
            ));
        }

        let current_queue = self.queues.get_queue(current.queue_id).await?;
        let queue_set = self.queues.queue_set_for_queue(&current_queue).await?;
        self.queues.ensure_permissioned(&queue_set, user).await?;

        let target = self
            .queues
            .outcomes_of(current_queue.id)
            .await?
            .into_iter()
            .find(|q| q.id == dto.to_queue_id)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Queue {} is not an outcome of '{}'",
                    dto.to_queue_id, current_queue.name
                ))
            })?;
        if !target.active {
            return Err(AppError::Validation(format!(
                "Queue '{}' is not active",
                target.name
            )));
        }
        self.ensure_firm(dto.firm_id).await?;

        let mut errors = FieldErrors::new();
        let captured = capture_fields(&target.assignment_fields.0, &dto.fields, &mut errors)?;
        if !errors.is_empty() {
            return Err(AppError::ValidationFailed(errors));
        }

        let report = Self::render(&target, &captured)?;
        let (ticket, _) = self
            .history
            .append(
                ticket.id,
                current.id,
                NewQueueAssignment {
                    queue_id: target.id,
                    assignment_date: Utc::now(),
                    assignment_user_id: user.sub.clone(),
                    assignment_firm_id: dto.firm_id,
                    notes: dto.notes.clone(),
                    details: captured.details(),
                },
                report,
            )
            .await?;

        tracing::info!(
            "Ticket {} moved from '{}' to '{}' by {}",
            ticket.id,
            current_queue.name,
            target.name,
            user.sub
        );
        Ok(ticket)
    }

    // =========================================================================
    // ASSIGNEE
    // =========================================================================

    pub async fn assign(
        &self,
        user: &AuthenticatedUser,
        ticket_id: Uuid,
        assignee_user_id: &str,
    ) -> Result<TicketResponseDto> {
        self.set_assignee(user, ticket_id, Some(assignee_user_id))
            .await
    }

    pub async fn release(
        &self,
        user: &AuthenticatedUser,
        ticket_id: Uuid,
    ) -> Result<TicketResponseDto> {
        self.set_assignee(user, ticket_id, None).await
    }

    async fn set_assignee(
        &self,
        user: &AuthenticatedUser,
        ticket_id: Uuid,
        assignee_user_id: Option<&str>,
    ) -> Result<TicketResponseDto> {
        let ticket = self.get_ticket(ticket_id).await?;
        let queue = self.queues.get_queue(ticket.current_queue_id).await?;
        let queue_set = self.queues.queue_set_for_queue(&queue).await?;
        self.queues.ensure_permissioned(&queue_set, user).await?;

        let ticket = self
            .store
            .set_assignee(ticket.id, assignee_user_id, &user.sub, Utc::now())
            .await?;
        match assignee_user_id {
            Some(assignee) => tracing::info!("Ticket {} assigned to {}", ticket.id, assignee),
            None => tracing::info!("Ticket {} released", ticket.id),
        }
        Ok(ticket.into())
    }

    // =========================================================================
    // READ
    // =========================================================================

    pub async fn get_ticket(&self, ticket_id: Uuid) -> Result<Ticket> {
        self.store
            .ticket(ticket_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ticket {} not found", ticket_id)))
    }

    /// Ticket with its history and every related record the view needs
    pub async fn load_view(&self, ticket_id: Uuid) -> Result<TicketView> {
        let (ticket, history) = self.history.load(ticket_id).await?;

        let mut queues = HashMap::new();
        let mut firms = HashMap::new();
        for assignment in history.all() {
            if !queues.contains_key(&assignment.queue_id) {
                let queue = self.queues.get_queue(assignment.queue_id).await?;
                queues.insert(queue.id, queue);
            }
            if !firms.contains_key(&assignment.assignment_firm_id) {
                if let Some(firm) = self
                    .directory
                    .firms
                    .firm(assignment.assignment_firm_id)
                    .await?
                {
                    firms.insert(firm.id, firm);
                }
            }
        }

        let current_outcomes = match history.current() {
            Ok(current) => self.queues.outcomes_of(current.queue_id).await?,
            Err(_) => Vec::new(),
        };
        let event = match ticket.event_id {
            Some(event_id) => self.directory.events.event(event_id).await?,
            None => None,
        };
        let patient_name = self
            .directory
            .patients
            .patient_name(ticket.patient_id)
            .await?;

        Ok(TicketView::new(
            ticket,
            history,
            ViewLookups {
                queues,
                current_outcomes,
                firms,
                event,
                patient_name,
            },
        ))
    }

    pub async fn detail(&self, ticket_id: Uuid) -> Result<TicketDetailDto> {
        TicketDetailDto::from_view(&self.load_view(ticket_id).await?)
    }

    pub async fn summary(&self, ticket_id: Uuid) -> Result<TicketSummary> {
        self.load_view(ticket_id).await?.summary_info()
    }

    /// Every assignment of the ticket, oldest first
    pub async fn history(&self, ticket_id: Uuid) -> Result<Vec<QueueAssignmentDto>> {
        let view = self.load_view(ticket_id).await?;
        Ok(view
            .history
            .all()
            .iter()
            .map(|a| QueueAssignmentDto::new(a, view.queue(a.queue_id).ok().map(|q| q.name.clone())))
            .collect())
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    async fn ensure_firm(&self, firm_id: Uuid) -> Result<()> {
        match self.directory.firms.firm(firm_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("Firm {} not found", firm_id))),
        }
    }

    async fn check_priority(
        &self,
        queue_set: &QueueSet,
        priority_id: Option<i32>,
        errors: &mut FieldErrors,
    ) -> Result<()> {
        match priority_id {
            None if !queue_set.allow_null_priority => {
                errors.insert("priority_id".to_string(), "Please select a priority".to_string());
            }
            None => {}
            Some(id) => match self.queues.priority(id).await {
                Ok(_) => {}
                Err(AppError::NotFound(_)) => {
                    errors.insert("priority_id".to_string(), "Unknown priority".to_string());
                }
                Err(e) => return Err(e),
            },
        }
        Ok(())
    }

    /// The queue's report definition rendered over the captured values
    fn render(queue: &Queue, captured: &CapturedFields) -> Result<Option<String>> {
        let Some(definition) = queue.report_definition.as_deref() else {
            return Ok(None);
        };
        let report = render_report(definition, &captured.context).map_err(|e| {
            tracing::error!("Report definition of queue {} failed: {}", queue.id, e);
            AppError::Internal(e.to_string())
        })?;
        Ok(Some(report).filter(|r| !r.is_empty()))
    }
}
