use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::directory::{ClinicalEvent, Firm};
use crate::features::queues::models::Queue;
use crate::features::tickets::models::{AssignmentHistory, QueueAssignment, Ticket};
use crate::shared::constants::PATIENT_SOURCE_LABEL;

/// Flat snapshot of a ticket for listings and move dialogs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TicketSummary {
    pub id: Uuid,
    pub patient_name: String,
    pub current_queue_name: String,
    pub current_queue_id: Uuid,
}

/// Related records resolved for a ticket view
#[derive(Debug, Clone, Default)]
pub struct ViewLookups {
    /// Every queue referenced by the history, keyed by id
    pub queues: HashMap<Uuid, Queue>,
    /// Outcomes of the current queue
    pub current_outcomes: Vec<Queue>,
    /// Every firm referenced by the history, keyed by id
    pub firms: HashMap<Uuid, Firm>,
    pub event: Option<ClinicalEvent>,
    pub patient_name: Option<String>,
}

/// A ticket together with its assignment history and the records needed to
/// describe where it came from and where it is.
///
/// Accessors that need the initial or current assignment fail with
/// `NotFound` when the history is empty, since a stored ticket always has one.
#[derive(Debug, Clone)]
pub struct TicketView {
    pub ticket: Ticket,
    pub history: AssignmentHistory,
    lookups: ViewLookups,
}

impl TicketView {
    pub fn new(ticket: Ticket, history: AssignmentHistory, lookups: ViewLookups) -> Self {
        Self {
            ticket,
            history,
            lookups,
        }
    }

    pub fn queue(&self, queue_id: Uuid) -> Result<&Queue> {
        self.lookups
            .queues
            .get(&queue_id)
            .ok_or_else(|| AppError::NotFound(format!("Queue {} not found", queue_id)))
    }

    pub fn firm(&self, firm_id: Uuid) -> Result<&Firm> {
        self.lookups
            .firms
            .get(&firm_id)
            .ok_or_else(|| AppError::NotFound(format!("Firm {} not found", firm_id)))
    }

    pub fn initial_queue(&self) -> Result<&Queue> {
        self.queue(self.history.initial()?.queue_id)
    }

    pub fn current_assignment(&self) -> Result<&QueueAssignment> {
        self.history.current()
    }

    pub fn current_queue(&self) -> Result<&Queue> {
        self.queue(self.history.current()?.queue_id)
    }

    fn event(&self) -> Result<Option<&ClinicalEvent>> {
        match self.ticket.event_id {
            None => Ok(None),
            Some(event_id) => self
                .lookups
                .event
                .as_ref()
                .filter(|e| e.id == event_id)
                .map(Some)
                .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id))),
        }
    }

    /// Where the ticket was raised from.
    ///
    /// Summary queues link to the episode, other event tickets to the event,
    /// and tickets raised without an event to the patient.
    pub fn source_link(&self) -> Result<String> {
        let initial_queue = self.initial_queue()?;
        Ok(match self.event()? {
            Some(event) if initial_queue.summary_link => {
                format!("/patient/episode/view/{}", event.episode_id)
            }
            Some(event) => format!(
                "/{}/default/view/{}",
                event.event_type_class_name, event.id
            ),
            None => format!("/patient/view/{}", self.ticket.patient_id),
        })
    }

    pub fn source_label(&self) -> Result<String> {
        let initial_queue = self.initial_queue()?;
        Ok(match self.event()? {
            Some(_) if initial_queue.summary_link => {
                format!("{} Episode", self.originating_firm()?.subspecialty_text())
            }
            Some(event) => event.event_type_name.clone(),
            None => PATIENT_SOURCE_LABEL.to_string(),
        })
    }

    /// Firm handling the ticket when it was first assigned
    pub fn originating_firm(&self) -> Result<&Firm> {
        self.firm(self.history.initial()?.assignment_firm_id)
    }

    pub fn has_history(&self) -> bool {
        self.history.has_history()
    }

    pub fn past_assignments(&self) -> &[QueueAssignment] {
        self.history.past_assignments()
    }

    /// Complete once the current queue has no outcomes
    pub fn is_complete(&self) -> Result<bool> {
        self.history.current()?;
        Ok(self.lookups.current_outcomes.is_empty())
    }

    pub fn current_outcomes(&self) -> &[Queue] {
        &self.lookups.current_outcomes
    }

    pub fn notes(&self) -> Result<Option<&str>> {
        Ok(self.history.current()?.notes.as_deref())
    }

    pub fn patient_name(&self) -> Result<&str> {
        self.lookups.patient_name.as_deref().ok_or_else(|| {
            AppError::NotFound(format!("Patient {} not found", self.ticket.patient_id))
        })
    }

    pub fn summary_info(&self) -> Result<TicketSummary> {
        let current_queue = self.current_queue()?;
        Ok(TicketSummary {
            id: self.ticket.id,
            patient_name: self.patient_name()?.to_string(),
            current_queue_name: current_queue.name.clone(),
            current_queue_id: current_queue.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::queues::models::NewQueue;
    use crate::features::tickets::models::{NewQueueAssignment, NewTicket};
    use chrono::{TimeZone, Utc};

    struct Fixture {
        triage: Queue,
        discharged: Queue,
        firm: Firm,
        event: ClinicalEvent,
    }

    fn queue(name: &str, summary_link: bool) -> Queue {
        NewQueue {
            queue_set_id: Uuid::nil(),
            name: name.to_string(),
            description: None,
            is_initial: false,
            summary_link,
            report_definition: None,
            assignment_fields: vec![],
        }
        .into_queue(Uuid::new_v4(), Utc::now())
    }

    fn fixture(summary_link: bool) -> Fixture {
        Fixture {
            triage: queue("Triage", summary_link),
            discharged: queue("Discharged", false),
            firm: Firm {
                id: Uuid::new_v4(),
                name: "Glaucoma Team".to_string(),
                subspecialty_id: Some(Uuid::new_v4()),
                subspecialty_name: Some("Glaucoma".to_string()),
            },
            event: ClinicalEvent {
                id: Uuid::new_v4(),
                episode_id: Uuid::new_v4(),
                event_type_name: "Examination".to_string(),
                event_type_class_name: "OphCiExamination".to_string(),
            },
        }
    }

    fn assignment(queue_id: Uuid, firm_id: Uuid, seconds: i64) -> NewQueueAssignment {
        NewQueueAssignment {
            queue_id,
            assignment_date: Utc.timestamp_opt(seconds, 0).unwrap(),
            assignment_user_id: "clinician-1".to_string(),
            assignment_firm_id: firm_id,
            notes: Some(format!("notes at {}", seconds)),
            details: None,
        }
    }

    /// Ticket created in Triage at t=10, optionally moved to Discharged at t=20
    fn view(f: &Fixture, event: Option<&ClinicalEvent>, moved: bool) -> TicketView {
        let ticket_id = Uuid::new_v4();
        let mut history = AssignmentHistory::default();
        let first = history
            .append(ticket_id, None, assignment(f.triage.id, f.firm.id, 10))
            .unwrap()
            .clone();
        if moved {
            history
                .append(ticket_id, Some(first.id), assignment(f.discharged.id, f.firm.id, 20))
                .unwrap();
        }

        let ticket = NewTicket {
            patient_id: Uuid::new_v4(),
            priority_id: Some(2),
            report: None,
            event_id: event.map(|e| e.id),
            created_user_id: "clinician-1".to_string(),
        }
        .into_ticket(ticket_id, &first);

        let current_outcomes = if moved {
            vec![]
        } else {
            vec![f.discharged.clone()]
        };
        let lookups = ViewLookups {
            queues: [&f.triage, &f.discharged]
                .into_iter()
                .map(|q| (q.id, q.clone()))
                .collect(),
            current_outcomes,
            firms: HashMap::from([(f.firm.id, f.firm.clone())]),
            event: event.cloned(),
            patient_name: Some("Mr Violet Coffin".to_string()),
        };
        TicketView::new(ticket, history, lookups)
    }

    #[test]
    fn test_triage_to_discharged() {
        let f = fixture(false);

        let before = view(&f, None, false);
        assert!(!before.is_complete().unwrap());
        assert!(!before.has_history());
        assert!(before.past_assignments().is_empty());

        let after = view(&f, None, true);
        assert_eq!(after.current_queue().unwrap().name, "Discharged");
        assert!(after.is_complete().unwrap());
        assert!(after.has_history());
        let past = after.past_assignments();
        assert_eq!(past.len(), 1);
        assert_eq!(past[0].queue_id, f.triage.id);
        assert_eq!(after.notes().unwrap(), Some("notes at 20"));
    }

    #[test]
    fn test_source_without_event_is_patient() {
        let f = fixture(false);
        let view = view(&f, None, false);

        assert_eq!(
            view.source_link().unwrap(),
            format!("/patient/view/{}", view.ticket.patient_id)
        );
        assert_eq!(view.source_label().unwrap(), "Patient");
    }

    #[test]
    fn test_source_from_event() {
        let f = fixture(false);
        let view = view(&f, Some(&f.event), false);

        assert_eq!(
            view.source_link().unwrap(),
            format!("/OphCiExamination/default/view/{}", f.event.id)
        );
        assert_eq!(view.source_label().unwrap(), "Examination");
    }

    #[test]
    fn test_source_from_summary_queue_is_episode() {
        let f = fixture(true);
        let view = view(&f, Some(&f.event), true);

        assert_eq!(
            view.source_link().unwrap(),
            format!("/patient/episode/view/{}", f.event.episode_id)
        );
        assert_eq!(view.source_label().unwrap(), "Glaucoma Episode");
        assert_eq!(
            view.originating_firm().unwrap().name_and_subspecialty(),
            "Glaucoma Team (Glaucoma)"
        );
    }

    #[test]
    fn test_summary_info_serializes_flat() {
        let f = fixture(false);
        let view = view(&f, None, false);

        let json = serde_json::to_value(view.summary_info().unwrap()).unwrap();
        assert_eq!(json["patient_name"], "Mr Violet Coffin");
        assert_eq!(json["current_queue_name"], "Triage");
        assert_eq!(json["current_queue_id"], f.triage.id.to_string());
        assert_eq!(json.as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_accessors_fail_without_assignments() {
        let f = fixture(false);
        let mut view = view(&f, None, false);
        view.history = AssignmentHistory::default();

        assert!(matches!(view.source_link(), Err(AppError::NotFound(_))));
        assert!(matches!(view.source_label(), Err(AppError::NotFound(_))));
        assert!(matches!(view.originating_firm(), Err(AppError::NotFound(_))));
        assert!(matches!(view.is_complete(), Err(AppError::NotFound(_))));
        assert!(matches!(view.notes(), Err(AppError::NotFound(_))));
        assert!(matches!(view.summary_info(), Err(AppError::NotFound(_))));
        assert!(!view.has_history());
    }
}
