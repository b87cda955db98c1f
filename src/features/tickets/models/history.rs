//! Ordered queue-assignment log of a single ticket.
//!
//! Assignments are ordered by `(assignment_date, sequence)`. The first is the
//! initial assignment and the last is the current one. Appends are
//! compare-and-append: the caller names the assignment it believes is current,
//! and the append is rejected if that is stale or if the new timestamp is
//! earlier than the current assignment's. Equal timestamps are accepted and
//! keep insertion order.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::tickets::models::QueueAssignment;
#[cfg(test)]
use crate::features::tickets::models::NewQueueAssignment;

/// Check an append against the current assignment and return the sequence
/// number the new assignment takes.
///
/// `expected_current` is `None` only when creating the first assignment.
pub fn validate_append(
    current: Option<&QueueAssignment>,
    expected_current: Option<Uuid>,
    assignment_date: DateTime<Utc>,
) -> Result<i32> {
    match (current, expected_current) {
        (None, None) => Ok(1),
        (Some(current), Some(expected)) if current.id == expected => {
            if assignment_date < current.assignment_date {
                return Err(AppError::ConcurrentModification(format!(
                    "Assignment at {} is earlier than the current assignment at {}",
                    assignment_date, current.assignment_date
                )));
            }
            Ok(current.sequence + 1)
        }
        (Some(_), _) => Err(AppError::ConcurrentModification(
            "Ticket has been moved since it was loaded".to_string(),
        )),
        (None, Some(_)) => Err(AppError::NotFound(
            "Ticket has no queue assignments".to_string(),
        )),
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentHistory {
    assignments: Vec<QueueAssignment>,
}

impl AssignmentHistory {
    pub fn new(mut assignments: Vec<QueueAssignment>) -> Self {
        assignments.sort_by_key(|a| (a.assignment_date, a.sequence));
        Self { assignments }
    }

    pub fn initial(&self) -> Result<&QueueAssignment> {
        self.assignments
            .first()
            .ok_or_else(|| AppError::NotFound("Ticket has no queue assignments".to_string()))
    }

    pub fn current(&self) -> Result<&QueueAssignment> {
        self.assignments
            .last()
            .ok_or_else(|| AppError::NotFound("Ticket has no queue assignments".to_string()))
    }

    pub fn all(&self) -> &[QueueAssignment] {
        &self.assignments
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn has_history(&self) -> bool {
        self.assignments.len() > 1
    }

    /// Every assignment but the current one, oldest first
    pub fn past_assignments(&self) -> &[QueueAssignment] {
        self.assignments
            .split_last()
            .map(|(_, past)| past)
            .unwrap_or(&[])
    }

    /// In-memory counterpart of [`TicketStore::append_assignment`]
    ///
    /// [`TicketStore::append_assignment`]: crate::features::tickets::store::TicketStore::append_assignment
    #[cfg(test)]
    pub fn append(
        &mut self,
        ticket_id: Uuid,
        expected_current: Option<Uuid>,
        assignment: NewQueueAssignment,
    ) -> Result<&QueueAssignment> {
        let sequence = validate_append(
            self.assignments.last(),
            expected_current,
            assignment.assignment_date,
        )?;
        self.assignments
            .push(assignment.into_assignment(Uuid::now_v7(), ticket_id, sequence));
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).unwrap()
    }

    fn new_assignment(queue_id: Uuid, seconds: i64) -> NewQueueAssignment {
        NewQueueAssignment {
            queue_id,
            assignment_date: at(seconds),
            assignment_user_id: "clinician-1".to_string(),
            assignment_firm_id: Uuid::new_v4(),
            notes: Some(format!("at {}", seconds)),
            details: None,
        }
    }

    #[test]
    fn test_empty_history_has_no_initial_or_current() {
        let history = AssignmentHistory::default();
        assert!(matches!(history.initial(), Err(AppError::NotFound(_))));
        assert!(matches!(history.current(), Err(AppError::NotFound(_))));
        assert!(!history.has_history());
        assert!(history.past_assignments().is_empty());
    }

    #[test]
    fn test_append_moves_current_forward() {
        let ticket_id = Uuid::new_v4();
        let triage = Uuid::new_v4();
        let discharged = Uuid::new_v4();
        let mut history = AssignmentHistory::default();

        let first = history
            .append(ticket_id, None, new_assignment(triage, 10))
            .unwrap()
            .id;
        assert!(!history.has_history());
        assert!(history.past_assignments().is_empty());

        history
            .append(ticket_id, Some(first), new_assignment(discharged, 20))
            .unwrap();

        assert_eq!(history.current().unwrap().queue_id, discharged);
        assert_eq!(history.initial().unwrap().queue_id, triage);
        assert!(history.has_history());
        let past = history.past_assignments();
        assert_eq!(past.len(), 1);
        assert_eq!(past[0].queue_id, triage);
        assert_eq!(past[0].assignment_date, at(10));
    }

    #[test]
    fn test_out_of_order_append_rejected() {
        let ticket_id = Uuid::new_v4();
        let mut history = AssignmentHistory::default();
        let first = history
            .append(ticket_id, None, new_assignment(Uuid::new_v4(), 20))
            .unwrap()
            .id;

        let result = history.append(ticket_id, Some(first), new_assignment(Uuid::new_v4(), 10));
        assert!(matches!(result, Err(AppError::ConcurrentModification(_))));
        assert_eq!(history.len(), 1);
        assert_eq!(history.current().unwrap().id, first);
    }

    #[test]
    fn test_stale_expected_current_rejected() {
        let ticket_id = Uuid::new_v4();
        let mut history = AssignmentHistory::default();
        let first = history
            .append(ticket_id, None, new_assignment(Uuid::new_v4(), 10))
            .unwrap()
            .id;
        history
            .append(ticket_id, Some(first), new_assignment(Uuid::new_v4(), 20))
            .unwrap();

        // A second writer that still believes `first` is current
        let result = history.append(ticket_id, Some(first), new_assignment(Uuid::new_v4(), 30));
        assert!(matches!(result, Err(AppError::ConcurrentModification(_))));
        assert_eq!(history.len(), 2);

        // Creating a first assignment twice is also stale
        let result = history.append(ticket_id, None, new_assignment(Uuid::new_v4(), 30));
        assert!(matches!(result, Err(AppError::ConcurrentModification(_))));
    }

    #[test]
    fn test_equal_timestamps_keep_insertion_order() {
        let ticket_id = Uuid::new_v4();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut history = AssignmentHistory::default();
        let first = history.append(ticket_id, None, new_assignment(a, 10)).unwrap().id;
        let second = history
            .append(ticket_id, Some(first), new_assignment(b, 10))
            .unwrap()
            .id;
        history
            .append(ticket_id, Some(second), new_assignment(c, 10))
            .unwrap();

        let queues: Vec<Uuid> = history.all().iter().map(|x| x.queue_id).collect();
        assert_eq!(queues, vec![a, b, c]);
        assert_eq!(history.current().unwrap().sequence, 3);
    }

    #[test]
    fn test_new_sorts_loaded_rows_canonically() {
        let ticket_id = Uuid::new_v4();
        let rows = vec![
            new_assignment(Uuid::new_v4(), 20).into_assignment(Uuid::new_v4(), ticket_id, 2),
            new_assignment(Uuid::new_v4(), 20).into_assignment(Uuid::new_v4(), ticket_id, 3),
            new_assignment(Uuid::new_v4(), 10).into_assignment(Uuid::new_v4(), ticket_id, 1),
        ];
        let history = AssignmentHistory::new(rows);

        let sequences: Vec<i32> = history.all().iter().map(|a| a.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
        // current is the maximum timestamp, initial the minimum
        assert_eq!(history.current().unwrap().sequence, 3);
        assert_eq!(history.initial().unwrap().assignment_date, at(10));
    }
}
