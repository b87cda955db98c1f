use uuid::Uuid;

use crate::core::config::TicketSortOrder;
#[cfg(test)]
use crate::features::tickets::models::Ticket;

/// Listing criteria as supplied by a user.
///
/// Empty lists and `None` mean the criterion was not supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFilter {
    pub queue_ids: Vec<Uuid>,
    pub priority_ids: Vec<i32>,
    pub subspecialty_id: Option<Uuid>,
    pub firm_id: Option<Uuid>,
    pub my_tickets: bool,
    /// `Some(false)` hides tickets in terminal queues
    pub closed_tickets: Option<bool>,
    pub patient_id: Option<Uuid>,
}

/// Criteria resolved against a queue set, ready for a store to evaluate.
///
/// `queue_ids` is an allow-list: an empty list matches nothing. For the other
/// criteria `None` means unrestricted and `Some(empty)` matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketSearch {
    pub queue_ids: Vec<Uuid>,
    pub priority_ids: Option<Vec<i32>>,
    /// Matched against the firm of the initial assignment
    pub firm_ids: Option<Vec<Uuid>>,
    pub assignee_user_id: Option<String>,
    pub patient_id: Option<Uuid>,
    pub sort: TicketSortOrder,
}

impl TicketSearch {
    /// Every ticket currently in one of `queue_ids`
    pub fn in_queues(queue_ids: Vec<Uuid>) -> Self {
        Self {
            queue_ids,
            priority_ids: None,
            firm_ids: None,
            assignee_user_id: None,
            patient_id: None,
            sort: TicketSortOrder::CreatedDesc,
        }
    }

    /// Evaluate the search for one ticket.
    ///
    /// Keep in step with `SEARCH_CONDITIONS` in the Postgres ticket store.
    #[cfg(test)]
    pub fn matches(&self, ticket: &Ticket, originating_firm_id: Uuid) -> bool {
        if !self.queue_ids.contains(&ticket.current_queue_id) {
            return false;
        }
        if let Some(priority_ids) = &self.priority_ids {
            match ticket.priority_id {
                Some(priority_id) if priority_ids.contains(&priority_id) => {}
                _ => return false,
            }
        }
        if let Some(firm_ids) = &self.firm_ids {
            if !firm_ids.contains(&originating_firm_id) {
                return false;
            }
        }
        if let Some(assignee) = &self.assignee_user_id {
            if ticket.assignee_user_id.as_ref() != Some(assignee) {
                return false;
            }
        }
        if let Some(patient_id) = self.patient_id {
            if ticket.patient_id != patient_id {
                return false;
            }
        }
        true
    }

    /// Sort tickets in place by the configured order, ties broken by id.
    ///
    /// Keep in step with `order_clause` in the Postgres ticket store.
    #[cfg(test)]
    pub fn sort_tickets(&self, tickets: &mut [Ticket]) {
        match self.sort {
            TicketSortOrder::CreatedDesc => {
                tickets.sort_by(|a, b| (b.created_date, b.id).cmp(&(a.created_date, a.id)))
            }
            TicketSortOrder::CreatedAsc => tickets.sort_by_key(|t| (t.created_date, t.id)),
            TicketSortOrder::Priority => tickets.sort_by_key(|t| {
                (
                    t.priority_id.is_none(),
                    t.priority_id,
                    t.created_date,
                    t.id,
                )
            }),
        }
    }
}
