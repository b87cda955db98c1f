use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::core::config::ListingConfig;
use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::directory::Directories;
use crate::features::queues::models::QueueSet;
use crate::features::queues::QueueSetService;
use crate::features::tickets::dtos::TicketListItemDto;
use crate::features::tickets::models::{TicketFilter, TicketSearch};
use crate::features::tickets::store::TicketStore;
use crate::shared::types::{Meta, PaginationQuery};

/// Filtered, paginated ticket listings of a queue set
pub struct TicketQueryService {
    store: Arc<dyn TicketStore>,
    queues: Arc<QueueSetService>,
    directory: Directories,
    listing: ListingConfig,
}

impl TicketQueryService {
    pub fn new(
        store: Arc<dyn TicketStore>,
        queues: Arc<QueueSetService>,
        directory: Directories,
        listing: ListingConfig,
    ) -> Self {
        Self {
            store,
            queues,
            directory,
            listing,
        }
    }

    /// Turn a user's filter into store criteria for the queue set.
    ///
    /// Every supplied criterion restricts the result. The queue set's filter
    /// settings only say which filters are offered to users.
    pub async fn resolve(
        &self,
        queue_set: &QueueSet,
        filter: &TicketFilter,
        user: &AuthenticatedUser,
    ) -> Result<TicketSearch> {
        let mut queue_ids: Vec<Uuid> = self
            .queues
            .queues_of(queue_set.id, true)
            .await?
            .into_iter()
            .map(|q| q.id)
            .filter(|id| filter.queue_ids.is_empty() || filter.queue_ids.contains(id))
            .collect();
        if filter.closed_tickets == Some(false) {
            let terminal = self.queues.terminal_queue_ids(queue_set.id).await?;
            queue_ids.retain(|id| !terminal.contains(id));
        }

        let priority_ids = (!filter.priority_ids.is_empty()).then(|| filter.priority_ids.clone());
        let firm_ids = self.resolve_firms(filter).await?;
        let assignee_user_id = filter.my_tickets.then(|| user.sub.clone());

        Ok(TicketSearch {
            queue_ids,
            priority_ids,
            firm_ids,
            assignee_user_id,
            patient_id: filter.patient_id,
            sort: self.listing.sort,
        })
    }

    /// Originating firms allowed by the firm and subspecialty criteria; both
    /// given means the firm must also be in the subspecialty
    async fn resolve_firms(&self, filter: &TicketFilter) -> Result<Option<Vec<Uuid>>> {
        match (filter.firm_id, filter.subspecialty_id) {
            (None, None) => Ok(None),
            (Some(firm_id), None) => Ok(Some(vec![firm_id])),
            (firm_id, Some(subspecialty_id)) => {
                let mut firm_ids = self
                    .directory
                    .firms
                    .firm_ids_in_subspecialty(subspecialty_id)
                    .await?;
                if let Some(firm_id) = firm_id {
                    firm_ids.retain(|id| *id == firm_id);
                }
                Ok(Some(firm_ids))
            }
        }
    }

    pub async fn list(
        &self,
        queue_set_id: Uuid,
        filter: &TicketFilter,
        pagination: &PaginationQuery,
        user: &AuthenticatedUser,
    ) -> Result<(Vec<TicketListItemDto>, Meta)> {
        let queue_set = self.queues.get_queue_set(queue_set_id).await?;
        let search = self.resolve(&queue_set, filter, user).await?;
        let page = pagination.resolve(self.listing.default_page_size);

        let (tickets, total) = self.store.search(&search, page).await?;

        let queue_names: HashMap<Uuid, String> = self
            .queues
            .queues_of(queue_set.id, true)
            .await?
            .into_iter()
            .map(|q| (q.id, q.name))
            .collect();

        let mut items = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            let patient_name = self
                .directory
                .patients
                .patient_name(ticket.patient_id)
                .await?;
            items.push(TicketListItemDto {
                id: ticket.id,
                patient_id: ticket.patient_id,
                patient_name,
                priority_id: ticket.priority_id,
                current_queue_id: ticket.current_queue_id,
                current_queue_name: queue_names.get(&ticket.current_queue_id).cloned(),
                assignee_user_id: ticket.assignee_user_id,
                created_date: ticket.created_date,
                report: ticket.report,
            });
        }

        Ok((items, Meta::paginated(total, &page)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::queues::models::FilterSettings;
    use crate::shared::test_helpers::{TestContext, TestUser, TriageSet};

    /// A new patient's ticket in Triage
    async fn ticket_with_priority(ctx: &TestContext, set: &TriageSet, priority_id: i32) -> Uuid {
        let mut dto = ctx.create_dto(set).await;
        dto.priority_id = Some(priority_id);
        ctx.tickets
            .add_patient_to_queue(&TestUser::Admin.user(), dto)
            .await
            .unwrap()
            .ticket
            .id
    }

    fn ids(items: &[TicketListItemDto]) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn test_empty_filter_lists_every_ticket_in_set() {
        let ctx = TestContext::new();
        let set = ctx.triage_set().await;
        let other_set = ctx.triage_set().await;
        let user = TestUser::Admin.user();
        let a = ticket_with_priority(&ctx, &set, 1).await;
        let b = ticket_with_priority(&ctx, &set, 2).await;
        ticket_with_priority(&ctx, &other_set, 2).await;

        let (items, meta) = ctx
            .queries
            .list(set.id, &TicketFilter::default(), &PaginationQuery::default(), &user)
            .await
            .unwrap();

        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(ids(&items), expected);
        assert_eq!(meta.total, 2);
        assert!(items.iter().all(|i| i.patient_name.is_some()));
    }

    #[tokio::test]
    async fn test_priority_filter() {
        let ctx = TestContext::new();
        let set = ctx.triage_set().await;
        let user = TestUser::Admin.user();
        ticket_with_priority(&ctx, &set, 1).await;
        let amber = ticket_with_priority(&ctx, &set, 2).await;
        ticket_with_priority(&ctx, &set, 3).await;

        let filter = TicketFilter {
            priority_ids: vec![2],
            ..Default::default()
        };
        let (items, _) = ctx
            .queries
            .list(set.id, &filter, &PaginationQuery::default(), &user)
            .await
            .unwrap();

        assert_eq!(ids(&items), vec![amber]);
    }

    #[tokio::test]
    async fn test_criteria_apply_when_set_hides_those_filters() {
        let ctx = TestContext::new();
        let hidden = FilterSettings {
            priority: false,
            subspecialty: false,
            firm: false,
            my_tickets: false,
            closed_tickets: false,
        };
        let set = ctx.triage_set_with(Some(hidden)).await;
        let user = TestUser::Admin.user();
        ticket_with_priority(&ctx, &set, 1).await;
        let amber = ticket_with_priority(&ctx, &set, 2).await;
        let closed = ticket_with_priority(&ctx, &set, 3).await;
        ctx.tickets
            .move_ticket(&user, closed, ctx.move_dto(&set, set.triage, set.discharged))
            .await
            .unwrap();
        ctx.tickets.assign(&user, amber, &user.sub).await.unwrap();

        let by_priority = TicketFilter {
            priority_ids: vec![2],
            ..Default::default()
        };
        let (items, meta) = ctx
            .queries
            .list(set.id, &by_priority, &PaginationQuery::default(), &user)
            .await
            .unwrap();
        assert_eq!(ids(&items), vec![amber]);
        assert_eq!(meta.total, 1);

        let open_only = TicketFilter {
            closed_tickets: Some(false),
            ..Default::default()
        };
        let (items, _) = ctx
            .queries
            .list(set.id, &open_only, &PaginationQuery::default(), &user)
            .await
            .unwrap();
        assert_eq!(items.len(), 2);
        assert!(!ids(&items).contains(&closed));

        let mine = TicketFilter {
            my_tickets: true,
            ..Default::default()
        };
        let (items, _) = ctx
            .queries
            .list(set.id, &mine, &PaginationQuery::default(), &user)
            .await
            .unwrap();
        assert_eq!(ids(&items), vec![amber]);

        let other_firm = ctx.directory.add_firm("Cornea Team", None).await;
        let by_firm = TicketFilter {
            firm_id: Some(other_firm.id),
            ..Default::default()
        };
        let (items, _) = ctx
            .queries
            .list(set.id, &by_firm, &PaginationQuery::default(), &user)
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_page_far_beyond_results_is_empty() {
        let ctx = TestContext::new();
        let set = ctx.triage_set().await;
        let user = TestUser::Admin.user();
        ticket_with_priority(&ctx, &set, 2).await;

        let page = PaginationQuery {
            page: Some(i64::MAX),
            page_size: Some(10),
        };
        let (items, meta) = ctx
            .queries
            .list(set.id, &TicketFilter::default(), &page, &user)
            .await
            .unwrap();
        assert!(items.is_empty());
        assert_eq!(meta.total, 1);
    }

    #[tokio::test]
    async fn test_closed_tickets_hidden_on_request() {
        let ctx = TestContext::new();
        let set = ctx.triage_set().await;
        let user = TestUser::Admin.user();
        let open = ticket_with_priority(&ctx, &set, 1).await;
        let closed = ticket_with_priority(&ctx, &set, 1).await;
        ctx.tickets
            .move_ticket(&user, closed, ctx.move_dto(&set, set.triage, set.discharged))
            .await
            .unwrap();

        let hide_closed = TicketFilter {
            closed_tickets: Some(false),
            ..Default::default()
        };
        let (items, _) = ctx
            .queries
            .list(set.id, &hide_closed, &PaginationQuery::default(), &user)
            .await
            .unwrap();
        assert_eq!(ids(&items), vec![open]);

        let (items, _) = ctx
            .queries
            .list(set.id, &TicketFilter::default(), &PaginationQuery::default(), &user)
            .await
            .unwrap();
        assert_eq!(items.len(), 2);

        let only_discharged = TicketFilter {
            queue_ids: vec![set.discharged],
            ..Default::default()
        };
        let (items, _) = ctx
            .queries
            .list(set.id, &only_discharged, &PaginationQuery::default(), &user)
            .await
            .unwrap();
        assert_eq!(ids(&items), vec![closed]);
    }

    #[tokio::test]
    async fn test_my_tickets_and_firm_filters() {
        let ctx = TestContext::new();
        let set = ctx.triage_set().await;
        let user = TestUser::Admin.user();
        let mine = ticket_with_priority(&ctx, &set, 1).await;
        ticket_with_priority(&ctx, &set, 1).await;
        ctx.tickets.assign(&user, mine, &user.sub).await.unwrap();

        let my_tickets = TicketFilter {
            my_tickets: true,
            ..Default::default()
        };
        let (items, _) = ctx
            .queries
            .list(set.id, &my_tickets, &PaginationQuery::default(), &user)
            .await
            .unwrap();
        assert_eq!(ids(&items), vec![mine]);

        let other_firm = ctx.directory.add_firm("Cornea Team", None).await;
        let by_other_firm = TicketFilter {
            firm_id: Some(other_firm.id),
            ..Default::default()
        };
        let (items, _) = ctx
            .queries
            .list(set.id, &by_other_firm, &PaginationQuery::default(), &user)
            .await
            .unwrap();
        assert!(items.is_empty());

        let by_subspecialty = TicketFilter {
            subspecialty_id: Some(set.subspecialty_id),
            ..Default::default()
        };
        let (items, _) = ctx
            .queries
            .list(set.id, &by_subspecialty, &PaginationQuery::default(), &user)
            .await
            .unwrap();
        assert_eq!(items.len(), 2);

        let firm_outside_subspecialty = TicketFilter {
            subspecialty_id: Some(set.subspecialty_id),
            firm_id: Some(other_firm.id),
            ..Default::default()
        };
        let (items, _) = ctx
            .queries
            .list(set.id, &firm_outside_subspecialty, &PaginationQuery::default(), &user)
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_pagination_meta() {
        let ctx = TestContext::new();
        let set = ctx.triage_set().await;
        let user = TestUser::Admin.user();
        for _ in 0..3 {
            ticket_with_priority(&ctx, &set, 2).await;
        }

        let page = PaginationQuery {
            page: Some(2),
            page_size: Some(2),
        };
        let (items, meta) = ctx
            .queries
            .list(set.id, &TicketFilter::default(), &page, &user)
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(meta.total, 3);
        assert_eq!(meta.page, Some(2));
        assert_eq!(meta.page_size, Some(2));
    }
}
