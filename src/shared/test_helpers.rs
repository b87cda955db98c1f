use std::sync::Arc;

use axum::{extract::Request, middleware::Next, Router};
use uuid::Uuid;

use crate::core::config::ListingConfig;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::directory::clients::memory::InMemoryDirectory;
use crate::features::directory::Directories;
use crate::features::queues::dtos::{AddOutcomeDto, CreateQueueDto, CreateQueueSetDto};
use crate::features::queues::models::FilterSettings;
use crate::features::queues::store::memory::InMemoryQueueStore;
use crate::features::queues::{MembershipAuthorizer, QueueSetService, QueueStore};
use crate::features::tickets::dtos::{CreateTicketDto, MoveTicketDto};
use crate::features::tickets::services::{HistoryService, TicketQueryService, TicketService};
use crate::features::tickets::store::memory::InMemoryTicketStore;
use crate::features::tickets::store::TicketStore;

/// Users injected in place of a validated bearer token
#[derive(Debug, Clone, Copy)]
pub enum TestUser {
    /// super_admin: configures queues and processes every queue set
    Admin,
    /// No roles; processes only queue sets it has been granted
    Clinician,
}

impl TestUser {
    pub fn user(self) -> AuthenticatedUser {
        match self {
            TestUser::Admin => AuthenticatedUser {
                sub: "admin-1".to_string(),
                name: Some("Test Admin".to_string()),
                roles: vec!["super_admin".to_string()],
            },
            TestUser::Clinician => AuthenticatedUser {
                sub: "clinician-1".to_string(),
                name: Some("Test Clinician".to_string()),
                roles: vec![],
            },
        }
    }
}

/// Layer the router so every request carries `user`, as `auth_middleware` would
pub fn with_test_user(router: Router, user: TestUser) -> Router {
    let user = user.user();
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
        },
    ))
}

/// Queue set "Glaucoma": Triage (initial, summary) -> Discharged (terminal)
pub struct TriageSet {
    pub id: Uuid,
    pub triage: Uuid,
    pub discharged: Uuid,
    /// "Glaucoma Team", in the Glaucoma subspecialty
    pub firm_id: Uuid,
    pub subspecialty_id: Uuid,
}

/// Every service wired to in-memory stores
pub struct TestContext {
    pub directory: Arc<InMemoryDirectory>,
    pub queue_sets: Arc<QueueSetService>,
    pub tickets: Arc<TicketService>,
    pub queries: Arc<TicketQueryService>,
}

impl TestContext {
    pub fn new() -> Self {
        let queue_store: Arc<dyn QueueStore> =
            Arc::new(InMemoryQueueStore::with_default_priorities());
        let ticket_store: Arc<dyn TicketStore> = Arc::new(InMemoryTicketStore::default());
        let directory = Arc::new(InMemoryDirectory::default());
        let directories = Directories::from_client(Arc::clone(&directory));

        let authorizer = Arc::new(MembershipAuthorizer::new(Arc::clone(&queue_store)));
        let queue_sets = Arc::new(QueueSetService::new(queue_store, authorizer));
        let history = Arc::new(HistoryService::new(Arc::clone(&ticket_store)));
        let tickets = Arc::new(TicketService::new(
            Arc::clone(&ticket_store),
            history,
            Arc::clone(&queue_sets),
            directories.clone(),
        ));
        let queries = Arc::new(TicketQueryService::new(
            ticket_store,
            Arc::clone(&queue_sets),
            directories,
            ListingConfig::default(),
        ));

        Self {
            directory,
            queue_sets,
            tickets,
            queries,
        }
    }

    pub async fn triage_set(&self) -> TriageSet {
        self.triage_set_with(None).await
    }

    /// Same queues as [`Self::triage_set`], with the given filter settings
    pub async fn triage_set_with(&self, filter_settings: Option<FilterSettings>) -> TriageSet {
        let created = self
            .queue_sets
            .create_queue_set(CreateQueueSetDto {
                category_id: None,
                name: "Glaucoma".to_string(),
                description: None,
                allow_null_priority: false,
                summary_link: true,
                filter_settings,
                initial_queue: queue_dto("Triage"),
            })
            .await
            .unwrap();
        let discharged = self
            .queue_sets
            .add_queue(created.queue_set.id, queue_dto("Discharged"))
            .await
            .unwrap();
        self.queue_sets
            .add_outcome(
                created.initial_queue.id,
                AddOutcomeDto {
                    outcome_queue_id: discharged.id,
                    display_order: 1,
                },
            )
            .await
            .unwrap();

        let subspecialty_id = Uuid::new_v4();
        let firm = self
            .directory
            .add_firm("Glaucoma Team", Some((subspecialty_id, "Glaucoma")))
            .await;

        TriageSet {
            id: created.queue_set.id,
            triage: created.initial_queue.id,
            discharged: discharged.id,
            firm_id: firm.id,
            subspecialty_id,
        }
    }

    pub async fn grant(&self, queue_set_id: Uuid, user: &AuthenticatedUser) {
        self.queue_sets
            .grant_user(queue_set_id, &user.sub)
            .await
            .unwrap();
    }

    /// A new patient added to Triage with Amber priority
    pub async fn create_dto(&self, set: &TriageSet) -> CreateTicketDto {
        let (patient_id, _) = self.directory.add_patient().await;
        CreateTicketDto {
            patient_id,
            queue_id: set.triage,
            firm_id: set.firm_id,
            priority_id: Some(2),
            event_id: None,
            notes: Some("Raised IOP".to_string()),
            fields: Default::default(),
        }
    }

    pub fn move_dto(&self, set: &TriageSet, from: Uuid, to: Uuid) -> MoveTicketDto {
        MoveTicketDto {
            from_queue_id: from,
            to_queue_id: to,
            firm_id: set.firm_id,
            notes: Some("Moved".to_string()),
            fields: Default::default(),
        }
    }
}

/// Queue set service over an empty in-memory registry
pub fn queue_set_service() -> Arc<QueueSetService> {
    TestContext::new().queue_sets
}

pub fn queue_dto(name: &str) -> CreateQueueDto {
    CreateQueueDto {
        name: name.to_string(),
        description: None,
        report_definition: None,
        assignment_fields: vec![],
        summary_link: None,
        is_initial: false,
    }
}
