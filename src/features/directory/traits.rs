use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::directory::models::{ClinicalEvent, Firm};

/// Resolves patients to display names
#[async_trait]
pub trait PatientDirectory: Send + Sync {
    /// Full display name, `None` if the patient is unknown
    async fn patient_name(&self, patient_id: Uuid) -> Result<Option<String>>;
}

/// Resolves originating clinical events
#[async_trait]
pub trait EventDirectory: Send + Sync {
    async fn event(&self, event_id: Uuid) -> Result<Option<ClinicalEvent>>;
}

/// Resolves firms and subspecialty membership
#[async_trait]
pub trait FirmDirectory: Send + Sync {
    async fn firm(&self, firm_id: Uuid) -> Result<Option<Firm>>;

    /// Ids of every firm belonging to the subspecialty
    async fn firm_ids_in_subspecialty(&self, subspecialty_id: Uuid) -> Result<Vec<Uuid>>;
}

/// The directory collaborators a ticket needs, usually all backed by one client
#[derive(Clone)]
pub struct Directories {
    pub patients: Arc<dyn PatientDirectory>,
    pub events: Arc<dyn EventDirectory>,
    pub firms: Arc<dyn FirmDirectory>,
}

impl Directories {
    pub fn from_client<T>(client: Arc<T>) -> Self
    where
        T: PatientDirectory + EventDirectory + FirmDirectory + 'static,
    {
        Self {
            patients: client.clone(),
            events: client.clone(),
            firms: client,
        }
    }
}
