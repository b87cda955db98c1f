use std::collections::HashMap;

use async_trait::async_trait;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::directory::models::{ClinicalEvent, Firm};
use crate::features::directory::traits::{EventDirectory, FirmDirectory, PatientDirectory};

#[derive(Default)]
struct Records {
    patients: HashMap<Uuid, String>,
    events: HashMap<Uuid, ClinicalEvent>,
    firms: HashMap<Uuid, Firm>,
}

/// Directory held in memory, used by service and handler tests
#[derive(Default)]
pub struct InMemoryDirectory {
    records: RwLock<Records>,
}

impl InMemoryDirectory {
    /// Add a patient with a generated name
    pub async fn add_patient(&self) -> (Uuid, String) {
        let first: String = FirstName().fake();
        let last: String = LastName().fake();
        let name = format!("{} {}", first, last);
        let id = Uuid::new_v4();
        self.records.write().await.patients.insert(id, name.clone());
        (id, name)
    }

    pub async fn add_firm(&self, name: &str, subspecialty: Option<(Uuid, &str)>) -> Firm {
        let firm = Firm {
            id: Uuid::new_v4(),
            name: name.to_string(),
            subspecialty_id: subspecialty.map(|(id, _)| id),
            subspecialty_name: subspecialty.map(|(_, name)| name.to_string()),
        };
        self.records.write().await.firms.insert(firm.id, firm.clone());
        firm
    }

    pub async fn add_event(&self, event_type_name: &str, class_name: &str) -> ClinicalEvent {
        let event = ClinicalEvent {
            id: Uuid::new_v4(),
            episode_id: Uuid::new_v4(),
            event_type_name: event_type_name.to_string(),
            event_type_class_name: class_name.to_string(),
        };
        self.records.write().await.events.insert(event.id, event.clone());
        event
    }
}

#[async_trait]
impl PatientDirectory for InMemoryDirectory {
    async fn patient_name(&self, patient_id: Uuid) -> Result<Option<String>> {
        Ok(self.records.read().await.patients.get(&patient_id).cloned())
    }
}

#[async_trait]
impl EventDirectory for InMemoryDirectory {
    async fn event(&self, event_id: Uuid) -> Result<Option<ClinicalEvent>> {
        Ok(self.records.read().await.events.get(&event_id).cloned())
    }
}

#[async_trait]
impl FirmDirectory for InMemoryDirectory {
    async fn firm(&self, firm_id: Uuid) -> Result<Option<Firm>> {
        Ok(self.records.read().await.firms.get(&firm_id).cloned())
    }

    async fn firm_ids_in_subspecialty(&self, subspecialty_id: Uuid) -> Result<Vec<Uuid>> {
        let records = self.records.read().await;
        Ok(records
            .firms
            .values()
            .filter(|f| f.subspecialty_id == Some(subspecialty_id))
            .map(|f| f.id)
            .collect())
    }
}
