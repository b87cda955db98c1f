use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::shared::constants::SUPPORT_SERVICES_SUBSPECIALTY;

/// A clinical event that may originate a ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ClinicalEvent {
    pub id: Uuid,
    pub episode_id: Uuid,
    /// Display name of the event type, e.g. "Examination"
    pub event_type_name: String,
    /// Module class of the event type, used to build view links
    pub event_type_class_name: String,
}

/// A clinical team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Firm {
    pub id: Uuid,
    pub name: String,
    pub subspecialty_id: Option<Uuid>,
    pub subspecialty_name: Option<String>,
}

impl Firm {
    pub fn subspecialty_text(&self) -> &str {
        self.subspecialty_name
            .as_deref()
            .unwrap_or(SUPPORT_SERVICES_SUBSPECIALTY)
    }

    /// e.g. "Glaucoma Team (Glaucoma)"
    pub fn name_and_subspecialty(&self) -> String {
        format!("{} ({})", self.name, self.subspecialty_text())
    }
}
