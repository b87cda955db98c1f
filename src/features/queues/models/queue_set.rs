use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Which optional filter columns a ticket listing exposes for a queue set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FilterSettings {
    pub priority: bool,
    pub subspecialty: bool,
    pub firm: bool,
    pub my_tickets: bool,
    pub closed_tickets: bool,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            priority: true,
            subspecialty: true,
            firm: true,
            my_tickets: true,
            closed_tickets: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct QueueSetCategory {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
}

/// Database model for queue set
#[derive(Debug, Clone, FromRow)]
pub struct QueueSet {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub allow_null_priority: bool,
    pub summary_link: bool,
    pub filter_priority: bool,
    pub filter_subspecialty: bool,
    pub filter_firm: bool,
    pub filter_my_tickets: bool,
    pub filter_closed_tickets: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl QueueSet {
    pub fn filter_settings(&self) -> FilterSettings {
        FilterSettings {
            priority: self.filter_priority,
            subspecialty: self.filter_subspecialty,
            firm: self.filter_firm,
            my_tickets: self.filter_my_tickets,
            closed_tickets: self.filter_closed_tickets,
        }
    }
}

/// Insert model for queue set
#[derive(Debug, Clone)]
pub struct NewQueueSet {
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub allow_null_priority: bool,
    pub summary_link: bool,
    pub filter_settings: FilterSettings,
}

impl NewQueueSet {
    pub fn into_queue_set(self, id: Uuid, created_at: DateTime<Utc>) -> QueueSet {
        let filters = self.filter_settings;
        QueueSet {
            id,
            category_id: self.category_id,
            name: self.name,
            description: self.description,
            allow_null_priority: self.allow_null_priority,
            summary_link: self.summary_link,
            filter_priority: filters.priority,
            filter_subspecialty: filters.subspecialty,
            filter_firm: filters.firm,
            filter_my_tickets: filters.my_tickets,
            filter_closed_tickets: filters.closed_tickets,
            active: true,
            created_at,
        }
    }
}
