use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Ticket priority (reference data seeded by migration)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Priority {
    pub id: i32,
    pub name: String,
    pub colour: String,
    pub display_order: i32,
}
