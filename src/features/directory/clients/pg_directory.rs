use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::directory::models::{ClinicalEvent, Firm};
use crate::features::directory::traits::{EventDirectory, FirmDirectory, PatientDirectory};

/// Directory backed by the host system's tables in the shared database
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PatientDirectory for PgDirectory {
    async fn patient_name(&self, patient_id: Uuid) -> Result<Option<String>> {
        let row: Option<(Option<String>, String, String)> = sqlx::query_as(
            r#"
            SELECT title, first_name, last_name
            FROM patients
            WHERE id = $1
            "#,
        )
        .bind(patient_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get patient {}: {:?}", patient_id, e);
            AppError::Database(e)
        })?;

        Ok(row.map(|(title, first_name, last_name)| match title {
            Some(title) if !title.is_empty() => {
                format!("{} {} {}", title, first_name, last_name)
            }
            _ => format!("{} {}", first_name, last_name),
        }))
    }
}

#[async_trait]
impl EventDirectory for PgDirectory {
    async fn event(&self, event_id: Uuid) -> Result<Option<ClinicalEvent>> {
        sqlx::query_as::<_, ClinicalEvent>(
            r#"
            SELECT
                e.id, e.episode_id,
                et.name AS event_type_name,
                et.class_name AS event_type_class_name
            FROM events e
            JOIN event_types et ON et.id = e.event_type_id
            WHERE e.id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get event {}: {:?}", event_id, e);
            AppError::Database(e)
        })
    }
}

#[async_trait]
impl FirmDirectory for PgDirectory {
    async fn firm(&self, firm_id: Uuid) -> Result<Option<Firm>> {
        sqlx::query_as::<_, Firm>(
            r#"
            SELECT
                f.id, f.name, f.subspecialty_id,
                s.name AS subspecialty_name
            FROM firms f
            LEFT JOIN subspecialties s ON s.id = f.subspecialty_id
            WHERE f.id = $1
            "#,
        )
        .bind(firm_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get firm {}: {:?}", firm_id, e);
            AppError::Database(e)
        })
    }

    async fn firm_ids_in_subspecialty(&self, subspecialty_id: Uuid) -> Result<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM firms WHERE subspecialty_id = $1")
            .bind(subspecialty_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to list firms for subspecialty {}: {:?}",
                    subspecialty_id,
                    e
                );
                AppError::Database(e)
            })
    }
}
