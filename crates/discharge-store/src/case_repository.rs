//! `cases` table: one row per `case_id` (unique constraint per spec §6).

use chrono::{DateTime, Utc};
use discharge_core::{Case, ClinicalInfo, ContactInfo, DischargeInfo, FollowUp, WorkflowStatus, WorkflowStep};
use sqlx::{FromRow, PgPool};

use crate::error::StoreError;
use crate::serde_text::{from_text, to_text};

#[derive(Debug, FromRow)]
struct CaseRow {
    case_id: String,
    patient_name: String,
    patient_dob: chrono::NaiveDate,
    contact: serde_json::Value,
    discharge: serde_json::Value,
    clinical: serde_json::Value,
    follow_up: serde_json::Value,
    workflow_status: String,
    current_step: Option<String>,
    assigned_shelter_id: Option<String>,
    assigned_transport_provider: Option<String>,
    assigned_benefits: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl CaseRow {
    fn into_case(self) -> Result<Case, StoreError> {
        Ok(Case {
            case_id: self.case_id,
            patient_name: self.patient_name,
            patient_dob: self.patient_dob,
            contact: serde_json::from_value::<ContactInfo>(self.contact)
                .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))?,
            discharge: serde_json::from_value::<DischargeInfo>(self.discharge)
                .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))?,
            clinical: serde_json::from_value::<ClinicalInfo>(self.clinical)
                .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))?,
            follow_up: serde_json::from_value::<FollowUp>(self.follow_up)
                .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))?,
            workflow_status: from_text(&self.workflow_status)
                .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))?,
            current_step: self
                .current_step
                .map(|s| from_text::<WorkflowStep>(&s))
                .transpose()
                .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))?,
            assigned_shelter_id: self.assigned_shelter_id,
            assigned_transport_provider: self.assigned_transport_provider,
            assigned_benefits: self.assigned_benefits,
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
        })
    }
}

#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct CaseSummary {
    pub case_id: String,
    pub patient_name: String,
    pub workflow_status: String,
    pub updated_at: DateTime<Utc>,
}

pub struct CaseRepository {
    pool: PgPool,
}

impl CaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, case), fields(case_id = %case.case_id))]
    pub async fn upsert(&self, case: &Case) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO cases (
                case_id, patient_name, patient_dob, contact, discharge, clinical, follow_up,
                workflow_status, current_step, assigned_shelter_id, assigned_transport_provider,
                assigned_benefits, created_at, updated_at, completed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (case_id) DO UPDATE SET
                patient_name = EXCLUDED.patient_name,
                contact = EXCLUDED.contact,
                discharge = EXCLUDED.discharge,
                clinical = EXCLUDED.clinical,
                follow_up = EXCLUDED.follow_up,
                workflow_status = EXCLUDED.workflow_status,
                current_step = EXCLUDED.current_step,
                assigned_shelter_id = EXCLUDED.assigned_shelter_id,
                assigned_transport_provider = EXCLUDED.assigned_transport_provider,
                assigned_benefits = EXCLUDED.assigned_benefits,
                updated_at = EXCLUDED.updated_at,
                completed_at = EXCLUDED.completed_at
            "#,
        )
        .bind(&case.case_id)
        .bind(&case.patient_name)
        .bind(case.patient_dob)
        .bind(serde_json::to_value(&case.contact).unwrap_or_default())
        .bind(serde_json::to_value(&case.discharge).unwrap_or_default())
        .bind(serde_json::to_value(&case.clinical).unwrap_or_default())
        .bind(serde_json::to_value(&case.follow_up).unwrap_or_default())
        .bind(to_text(&case.workflow_status))
        .bind(case.current_step.map(|s| to_text(&s)))
        .bind(&case.assigned_shelter_id)
        .bind(&case.assigned_transport_provider)
        .bind(&case.assigned_benefits)
        .bind(case.created_at)
        .bind(case.updated_at)
        .bind(case.completed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn load(&self, case_id: &str) -> Result<Case, StoreError> {
        let row: Option<CaseRow> = sqlx::query_as(
            r#"
            SELECT case_id, patient_name, patient_dob, contact, discharge, clinical, follow_up,
                   workflow_status, current_step, assigned_shelter_id, assigned_transport_provider,
                   assigned_benefits, created_at, updated_at, completed_at
            FROM cases WHERE case_id = $1
            "#,
        )
        .bind(case_id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| StoreError::CaseNotFound(case_id.to_string()))?.into_case()
    }

    pub async fn list_summaries(&self) -> Result<Vec<CaseSummary>, StoreError> {
        let rows = sqlx::query_as(
            "SELECT case_id, patient_name, workflow_status, updated_at FROM cases ORDER BY updated_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Bump `updated_at` — used inside the transactional timeline append in
    /// `TimelineRepository` so readers never see an event referencing a Case
    /// row that has not yet advanced (§4.7).
    pub(crate) async fn touch(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        case_id: &str,
        status: Option<WorkflowStatus>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE cases SET
                updated_at = now(),
                workflow_status = COALESCE($2, workflow_status),
                completed_at = COALESCE($3, completed_at)
            WHERE case_id = $1
            "#,
        )
        .bind(case_id)
        .bind(status.map(|s| to_text(&s)))
        .bind(completed_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
