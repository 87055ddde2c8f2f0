//! `timeline_events` table: `(case_id, seq)` primary key, append-only.

use chrono::{DateTime, Utc};
use discharge_core::{EventStatus, TimelineEvent, WorkflowStatus};
use sqlx::{FromRow, PgPool};

use crate::case_repository::CaseRepository;
use crate::error::StoreError;
use crate::serde_text::{from_text, to_text};

#[derive(Debug, FromRow)]
struct EventRow {
    case_id: String,
    seq: i64,
    step: String,
    agent: String,
    status: String,
    description: String,
    details: serde_json::Value,
    timestamp: DateTime<Utc>,
    transcription: Option<String>,
}

impl EventRow {
    fn into_event(self) -> Result<TimelineEvent, StoreError> {
        Ok(TimelineEvent {
            case_id: self.case_id,
            seq: self.seq,
            step: self.step,
            agent: self.agent,
            status: from_text::<EventStatus>(&self.status)
                .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))?,
            description: self.description,
            details: serde_json::from_value(self.details).unwrap_or_default(),
            timestamp: self.timestamp,
            transcription: self.transcription,
        })
    }
}

pub struct TimelineRepository {
    pool: PgPool,
}

impl TimelineRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one event, assigning the next dense `seq` for `case_id`, and
    /// bump the Case row's `updated_at` (and optionally its terminal status)
    /// in the same transaction — the §4.7 invariant.
    #[tracing::instrument(skip(self, event), fields(case_id = %event.case_id, step = %event.step))]
    pub async fn append(
        &self,
        mut event: TimelineEvent,
        case_status_update: Option<(WorkflowStatus, Option<DateTime<Utc>>)>,
    ) -> Result<TimelineEvent, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Lock the case row and compute the next dense seq under it, so
        // concurrent appends for the same case_id serialize.
        sqlx::query("SELECT case_id FROM cases WHERE case_id = $1 FOR UPDATE")
            .bind(&event.case_id)
            .fetch_optional(&mut *tx)
            .await?;

        let next_seq: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(seq) + 1, 0) FROM timeline_events WHERE case_id = $1",
        )
        .bind(&event.case_id)
        .fetch_one(&mut *tx)
        .await?;
        event.seq = next_seq;

        sqlx::query(
            r#"
            INSERT INTO timeline_events
                (case_id, seq, step, agent, status, description, details, timestamp, transcription)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&event.case_id)
        .bind(event.seq)
        .bind(&event.step)
        .bind(&event.agent)
        .bind(to_text(&event.status))
        .bind(serde_json::to_value(&event.details).unwrap_or_default())
        .bind(event.timestamp)
        .bind(&event.transcription)
        .execute(&mut *tx)
        .await?;

        let (status, completed_at) = case_status_update.unzip();
        let completed_at = completed_at.flatten();
        CaseRepository::touch(&mut tx, &event.case_id, status, completed_at).await?;

        tx.commit().await?;
        Ok(event)
    }

    pub async fn load(&self, case_id: &str) -> Result<Vec<TimelineEvent>, StoreError> {
        let rows: Vec<EventRow> = sqlx::query_as(
            "SELECT case_id, seq, step, agent, status, description, details, timestamp, transcription \
             FROM timeline_events WHERE case_id = $1 ORDER BY seq ASC",
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(EventRow::into_event).collect()
    }
}

#[cfg(test)]
mod tests {
    // Density and ordering are exercised end-to-end in discharge-workflow's
    // integration tests against a real pool; this crate has no in-memory
    // Postgres fake to assert against here.
}
