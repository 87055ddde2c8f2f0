//! `scrape_log` table: append-only record of every scrape attempt, used
//! for the operator-facing scrape history (§5) and diagnosing cache misses.

use chrono::{DateTime, Utc};
use discharge_core::{CacheCategory, ScrapeLog, ScrapeStatus};
use sqlx::{FromRow, PgPool};

use crate::error::StoreError;
use crate::serde_text::{from_text, to_text};

#[derive(FromRow)]
struct ScrapeLogRow {
    category: String,
    url: String,
    status: String,
    items_scraped: i64,
    error_message: Option<String>,
    duration_seconds: f64,
    scraped_at: DateTime<Utc>,
}

impl ScrapeLogRow {
    fn into_log(self) -> Result<ScrapeLog, StoreError> {
        Ok(ScrapeLog {
            category: from_text(&self.category)
                .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))?,
            url: self.url,
            status: from_text::<ScrapeStatus>(&self.status)
                .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))?,
            items_scraped: self.items_scraped,
            error_message: self.error_message,
            duration_seconds: self.duration_seconds,
            scraped_at: self.scraped_at,
        })
    }
}

pub struct ScrapeLogRepository {
    pool: PgPool,
}

impl ScrapeLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn append(&self, log: &ScrapeLog) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO scrape_log
                (category, url, status, items_scraped, error_message, duration_seconds, scraped_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(to_text(&log.category))
        .bind(&log.url)
        .bind(to_text(&log.status))
        .bind(log.items_scraped)
        .bind(&log.error_message)
        .bind(log.duration_seconds)
        .bind(log.scraped_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn recent(&self, category: CacheCategory, limit: i64) -> Result<Vec<ScrapeLog>, StoreError> {
        let rows: Vec<ScrapeLogRow> = sqlx::query_as(
            r#"
            SELECT category, url, status, items_scraped, error_message, duration_seconds, scraped_at
            FROM scrape_log
            WHERE category = $1
            ORDER BY scraped_at DESC
            LIMIT $2
            "#,
        )
        .bind(to_text(&category))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ScrapeLogRow::into_log).collect()
    }
}
