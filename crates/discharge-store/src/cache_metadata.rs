//! `cache_metadata` table: one row per category, `category` is primary key.

use chrono::{DateTime, Utc};
use discharge_core::{CacheCategory, CacheMetadata};
use sqlx::{FromRow, PgPool};

use crate::error::StoreError;
use crate::serde_text::{from_text, to_text};

#[derive(FromRow)]
struct CacheMetadataRow {
    category: String,
    last_scraped_at: DateTime<Utc>,
    items_count: i64,
    ttl_seconds: i64,
}

impl CacheMetadataRow {
    fn into_metadata(self) -> Result<CacheMetadata, StoreError> {
        Ok(CacheMetadata {
            category: from_text(&self.category)
                .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))?,
            last_scraped_at: self.last_scraped_at,
            items_count: self.items_count,
            ttl_seconds: self.ttl_seconds,
        })
    }
}

pub struct CacheMetadataRepository {
    pool: PgPool,
}

impl CacheMetadataRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, category: CacheCategory) -> Result<Option<CacheMetadata>, StoreError> {
        let row: Option<CacheMetadataRow> = sqlx::query_as(
            "SELECT category, last_scraped_at, items_count, ttl_seconds FROM cache_metadata WHERE category = $1",
        )
        .bind(to_text(&category))
        .fetch_optional(&self.pool)
        .await?;
        row.map(CacheMetadataRow::into_metadata).transpose()
    }

    /// Upsert the row after a successful (or partial) refresh. `items_count`
    /// must equal the row count of the category table immediately after the
    /// refresh commits (§3 invariant) — callers pass the count they just
    /// wrote via `ListingStore::replace_*`.
    pub async fn record_refresh(
        &self,
        category: CacheCategory,
        items_count: i64,
        ttl_seconds: i64,
        scraped_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO cache_metadata (category, last_scraped_at, items_count, ttl_seconds)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (category) DO UPDATE SET
                last_scraped_at = EXCLUDED.last_scraped_at,
                items_count = EXCLUDED.items_count,
                ttl_seconds = EXCLUDED.ttl_seconds
            "#,
        )
        .bind(to_text(&category))
        .bind(scraped_at)
        .bind(items_count)
        .bind(ttl_seconds)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
