//! Public operations: `get`, `refresh`, `ensure_fresh` (§4.3).

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use discharge_core::{
    BenefitProgram, CacheCategory, CommunityResource, ScrapeLog, ScrapeStatus, ShelterListing, TransportListing,
};
use discharge_store::{CacheMetadataRepository, ListingStore, ResourceFilter, ScrapeLogRepository, ShelterFilter, TransportFilter};

use crate::browser::PageFetcher;
use crate::curated::{curated_benefit, curated_resource, curated_shelter, curated_transport};
use crate::error::ScrapeError;
use crate::urls::{BENEFIT_URLS, RESOURCE_URLS, SHELTER_URLS, TRANSPORT_URLS};

pub struct ScrapeCache {
    listings: ListingStore,
    cache_metadata: CacheMetadataRepository,
    scrape_log: ScrapeLogRepository,
    fetcher: Arc<dyn PageFetcher>,
    ttl_seconds: i64,
}

impl ScrapeCache {
    pub fn new(
        listings: ListingStore,
        cache_metadata: CacheMetadataRepository,
        scrape_log: ScrapeLogRepository,
        fetcher: Arc<dyn PageFetcher>,
        ttl_seconds: i64,
    ) -> Self {
        Self {
            listings,
            cache_metadata,
            scrape_log,
            fetcher,
            ttl_seconds,
        }
    }

    /// Reader-triggered refresh: no background worker polls for staleness,
    /// so every read path ensures freshness for its own category first.
    pub async fn get_shelters(&self, filter: &ShelterFilter) -> Result<Vec<ShelterListing>, ScrapeError> {
        self.ensure_fresh(CacheCategory::Shelters).await?;
        Ok(self.listings.get_shelters(filter).await?)
    }

    pub async fn get_transport(&self, filter: &TransportFilter) -> Result<Vec<TransportListing>, ScrapeError> {
        self.ensure_fresh(CacheCategory::Transport).await?;
        Ok(self.listings.get_transport(filter).await?)
    }

    pub async fn get_benefits(&self) -> Result<Vec<BenefitProgram>, ScrapeError> {
        self.ensure_fresh(CacheCategory::Benefits).await?;
        Ok(self.listings.get_benefits().await?)
    }

    pub async fn get_resources(&self, filter: &ResourceFilter) -> Result<Vec<CommunityResource>, ScrapeError> {
        self.ensure_fresh(CacheCategory::Resources).await?;
        Ok(self.listings.get_resources(filter).await?)
    }

    /// Out-of-band bed-count update, e.g. from the `/shelters/{name}/availability`
    /// HTTP endpoint; does not touch `cache_metadata` staleness bookkeeping.
    pub async fn set_shelter_available_beds(&self, name: &str, available_beds: i32) -> Result<(), ScrapeError> {
        Ok(self.listings.set_shelter_available_beds(name, available_beds).await?)
    }

    pub async fn ensure_fresh(&self, category: CacheCategory) -> Result<(), ScrapeError> {
        let now = Utc::now();
        let stale = match self.cache_metadata.get(category).await? {
            Some(meta) => meta.is_stale_at(now),
            None => true,
        };
        if stale {
            self.refresh(category).await?;
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self, category: CacheCategory) -> Result<i64, ScrapeError> {
        let started = std::time::Instant::now();
        let (items_count, any_failed) = match category {
            CacheCategory::Shelters => self.refresh_shelters().await?,
            CacheCategory::Transport => self.refresh_transport().await?,
            CacheCategory::Benefits => self.refresh_benefits().await?,
            CacheCategory::Resources => self.refresh_resources().await?,
        };

        let now = Utc::now();
        self.cache_metadata
            .record_refresh(category, items_count, self.ttl_seconds, now)
            .await?;
        self.scrape_log
            .append(&ScrapeLog {
                category,
                url: format!("{} category ({} urls)", category, urls_for(category).len()),
                status: if any_failed { ScrapeStatus::Partial } else { ScrapeStatus::Success },
                items_scraped: items_count,
                error_message: None,
                duration_seconds: started.elapsed().as_secs_f64(),
                scraped_at: now,
            })
            .await?;

        Ok(items_count)
    }

    async fn refresh_shelters(&self) -> Result<(i64, bool), ScrapeError> {
        let mut rows = Vec::new();
        let mut any_failed = false;
        for url in SHELTER_URLS {
            if self.fetcher.fetch(url).await.is_err() {
                any_failed = true;
            }
            rows.push(curated_shelter(url));
        }
        dedup_by(&mut rows, |r| (r.name.to_lowercase(), r.address.to_lowercase()));
        let count = self.listings.replace_shelters(rows).await?;
        Ok((count, any_failed))
    }

    async fn refresh_transport(&self) -> Result<(i64, bool), ScrapeError> {
        let mut rows = Vec::new();
        let mut any_failed = false;
        for url in TRANSPORT_URLS {
            if self.fetcher.fetch(url).await.is_err() {
                any_failed = true;
            }
            rows.push(curated_transport(url));
        }
        dedup_by(&mut rows, |r| (r.provider.to_lowercase(), r.service_name.to_lowercase()));
        let count = self.listings.replace_transport(rows).await?;
        Ok((count, any_failed))
    }

    async fn refresh_benefits(&self) -> Result<(i64, bool), ScrapeError> {
        let mut rows = Vec::new();
        let mut any_failed = false;
        for url in BENEFIT_URLS {
            if self.fetcher.fetch(url).await.is_err() {
                any_failed = true;
            }
            rows.push(curated_benefit(url));
        }
        dedup_by(&mut rows, |r| (r.program_name.to_lowercase(), String::new()));
        let count = self.listings.replace_benefits(rows).await?;
        Ok((count, any_failed))
    }

    async fn refresh_resources(&self) -> Result<(i64, bool), ScrapeError> {
        let mut rows = Vec::new();
        let mut any_failed = false;
        for url in RESOURCE_URLS {
            if self.fetcher.fetch(url).await.is_err() {
                any_failed = true;
            }
            rows.push(curated_resource(url));
        }
        dedup_by(&mut rows, |r| (r.name.to_lowercase(), r.address.to_lowercase()));
        let count = self.listings.replace_resources(rows).await?;
        Ok((count, any_failed))
    }
}

fn urls_for(category: CacheCategory) -> &'static [&'static str] {
    match category {
        CacheCategory::Shelters => SHELTER_URLS,
        CacheCategory::Transport => TRANSPORT_URLS,
        CacheCategory::Benefits => BENEFIT_URLS,
        CacheCategory::Resources => RESOURCE_URLS,
    }
}

/// Drop entries whose dedup key has already been seen, preserving order —
/// the category's unique-key rule from §4.3/§6.
fn dedup_by<T, K: Eq + std::hash::Hash>(rows: &mut Vec<T>, key_fn: impl Fn(&T) -> K) {
    let mut seen = HashSet::new();
    rows.retain(|r| seen.insert(key_fn(r)));
}
