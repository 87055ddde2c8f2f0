//! Postgres persistence for cases, timeline events, and scraped listings.
//!
//! All queries are runtime-checked (`sqlx::query`/`query_as`) rather than
//! the `sqlx::query!` compile-time macros, since the schema is applied by
//! the migrations in `migrations/` and may not exist at crate-build time.

pub mod cache_metadata;
pub mod case_repository;
pub mod error;
pub mod listings;
pub mod scrape_log;
pub(crate) mod serde_text;
pub mod timeline_repository;

pub use cache_metadata::CacheMetadataRepository;
pub use case_repository::{CaseRepository, CaseSummary};
pub use error::StoreError;
pub use listings::{ListingStore, ResourceFilter, ShelterFilter, TransportFilter};
pub use scrape_log::ScrapeLogRepository;
pub use timeline_repository::TimelineRepository;
