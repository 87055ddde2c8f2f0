//! Cached rows describing external entities: shelters, transport providers,
//! benefit programs, and community resources, plus the per-category cache
//! bookkeeping rows (`CacheMetadata`, `ScrapeLog`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheCategory {
    Shelters,
    Transport,
    Benefits,
    Resources,
}

impl CacheCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shelters => "shelters",
            Self::Transport => "transport",
            Self::Benefits => "benefits",
            Self::Resources => "resources",
        }
    }

    pub const ALL: [CacheCategory; 4] = [
        CacheCategory::Shelters,
        CacheCategory::Transport,
        CacheCategory::Benefits,
        CacheCategory::Resources,
    ];
}

impl std::fmt::Display for CacheCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShelterListing {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub capacity: i32,
    pub available_beds: i32,
    pub accessibility: bool,
    pub services: Vec<String>,
    pub hours: Option<String>,
    pub eligibility: Option<String>,
    pub website: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub source: String,
    pub last_updated: DateTime<Utc>,
}

impl ShelterListing {
    /// Invariant from §3: `0 <= available_beds <= capacity`.
    pub fn is_valid(&self) -> bool {
        self.available_beds >= 0 && self.available_beds <= self.capacity
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportListing {
    pub provider: String,
    pub service_name: String,
    pub vehicle_type: String,
    pub accessibility_equipped: bool,
    pub phone: String,
    pub service_area: Option<String>,
    pub base_fee_cents: Option<i64>,
    pub source: String,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenefitProgram {
    pub program_name: String,
    pub agency: String,
    pub description: String,
    pub monthly_value_cents: Option<i64>,
    pub eligibility_rule: String,
    pub application_url: Option<String>,
    pub source: String,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCategory {
    Food,
    Hygiene,
    Clothing,
    Other,
}

impl ResourceCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Hygiene => "hygiene",
            Self::Clothing => "clothing",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityResource {
    pub name: String,
    pub category: ResourceCategory,
    pub address: String,
    pub phone: String,
    pub services: Vec<String>,
    pub dietary_accommodations: bool,
    pub hours: Option<String>,
    pub source: String,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub category: CacheCategory,
    pub last_scraped_at: DateTime<Utc>,
    pub items_count: i64,
    pub ttl_seconds: i64,
}

impl CacheMetadata {
    /// `is_stale(c) ≡ now − last_scraped_at > ttl_seconds` (§3 invariant).
    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        (now - self.last_scraped_at).num_seconds() > self.ttl_seconds
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeStatus {
    Success,
    Partial,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeLog {
    pub category: CacheCategory,
    pub url: String,
    pub status: ScrapeStatus,
    pub items_scraped: i64,
    pub error_message: Option<String>,
    pub duration_seconds: f64,
    pub scraped_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bed_count_invariant_rejects_overbooking() {
        assert!(!listing_with(10, 11).is_valid());
    }

    #[test]
    fn cache_staleness_is_a_pure_function_of_ttl() {
        let meta = CacheMetadata {
            category: CacheCategory::Shelters,
            last_scraped_at: Utc::now() - chrono::Duration::seconds(100),
            items_count: 3,
            ttl_seconds: 200,
        };
        assert!(!meta.is_stale_at(Utc::now()));
        assert!(meta.is_stale_at(Utc::now() + chrono::Duration::seconds(200)));
    }

    pub(super) fn listing_with(capacity: i32, available_beds: i32) -> ShelterListing {
        ShelterListing {
            name: "Test".into(),
            address: "1 Main St".into(),
            phone: "555".into(),
            capacity,
            available_beds,
            accessibility: false,
            services: vec![],
            hours: None,
            eligibility: None,
            website: None,
            latitude: None,
            longitude: None,
            source: "test".into(),
            last_updated: Utc::now(),
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::tests::*;
    use proptest::prelude::*;

    proptest! {
        /// `is_valid()` agrees with the `0 <= available_beds <= capacity`
        /// definition for any combination, not just the hand-picked cases above.
        #[test]
        fn bed_count_invariant_matches_its_definition(capacity in -100i32..1000, available_beds in -1000i32..1000) {
            let listing = listing_with(capacity, available_beds);
            prop_assert_eq!(listing.is_valid(), available_beds >= 0 && available_beds <= capacity);
        }
    }
}
