//! Shelter/transport/benefit/resource listing tables. Each category is
//! single-writer (the scraping cache), multi-reader (§5). A `refresh`
//! replaces the whole category's rows inside one transaction so readers
//! never observe a half-written batch (§4.3 invariant).

use discharge_core::{BenefitProgram, CommunityResource, ResourceCategory, ShelterListing, TransportListing};
use sqlx::{FromRow, PgPool};

use crate::error::StoreError;
use crate::serde_text::{from_text, to_text};

#[derive(Default, Debug, Clone)]
pub struct ShelterFilter {
    pub min_available_beds: Option<i32>,
    pub accessibility: Option<bool>,
}

#[derive(Default, Debug, Clone)]
pub struct TransportFilter {
    pub accessibility_equipped: Option<bool>,
}

#[derive(Default, Debug, Clone)]
pub struct ResourceFilter {
    pub category: Option<ResourceCategory>,
    pub dietary_accommodations: Option<bool>,
}

pub struct ListingStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct ShelterRow {
    name: String,
    address: String,
    phone: String,
    capacity: i32,
    available_beds: i32,
    accessibility: bool,
    services: Vec<String>,
    hours: Option<String>,
    eligibility: Option<String>,
    website: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    source: String,
    last_updated: chrono::DateTime<chrono::Utc>,
}

impl From<ShelterRow> for ShelterListing {
    fn from(r: ShelterRow) -> Self {
        ShelterListing {
            name: r.name,
            address: r.address,
            phone: r.phone,
            capacity: r.capacity,
            available_beds: r.available_beds,
            accessibility: r.accessibility,
            services: r.services,
            hours: r.hours,
            eligibility: r.eligibility,
            website: r.website,
            latitude: r.latitude,
            longitude: r.longitude,
            source: r.source,
            last_updated: r.last_updated,
        }
    }
}

#[derive(FromRow)]
struct TransportRow {
    provider: String,
    service_name: String,
    vehicle_type: String,
    accessibility_equipped: bool,
    phone: String,
    service_area: Option<String>,
    base_fee_cents: Option<i64>,
    source: String,
    last_updated: chrono::DateTime<chrono::Utc>,
}

impl From<TransportRow> for TransportListing {
    fn from(r: TransportRow) -> Self {
        TransportListing {
            provider: r.provider,
            service_name: r.service_name,
            vehicle_type: r.vehicle_type,
            accessibility_equipped: r.accessibility_equipped,
            phone: r.phone,
            service_area: r.service_area,
            base_fee_cents: r.base_fee_cents,
            source: r.source,
            last_updated: r.last_updated,
        }
    }
}

#[derive(FromRow)]
struct BenefitRow {
    program_name: String,
    agency: String,
    description: String,
    monthly_value_cents: Option<i64>,
    eligibility_rule: String,
    application_url: Option<String>,
    source: String,
    last_updated: chrono::DateTime<chrono::Utc>,
}

impl From<BenefitRow> for BenefitProgram {
    fn from(r: BenefitRow) -> Self {
        BenefitProgram {
            program_name: r.program_name,
            agency: r.agency,
            description: r.description,
            monthly_value_cents: r.monthly_value_cents,
            eligibility_rule: r.eligibility_rule,
            application_url: r.application_url,
            source: r.source,
            last_updated: r.last_updated,
        }
    }
}

#[derive(FromRow)]
struct ResourceRow {
    name: String,
    category: String,
    address: String,
    phone: String,
    services: Vec<String>,
    dietary_accommodations: bool,
    hours: Option<String>,
    source: String,
    last_updated: chrono::DateTime<chrono::Utc>,
}

impl ResourceRow {
    fn into_resource(self) -> Result<CommunityResource, StoreError> {
        Ok(CommunityResource {
            name: self.name,
            category: from_text(&self.category)
                .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))?,
            address: self.address,
            phone: self.phone,
            services: self.services,
            dietary_accommodations: self.dietary_accommodations,
            hours: self.hours,
            source: self.source,
            last_updated: self.last_updated,
        })
    }
}

impl ListingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // -- shelters --------------------------------------------------------

    pub async fn get_shelters(&self, filter: &ShelterFilter) -> Result<Vec<ShelterListing>, StoreError> {
        let rows: Vec<ShelterRow> = sqlx::query_as(
            r#"
            SELECT name, address, phone, capacity, available_beds, accessibility, services,
                   hours, eligibility, website, latitude, longitude, source, last_updated
            FROM shelters
            WHERE available_beds >= $1 AND (accessibility = $2 OR $2 IS NULL)
            ORDER BY available_beds DESC
            "#,
        )
        .bind(filter.min_available_beds.unwrap_or(0))
        .bind(filter.accessibility)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn replace_shelters(&self, rows: Vec<ShelterListing>) -> Result<i64, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM shelters").execute(&mut *tx).await?;
        for r in &rows {
            sqlx::query(
                r#"
                INSERT INTO shelters
                    (name, address, phone, capacity, available_beds, accessibility, services,
                     hours, eligibility, website, latitude, longitude, source, last_updated)
                VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14)
                ON CONFLICT (name) DO UPDATE SET
                    address = EXCLUDED.address, phone = EXCLUDED.phone,
                    capacity = EXCLUDED.capacity, available_beds = EXCLUDED.available_beds,
                    accessibility = EXCLUDED.accessibility, services = EXCLUDED.services,
                    hours = EXCLUDED.hours, eligibility = EXCLUDED.eligibility,
                    website = EXCLUDED.website, latitude = EXCLUDED.latitude,
                    longitude = EXCLUDED.longitude, source = EXCLUDED.source,
                    last_updated = EXCLUDED.last_updated
                "#,
            )
            .bind(&r.name)
            .bind(&r.address)
            .bind(&r.phone)
            .bind(r.capacity)
            .bind(r.available_beds)
            .bind(r.accessibility)
            .bind(&r.services)
            .bind(&r.hours)
            .bind(&r.eligibility)
            .bind(&r.website)
            .bind(r.latitude)
            .bind(r.longitude)
            .bind(&r.source)
            .bind(r.last_updated)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(rows.len() as i64)
    }

    pub async fn set_shelter_available_beds(&self, name: &str, available_beds: i32) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE shelters SET available_beds = LEAST($2, capacity), last_updated = now() WHERE name = $1",
        )
        .bind(name)
        .bind(available_beds)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // -- transport ---------------------------------------------------------

    pub async fn get_transport(&self, filter: &TransportFilter) -> Result<Vec<TransportListing>, StoreError> {
        let rows: Vec<TransportRow> = sqlx::query_as(
            r#"
            SELECT provider, service_name, vehicle_type, accessibility_equipped, phone,
                   service_area, base_fee_cents, source, last_updated
            FROM transport
            WHERE (accessibility_equipped = $1 OR $1 IS NULL)
            ORDER BY provider ASC
            "#,
        )
        .bind(filter.accessibility_equipped)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn replace_transport(&self, rows: Vec<TransportListing>) -> Result<i64, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM transport").execute(&mut *tx).await?;
        for r in &rows {
            sqlx::query(
                r#"
                INSERT INTO transport
                    (provider, service_name, vehicle_type, accessibility_equipped, phone,
                     service_area, base_fee_cents, source, last_updated)
                VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
                ON CONFLICT (provider, service_name) DO UPDATE SET
                    vehicle_type = EXCLUDED.vehicle_type,
                    accessibility_equipped = EXCLUDED.accessibility_equipped,
                    phone = EXCLUDED.phone, service_area = EXCLUDED.service_area,
                    base_fee_cents = EXCLUDED.base_fee_cents, source = EXCLUDED.source,
                    last_updated = EXCLUDED.last_updated
                "#,
            )
            .bind(&r.provider)
            .bind(&r.service_name)
            .bind(&r.vehicle_type)
            .bind(r.accessibility_equipped)
            .bind(&r.phone)
            .bind(&r.service_area)
            .bind(r.base_fee_cents)
            .bind(&r.source)
            .bind(r.last_updated)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(rows.len() as i64)
    }

    // -- benefits ------------------------------------------------------

    pub async fn get_benefits(&self) -> Result<Vec<BenefitProgram>, StoreError> {
        let rows: Vec<BenefitRow> = sqlx::query_as(
            r#"SELECT program_name, agency, description, monthly_value_cents, eligibility_rule,
                      application_url, source, last_updated FROM benefits ORDER BY program_name ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn replace_benefits(&self, rows: Vec<BenefitProgram>) -> Result<i64, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM benefits").execute(&mut *tx).await?;
        for r in &rows {
            sqlx::query(
                r#"
                INSERT INTO benefits
                    (program_name, agency, description, monthly_value_cents, eligibility_rule,
                     application_url, source, last_updated)
                VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
                ON CONFLICT (program_name) DO UPDATE SET
                    agency = EXCLUDED.agency, description = EXCLUDED.description,
                    monthly_value_cents = EXCLUDED.monthly_value_cents,
                    eligibility_rule = EXCLUDED.eligibility_rule,
                    application_url = EXCLUDED.application_url, source = EXCLUDED.source,
                    last_updated = EXCLUDED.last_updated
                "#,
            )
            .bind(&r.program_name)
            .bind(&r.agency)
            .bind(&r.description)
            .bind(r.monthly_value_cents)
            .bind(&r.eligibility_rule)
            .bind(&r.application_url)
            .bind(&r.source)
            .bind(r.last_updated)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(rows.len() as i64)
    }

    // -- community resources --------------------------------------------

    pub async fn get_resources(&self, filter: &ResourceFilter) -> Result<Vec<CommunityResource>, StoreError> {
        let rows: Vec<ResourceRow> = sqlx::query_as(
            r#"
            SELECT name, category, address, phone, services, dietary_accommodations, hours,
                   source, last_updated
            FROM community_resources
            WHERE (category = $1 OR $1 IS NULL) AND (dietary_accommodations = $2 OR $2 IS NULL)
            ORDER BY name ASC
            "#,
        )
        .bind(filter.category.map(|c| to_text(&c)))
        .bind(filter.dietary_accommodations)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ResourceRow::into_resource).collect()
    }

    pub async fn replace_resources(&self, rows: Vec<CommunityResource>) -> Result<i64, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM community_resources").execute(&mut *tx).await?;
        for r in &rows {
            sqlx::query(
                r#"
                INSERT INTO community_resources
                    (name, category, address, phone, services, dietary_accommodations, hours,
                     source, last_updated)
                VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
                ON CONFLICT (name) DO UPDATE SET
                    category = EXCLUDED.category, address = EXCLUDED.address,
                    phone = EXCLUDED.phone, services = EXCLUDED.services,
                    dietary_accommodations = EXCLUDED.dietary_accommodations,
                    hours = EXCLUDED.hours, source = EXCLUDED.source,
                    last_updated = EXCLUDED.last_updated
                "#,
            )
            .bind(&r.name)
            .bind(to_text(&r.category))
            .bind(&r.address)
            .bind(&r.phone)
            .bind(&r.services)
            .bind(r.dietary_accommodations)
            .bind(&r.hours)
            .bind(&r.source)
            .bind(r.last_updated)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(rows.len() as i64)
    }
}
