//! End-to-end coordination against a real Postgres fixture. No fake store:
//! `CaseRepository`/`TimelineRepository`/`ScrapeCache` all wrap a `PgPool`
//! directly, so the only seam left to fake is the browser fetch — and the
//! curated per-URL records mean a failing fetch still populates the cache
//! deterministically (§4.3).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use discharge_bus::IncomeLevel;
use discharge_core::{ClinicalInfo, Config, ContactInfo, DischargeInfo, FollowUp, Medication};
use discharge_scrape::{PageFetcher, ScrapeError};
use discharge_workflow::{Engine, IntakeRecord, OutcomeStatus};
use sqlx::PgPool;

struct AlwaysFailFetcher;

#[async_trait]
impl PageFetcher for AlwaysFailFetcher {
    async fn fetch(&self, _url: &str) -> Result<String, ScrapeError> {
        Err(ScrapeError::Fetch("no network access in tests".into()))
    }
}

fn test_config() -> Config {
    Config {
        database_url: String::new(),
        http_bind_addr: "0.0.0.0:0".into(),
        demo_mode: true,
        demo_phone_number: None,
        voice_api_key: None,
        voice_phone_number_id: None,
        voice_assistant_id: None,
        routing_provider_token: None,
        proxy_url: None,
        document_extractor_api_key: None,
        llm_api_key: None,
        k_retry: 3,
        call_poll_interval_seconds: 1,
        call_max_wait_seconds: 1,
        cache_ttl_seconds: 86_400,
    }
}

fn test_intake(case_id: &str, medication: &str) -> IntakeRecord {
    IntakeRecord {
        case_id: case_id.to_string(),
        patient_name: "Jordan Rivera".to_string(),
        patient_dob: NaiveDate::from_ymd_opt(1978, 4, 12).unwrap(),
        contact: ContactInfo {
            phone: "(415) 555-0101".to_string(),
            address: "1001 Potrero Ave, San Francisco, CA 94110".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            zip: "94110".to_string(),
            emergency_contact: None,
        },
        discharge: DischargeInfo {
            facility_name: "Zuckerberg SF General".to_string(),
            facility_phone: None,
            facility_address: Some("1001 Potrero Ave, San Francisco, CA 94110".to_string()),
            mrn: Some("MRN-48213".to_string()),
            admission_date: NaiveDate::from_ymd_opt(2026, 7, 24),
            planned_discharge_date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            destination: None,
        },
        clinical: ClinicalInfo {
            primary_condition: Some("COPD exacerbation".to_string()),
            diagnosis_text: None,
            medications: vec![Medication {
                name: medication.to_string(),
                dosage: "10mg".to_string(),
                frequency: "once daily".to_string(),
            }],
            allergies: None,
            accessibility_needs: None,
            dietary_needs: None,
            social_needs: None,
        },
        follow_up: FollowUp::default(),
        income_level: Some(IncomeLevel::Low),
        current_benefits: vec![],
    }
}

fn engine(pool: PgPool) -> Engine {
    Engine::build(test_config(), pool, Arc::new(AlwaysFailFetcher))
}

/// No voice credentials means `VoiceCaller::call_shelter` always returns
/// `NotConfigured`, which the shelter agent treats as an unconfirmed call,
/// not a hard failure. After `k_retry` candidates are exhausted the
/// workflow settles for the last one tried.
#[sqlx::test(migrations = "../../migrations")]
async fn shelter_never_confirmed_without_voice_credentials_settles_unconfirmed(pool: PgPool) {
    let engine = engine(pool);
    let outcome = engine.coordinate(test_intake("CASE-TEST-0001", "Lisinopril")).await;

    assert_eq!(outcome.status, OutcomeStatus::UnconfirmedShelter);
    assert!(outcome.shelter.is_some());
    assert!(!outcome.shelter.as_ref().unwrap().accessibility_confirmed);
    assert!(outcome.medications.is_some());
    assert!(outcome.benefits.is_some());
    assert!(outcome.case_manager.is_some());
    assert!(outcome.error.is_none());
    assert!(outcome.timeline.iter().any(|e| e.step == "shelter_unconfirmed"));
}

/// A medication absent from the bundled pharmacy database fails the
/// pharmacy step, which is a hard failure regardless of how shelter and
/// transport resolve (§7 partial-failure policy).
#[sqlx::test(migrations = "../../migrations")]
async fn unknown_medication_fails_the_whole_case(pool: PgPool) {
    let engine = engine(pool);
    let outcome = engine.coordinate(test_intake("CASE-TEST-0002", "Xyzolumab")).await;

    assert_eq!(outcome.status, OutcomeStatus::Failed);
    assert!(outcome.medications.is_none());
    assert!(outcome.timeline.iter().any(|e| e.step == "pharmacy_failed"));

    let case = engine.load_case("CASE-TEST-0002").await.unwrap();
    assert_eq!(case.workflow_status, discharge_core::WorkflowStatus::Failed);
    assert!(case.completed_at.is_some());
}

/// Zeroing every shelter's bed count after the cache has populated forces
/// the shelter agent to report no candidates, which `run_shelter` treats
/// as a hard failure (§4.6 "no candidates with available beds").
#[sqlx::test(migrations = "../../migrations")]
async fn no_shelter_candidates_fails_the_case(pool: PgPool) {
    let engine = engine(pool.clone());
    // Trigger one reader-driven refresh so the shelters table is populated.
    let _ = engine.cache().get_shelters(&discharge_store::ShelterFilter::default()).await.unwrap();
    sqlx::query("UPDATE shelters SET available_beds = 0").execute(&pool).await.unwrap();

    let outcome = engine.coordinate(test_intake("CASE-TEST-0003", "Lisinopril")).await;

    assert_eq!(outcome.status, OutcomeStatus::Failed);
    assert!(outcome.shelter.is_none());
    assert!(outcome.timeline.iter().any(|e| e.step == "shelter_failed"));
}

/// No transport provider left in the cache downgrades an otherwise-viable
/// case to `coordinated-without-transport` rather than failing it outright.
#[sqlx::test(migrations = "../../migrations")]
async fn missing_transport_provider_downgrades_instead_of_failing(pool: PgPool) {
    let engine = engine(pool.clone());
    let _ = engine.cache().get_transport(&discharge_store::TransportFilter::default()).await.unwrap();
    sqlx::query("DELETE FROM transport").execute(&pool).await.unwrap();

    let outcome = engine.coordinate(test_intake("CASE-TEST-0004", "Lisinopril")).await;

    assert_eq!(outcome.status, OutcomeStatus::CoordinatedWithoutTransport);
    assert!(outcome.shelter.is_some());
    assert!(outcome.transport.is_none());
    assert!(outcome.timeline.iter().any(|e| e.step == "transport_failed"));
}

/// The timeline is append-only with dense per-case `seq`, and `load_timeline`
/// returns exactly what `coordinate()` persisted, in order.
#[sqlx::test(migrations = "../../migrations")]
async fn persisted_timeline_matches_the_returned_outcome(pool: PgPool) {
    let engine = engine(pool);
    let outcome = engine.coordinate(test_intake("CASE-TEST-0005", "Lisinopril")).await;

    let persisted = engine.load_timeline("CASE-TEST-0005").await.unwrap();
    assert_eq!(persisted.len(), outcome.timeline.len());
    for (i, event) in persisted.iter().enumerate() {
        assert_eq!(event.seq, i as i64);
    }
    assert_eq!(persisted.last().unwrap().step, "completed");
}
