//! Router-level tests driven through `tower::ServiceExt::oneshot`, the same
//! way the pack's other axum services are exercised end to end without
//! binding a real socket.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use discharge_scrape::{PageFetcher, ScrapeError};
use discharge_web::{router, AppState};
use discharge_workflow::Engine;
use http_body_util::BodyExt;
use hyper::{Request, StatusCode};
use sqlx::PgPool;
use tower::ServiceExt;

struct AlwaysFailFetcher;

#[async_trait]
impl PageFetcher for AlwaysFailFetcher {
    async fn fetch(&self, _url: &str) -> Result<String, ScrapeError> {
        Err(ScrapeError::Fetch("no network access in tests".into()))
    }
}

fn test_config() -> discharge_core::Config {
    discharge_core::Config {
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
        k_retry: 1,
        call_poll_interval_seconds: 1,
        call_max_wait_seconds: 1,
        cache_ttl_seconds: 86_400,
    }
}

fn app(pool: PgPool) -> axum::Router {
    let engine = Arc::new(Engine::build(test_config(), pool, Arc::new(AlwaysFailFetcher)));
    router(AppState::new(engine))
}

#[sqlx::test(migrations = "../../migrations")]
async fn discharge_request_returns_a_case_id_and_status(pool: PgPool) {
    let body = serde_json::json!({
        "patient_name": "Alex Chen",
        "patient_dob": "1985-02-20",
        "contact": {
            "phone": "(415) 555-0110",
            "address": "1001 Potrero Ave, San Francisco, CA 94110",
            "city": "San Francisco",
            "state": "CA",
            "zip": "94110",
            "emergency_contact": null
        },
        "discharge": {
            "facility_name": "Zuckerberg SF General",
            "facility_phone": null,
            "facility_address": "1001 Potrero Ave, San Francisco, CA 94110",
            "mrn": null,
            "admission_date": null,
            "planned_discharge_date": "2026-08-01",
            "destination": null
        },
        "clinical": {
            "primary_condition": "Hypertension",
            "diagnosis_text": null,
            "medications": [{"name": "Lisinopril", "dosage": "10mg", "frequency": "once daily"}],
            "allergies": null,
            "accessibility_needs": null,
            "dietary_needs": null,
            "social_needs": null
        },
        "follow_up": {
            "physician": null,
            "appointment_date": null,
            "instructions": null,
            "adherence_barriers": null
        },
        "income_level": "low",
        "current_benefits": []
    });

    let response = app(pool)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/discharge")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(parsed["case_id"].as_str().unwrap().starts_with("CASE-"));
    assert!(parsed["status"].is_string());
}

#[sqlx::test(migrations = "../../migrations")]
async fn unknown_workflow_returns_404(pool: PgPool) {
    let response = app(pool)
        .oneshot(Request::builder().uri("/workflows/CASE-DOES-NOT-EXIST").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../migrations")]
async fn shelters_listing_is_populated_from_curated_fallback_data(pool: PgPool) {
    let response = app(pool).oneshot(Request::builder().uri("/shelters").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let shelters: Vec<serde_json::Value> = serde_json::from_slice(&bytes).unwrap();
    assert!(!shelters.is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn updating_shelter_availability_returns_no_content(pool: PgPool) {
    let app = app(pool);
    // Seed the shelters table first via a read.
    let _ = app
        .clone()
        .oneshot(Request::builder().uri("/shelters").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/shelters/HSH%20Access%20Points%20%26%20Help%20Centers/availability")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&serde_json::json!({"available_beds": 7})).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

