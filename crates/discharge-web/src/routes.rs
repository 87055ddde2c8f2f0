//! Handler bodies for every endpoint in the HTTP facade. Thin: parse,
//! delegate to the engine or a repository, shape the JSON reply.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use discharge_bus::IncomeLevel;
use discharge_core::{ClinicalInfo, ContactInfo, DischargeInfo, EventStatus, FollowUp, TimelineEvent};
use discharge_store::{CaseSummary, ResourceFilter, ShelterFilter, TransportFilter};
use discharge_workflow::{IntakeRecord, Outcome, OutcomeStatus, ShelterSummary};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DischargeRequest {
    #[serde(default)]
    pub case_id: Option<String>,
    pub patient_name: String,
    pub patient_dob: NaiveDate,
    pub contact: ContactInfo,
    pub discharge: DischargeInfo,
    pub clinical: ClinicalInfo,
    pub follow_up: FollowUp,
    pub income_level: Option<IncomeLevel>,
    #[serde(default)]
    pub current_benefits: Vec<String>,
    #[serde(default)]
    pub form_data: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct DischargeResponse {
    pub status: OutcomeStatus,
    pub case_id: String,
    pub shelter: Option<ShelterSummary>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl From<Outcome> for DischargeResponse {
    fn from(outcome: Outcome) -> Self {
        let message = match outcome.status {
            OutcomeStatus::Coordinated => Some("discharge fully coordinated".to_string()),
            OutcomeStatus::CoordinatedWithoutTransport => Some("coordinated; transport could not be scheduled".to_string()),
            OutcomeStatus::UnconfirmedShelter => Some("coordinated against the best available shelter candidate; availability unconfirmed".to_string()),
            OutcomeStatus::Failed => None,
        };
        Self {
            status: outcome.status,
            case_id: outcome.case_id,
            shelter: outcome.shelter,
            message,
            error: outcome.error,
        }
    }
}

/// `case_id` is generated from the submission time when the caller omits
/// one, matching the source's `CASE_<timestamp>` convention.
fn generate_case_id() -> String {
    format!("CASE-{}", Utc::now().format("%Y%m%d%H%M%S%3f"))
}

pub async fn post_discharge(State(state): State<AppState>, Json(req): Json<DischargeRequest>) -> Json<DischargeResponse> {
    let case_id = req.case_id.unwrap_or_else(generate_case_id);
    let intake = IntakeRecord {
        case_id,
        patient_name: req.patient_name,
        patient_dob: req.patient_dob,
        contact: req.contact,
        discharge: req.discharge,
        clinical: req.clinical,
        follow_up: req.follow_up,
        income_level: req.income_level,
        current_benefits: req.current_benefits,
    };

    let outcome = state.engine.coordinate(intake).await;
    Json(outcome.into())
}

pub async fn list_workflows(State(state): State<AppState>) -> Result<Json<Vec<CaseSummary>>, StatusCode> {
    state
        .engine
        .list_cases()
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!(error = %e, "failed to list cases");
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

#[derive(Debug, Serialize)]
pub struct WorkflowDetail {
    pub case: discharge_core::Case,
    pub timeline: Vec<TimelineEvent>,
}

pub async fn get_workflow(State(state): State<AppState>, Path(case_id): Path<String>) -> Result<Json<WorkflowDetail>, StatusCode> {
    let case = state.engine.load_case(&case_id).await.map_err(|e| match e {
        discharge_store::StoreError::CaseNotFound(_) => StatusCode::NOT_FOUND,
        e => {
            tracing::error!(case_id = %case_id, error = %e, "failed to load case");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    })?;
    let timeline = state.engine.load_timeline(&case_id).await.map_err(|e| {
        tracing::error!(case_id = %case_id, error = %e, "failed to load timeline");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(WorkflowDetail { case, timeline }))
}

pub async fn get_shelters(State(state): State<AppState>) -> Result<Json<Vec<discharge_core::ShelterListing>>, StatusCode> {
    state
        .engine
        .cache()
        .get_shelters(&ShelterFilter::default())
        .await
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

pub async fn get_transport(State(state): State<AppState>) -> Result<Json<Vec<discharge_core::TransportListing>>, StatusCode> {
    state
        .engine
        .cache()
        .get_transport(&TransportFilter::default())
        .await
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

pub async fn get_benefits(State(state): State<AppState>) -> Result<Json<Vec<discharge_core::BenefitProgram>>, StatusCode> {
    state.engine.cache().get_benefits().await.map(Json).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

pub async fn get_resources(State(state): State<AppState>) -> Result<Json<Vec<discharge_core::CommunityResource>>, StatusCode> {
    state
        .engine
        .cache()
        .get_resources(&ResourceFilter::default())
        .await
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub available_beds: i32,
}

pub async fn update_shelter_availability(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<AvailabilityRequest>,
) -> StatusCode {
    match state.engine.cache().set_shelter_available_beds(&name, req.available_beds).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(e) => {
            tracing::error!(shelter = %name, error = %e, "failed to update shelter availability");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Ingestion of provider callbacks. The coordinator drives confirmation by
/// polling (§4.4), so a webhook delivery only needs to be accepted and
/// logged — nothing downstream currently consumes it synchronously.
pub async fn vapi_webhook(Json(payload): Json<serde_json::Value>) -> StatusCode {
    tracing::info!(?payload, "received vapi webhook callback");
    StatusCode::OK
}

#[derive(Debug, Deserialize)]
pub struct WorkflowEventRequest {
    pub case_id: String,
    pub step: String,
    pub agent: String,
    #[serde(default = "default_event_status")]
    pub status: EventStatus,
    pub description: String,
}

fn default_event_status() -> EventStatus {
    EventStatus::Info
}

pub async fn post_workflow_event(State(state): State<AppState>, Json(req): Json<WorkflowEventRequest>) -> Result<Json<TimelineEvent>, StatusCode> {
    let event = TimelineEvent::new(req.case_id, req.step, req.agent, req.status, req.description);
    state.engine.append_event(event).await.map(Json).map_err(|e| {
        tracing::error!(error = %e, "failed to append externally-submitted timeline event");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}
