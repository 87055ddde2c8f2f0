//! The closed set of request/response records the bus dispatches by tag.
//! Each `AgentName` registers exactly one `(request variant → response
//! variant)` pair at construction time (§4.2).

use chrono::{DateTime, NaiveDate, Utc};
use discharge_core::{Medication, WorkflowStatus, WorkflowStep};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentName {
    Shelter,
    Transport,
    Resource,
    Pharmacy,
    Eligibility,
    SocialWorker,
    Analytics,
}

impl AgentName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shelter => "shelter",
            Self::Transport => "transport",
            Self::Resource => "resource",
            Self::Pharmacy => "pharmacy",
            Self::Eligibility => "eligibility",
            Self::SocialWorker => "social_worker",
            Self::Analytics => "analytics",
        }
    }
}

impl std::fmt::Display for AgentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeLevel {
    None,
    VeryLow,
    Low,
    Moderate,
    High,
}

// -- shelter -----------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShelterNeeds {
    pub accessibility: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShelterMatchRequest {
    pub case_id: String,
    pub needs: ShelterNeeds,
    /// Shelter names already tried and rejected this case, so a retried
    /// call advances to the next candidate instead of repeating one (§4.1
    /// retry loop, driven by the coordinator).
    #[serde(default)]
    pub excluded: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShelterMatchResponse {
    pub selected: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub availability_confirmed: bool,
    pub beds_available: i32,
    pub accessibility_confirmed: bool,
    pub accessibility_warning: bool,
    pub services: Vec<String>,
    pub transcript: Option<String>,
}

// -- transport -----------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportRequest {
    pub case_id: String,
    pub pickup: String,
    pub dropoff: String,
    pub accessibility_required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportResponse {
    pub provider: String,
    pub driver: String,
    pub phone: String,
    pub pickup_time: DateTime<Utc>,
    pub eta_minutes: i32,
    pub route_polyline: String,
}

// -- resources -----------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRequest {
    pub case_id: String,
    pub items: Vec<String>,
    pub delivery_address: String,
    pub dietary: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceAssignment {
    pub item: String,
    pub provider_name: String,
    pub address: String,
    pub phone: String,
    pub pickup_window: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceResponse {
    pub assignments: Vec<ResourceAssignment>,
    pub unmet: Vec<String>,
}

// -- pharmacy -----------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PharmacyRequest {
    pub case_id: String,
    pub medications: Vec<Medication>,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PharmacyResponse {
    pub pharmacy_name: String,
    pub address: String,
    pub phone: String,
    pub ready_time: DateTime<Utc>,
    pub total_cost_cents: i64,
    pub insurance_coverage: bool,
}

// -- eligibility -----------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityRequest {
    pub case_id: String,
    pub dob: NaiveDate,
    pub income_level: Option<IncomeLevel>,
    pub current_benefits: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenefitAward {
    pub program_name: String,
    pub monthly_value_cents: i64,
    pub requires_manual_review: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityResponse {
    pub programs: Vec<BenefitAward>,
    pub total_monthly_benefits_cents: i64,
    pub requires_manual_review: bool,
    pub next_steps: Vec<String>,
}

// -- social worker -----------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialWorkerAssignment {
    pub case_id: String,
    pub patient_name: String,
    pub needs: ShelterNeeds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialWorkerResponse {
    pub name: String,
    pub phone: String,
    pub department: String,
    pub first_contact_date: NaiveDate,
}

// -- requests/responses, tagged -----------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgentRequest {
    ShelterMatch(ShelterMatchRequest),
    Transport(TransportRequest),
    Resource(ResourceRequest),
    Pharmacy(PharmacyRequest),
    Eligibility(EligibilityRequest),
    SocialWorker(SocialWorkerAssignment),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgentResponse {
    ShelterMatch(ShelterMatchResponse),
    Transport(TransportResponse),
    Resource(ResourceResponse),
    Pharmacy(PharmacyResponse),
    Eligibility(EligibilityResponse),
    SocialWorker(SocialWorkerResponse),
}

impl AgentRequest {
    pub fn target(&self) -> AgentName {
        match self {
            Self::ShelterMatch(_) => AgentName::Shelter,
            Self::Transport(_) => AgentName::Transport,
            Self::Resource(_) => AgentName::Resource,
            Self::Pharmacy(_) => AgentName::Pharmacy,
            Self::Eligibility(_) => AgentName::Eligibility,
            Self::SocialWorker(_) => AgentName::SocialWorker,
        }
    }
}

/// The one message class delivered through `notify` — every step the
/// coordinator takes is reported to the analytics agent this way (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowUpdate {
    pub case_id: String,
    pub step: WorkflowStep,
    pub status: WorkflowStatus,
    pub sender: AgentName,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgentMessage {
    WorkflowUpdate(WorkflowUpdate),
}
