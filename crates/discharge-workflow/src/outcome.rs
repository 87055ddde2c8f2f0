//! `coordinate()`'s return value — never an error, only a populated status
//! and whatever partial results the workflow produced (§7, §8).

use discharge_core::TimelineEvent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeStatus {
    Coordinated,
    CoordinatedWithoutTransport,
    UnconfirmedShelter,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShelterSummary {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub beds_available: i32,
    pub accessibility_confirmed: bool,
    pub accessibility_warning: bool,
    pub services: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportSummary {
    pub provider: String,
    pub driver: String,
    pub eta_minutes: i32,
    pub route_polyline: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationPlan {
    pub pharmacy_name: String,
    pub address: String,
    pub total_cost_cents: i64,
    pub insurance_coverage: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenefitsSummary {
    pub programs: Vec<String>,
    pub total_monthly_benefits_cents: i64,
    pub requires_manual_review: bool,
    pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseManagerAssignment {
    pub name: String,
    pub phone: String,
    pub department: String,
    pub first_contact_date: chrono::NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub case_id: String,
    pub status: OutcomeStatus,
    pub shelter: Option<ShelterSummary>,
    pub transport: Option<TransportSummary>,
    pub medications: Option<MedicationPlan>,
    pub benefits: Option<BenefitsSummary>,
    pub case_manager: Option<CaseManagerAssignment>,
    pub timeline: Vec<TimelineEvent>,
    pub error: Option<String>,
}
