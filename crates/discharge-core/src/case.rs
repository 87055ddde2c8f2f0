//! Case — the aggregate workflow state for one discharge coordination attempt.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Overall status of a case's workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Initiated,
    InProgress,
    Coordinated,
    Failed,
}

impl WorkflowStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Coordinated | Self::Failed)
    }
}

/// Named step in the coordinator's sequence (§4.1 of the spec).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    PersistIntake,
    SocialWorkerPlanning,
    PharmacyPrep,
    ShelterMatching,
    VoiceConfirmation,
    ResourceCoordination,
    EligibilityCheck,
    TransportScheduling,
    Finalize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactInfo {
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub emergency_contact: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DischargeInfo {
    pub facility_name: String,
    pub facility_phone: Option<String>,
    pub facility_address: Option<String>,
    pub mrn: Option<String>,
    pub admission_date: Option<NaiveDate>,
    pub planned_discharge_date: NaiveDate,
    pub destination: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClinicalInfo {
    pub primary_condition: Option<String>,
    pub diagnosis_text: Option<String>,
    pub medications: Vec<Medication>,
    pub allergies: Option<String>,
    pub accessibility_needs: Option<String>,
    pub dietary_needs: Option<String>,
    pub social_needs: Option<String>,
}

impl ClinicalInfo {
    pub fn requires_accessibility(&self) -> bool {
        self.accessibility_needs
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FollowUp {
    pub physician: Option<String>,
    pub appointment_date: Option<NaiveDate>,
    pub instructions: Option<String>,
    pub adherence_barriers: Option<String>,
}

/// The aggregate workflow record for one discharge. Exactly one row exists
/// per `case_id`; `completed_at` is set iff `workflow_status` is terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub case_id: String,
    pub patient_name: String,
    pub patient_dob: NaiveDate,
    pub contact: ContactInfo,
    pub discharge: DischargeInfo,
    pub clinical: ClinicalInfo,
    pub follow_up: FollowUp,
    pub workflow_status: WorkflowStatus,
    pub current_step: Option<WorkflowStep>,
    pub assigned_shelter_id: Option<String>,
    pub assigned_transport_provider: Option<String>,
    pub assigned_benefits: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Case {
    pub fn new(
        case_id: impl Into<String>,
        patient_name: impl Into<String>,
        patient_dob: NaiveDate,
        contact: ContactInfo,
        discharge: DischargeInfo,
        clinical: ClinicalInfo,
        follow_up: FollowUp,
    ) -> Self {
        let now = Utc::now();
        Self {
            case_id: case_id.into(),
            patient_name: patient_name.into(),
            patient_dob,
            contact,
            discharge,
            clinical,
            follow_up,
            workflow_status: WorkflowStatus::Initiated,
            current_step: Some(WorkflowStep::PersistIntake),
            assigned_shelter_id: None,
            assigned_transport_provider: None,
            assigned_benefits: Vec::new(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Move the case into a new step, bumping `updated_at`.
    pub fn advance(&mut self, step: WorkflowStep) {
        self.current_step = Some(step);
        self.updated_at = Utc::now();
    }

    /// Mark the case terminal, setting `completed_at` (invariant in §3).
    pub fn finalize(&mut self, status: WorkflowStatus) {
        debug_assert!(status.is_terminal());
        self.workflow_status = status;
        let now = Utc::now();
        self.updated_at = now;
        self.completed_at = Some(now);
    }
}
