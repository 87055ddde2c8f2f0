//! Analytics sink: records a de-identified log of workflow progress and
//! raises alerts for failures on the steps that strand a patient (§4.6).
//!
//! Only a SHA-256 hash of the case id is retained; nothing here persists
//! patient-identifying detail.

use std::sync::Mutex;

use async_trait::async_trait;
use discharge_bus::{AgentMessage, NotificationSink};
use discharge_core::{WorkflowStatus, WorkflowStep};
use sha2::{Digest, Sha256};

/// Steps where a failure strands the patient badly enough to page someone,
/// rather than merely degrading the outcome.
const ALERTABLE_STEPS: &[WorkflowStep] = &[WorkflowStep::ShelterMatching, WorkflowStep::TransportScheduling];

#[derive(Debug, Clone)]
pub struct AnalyticsRecord {
    pub case_id_hash: String,
    pub step: WorkflowStep,
    pub status: WorkflowStatus,
}

#[derive(Debug, Clone)]
pub struct Alert {
    pub case_id_hash: String,
    pub step: WorkflowStep,
}

#[derive(Default)]
pub struct AnalyticsSink {
    records: Mutex<Vec<AnalyticsRecord>>,
    alerts: Mutex<Vec<Alert>>,
}

impl AnalyticsSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AnalyticsRecord> {
        self.records.lock().expect("analytics records lock poisoned").clone()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().expect("analytics alerts lock poisoned").clone()
    }
}

fn hash_case_id(case_id: &str) -> String {
    let digest = Sha256::digest(case_id.as_bytes());
    format!("{:x}", digest)
}

#[async_trait]
impl NotificationSink for AnalyticsSink {
    async fn notify(&self, message: AgentMessage) {
        let AgentMessage::WorkflowUpdate(update) = message;
        let case_id_hash = hash_case_id(&update.case_id);

        if update.status == WorkflowStatus::Failed && ALERTABLE_STEPS.contains(&update.step) {
            self.alerts.lock().expect("analytics alerts lock poisoned").push(Alert {
                case_id_hash: case_id_hash.clone(),
                step: update.step,
            });
            tracing::warn!(step = ?update.step, "workflow step failed, raising alert");
        }

        self.records.lock().expect("analytics records lock poisoned").push(AnalyticsRecord {
            case_id_hash,
            step: update.step,
            status: update.status,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use discharge_bus::{AgentName, WorkflowUpdate};

    fn update(step: WorkflowStep, status: WorkflowStatus) -> AgentMessage {
        AgentMessage::WorkflowUpdate(WorkflowUpdate {
            case_id: "C1".into(),
            step,
            status,
            sender: AgentName::Shelter,
            timestamp: Utc::now(),
        })
    }

    #[tokio::test]
    async fn failed_shelter_match_raises_an_alert() {
        let sink = AnalyticsSink::new();
        sink.notify(update(WorkflowStep::ShelterMatching, WorkflowStatus::Failed)).await;
        assert_eq!(sink.alerts().len(), 1);
        assert_eq!(sink.records().len(), 1);
    }

    #[tokio::test]
    async fn failed_pharmacy_prep_does_not_alert() {
        let sink = AnalyticsSink::new();
        sink.notify(update(WorkflowStep::PharmacyPrep, WorkflowStatus::Failed)).await;
        assert!(sink.alerts().is_empty());
        assert_eq!(sink.records().len(), 1);
    }

    #[test]
    fn hashing_is_deterministic_and_does_not_echo_the_case_id() {
        let hash = hash_case_id("case-123");
        assert_eq!(hash, hash_case_id("case-123"));
        assert_ne!(hash, "case-123");
    }
}
