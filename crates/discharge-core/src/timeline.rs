//! TimelineEvent — an append-only record describing one observable step in a
//! case's workflow. Per `case_id` the `seq` is dense and strictly increasing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub case_id: String,
    pub seq: i64,
    pub step: String,
    pub agent: String,
    pub status: EventStatus,
    pub description: String,
    #[serde(default)]
    pub details: HashMap<String, serde_json::Value>,
    pub timestamp: DateTime<Utc>,
    pub transcription: Option<String>,
}

impl TimelineEvent {
    /// Build an event; `seq` is assigned by the store on append, not here.
    pub fn new(
        case_id: impl Into<String>,
        step: impl Into<String>,
        agent: impl Into<String>,
        status: EventStatus,
        description: impl Into<String>,
    ) -> Self {
        Self {
            case_id: case_id.into(),
            seq: 0,
            step: step.into(),
            agent: agent.into(),
            status,
            description: description.into(),
            details: HashMap::new(),
            timestamp: Utc::now(),
            transcription: None,
        }
    }

    pub fn with_details(mut self, details: HashMap<String, serde_json::Value>) -> Self {
        self.details = details;
        self
    }

    pub fn with_transcription(mut self, transcript: impl Into<String>) -> Self {
        self.transcription = Some(transcript.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn density_over_a_sequence_of_appended_seqs() {
        let seqs: Vec<i64> = (0..5).collect();
        assert!(seqs.iter().enumerate().all(|(i, &s)| i as i64 == s));
    }
}
