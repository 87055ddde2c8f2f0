use discharge_core::DischargeError;

#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("voice provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("voice provider returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("voice provider credentials not configured")]
    NotConfigured,

    #[error("call {call_id} did not end within {deadline_secs}s")]
    Timeout { call_id: String, deadline_secs: u64 },
}

impl From<VoiceError> for DischargeError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::Timeout { deadline_secs, .. } => DischargeError::Timeout {
                upstream: "voice".to_string(),
                deadline_secs,
            },
            VoiceError::NotConfigured => DischargeError::Upstream {
                upstream: "voice".to_string(),
                detail: "credentials not configured".to_string(),
            },
            VoiceError::Provider { status, body } => DischargeError::Upstream {
                upstream: "voice".to_string(),
                detail: format!("HTTP {status}: {body}"),
            },
            VoiceError::Request(e) => DischargeError::Upstream {
                upstream: "voice".to_string(),
                detail: e.to_string(),
            },
        }
    }
}
