use discharge_core::DischargeError;

use crate::message::AgentName;

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("agent {0} is not registered")]
    Unregistered(AgentName),

    #[error("call to {0} timed out after {1:?}")]
    Timeout(AgentName, std::time::Duration),

    #[error("agent {0} returned an error: {1}")]
    Remote(AgentName, String),
}

impl From<BusError> for DischargeError {
    fn from(err: BusError) -> Self {
        match err {
            BusError::Timeout(name, deadline) => DischargeError::Timeout {
                upstream: name.to_string(),
                deadline_secs: deadline.as_secs(),
            },
            BusError::Unregistered(name) => DischargeError::Upstream {
                upstream: name.to_string(),
                detail: "agent not registered".to_string(),
            },
            BusError::Remote(name, detail) => DischargeError::Upstream {
                upstream: name.to_string(),
                detail,
            },
        }
    }
}
