//! Process-wide name → handler address book, wired explicitly at startup
//! (no import-time self-registration — see the DESIGN NOTES on circular
//! agent addresses).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::cancel::CancelToken;
use crate::error::BusError;
use crate::message::{AgentMessage, AgentName, AgentRequest, AgentResponse};

#[async_trait]
pub trait AgentHandler: Send + Sync {
    fn name(&self) -> AgentName;

    async fn call(&self, request: AgentRequest, cancel: CancelToken) -> Result<AgentResponse, BusError>;
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, message: AgentMessage);
}

pub struct AgentBusBuilder {
    handlers: HashMap<AgentName, Arc<dyn AgentHandler>>,
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl AgentBusBuilder {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            sinks: Vec::new(),
        }
    }

    pub fn register(mut self, handler: Arc<dyn AgentHandler>) -> Self {
        self.handlers.insert(handler.name(), handler);
        self
    }

    pub fn register_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn build(self) -> AgentBus {
        AgentBus {
            handlers: self.handlers,
            sinks: self.sinks,
        }
    }
}

impl Default for AgentBusBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The bus itself. Constructed once by `Engine::build` and shared behind
/// an `Arc` for the lifetime of the process.
pub struct AgentBus {
    handlers: HashMap<AgentName, Arc<dyn AgentHandler>>,
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl AgentBus {
    pub fn builder() -> AgentBusBuilder {
        AgentBusBuilder::new()
    }

    /// `call(agent_name, request, timeout) → response|TimeoutError|RemoteError` (§4.2).
    #[tracing::instrument(skip(self, request, cancel), fields(agent = %name))]
    pub async fn call(
        &self,
        name: AgentName,
        request: AgentRequest,
        timeout: Duration,
        cancel: CancelToken,
    ) -> Result<AgentResponse, BusError> {
        let handler = self.handlers.get(&name).ok_or(BusError::Unregistered(name))?;

        match tokio::time::timeout(timeout, handler.call(request, cancel)).await {
            Ok(result) => result,
            Err(_) => Err(BusError::Timeout(name, timeout)),
        }
    }

    /// One-way fan-out: every registered sink is notified without blocking
    /// the caller. Used for `WorkflowUpdate`s the analytics agent consumes.
    pub fn notify(&self, message: AgentMessage) {
        for sink in &self.sinks {
            let sink = Arc::clone(sink);
            let message = message.clone();
            tokio::spawn(async move {
                sink.notify(message).await;
            });
        }
        if self.sinks.is_empty() {
            warn!("notify() called with no registered sinks");
        }
    }

    pub fn is_registered(&self, name: AgentName) -> bool {
        self.handlers.contains_key(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{ShelterMatchRequest, ShelterMatchResponse, ShelterNeeds};

    struct EchoShelter;

    #[async_trait]
    impl AgentHandler for EchoShelter {
        fn name(&self) -> AgentName {
            AgentName::Shelter
        }

        async fn call(&self, request: AgentRequest, _cancel: CancelToken) -> Result<AgentResponse, BusError> {
            let AgentRequest::ShelterMatch(req) = request else {
                return Err(BusError::Remote(AgentName::Shelter, "unexpected request".into()));
            };
            Ok(AgentResponse::ShelterMatch(ShelterMatchResponse {
                selected: Some(format!("echo-for-{}", req.case_id)),
                address: Some("100 Test St".to_string()),
                phone: Some("(415) 555-0100".to_string()),
                availability_confirmed: true,
                beds_available: 1,
                accessibility_confirmed: req.needs.accessibility,
                accessibility_warning: false,
                services: vec![],
                transcript: None,
            }))
        }
    }

    #[tokio::test]
    async fn call_routes_to_the_registered_handler() {
        let bus = AgentBus::builder().register(Arc::new(EchoShelter)).build();
        let response = bus
            .call(
                AgentName::Shelter,
                AgentRequest::ShelterMatch(ShelterMatchRequest {
                    case_id: "C1".into(),
                    needs: ShelterNeeds { accessibility: true },
                    excluded: vec![],
                }),
                Duration::from_secs(1),
                CancelToken::new(),
            )
            .await
            .unwrap();
        match response {
            AgentResponse::ShelterMatch(r) => assert_eq!(r.selected.as_deref(), Some("echo-for-C1")),
            _ => panic!("wrong response variant"),
        }
    }

    #[tokio::test]
    async fn call_to_unregistered_agent_fails_fast() {
        let bus = AgentBus::builder().build();
        let err = bus
            .call(
                AgentName::Transport,
                AgentRequest::ShelterMatch(ShelterMatchRequest {
                    case_id: "C1".into(),
                    needs: ShelterNeeds { accessibility: false },
                    excluded: vec![],
                }),
                Duration::from_secs(1),
                CancelToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BusError::Unregistered(AgentName::Transport)));
    }
}
