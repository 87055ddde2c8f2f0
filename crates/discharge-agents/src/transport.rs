//! Transport agent: picks a provider from the scraping cache and obtains a
//! route from the routing collaborator (§4.6).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use discharge_bus::{AgentHandler, AgentName, AgentRequest, AgentResponse, BusError, CancelToken, TransportResponse};
use discharge_scrape::ScrapeCache;
use discharge_store::TransportFilter;

use crate::routing::RoutingClient;

const DEMO_DRIVER_NAME: &str = "John Smith";
const DEMO_DRIVER_PHONE: &str = "(415) 555-0125";

pub struct TransportHandler {
    cache: Arc<ScrapeCache>,
    routing: Arc<RoutingClient>,
}

impl TransportHandler {
    pub fn new(cache: Arc<ScrapeCache>, routing: Arc<RoutingClient>) -> Self {
        Self { cache, routing }
    }
}

#[async_trait]
impl AgentHandler for TransportHandler {
    fn name(&self) -> AgentName {
        AgentName::Transport
    }

    #[tracing::instrument(skip(self, request, _cancel))]
    async fn call(&self, request: AgentRequest, _cancel: CancelToken) -> Result<AgentResponse, BusError> {
        let AgentRequest::Transport(req) = request else {
            return Err(BusError::Remote(AgentName::Transport, "unexpected request variant".into()));
        };

        let providers = self
            .cache
            .get_transport(&TransportFilter {
                accessibility_equipped: if req.accessibility_required { Some(true) } else { None },
            })
            .await
            .map_err(|e| BusError::Remote(AgentName::Transport, e.to_string()))?;

        let provider = providers
            .into_iter()
            .find(|p| !req.accessibility_required || p.vehicle_type.to_lowercase().contains("wheelchair"))
            .ok_or_else(|| BusError::Remote(AgentName::Transport, "no transport provider available".into()))?;

        let route = self.routing.route(&req.pickup, &req.dropoff).await;

        Ok(AgentResponse::Transport(TransportResponse {
            provider: provider.provider,
            driver: DEMO_DRIVER_NAME.to_string(),
            phone: DEMO_DRIVER_PHONE.to_string(),
            pickup_time: Utc::now() + Duration::minutes(30),
            eta_minutes: route.eta_minutes,
            route_polyline: route.polyline,
        }))
    }
}
