//! Resource agent: assigns one provider per requested item class from the
//! community-resource cache (§4.6).

use std::sync::Arc;

use async_trait::async_trait;
use discharge_bus::{AgentHandler, AgentName, AgentRequest, AgentResponse, BusError, CancelToken, ResourceAssignment, ResourceResponse};
use discharge_scrape::ScrapeCache;
use discharge_store::ResourceFilter;

pub struct ResourceHandler {
    cache: Arc<ScrapeCache>,
}

impl ResourceHandler {
    pub fn new(cache: Arc<ScrapeCache>) -> Self {
        Self { cache }
    }
}

/// The item class an incoming item string maps to, for the purpose of
/// matching it against a resource's `services` list. `food`/`hygiene_kit`/
/// `clothing` are the classes the source's mock resource catalog uses.
fn item_keyword(item: &str) -> String {
    item.to_lowercase().replace("_kit", "").replace('_', " ")
}

#[async_trait]
impl AgentHandler for ResourceHandler {
    fn name(&self) -> AgentName {
        AgentName::Resource
    }

    #[tracing::instrument(skip(self, request, _cancel))]
    async fn call(&self, request: AgentRequest, _cancel: CancelToken) -> Result<AgentResponse, BusError> {
        let AgentRequest::Resource(req) = request else {
            return Err(BusError::Remote(AgentName::Resource, "unexpected request variant".into()));
        };

        let pool = self
            .cache
            .get_resources(&ResourceFilter::default())
            .await
            .map_err(|e| BusError::Remote(AgentName::Resource, e.to_string()))?;

        let mut assignments = Vec::new();
        let mut unmet = Vec::new();

        for item in &req.items {
            let keyword = item_keyword(item);
            let needs_dietary = req.dietary.unwrap_or(false) && keyword == "food";

            let provider = pool.iter().find(|r| {
                let services_match = r.services.iter().any(|s| s.to_lowercase().contains(&keyword));
                services_match && (!needs_dietary || r.dietary_accommodations)
            });

            match provider {
                Some(provider) => assignments.push(ResourceAssignment {
                    item: item.clone(),
                    provider_name: provider.name.clone(),
                    address: provider.address.clone(),
                    phone: provider.phone.clone(),
                    pickup_window: "Today, 9AM-5PM".to_string(),
                }),
                None => unmet.push(item.clone()),
            }
        }

        Ok(AgentResponse::Resource(ResourceResponse { assignments, unmet }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hygiene_kit_normalizes_to_the_hygiene_keyword() {
        assert_eq!(item_keyword("hygiene_kit"), "hygiene");
    }

    #[test]
    fn food_keyword_is_unchanged() {
        assert_eq!(item_keyword("food"), "food");
    }
}
