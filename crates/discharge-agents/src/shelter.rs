//! Shelter agent: picks a candidate from the scraping cache, places a
//! voice-confirmation call, and reports what the transcript says (§4.6).

use std::sync::Arc;

use async_trait::async_trait;
use discharge_bus::{AgentHandler, AgentName, AgentRequest, AgentResponse, BusError, CancelToken, ShelterMatchResponse};
use discharge_scrape::ScrapeCache;
use discharge_store::ShelterFilter;
use discharge_voice::VoiceCaller;
use tracing::{info, warn};

pub struct ShelterHandler {
    cache: Arc<ScrapeCache>,
    voice: Arc<VoiceCaller>,
}

impl ShelterHandler {
    pub fn new(cache: Arc<ScrapeCache>, voice: Arc<VoiceCaller>) -> Self {
        Self { cache, voice }
    }
}

#[async_trait]
impl AgentHandler for ShelterHandler {
    fn name(&self) -> AgentName {
        AgentName::Shelter
    }

    #[tracing::instrument(skip(self, request, _cancel))]
    async fn call(&self, request: AgentRequest, _cancel: CancelToken) -> Result<AgentResponse, BusError> {
        let AgentRequest::ShelterMatch(req) = request else {
            return Err(BusError::Remote(AgentName::Shelter, "unexpected request variant".into()));
        };

        let mut accessibility_warning = false;
        let mut candidates = self
            .cache
            .get_shelters(&ShelterFilter {
                min_available_beds: Some(1),
                accessibility: if req.needs.accessibility { Some(true) } else { None },
            })
            .await
            .map_err(|e| BusError::Remote(AgentName::Shelter, e.to_string()))?;

        if req.needs.accessibility && candidates.is_empty() {
            accessibility_warning = true;
            candidates = self
                .cache
                .get_shelters(&ShelterFilter {
                    min_available_beds: Some(1),
                    accessibility: None,
                })
                .await
                .map_err(|e| BusError::Remote(AgentName::Shelter, e.to_string()))?;
        }

        let candidate = candidates.into_iter().find(|c| !req.excluded.contains(&c.name));

        let Some(candidate) = candidate else {
            return Ok(AgentResponse::ShelterMatch(ShelterMatchResponse {
                selected: None,
                address: None,
                phone: None,
                availability_confirmed: false,
                beds_available: 0,
                accessibility_confirmed: false,
                accessibility_warning,
                services: vec![],
                transcript: None,
            }));
        };

        let outcome = self.voice.call_shelter(&candidate.phone, &candidate.name).await;

        let (transcript, parsed) = match outcome {
            Ok(outcome) => {
                let parsed = discharge_voice::parse(&outcome.transcript, &candidate.name);
                (Some(outcome.transcript), parsed)
            }
            Err(e) => {
                warn!(shelter = %candidate.name, error = %e, "voice confirmation call failed");
                (
                    None,
                    discharge_voice::ParsedTranscript {
                        availability_confirmed: false,
                        beds_available: 0,
                        accessibility: candidate.accessibility,
                        services: vec![],
                    },
                )
            }
        };

        info!(
            shelter = %candidate.name,
            confirmed = parsed.availability_confirmed,
            beds = parsed.beds_available,
            "shelter voice confirmation result"
        );

        Ok(AgentResponse::ShelterMatch(ShelterMatchResponse {
            selected: Some(candidate.name),
            address: Some(candidate.address),
            phone: Some(candidate.phone),
            availability_confirmed: parsed.availability_confirmed,
            beds_available: parsed.beds_available,
            accessibility_confirmed: parsed.accessibility,
            accessibility_warning,
            services: parsed.services,
            transcript,
        }))
    }
}

#[cfg(test)]
mod tests {
    // The candidate-selection and voice-call orchestration require a live
    // ScrapeCache/VoiceCaller pair; exercised by discharge-workflow's
    // integration tests against fakes of those collaborators.
}
