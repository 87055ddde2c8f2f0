//! The coordinator: `Engine::build(config) → Engine`, `Engine::coordinate`
//! runs the nine-step sequence for one case (§4.1).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use discharge_agents::{
    AnalyticsSink, EligibilityHandler, PharmacyHandler, ResourceHandler, RoutingClient, ShelterHandler,
    SocialWorkerHandler, TransportHandler,
};
use discharge_bus::{
    AgentBus, AgentMessage, AgentName, AgentRequest, AgentResponse, CancelToken, EligibilityRequest,
    PharmacyRequest, ResourceRequest, ShelterMatchRequest, ShelterNeeds, SocialWorkerAssignment, TransportRequest,
    WorkflowUpdate,
};
use discharge_core::{Case, Config, EventStatus, Medication, TimelineEvent, WorkflowStatus, WorkflowStep};
use discharge_scrape::{PageFetcher, ScrapeCache};
use discharge_store::{CacheMetadataRepository, CaseRepository, ListingStore, ScrapeLogRepository, TimelineRepository};
use discharge_voice::VoiceCaller;
use sqlx::PgPool;

use crate::intake::IntakeRecord;
use crate::outcome::{BenefitsSummary, CaseManagerAssignment, MedicationPlan, Outcome, OutcomeStatus, ShelterSummary, TransportSummary};

/// Resource items requested for every case; the source's coordinator hands
/// the resource agent the same fixed list regardless of intake content.
const DEFAULT_RESOURCE_ITEMS: &[&str] = &["food", "hygiene_kit", "clothing"];

const AGENT_CALL_TIMEOUT: Duration = Duration::from_secs(30);
const VOICE_CALL_TIMEOUT: Duration = Duration::from_secs(620);

pub struct Engine {
    case_repo: CaseRepository,
    timeline_repo: TimelineRepository,
    bus: Arc<AgentBus>,
    config: Arc<Config>,
    analytics: Arc<AnalyticsSink>,
    cache: Arc<ScrapeCache>,
}

impl Engine {
    /// Instantiate every collaborator and agent handler, wire them into a
    /// bus, and return a ready-to-use engine. No global registration: every
    /// address is recorded here, explicitly (§9).
    pub fn build(config: Config, pool: PgPool, fetcher: Arc<dyn PageFetcher>) -> Self {
        let config = Arc::new(config);

        let cache = Arc::new(ScrapeCache::new(
            ListingStore::new(pool.clone()),
            CacheMetadataRepository::new(pool.clone()),
            ScrapeLogRepository::new(pool.clone()),
            fetcher,
            config.cache_ttl_seconds,
        ));

        let voice = Arc::new(VoiceCaller::new(
            config.voice_api_key.clone(),
            config.voice_phone_number_id.clone(),
            config.voice_assistant_id.clone(),
            config.demo_mode,
            config.demo_phone_number.clone(),
            config.call_poll_interval_seconds,
            config.call_max_wait_seconds,
        ));

        let routing = Arc::new(RoutingClient::new(config.routing_provider_token.clone()));
        let analytics = Arc::new(AnalyticsSink::new());

        let bus = Arc::new(
            AgentBus::builder()
                .register(Arc::new(ShelterHandler::new(cache.clone(), voice)))
                .register(Arc::new(TransportHandler::new(cache.clone(), routing)))
                .register(Arc::new(ResourceHandler::new(cache.clone())))
                .register(Arc::new(PharmacyHandler::new()))
                .register(Arc::new(EligibilityHandler::new()))
                .register(Arc::new(SocialWorkerHandler::new()))
                .register_sink(analytics.clone())
                .build(),
        );

        Self {
            case_repo: CaseRepository::new(pool.clone()),
            timeline_repo: TimelineRepository::new(pool),
            bus,
            config,
            analytics,
            cache,
        }
    }

    pub fn bus(&self) -> Arc<AgentBus> {
        self.bus.clone()
    }

    pub fn analytics(&self) -> Arc<AnalyticsSink> {
        self.analytics.clone()
    }

    pub fn cache(&self) -> Arc<ScrapeCache> {
        self.cache.clone()
    }

    pub fn config(&self) -> Arc<Config> {
        self.config.clone()
    }

    pub async fn load_case(&self, case_id: &str) -> Result<discharge_core::Case, discharge_store::StoreError> {
        self.case_repo.load(case_id).await
    }

    pub async fn list_cases(&self) -> Result<Vec<discharge_store::CaseSummary>, discharge_store::StoreError> {
        self.case_repo.list_summaries().await
    }

    pub async fn load_timeline(&self, case_id: &str) -> Result<Vec<discharge_core::TimelineEvent>, discharge_store::StoreError> {
        self.timeline_repo.load(case_id).await
    }

    pub async fn append_event(&self, event: discharge_core::TimelineEvent) -> Result<discharge_core::TimelineEvent, discharge_store::StoreError> {
        self.timeline_repo.append(event, None).await
    }

    #[tracing::instrument(skip(self, intake), fields(case_id = %intake.case_id))]
    pub async fn coordinate(&self, intake: IntakeRecord) -> Outcome {
        let case_id = intake.case_id.clone();
        let mut timeline = Vec::new();
        let mut failed = false;

        let mut case = Case::new(
            intake.case_id.clone(),
            intake.patient_name.clone(),
            intake.patient_dob,
            intake.contact.clone(),
            intake.discharge.clone(),
            intake.clinical.clone(),
            intake.follow_up.clone(),
        );
        case.workflow_status = WorkflowStatus::InProgress;

        if let Err(e) = self.case_repo.upsert(&case).await {
            tracing::error!(case_id = %case_id, error = %e, "failed to persist intake, aborting coordination");
            return Outcome {
                case_id,
                status: OutcomeStatus::Failed,
                shelter: None,
                transport: None,
                medications: None,
                benefits: None,
                case_manager: None,
                timeline: Vec::new(),
                error: Some(e.to_string()),
            };
        }
        timeline.push(
            self.append(
                &case_id,
                "initiated",
                "coordinator",
                EventStatus::Completed,
                format!("Intake received for {}", intake.patient_name),
                HashMap::new(),
                None,
            )
            .await,
        );

        // Step 2: social-worker planning — independent of everything later.
        case.advance(WorkflowStep::SocialWorkerPlanning);
        let _ = self.case_repo.upsert(&case).await;
        let case_manager = self.run_social_worker(&intake, &mut timeline).await;

        // Step 3: pharmacy prep.
        case.advance(WorkflowStep::PharmacyPrep);
        let _ = self.case_repo.upsert(&case).await;
        let medications = self.run_pharmacy(&intake, &mut timeline).await;
        if medications.is_none() {
            failed = true;
        }

        // Steps 4-5: shelter matching with voice-confirmation retries.
        case.advance(WorkflowStep::ShelterMatching);
        let _ = self.case_repo.upsert(&case).await;
        let (shelter, shelter_confirmed, shelter_hard_failed) = self.run_shelter(&intake, &mut timeline).await;
        if shelter_hard_failed {
            failed = true;
        }
        if let Some(s) = &shelter {
            case.assigned_shelter_id = Some(s.name.clone());
        }

        // Steps 6-7 run concurrently: resource coordination and eligibility
        // both depend only on intake (plus, for 6, the shelter address).
        // Step 6 is skipped outright on a step-4 hard failure (no shelter at all).
        case.advance(WorkflowStep::ResourceCoordination);
        let _ = self.case_repo.upsert(&case).await;
        let resources_future = async {
            if let Some(shelter_summary) = shelter.as_ref() {
                self.run_resources(&intake, Some(shelter_summary)).await
            } else {
                (true, Vec::new())
            }
        };
        let (resource_result, eligibility_result) = tokio::join!(resources_future, self.run_eligibility(&intake));
        let (resources_ok, resource_events) = resource_result;
        timeline.extend(resource_events);
        if !resources_ok {
            failed = true;
        }
        let (benefits, eligibility_events) = eligibility_result;
        timeline.extend(eligibility_events);
        if let Some(b) = &benefits {
            case.assigned_benefits = b.programs.clone();
        }
        if benefits.is_none() {
            failed = true;
        }

        // Step 8: transport, only attempted if we have a shelter dropoff.
        case.advance(WorkflowStep::TransportScheduling);
        let _ = self.case_repo.upsert(&case).await;
        let mut transport_failed = false;
        let transport = if let Some(shelter_summary) = &shelter {
            let (transport, events) = self.run_transport(&intake, shelter_summary).await;
            timeline.extend(events);
            if let Some(t) = &transport {
                case.assigned_transport_provider = Some(t.provider.clone());
            }
            if transport.is_none() {
                transport_failed = true;
            }
            transport
        } else {
            None
        };

        let status = if failed {
            OutcomeStatus::Failed
        } else if transport_failed {
            OutcomeStatus::CoordinatedWithoutTransport
        } else if shelter.is_some() && !shelter_confirmed {
            OutcomeStatus::UnconfirmedShelter
        } else {
            OutcomeStatus::Coordinated
        };

        let case_status = if matches!(status, OutcomeStatus::Failed) {
            WorkflowStatus::Failed
        } else {
            WorkflowStatus::Coordinated
        };
        case.advance(WorkflowStep::Finalize);
        case.finalize(case_status);
        if let Err(e) = self.case_repo.upsert(&case).await {
            tracing::error!(case_id = %case_id, error = %e, "failed to persist final case state");
        }

        timeline.push(
            self.append(
                &case_id,
                "completed",
                "coordinator",
                if matches!(status, OutcomeStatus::Failed) { EventStatus::Failed } else { EventStatus::Completed },
                format!("Workflow finished with status {:?}", status),
                HashMap::new(),
                None,
            )
            .await,
        );

        Outcome {
            case_id,
            status,
            shelter,
            transport,
            medications,
            benefits,
            case_manager,
            timeline,
            error: None,
        }
    }

    async fn run_social_worker(&self, intake: &IntakeRecord, timeline: &mut Vec<TimelineEvent>) -> Option<CaseManagerAssignment> {
        let request = AgentRequest::SocialWorker(SocialWorkerAssignment {
            case_id: intake.case_id.clone(),
            patient_name: intake.patient_name.clone(),
            needs: ShelterNeeds { accessibility: intake.clinical.requires_accessibility() },
        });

        match self.bus.call(AgentName::SocialWorker, request, AGENT_CALL_TIMEOUT, CancelToken::new()).await {
            Ok(AgentResponse::SocialWorker(r)) => {
                timeline.push(
                    self.append(
                        &intake.case_id,
                        "sw_plan_started",
                        "social_worker",
                        EventStatus::Completed,
                        format!("Case manager {} assigned ({})", r.name, r.department),
                        HashMap::new(),
                        None,
                    )
                    .await,
                );
                self.notify(&intake.case_id, WorkflowStep::SocialWorkerPlanning, WorkflowStatus::InProgress, AgentName::SocialWorker);
                Some(CaseManagerAssignment {
                    name: r.name,
                    phone: r.phone,
                    department: r.department,
                    first_contact_date: r.first_contact_date,
                })
            }
            Ok(_) => None,
            Err(e) => {
                timeline.push(
                    self.append(
                        &intake.case_id,
                        "sw_plan_failed",
                        "social_worker",
                        EventStatus::Failed,
                        e.to_string(),
                        HashMap::new(),
                        None,
                    )
                    .await,
                );
                self.notify(&intake.case_id, WorkflowStep::SocialWorkerPlanning, WorkflowStatus::Failed, AgentName::SocialWorker);
                None
            }
        }
    }

    async fn run_pharmacy(&self, intake: &IntakeRecord, timeline: &mut Vec<TimelineEvent>) -> Option<MedicationPlan> {
        let medications: Vec<Medication> = intake.clinical.medications.clone();
        let request = AgentRequest::Pharmacy(PharmacyRequest {
            case_id: intake.case_id.clone(),
            medications,
            location: format!("{}, {}", intake.contact.city, intake.contact.state),
        });

        match self.bus.call(AgentName::Pharmacy, request, AGENT_CALL_TIMEOUT, CancelToken::new()).await {
            Ok(AgentResponse::Pharmacy(r)) => {
                timeline.push(
                    self.append(
                        &intake.case_id,
                        "pharmacy_ready",
                        "pharmacy",
                        EventStatus::Completed,
                        format!("{} will have medications ready by {}", r.pharmacy_name, r.ready_time),
                        details(&[("total_cost_cents", r.total_cost_cents.into()), ("insurance_coverage", r.insurance_coverage.into())]),
                        None,
                    )
                    .await,
                );
                self.notify(&intake.case_id, WorkflowStep::PharmacyPrep, WorkflowStatus::InProgress, AgentName::Pharmacy);
                Some(MedicationPlan {
                    pharmacy_name: r.pharmacy_name,
                    address: r.address,
                    total_cost_cents: r.total_cost_cents,
                    insurance_coverage: r.insurance_coverage,
                })
            }
            Ok(_) => None,
            Err(e) => {
                timeline.push(
                    self.append(&intake.case_id, "pharmacy_failed", "pharmacy", EventStatus::Failed, e.to_string(), HashMap::new(), None)
                        .await,
                );
                self.notify(&intake.case_id, WorkflowStep::PharmacyPrep, WorkflowStatus::Failed, AgentName::Pharmacy);
                None
            }
        }
    }

    /// Steps 4 and 5 together: pick a candidate, confirm it by voice, retry
    /// up to `k_retry` candidates total before settling for "unconfirmed".
    async fn run_shelter(&self, intake: &IntakeRecord, timeline: &mut Vec<TimelineEvent>) -> (Option<ShelterSummary>, bool, bool) {
        let needs_accessibility = intake.clinical.requires_accessibility();
        let mut excluded = Vec::new();
        let mut last: Option<ShelterSummary> = None;

        for _ in 0..self.config.k_retry.max(1) {
            let request = AgentRequest::ShelterMatch(ShelterMatchRequest {
                case_id: intake.case_id.clone(),
                needs: ShelterNeeds { accessibility: needs_accessibility },
                excluded: excluded.clone(),
            });

            let response = self.bus.call(AgentName::Shelter, request, VOICE_CALL_TIMEOUT, CancelToken::new()).await;
            let r = match response {
                Ok(AgentResponse::ShelterMatch(r)) => r,
                Ok(_) => return (None, false, true),
                Err(e) => {
                    timeline.push(
                        self.append(&intake.case_id, "shelter_failed", "shelter", EventStatus::Failed, e.to_string(), HashMap::new(), None)
                            .await,
                    );
                    self.notify(&intake.case_id, WorkflowStep::ShelterMatching, WorkflowStatus::Failed, AgentName::Shelter);
                    return (None, false, true);
                }
            };

            let Some(name) = r.selected.clone() else {
                timeline.push(
                    self.append(
                        &intake.case_id,
                        "shelter_failed",
                        "shelter",
                        EventStatus::Failed,
                        "no shelter candidates with available beds",
                        HashMap::new(),
                        None,
                    )
                    .await,
                );
                self.notify(&intake.case_id, WorkflowStep::ShelterMatching, WorkflowStatus::Failed, AgentName::Shelter);
                return (None, false, true);
            };

            timeline.push(
                self.append(
                    &intake.case_id,
                    "shelter_candidate_selected",
                    "shelter",
                    EventStatus::InProgress,
                    format!("Candidate shelter: {name}"),
                    details(&[("accessibility_warning", r.accessibility_warning.into())]),
                    None,
                )
                .await,
            );

            if let Some(transcript) = &r.transcript {
                timeline.push(
                    self.append(
                        &intake.case_id,
                        "vapi_transcription",
                        "shelter",
                        EventStatus::Info,
                        format!("{}: {}", name, transcript_prefix(transcript)),
                        HashMap::new(),
                        Some(transcript.clone()),
                    )
                    .await,
                );
            }

            let summary = ShelterSummary {
                name: name.clone(),
                address: r.address.clone().unwrap_or_default(),
                phone: r.phone.clone().unwrap_or_default(),
                beds_available: r.beds_available,
                accessibility_confirmed: r.accessibility_confirmed,
                accessibility_warning: r.accessibility_warning,
                services: r.services.clone(),
            };

            if r.availability_confirmed {
                timeline.push(
                    self.append(
                        &intake.case_id,
                        "shelter_confirmed",
                        "shelter",
                        EventStatus::Completed,
                        format!("{} confirmed {} bed(s) available", name, r.beds_available),
                        HashMap::new(),
                        None,
                    )
                    .await,
                );
                self.notify(&intake.case_id, WorkflowStep::VoiceConfirmation, WorkflowStatus::InProgress, AgentName::Shelter);
                return (Some(summary), true, false);
            }

            excluded.push(name);
            last = Some(summary);
        }

        timeline.push(
            self.append(
                &intake.case_id,
                "shelter_unconfirmed",
                "shelter",
                EventStatus::Info,
                "no candidate confirmed availability after retries",
                HashMap::new(),
                None,
            )
            .await,
        );
        self.notify(&intake.case_id, WorkflowStep::VoiceConfirmation, WorkflowStatus::InProgress, AgentName::Shelter);
        (last, false, false)
    }

    async fn run_resources(&self, intake: &IntakeRecord, shelter: Option<&ShelterSummary>) -> (bool, Vec<TimelineEvent>) {
        let mut events = Vec::new();
        let delivery_address = shelter.map(|s| s.address.clone()).unwrap_or_else(|| intake.contact.address.clone());
        let request = AgentRequest::Resource(ResourceRequest {
            case_id: intake.case_id.clone(),
            items: DEFAULT_RESOURCE_ITEMS.iter().map(|s| s.to_string()).collect(),
            delivery_address,
            dietary: Some(intake.clinical.dietary_needs.is_some()),
        });

        match self.bus.call(AgentName::Resource, request, AGENT_CALL_TIMEOUT, CancelToken::new()).await {
            Ok(AgentResponse::Resource(r)) => {
                events.push(
                    self.append(
                        &intake.case_id,
                        "resources_summary",
                        "resource",
                        EventStatus::Completed,
                        format!("{} item(s) assigned, {} unmet", r.assignments.len(), r.unmet.len()),
                        details(&[("unmet", r.unmet.clone().into())]),
                        None,
                    )
                    .await,
                );
                self.notify(&intake.case_id, WorkflowStep::ResourceCoordination, WorkflowStatus::InProgress, AgentName::Resource);
                (true, events)
            }
            Ok(_) => (false, events),
            Err(e) => {
                events.push(
                    self.append(&intake.case_id, "resources_failed", "resource", EventStatus::Failed, e.to_string(), HashMap::new(), None)
                        .await,
                );
                self.notify(&intake.case_id, WorkflowStep::ResourceCoordination, WorkflowStatus::Failed, AgentName::Resource);
                (false, events)
            }
        }
    }

    async fn run_eligibility(&self, intake: &IntakeRecord) -> (Option<BenefitsSummary>, Vec<TimelineEvent>) {
        let mut events = Vec::new();
        let request = AgentRequest::Eligibility(EligibilityRequest {
            case_id: intake.case_id.clone(),
            dob: intake.patient_dob,
            income_level: intake.income_level,
            current_benefits: intake.current_benefits.clone(),
        });

        match self.bus.call(AgentName::Eligibility, request, AGENT_CALL_TIMEOUT, CancelToken::new()).await {
            Ok(AgentResponse::Eligibility(r)) => {
                events.push(
                    self.append(
                        &intake.case_id,
                        "eligibility_checked",
                        "eligibility",
                        EventStatus::Completed,
                        format!("{} program(s), ${:.2}/mo", r.programs.len(), r.total_monthly_benefits_cents as f64 / 100.0),
                        HashMap::new(),
                        None,
                    )
                    .await,
                );
                self.notify(&intake.case_id, WorkflowStep::EligibilityCheck, WorkflowStatus::InProgress, AgentName::Eligibility);
                (
                    Some(BenefitsSummary {
                        programs: r.programs.iter().map(|p| p.program_name.clone()).collect(),
                        total_monthly_benefits_cents: r.total_monthly_benefits_cents,
                        requires_manual_review: r.requires_manual_review,
                        next_steps: r.next_steps,
                    }),
                    events,
                )
            }
            Ok(_) => (None, events),
            Err(e) => {
                events.push(
                    self.append(&intake.case_id, "eligibility_failed", "eligibility", EventStatus::Failed, e.to_string(), HashMap::new(), None)
                        .await,
                );
                self.notify(&intake.case_id, WorkflowStep::EligibilityCheck, WorkflowStatus::Failed, AgentName::Eligibility);
                (None, events)
            }
        }
    }

    async fn run_transport(&self, intake: &IntakeRecord, shelter: &ShelterSummary) -> (Option<TransportSummary>, Vec<TimelineEvent>) {
        let mut events = Vec::new();
        let pickup = intake.discharge.facility_address.clone().unwrap_or_else(|| intake.contact.address.clone());
        let request = AgentRequest::Transport(TransportRequest {
            case_id: intake.case_id.clone(),
            pickup,
            dropoff: shelter.address.clone(),
            accessibility_required: intake.clinical.requires_accessibility(),
        });

        match self.bus.call(AgentName::Transport, request, AGENT_CALL_TIMEOUT, CancelToken::new()).await {
            Ok(AgentResponse::Transport(r)) => {
                events.push(
                    self.append(
                        &intake.case_id,
                        "transport_scheduled",
                        "transport",
                        EventStatus::Completed,
                        format!("{} arriving in {} minutes", r.provider, r.eta_minutes),
                        HashMap::new(),
                        None,
                    )
                    .await,
                );
                self.notify(&intake.case_id, WorkflowStep::TransportScheduling, WorkflowStatus::InProgress, AgentName::Transport);
                (
                    Some(TransportSummary {
                        provider: r.provider,
                        driver: r.driver,
                        eta_minutes: r.eta_minutes,
                        route_polyline: r.route_polyline,
                    }),
                    events,
                )
            }
            Ok(_) => (None, events),
            Err(e) => {
                events.push(
                    self.append(&intake.case_id, "transport_failed", "transport", EventStatus::Failed, e.to_string(), HashMap::new(), None)
                        .await,
                );
                self.notify(&intake.case_id, WorkflowStep::TransportScheduling, WorkflowStatus::Failed, AgentName::Transport);
                (None, events)
            }
        }
    }

    async fn append(
        &self,
        case_id: &str,
        step: &str,
        agent: &str,
        status: EventStatus,
        description: impl Into<String>,
        details: HashMap<String, serde_json::Value>,
        transcription: Option<String>,
    ) -> TimelineEvent {
        let mut event = TimelineEvent::new(case_id, step, agent, status, description).with_details(details);
        if let Some(t) = transcription {
            event = event.with_transcription(t);
        }
        match self.timeline_repo.append(event.clone(), None).await {
            Ok(persisted) => persisted,
            Err(e) => {
                eprintln!("DEBUG append failed case_id={} step={} error={}", case_id, step, e);
                tracing::error!(case_id = %case_id, step = %step, error = %e, "failed to persist timeline event");
                event
            }
        }
    }

    fn notify(&self, case_id: &str, step: WorkflowStep, status: WorkflowStatus, sender: AgentName) {
        self.bus.notify(AgentMessage::WorkflowUpdate(WorkflowUpdate {
            case_id: case_id.to_string(),
            step,
            status,
            sender,
            timestamp: Utc::now(),
        }));
    }
}

fn details(pairs: &[(&str, serde_json::Value)]) -> HashMap<String, serde_json::Value> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

/// First line (or first 120 chars) of a transcript, for the human-readable
/// event description; the full text always lives in `transcription`.
fn transcript_prefix(transcript: &str) -> String {
    let first_line = transcript.lines().next().unwrap_or(transcript);
    first_line.chars().take(120).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_prefix_keeps_only_the_first_line() {
        let transcript = "Shelter confirmed for tonight.\nAgent: thank you, goodbye.";
        assert_eq!(transcript_prefix(transcript), "Shelter confirmed for tonight.");
    }

    #[test]
    fn transcript_prefix_truncates_long_single_lines() {
        let transcript = "a".repeat(200);
        assert_eq!(transcript_prefix(&transcript).len(), 120);
    }

    #[test]
    fn details_builds_a_map_from_pairs() {
        let map = details(&[("beds_available", 5.into()), ("name", "Shelter A".into())]);
        assert_eq!(map.get("beds_available"), Some(&serde_json::json!(5)));
        assert_eq!(map.get("name"), Some(&serde_json::json!("Shelter A")));
    }
}
