//! Pharmacy agent: matches requested medications against a bundled
//! pharmacy reference table and picks the best-stocked pharmacy (§4.6).
//!
//! The table is a static asset loaded once via `once_cell`, not re-read
//! per request.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use discharge_bus::{AgentHandler, AgentName, AgentRequest, AgentResponse, BusError, CancelToken, PharmacyResponse};
use once_cell::sync::Lazy;
use serde::Deserialize;

const PHARMACY_DATABASE_JSON: &str = include_str!("../assets/pharmacy_database.json");

#[derive(Debug, Deserialize)]
struct PharmacyEntry {
    name: String,
    address: String,
    phone: String,
    #[allow(dead_code)]
    hours: String,
}

#[derive(Debug, Deserialize)]
struct MedicationEntry {
    name: String,
    cost_cents: i64,
    insurance_coverage: bool,
    pharmacies: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PharmacyDatabase {
    pharmacies: Vec<PharmacyEntry>,
    medications: Vec<MedicationEntry>,
}

static DATABASE: Lazy<PharmacyDatabase> =
    Lazy::new(|| serde_json::from_str(PHARMACY_DATABASE_JSON).expect("bundled pharmacy database is valid JSON"));

pub struct PharmacyHandler;

impl PharmacyHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PharmacyHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentHandler for PharmacyHandler {
    fn name(&self) -> AgentName {
        AgentName::Pharmacy
    }

    #[tracing::instrument(skip(self, request, _cancel))]
    async fn call(&self, request: AgentRequest, _cancel: CancelToken) -> Result<AgentResponse, BusError> {
        let AgentRequest::Pharmacy(req) = request else {
            return Err(BusError::Remote(AgentName::Pharmacy, "unexpected request variant".into()));
        };

        let matches: Vec<&MedicationEntry> = req
            .medications
            .iter()
            .filter_map(|requested| {
                let name = requested.name.to_lowercase();
                DATABASE
                    .medications
                    .iter()
                    .find(|m| m.name.to_lowercase().contains(&name) || name.contains(&m.name.to_lowercase()))
            })
            .collect();

        if matches.is_empty() {
            return Err(BusError::Remote(
                AgentName::Pharmacy,
                "no requested medications found in the pharmacy database".to_string(),
            ));
        }

        let total_cost_cents: i64 = matches.iter().map(|m| m.cost_cents).sum();
        let insurance_coverage = matches.iter().all(|m| m.insurance_coverage);

        let mut scores: Vec<(&str, usize)> = DATABASE
            .pharmacies
            .iter()
            .map(|p| {
                let score = matches.iter().filter(|m| m.pharmacies.iter().any(|name| name == &p.name)).count();
                (p.name.as_str(), score)
            })
            .collect();

        // Highest match count wins; ties broken by lexicographic pharmacy
        // name (the source's `max()` over a dict does not guarantee this).
        scores.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let best_name = scores
            .into_iter()
            .next()
            .map(|(name, _)| name)
            .ok_or_else(|| BusError::Remote(AgentName::Pharmacy, "no pharmacies configured".to_string()))?;

        let best = DATABASE
            .pharmacies
            .iter()
            .find(|p| p.name == best_name)
            .expect("best_name was derived from DATABASE.pharmacies");

        Ok(AgentResponse::Pharmacy(PharmacyResponse {
            pharmacy_name: best.name.clone(),
            address: best.address.clone(),
            phone: best.phone.clone(),
            ready_time: Utc::now() + Duration::minutes(30),
            total_cost_cents,
            insurance_coverage,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use discharge_bus::PharmacyRequest;
    use discharge_core::Medication;

    fn request(meds: &[&str]) -> AgentRequest {
        AgentRequest::Pharmacy(PharmacyRequest {
            case_id: "C1".into(),
            medications: meds
                .iter()
                .map(|n| Medication {
                    name: n.to_string(),
                    dosage: "500mg".into(),
                    frequency: "TID".into(),
                })
                .collect(),
            location: "San Francisco, CA".into(),
        })
    }

    #[tokio::test]
    async fn zero_matches_fails() {
        let handler = PharmacyHandler::new();
        let err = handler
            .call(request(&["Unobtainium 9000"]), CancelToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BusError::Remote(AgentName::Pharmacy, _)));
    }

    #[tokio::test]
    async fn case_insensitive_substring_match_sums_costs() {
        let handler = PharmacyHandler::new();
        let response = handler.call(request(&["amoxicillin"]), CancelToken::new()).await.unwrap();
        let AgentResponse::Pharmacy(r) = response else { panic!("wrong variant") };
        assert_eq!(r.total_cost_cents, 1200);
        assert!(r.insurance_coverage);
    }

    #[tokio::test]
    async fn picks_pharmacy_stocking_the_most_requested_medications() {
        let handler = PharmacyHandler::new();
        // Insulin Glargine is only stocked at SF General; Amoxicillin is at
        // three pharmacies including SF General, so it should win.
        let response = handler
            .call(request(&["Amoxicillin", "Insulin Glargine"]), CancelToken::new())
            .await
            .unwrap();
        let AgentResponse::Pharmacy(r) = response else { panic!("wrong variant") };
        assert_eq!(r.pharmacy_name, "SF General Hospital Outpatient Pharmacy");
        assert_eq!(r.total_cost_cents, 1200 + 12000);
    }
}
