//! Eligibility agent: checks a fixed set of benefit programs against the
//! patient's income level and current benefits (§4.6).

use async_trait::async_trait;
use discharge_bus::{
    AgentHandler, AgentName, AgentRequest, AgentResponse, BenefitAward, BusError, CancelToken, EligibilityResponse,
    IncomeLevel,
};

const GA_MONTHLY_CENTS: i64 = 58_800;
const SNAP_MONTHLY_CENTS: i64 = 28_100;

pub struct EligibilityHandler;

impl EligibilityHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EligibilityHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentHandler for EligibilityHandler {
    fn name(&self) -> AgentName {
        AgentName::Eligibility
    }

    #[tracing::instrument(skip(self, request, _cancel))]
    async fn call(&self, request: AgentRequest, _cancel: CancelToken) -> Result<AgentResponse, BusError> {
        let AgentRequest::Eligibility(req) = request else {
            return Err(BusError::Remote(AgentName::Eligibility, "unexpected request variant".into()));
        };

        let mut programs = Vec::new();

        let medi_cal_eligible = matches!(
            req.income_level,
            Some(IncomeLevel::Low) | Some(IncomeLevel::VeryLow) | Some(IncomeLevel::None)
        );
        if medi_cal_eligible {
            programs.push(BenefitAward {
                program_name: "Medi-Cal".to_string(),
                monthly_value_cents: 0,
                requires_manual_review: false,
            });
        }

        // General Assistance and SNAP are always eligible in this system —
        // cash and food assistance have no income gate at the coordination
        // layer, only at the agency that ultimately processes the application.
        programs.push(BenefitAward {
            program_name: "General Assistance".to_string(),
            monthly_value_cents: GA_MONTHLY_CENTS,
            requires_manual_review: false,
        });
        programs.push(BenefitAward {
            program_name: "CalFresh (SNAP)".to_string(),
            monthly_value_cents: SNAP_MONTHLY_CENTS,
            requires_manual_review: false,
        });
        programs.push(BenefitAward {
            program_name: "Housing Assistance".to_string(),
            monthly_value_cents: 0,
            requires_manual_review: false,
        });

        // Disability benefits are never auto-approved; they only surface
        // once the patient has an application already in progress, and
        // always land in manual review.
        let disability_pending = req
            .current_benefits
            .iter()
            .any(|b| b.to_lowercase().contains("disability") || b.to_lowercase().contains("ssi") || b.to_lowercase().contains("ssdi"));
        if disability_pending {
            programs.push(BenefitAward {
                program_name: "SSI/SSDI".to_string(),
                monthly_value_cents: 0,
                requires_manual_review: true,
            });
        }

        let total_monthly_benefits_cents = programs.iter().map(|p| p.monthly_value_cents).sum();
        let requires_manual_review = programs.iter().any(|p| p.requires_manual_review);
        let next_steps = generate_next_steps(&programs, requires_manual_review);

        Ok(AgentResponse::Eligibility(EligibilityResponse {
            programs,
            total_monthly_benefits_cents,
            requires_manual_review,
            next_steps,
        }))
    }
}

fn generate_next_steps(programs: &[BenefitAward], requires_manual_review: bool) -> Vec<String> {
    let mut steps = Vec::new();
    if requires_manual_review {
        steps.push("Schedule appointment with benefits counselor".to_string());
    }
    for program in programs {
        match program.program_name.as_str() {
            "Medi-Cal" => steps.push("Apply for Medi-Cal coverage immediately".to_string()),
            "General Assistance" => steps.push("Submit GA application with required documentation".to_string()),
            "CalFresh (SNAP)" => steps.push("Apply for CalFresh benefits".to_string()),
            "Housing Assistance" => steps.push("Join housing assistance waitlist".to_string()),
            _ => {}
        }
    }
    if steps.is_empty() {
        steps.push("Contact social worker for benefit navigation assistance".to_string());
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use discharge_bus::EligibilityRequest;

    fn request(income_level: Option<IncomeLevel>, current_benefits: Vec<String>) -> AgentRequest {
        AgentRequest::Eligibility(EligibilityRequest {
            case_id: "C1".into(),
            dob: NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
            income_level,
            current_benefits,
        })
    }

    #[tokio::test]
    async fn low_income_no_current_benefits_matches_the_documented_scenario() {
        let handler = EligibilityHandler::new();
        let response = handler
            .call(request(Some(IncomeLevel::Low), vec![]), CancelToken::new())
            .await
            .unwrap();
        let AgentResponse::Eligibility(r) = response else { panic!("wrong variant") };

        let names: Vec<&str> = r.programs.iter().map(|p| p.program_name.as_str()).collect();
        assert_eq!(names, vec!["Medi-Cal", "General Assistance", "CalFresh (SNAP)", "Housing Assistance"]);
        assert_eq!(r.total_monthly_benefits_cents, 86_900);
        assert!(!r.requires_manual_review);
        assert_eq!(
            r.next_steps,
            vec![
                "Apply for Medi-Cal coverage immediately",
                "Submit GA application with required documentation",
                "Apply for CalFresh benefits",
                "Join housing assistance waitlist",
            ]
        );
    }

    #[tokio::test]
    async fn moderate_income_is_not_medi_cal_eligible() {
        let handler = EligibilityHandler::new();
        let response = handler
            .call(request(Some(IncomeLevel::Moderate), vec![]), CancelToken::new())
            .await
            .unwrap();
        let AgentResponse::Eligibility(r) = response else { panic!("wrong variant") };
        assert!(!r.programs.iter().any(|p| p.program_name == "Medi-Cal"));
    }

    #[tokio::test]
    async fn pending_disability_application_forces_manual_review() {
        let handler = EligibilityHandler::new();
        let response = handler
            .call(request(Some(IncomeLevel::Low), vec!["SSDI application pending".into()]), CancelToken::new())
            .await
            .unwrap();
        let AgentResponse::Eligibility(r) = response else { panic!("wrong variant") };
        assert!(r.requires_manual_review);
        assert!(r.programs.iter().any(|p| p.program_name == "SSI/SSDI" && p.requires_manual_review));
    }
}
