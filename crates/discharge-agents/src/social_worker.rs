//! Social worker agent: assigns a department contact and schedules the
//! first follow-up call (§4.6).

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use discharge_bus::{AgentHandler, AgentName, AgentRequest, AgentResponse, BusError, CancelToken, SocialWorkerResponse};

const DEPARTMENT: &str = "Case Management Services";
const CONTACT_NAME: &str = "Maria Santos, LCSW";
const CONTACT_PHONE: &str = "(415) 555-0199";

pub struct SocialWorkerHandler;

impl SocialWorkerHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SocialWorkerHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Next business day at 10am: one day ahead, pushed past the weekend.
fn next_business_day(from: NaiveDate) -> NaiveDate {
    let mut next = from + Duration::days(1);
    if matches!(next.weekday(), Weekday::Sat | Weekday::Sun) {
        next += Duration::days(2);
    }
    next
}

#[async_trait]
impl AgentHandler for SocialWorkerHandler {
    fn name(&self) -> AgentName {
        AgentName::SocialWorker
    }

    #[tracing::instrument(skip(self, request, _cancel))]
    async fn call(&self, request: AgentRequest, _cancel: CancelToken) -> Result<AgentResponse, BusError> {
        let AgentRequest::SocialWorker(_assignment) = request else {
            return Err(BusError::Remote(AgentName::SocialWorker, "unexpected request variant".into()));
        };

        let first_contact_date = next_business_day(Utc::now().date_naive());

        Ok(AgentResponse::SocialWorker(SocialWorkerResponse {
            name: CONTACT_NAME.to_string(),
            phone: CONTACT_PHONE.to_string(),
            department: DEPARTMENT.to_string(),
            first_contact_date,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn friday_rolls_to_monday() {
        let friday = NaiveDate::from_ymd_opt(2026, 7, 31).unwrap();
        assert_eq!(friday.weekday(), Weekday::Fri);
        assert_eq!(next_business_day(friday), NaiveDate::from_ymd_opt(2026, 8, 3).unwrap());
    }

    #[test]
    fn saturday_rolls_to_tuesday() {
        // from=Saturday -> next=Sunday -> the blanket +2 lands on Tuesday, not
        // Monday. Ported as-is from the weekday()>=5 check in the source.
        let saturday = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        assert_eq!(saturday.weekday(), Weekday::Sat);
        assert_eq!(next_business_day(saturday), NaiveDate::from_ymd_opt(2026, 8, 4).unwrap());
    }

    #[test]
    fn weekday_rolls_to_the_following_day() {
        let tuesday = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();
        assert_eq!(next_business_day(tuesday), NaiveDate::from_ymd_opt(2026, 8, 5).unwrap());
    }
}
