//! The input to `Engine::coordinate` — a filled discharge intake record.

use discharge_bus::IncomeLevel;
use discharge_core::{ClinicalInfo, ContactInfo, DischargeInfo, FollowUp};

#[derive(Debug, Clone)]
pub struct IntakeRecord {
    pub case_id: String,
    pub patient_name: String,
    pub patient_dob: chrono::NaiveDate,
    pub contact: ContactInfo,
    pub discharge: DischargeInfo,
    pub clinical: ClinicalInfo,
    pub follow_up: FollowUp,
    pub income_level: Option<IncomeLevel>,
    pub current_benefits: Vec<String>,
}
