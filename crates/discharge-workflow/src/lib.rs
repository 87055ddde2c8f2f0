//! The nine-step discharge-coordination sequence: intake in, an `Outcome`
//! out, with a full timeline regardless of how far the case got.

pub mod engine;
pub mod intake;
pub mod outcome;

pub use engine::Engine;
pub use intake::IntakeRecord;
pub use outcome::{
    BenefitsSummary, CaseManagerAssignment, MedicationPlan, Outcome, OutcomeStatus, ShelterSummary, TransportSummary,
};
