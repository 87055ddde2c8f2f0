//! Foundation types shared across the discharge-coordination workspace.
//!
//! Everything here is a plain data type, an error taxonomy, or process
//! configuration — no I/O. Other crates build their behavior on top of
//! these shapes.

pub mod case;
pub mod config;
pub mod error;
pub mod listing;
pub mod timeline;

pub use case::{Case, ClinicalInfo, ContactInfo, DischargeInfo, FollowUp, Medication, WorkflowStatus, WorkflowStep};
pub use config::Config;
pub use error::DischargeError;
pub use listing::{
    BenefitProgram, CacheCategory, CacheMetadata, CommunityResource, ResourceCategory, ScrapeLog,
    ScrapeStatus, ShelterListing, TransportListing,
};
pub use timeline::{EventStatus, TimelineEvent};
