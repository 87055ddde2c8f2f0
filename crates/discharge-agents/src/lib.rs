//! Stateless agent handlers invoked by the coordinator over the agent bus,
//! plus the analytics notification sink (§4.6).

pub mod analytics;
pub mod eligibility;
pub mod pharmacy;
pub mod resource;
pub mod routing;
pub mod shelter;
pub mod social_worker;
pub mod transport;

pub use analytics::{Alert, AnalyticsRecord, AnalyticsSink};
pub use eligibility::EligibilityHandler;
pub use pharmacy::PharmacyHandler;
pub use resource::ResourceHandler;
pub use routing::{Route, RoutingClient};
pub use shelter::ShelterHandler;
pub use social_worker::SocialWorkerHandler;
pub use transport::TransportHandler;
