//! Axum router for the discharge-coordination HTTP facade (§6).

pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/discharge", post(routes::post_discharge))
        .route("/workflows", get(routes::list_workflows))
        .route("/workflows/:case_id", get(routes::get_workflow))
        .route("/shelters", get(routes::get_shelters))
        .route("/shelters/:name/availability", post(routes::update_shelter_availability))
        .route("/transport", get(routes::get_transport))
        .route("/benefits", get(routes::get_benefits))
        .route("/resources", get(routes::get_resources))
        .route("/vapi/webhook", post(routes::vapi_webhook))
        .route("/workflow-events", post(routes::post_workflow_event))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
