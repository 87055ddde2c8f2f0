//! Shared application state: one `Engine` behind an `Arc`, cloned cheaply
//! into every handler via axum's `State` extractor.

use std::sync::Arc;

use discharge_workflow::Engine;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

impl AppState {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }
}
