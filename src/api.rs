//! HTTP API for the airline agents

mod handlers;
mod presenter;
mod types;

pub use handlers::create_router;

use crate::llm::ModelRegistry;
use crate::runtime::SharedManager;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<SharedManager>,
    pub llm_registry: Arc<ModelRegistry>,
}
