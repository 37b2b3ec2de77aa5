pub mod config;
pub mod handlers;
pub mod model;

use std::sync::Arc;

use revision_service::handler::ResourceHandler;
use revision_service::store::MemoryStore;

use model::Fortune;

pub use config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub fortunes: Arc<ResourceHandler<Fortune, MemoryStore<Fortune>>>,
}
