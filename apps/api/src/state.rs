use std::sync::Arc;

use crate::config::Config;
use crate::optimization::service::Optimizer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the result cache, dispatch queue and throttle for the process.
    pub optimizer: Arc<Optimizer>,
    pub config: Config,
}
