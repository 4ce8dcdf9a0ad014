use crate::config::Config;
use crate::generation::Orchestrator;
use crate::interview::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Every structured generation goes through this one orchestrator.
    pub orchestrator: Orchestrator,
    pub sessions: SessionStore,
    pub config: Config,
}
