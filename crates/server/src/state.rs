use std::sync::Arc;

use sibyl_core::config::SibylCfg;
use sibyl_core::identity::IdentityProvider;
use sibyl_core::orchestrator::Orchestrator;

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub identity: Arc<dyn IdentityProvider>,
    pub cfg: Arc<SibylCfg>,
}
