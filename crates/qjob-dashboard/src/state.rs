//! Application state for the dashboard server.

use qjob_core::{QjobConfig, Services, Session};
use tokio::sync::RwLock;

/// Shared application state.
///
/// The dashboard is a single-operator panel, so it owns exactly one
/// [`Session`]. Credentials are never stored here; they arrive with each
/// request that needs them.
pub struct AppState {
    pub config: QjobConfig,
    pub services: Services,
    pub session: RwLock<Session>,
}

impl AppState {
    /// State with the clients compiled into this build.
    pub fn from_config(config: QjobConfig) -> Self {
        let services = Services::from_config(&config);
        Self::with_services(config, services)
    }

    /// State with explicitly supplied clients.
    pub fn with_services(config: QjobConfig, services: Services) -> Self {
        let session = services.new_session();
        Self {
            config,
            services,
            session: RwLock::new(session),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(QjobConfig::default())
    }
}
