//! Shared application state for axum handlers.

use std::sync::Arc;

use shutterhub_app::event_bus::EventBus;
use shutterhub_domain::directory::DeviceDirectory;
use shutterhub_domain::schedule::Schedule;

/// State injected into every handler.
///
/// Everything here is read-only after startup (the bus registry has
/// interior mutability of its own), so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub bus: EventBus,
    pub directory: Arc<DeviceDirectory>,
    pub schedules: Arc<Vec<Schedule>>,
}

impl AppState {
    /// Bundle the wired collaborators into handler state.
    #[must_use]
    pub fn new(bus: EventBus, directory: Arc<DeviceDirectory>, schedules: Vec<Schedule>) -> Self {
        Self {
            bus,
            directory,
            schedules: Arc::new(schedules),
        }
    }
}
