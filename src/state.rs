use crate::service::WasteService;

/// Shared state handed to every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    service: WasteService,
    default_window_minutes: i64,
}

impl AppState {
    pub fn new(service: WasteService, default_window_minutes: i64) -> Self {
        Self {
            service,
            default_window_minutes,
        }
    }

    pub fn service(&self) -> &WasteService {
        &self.service
    }

    pub fn default_window_minutes(&self) -> i64 {
        self.default_window_minutes
    }
}
