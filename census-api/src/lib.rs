use census::CensusManager;

pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod models;

/// Shared state handed to every handler through `web::Data`.
pub struct AppState {
    pub manager: CensusManager,
}

impl AppState {
    pub fn new(manager: CensusManager) -> Self {
        Self { manager }
    }
}
