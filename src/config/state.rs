// Application state module
// Immutable state shared by every connection

use super::types::Config;
use crate::handler::pages::PageStore;

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: PageStore,
}

impl AppState {
    /// Build the shared state, wiring the page store to the configured
    /// assets directory
    pub fn new(config: Config) -> Self {
        let store = PageStore::new(&config.pages.assets_dir);
        Self { config, store }
    }
}
