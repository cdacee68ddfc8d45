//! Application state for the fare engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::{ConfigLoader, RateTable};

/// Shared application state.
///
/// Holds the loaded rate table. Handlers only read it, so no locking is
/// needed.
#[derive(Clone)]
pub struct AppState {
    /// The loaded tariff configuration.
    config: Arc<ConfigLoader>,
}

impl AppState {
    /// Creates a new application state with the given configuration loader.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the rate table requests are priced with.
    pub fn rates(&self) -> &RateTable {
        self.config.rates()
    }
}
