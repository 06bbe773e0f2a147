// =============================================================================
// Application State
// =============================================================================
//
// Owned by `main` and handed to the HTTP router behind an `Arc`.  Holds the
// loaded configuration and the market-data client; nothing in it changes after
// startup, so no locking is needed.
// =============================================================================

use anyhow::Result;

use crate::bybit::BybitClient;
use crate::runtime_config::RuntimeConfig;

pub struct AppState {
    pub config: RuntimeConfig,
    pub client: BybitClient,
}

impl AppState {
    /// Build the state, creating a client against `config.bybit_base_url`.
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        let client = BybitClient::new(config.bybit_base_url.clone())?;
        Ok(Self { config, client })
    }
}
