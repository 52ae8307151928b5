use sqlx::PgPool;

use crate::config::Config;
use crate::gateway::CloudGateway;

// ---

/// Shared handler state, created once at startup and cloned per request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub gateway: CloudGateway,
}

impl AppState {
    // ---
    pub fn new(pool: PgPool, config: Config) -> anyhow::Result<Self> {
        let gateway = CloudGateway::new(&config)?;
        Ok(Self {
            pool,
            config,
            gateway,
        })
    }
}
