use std::sync::Arc;

use redis::aio::ConnectionManager;

use super::{
    config::Config,
    database::{MAX_CONNECT_ATTEMPTS, connect},
    error::ConnectError,
};

/// Process-wide state, built exactly once before the listener binds.
/// Handlers only ever read it; the managers handle their own locking.
pub struct AppState {
    pub config: Config,
    pub primary: ConnectionManager,
    pub replica: ConnectionManager,
}

impl AppState {
    pub async fn new() -> Result<Arc<Self>, ConnectError> {
        let config = Config::load();

        let primary = connect(&config.primary_address, MAX_CONNECT_ATTEMPTS).await?;
        let replica = connect(&config.replica_address, MAX_CONNECT_ATTEMPTS).await?;

        Ok(Arc::new(Self {
            config,
            primary,
            replica,
        }))
    }
}
