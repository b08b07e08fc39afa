//! Redis access.
//!
//! The store holds plain lists of strings, one per key. Both backends are
//! reached through a [`ConnectionManager`], which multiplexes a single
//! connection behind a cheaply clonable handle and reconnects on its own
//! after transient drops. Handlers clone the manager per request.
//!
//! Startup is the only place with retry logic: each backend gets a bounded
//! number of connection attempts at a fixed spacing, and a `PING` must
//! round-trip before the manager counts as live. In-request operations fail
//! immediately and surface as [`AppError::StoreUnavailable`].
use std::{future::Future, time::Duration};

use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use tracing::{info, warn};

use crate::error::{AppError, ConnectError};

pub const MAX_CONNECT_ATTEMPTS: u32 = 5;
pub const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Runs `op` up to `attempts` times, sleeping `delay` between failures.
/// No backoff, no jitter. Returns the last error once attempts run out.
pub async fn retry_fixed<T, E, F, Fut>(attempts: u32, delay: Duration, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut last_err = None;

    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                warn!("Attempt {attempt}/{attempts} failed: {err}");
                last_err = Some(err);

                if attempt < attempts {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    Err(last_err.expect("retry_fixed called with zero attempts"))
}

/// Establishes a verified connection to the Redis instance at `address`
/// (host:port), retrying on a fixed schedule. Fatal for the caller if it
/// fails: the server never starts with a missing backend.
pub async fn connect(address: &str, max_attempts: u32) -> Result<ConnectionManager, ConnectError> {
    info!("Connecting to redis at {address}");
    let url = format!("redis://{address}");

    retry_fixed(max_attempts, CONNECT_RETRY_DELAY, || async {
        // The manager has its own reconnect loop; keep it out of the way so
        // this retry schedule is the only one in effect.
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(1)
            .set_connection_timeout(Duration::from_millis(500));

        let client = Client::open(url.as_str())?;
        let mut manager = client.get_connection_manager_with_config(config).await?;

        redis::cmd("PING")
            .query_async::<String>(&mut manager)
            .await?;

        Ok(manager)
    })
    .await
    .map_err(|source| ConnectError {
        address: address.to_string(),
        attempts: max_attempts,
        source,
    })
}

/// All elements of the list under `key`, in insertion order. An absent key
/// and an empty list both come back as `[]`.
pub async fn list_get_all(
    mut conn: ConnectionManager,
    key: &str,
) -> Result<Vec<String>, AppError> {
    Ok(conn.lrange(key, 0, -1).await?)
}

/// Appends `value` to the tail of the list under `key`, creating the list
/// if needed.
pub async fn list_append(
    mut conn: ConnectionManager,
    key: &str,
    value: &str,
) -> Result<(), AppError> {
    conn.rpush::<_, _, ()>(key, value).await?;

    Ok(())
}

/// Raw `INFO` dump from the backend, unparsed.
pub async fn raw_info(mut conn: ConnectionManager) -> Result<String, AppError> {
    Ok(redis::cmd("INFO").query_async::<String>(&mut conn).await?)
}
