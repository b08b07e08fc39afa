//! Runtime configuration.
//!
//! Everything comes from environment variables with defaults matching the
//! standard deployment: the server listens on port 3000 and expects the two
//! Redis instances under their service names, resolved by the container
//! network's DNS.
use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub primary_address: String,
    pub replica_address: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("GUESTBOOK_PORT", "3000"),
            primary_address: try_load("REDIS_PRIMARY_ADDR", "redis-master:6379"),
            replica_address: try_load("REDIS_REPLICA_ADDR", "redis-replica:6379"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
