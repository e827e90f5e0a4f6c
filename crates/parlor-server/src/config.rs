//! Configuration for the coordinator.
//!
//! For now this is intentionally simple: you can either use defaults
//! or override via a few environment variables:
//!
//! - `PARLOR_BIND_ADDR`   (default: "0.0.0.0")
//! - `PARLOR_PORT`        (default: "9040")
//! - `PARLOR_MAX_CLIENTS` (default: "1024")
//! - `PARLOR_MATCH_SIZE`  (default: "4")
//! - `PARLOR_PING_SECS`   (default: "180")
//! - `PARLOR_STALE_SECS`  (default: "300")
//!
//! The stale threshold must exceed the ping interval, otherwise a
//! healthy-but-idle session would age past the threshold between two
//! supervisor cycles and be evicted despite answering every ping.
//! `from_env` rejects such a configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Coordinator configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// IP address / interface to bind to (e.g. "0.0.0.0" or "127.0.0.1").
    pub bind_addr: String,

    /// TCP port to listen on. Port 0 asks the OS for a free port.
    pub port: u16,

    /// Maximum number of simultaneously connected sessions.
    pub max_clients: usize,

    /// Seats per match.
    pub match_size: usize,

    /// How often the supervisor broadcasts PING.
    pub ping_secs: u64,

    /// How old a session's last-seen may grow before eviction.
    pub stale_secs: u64,
}

impl Config {
    /// Construct a `Config` from environment variables, falling back
    /// to reasonable defaults.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let bind_addr = env::var("PARLOR_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = read_env_or_default("PARLOR_PORT", 9040u16)?;
        let max_clients = read_env_or_default("PARLOR_MAX_CLIENTS", 1024usize)?;
        let match_size = read_env_or_default("PARLOR_MATCH_SIZE", 4usize)?;
        let ping_secs = read_env_or_default("PARLOR_PING_SECS", 180u64)?;
        let stale_secs = read_env_or_default("PARLOR_STALE_SECS", 300u64)?;

        if stale_secs <= ping_secs {
            return Err("PARLOR_STALE_SECS must exceed PARLOR_PING_SECS".into());
        }

        Ok(Config {
            bind_addr,
            port,
            max_clients,
            match_size,
            ping_secs,
            stale_secs,
        })
    }

    /// Convenience: `addr:port` socket string.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_secs)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_secs)
    }
}

fn read_env_or_default<T>(key: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::error::Error + 'static,
{
    match env::var(key) {
        Ok(val) => Ok(val.parse::<T>()?),
        Err(_) => Ok(default),
    }
}
