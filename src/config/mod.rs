//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;

use crate::util::rate_limit::INPUT_RATE_LIMIT;
use crate::util::time::{SIMULATION_TPS, SNAPSHOT_TPS};

/// Highest simulation rate accepted from the environment
const MAX_TICK_RATE: u32 = 120;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed client origins for CORS (`*` = any)
    pub client_origin: String,

    /// Simulation ticks per second
    pub tick_rate: u32,
    /// State broadcasts per second
    pub snapshot_rate: u32,
    /// Inbound messages per second per connection
    pub input_rate_limit: u32,
    /// Seed for the game RNG; random when unset
    pub game_seed: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        };

        let tick_rate = parse_var("TICK_RATE", SIMULATION_TPS)?;
        if !(1..=MAX_TICK_RATE).contains(&tick_rate) {
            return Err(ConfigError::OutOfRange("TICK_RATE"));
        }
        let snapshot_rate = parse_var("SNAPSHOT_RATE", SNAPSHOT_TPS.min(tick_rate))?;
        if !(1..=tick_rate).contains(&snapshot_rate) {
            return Err(ConfigError::OutOfRange("SNAPSHOT_RATE"));
        }

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            client_origin: env::var("CLIENT_ORIGIN").unwrap_or_else(|_| "*".to_string()),

            tick_rate,
            snapshot_rate,
            input_rate_limit: parse_var("INPUT_RATE_LIMIT", INPUT_RATE_LIMIT)?,
            game_seed: match env::var("GAME_SEED") {
                Ok(seed) => Some(seed.parse().map_err(|_| ConfigError::Invalid("GAME_SEED"))?),
                Err(_) => None,
            },
        })
    }
}

/// Parse an optional numeric variable, defaulting when unset
fn parse_var(name: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Environment variable out of range: {0}")]
    OutOfRange(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}
