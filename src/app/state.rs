//! Application state shared across routes

use std::sync::Arc;

use rand::Rng;
use tracing::info;

use crate::config::Config;
use crate::game::{GameHandle, GameServer};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub game: GameHandle,
}

impl AppState {
    /// Build the state and the game actor; the caller spawns the returned server
    pub fn new(config: Config) -> (Self, GameServer) {
        let config = Arc::new(config);

        let seed = config
            .game_seed
            .unwrap_or_else(|| rand::thread_rng().gen());
        info!(seed, "Game RNG seeded");

        let (server, game) = GameServer::new(seed, config.tick_rate, config.snapshot_rate);

        (Self { config, game }, server)
    }
}
