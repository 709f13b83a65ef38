//! Game simulation modules

pub mod ball;
pub mod constants;
pub mod error;
pub mod input;
pub mod r#match;
pub mod physics;
pub mod player;
pub mod registry;
pub mod server;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use server::{Connection, GameHandle, GameServer};

use serde::{Deserialize, Serialize};

/// One input sample from a client (positions in court units, angles in radians)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AvatarInput {
    pub x: f32,
    pub z: f32,
    pub angle_x: f32,
    pub angle_y: f32,
    pub jumping: bool,
    pub catching: bool,
}
