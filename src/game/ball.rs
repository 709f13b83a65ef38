//! The shared ball and the court it lives in

use serde::{Deserialize, Serialize};

use super::constants::{
    BALL_INITIAL_Y, BALL_RADIUS, BALL_RESPAWN_VY, BASKET_HEIGHT, BASKET_WIDTH, BASKET_Y,
    COURT_BORDER, COURT_DEPTH, COURT_WIDTH,
};
use super::player::PlayerId;

/// Axis-aligned limits for the ball centre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CourtBounds {
    pub x_min: f32,
    pub x_max: f32,
    pub z_min: f32,
    pub z_max: f32,
}

impl CourtBounds {
    /// Ball-centre limits: court plus border, shrunk by the ball radius
    pub fn for_ball() -> Self {
        let half_x = COURT_WIDTH / 2.0 + COURT_BORDER - BALL_RADIUS;
        let half_z = COURT_DEPTH / 2.0 + COURT_BORDER - BALL_RADIUS;
        Self {
            x_min: -half_x,
            x_max: half_x,
            z_min: -half_z,
            z_max: half_z,
        }
    }
}

/// Rectangular basket opening on an end wall
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasketOpening {
    pub y_min: f32,
    pub y_max: f32,
    pub z_min: f32,
    pub z_max: f32,
}

impl BasketOpening {
    pub fn standard() -> Self {
        Self {
            y_min: BASKET_Y - BASKET_HEIGHT / 2.0,
            y_max: BASKET_Y + BASKET_HEIGHT / 2.0,
            z_min: -BASKET_WIDTH / 2.0,
            z_max: BASKET_WIDTH / 2.0,
        }
    }

    /// Strictly inside the opening (touching the rim does not count)
    pub fn contains(&self, y: f32, z: f32) -> bool {
        y > self.y_min && y < self.y_max && z > self.z_min && z < self.z_max
    }
}

/// Authoritative ball state
///
/// Position and velocity are only meaningful while `player_id` is `None`;
/// a held ball follows its holder's arm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub vx: f32,
    pub vy: f32,
    pub vz: f32,
    pub player_id: Option<PlayerId>,
}

impl BallState {
    /// A freshly respawned ball at centre court
    pub fn new() -> Self {
        let mut ball = Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            vx: 0.0,
            vy: 0.0,
            vz: 0.0,
            player_id: None,
        };
        ball.reset();
        ball
    }

    /// Re-centre with a small upward pop and clear the holder
    pub fn reset(&mut self) {
        self.x = 0.0;
        self.z = 0.0;
        self.y = BALL_INITIAL_Y;
        self.vx = 0.0;
        self.vz = 0.0;
        self.vy = BALL_RESPAWN_VY;
        self.player_id = None;
    }

    /// Lying on the floor with no vertical motion
    pub fn is_resting(&self) -> bool {
        self.y == BALL_RADIUS && self.vy == 0.0
    }

    pub fn is_held(&self) -> bool {
        self.player_id.is_some()
    }

    pub fn is_held_by(&self, player_id: PlayerId) -> bool {
        self.player_id == Some(player_id)
    }
}

impl Default for BallState {
    fn default() -> Self {
        Self::new()
    }
}
