//! Gameplay tuning constants
//!
//! Distances are in court units (roughly metres), velocities in units per tick.
//! Everything here is shared with clients so both sides predict identically.

/// Players allowed on a single team
pub const MAX_PLAYERS_PER_TEAM: usize = 3;

/// Number of teams on the court
pub const TEAM_COUNT: usize = 2;

/// Reference simulation rate; tick-denominated durations below assume it
pub const REFERENCE_TPS: u32 = 20;

/// Match length (5 minutes at the reference rate)
pub const MATCH_DURATION_TICKS: u32 = REFERENCE_TPS * 60 * 5;

/// Scoring pause before the ball respawns (3 seconds)
pub const RESET_BALL_DURATION_TICKS: u32 = 60;

/// Playable court (centred on the origin)
pub const COURT_WIDTH: f32 = 12.0;
pub const COURT_DEPTH: f32 = 8.0;
pub const COURT_BORDER: f32 = 1.0;

/// Avatar arm geometry
pub const SHOULDER_Y: f32 = 0.9;
pub const ARM_LENGTH: f32 = 0.6;

/// Jump profiles
pub const JUMP_DURATION_NO_BALL: u32 = 25;
pub const JUMP_BOOST_NO_BALL: f32 = 0.5;
pub const JUMP_DURATION_WITH_BALL: u32 = 20;
pub const JUMP_BOOST_WITH_BALL: f32 = 0.4;
pub const JUMP_GRAVITY: f32 = 0.05;

/// Basket opening, centred on z = 0 at each end wall
pub const BASKET_Y: f32 = 3.75;
pub const BASKET_WIDTH: f32 = 3.0;
pub const BASKET_HEIGHT: f32 = 1.5;

/// Ball physics
pub const BALL_INITIAL_Y: f32 = 2.0;
pub const BALL_RESPAWN_VY: f32 = 0.3;
pub const BALL_RADIUS: f32 = 0.3;
pub const CATCH_RADIUS: f32 = 0.5;
pub const BALL_DRAG: f32 = 0.98;
pub const BALL_BOUNCE: f32 = 0.6;
pub const BALL_GRAVITY: f32 = 0.04;
/// Downward speed under which a floor contact comes to rest instead of bouncing
pub const BALL_REST_THRESHOLD: f32 = 0.2;

/// Throw speed scale
pub const THROW_POWER: f32 = 0.3;

/// Spawn slots
pub const SPAWN_X: f32 = 5.0;
pub const SPAWN_Z_SPACING: f32 = 3.0;

/// Text limits (in characters)
pub const NAME_MAX_LEN: usize = 20;
pub const CHAT_MAX_LEN: usize = 300;
