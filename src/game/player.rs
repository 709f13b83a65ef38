//! Player, avatar and team records

use serde::{Deserialize, Serialize};

use super::constants::{
    JUMP_DURATION_NO_BALL, JUMP_DURATION_WITH_BALL, MAX_PLAYERS_PER_TEAM, SPAWN_X,
    SPAWN_Z_SPACING,
};

/// Server-assigned, monotonically increasing connection identity
pub type PlayerId = u64;

/// Jump arc in progress (`timer == 0` means grounded)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JumpState {
    pub timer: u32,
    pub with_ball: bool,
}

impl JumpState {
    pub fn is_jumping(&self) -> bool {
        self.timer > 0
    }

    /// Start an arc unless one is already running. Returns whether it started.
    pub fn try_start(&mut self, with_ball: bool) -> bool {
        if self.is_jumping() {
            return false;
        }
        self.timer = if with_ball {
            JUMP_DURATION_WITH_BALL
        } else {
            JUMP_DURATION_NO_BALL
        };
        self.with_ball = with_ball;
        true
    }

    pub fn tick(&mut self) {
        self.timer = self.timer.saturating_sub(1);
    }
}

/// In-match embodiment of a player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    pub team_index: usize,
    /// Mirror of the team score
    pub score: u32,
    pub x: f32,
    pub z: f32,
    pub jump: JumpState,
    /// Pitch in radians
    pub angle_x: f32,
    /// Facing in radians
    pub angle_y: f32,
    pub catching: bool,
}

impl Avatar {
    /// Spawn in the slot for the `roster_len`-th member of `team_index`.
    /// Teams face each other from opposite ends of the court.
    pub fn spawn(team_index: usize, roster_len: usize) -> Self {
        let (x, angle_y) = if team_index == 0 {
            (-SPAWN_X, 0.0)
        } else {
            (SPAWN_X, std::f32::consts::PI)
        };
        Self {
            team_index,
            score: 0,
            x,
            z: (roster_len as f32 - 1.0) * SPAWN_Z_SPACING,
            jump: JumpState::default(),
            angle_x: 0.0,
            angle_y,
            catching: false,
        }
    }
}

/// Public player record (what every client sees)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// `None` while in the lobby
    pub avatar: Option<Avatar>,
}

impl Player {
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            avatar: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.avatar.is_some()
    }
}

/// A team roster in join order. Holds ids only; the registry owns the players.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Team {
    pub index: usize,
    pub players: Vec<PlayerId>,
}

impl Team {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            players: Vec::with_capacity(MAX_PLAYERS_PER_TEAM),
        }
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS_PER_TEAM
    }

    pub fn remove(&mut self, player_id: PlayerId) -> bool {
        let before = self.players.len();
        self.players.retain(|&id| id != player_id);
        self.players.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jump_profile_selection() {
        let mut jump = JumpState::default();
        assert!(jump.try_start(true));
        assert_eq!(jump.timer, JUMP_DURATION_WITH_BALL);
        assert!(jump.with_ball);

        let mut jump = JumpState::default();
        assert!(jump.try_start(false));
        assert_eq!(jump.timer, JUMP_DURATION_NO_BALL);
        assert!(!jump.with_ball);
    }

    #[test]
    fn test_jump_cannot_restart_mid_arc() {
        let mut jump = JumpState::default();
        jump.try_start(false);
        jump.tick();
        assert!(!jump.try_start(true));
        assert_eq!(jump.timer, JUMP_DURATION_NO_BALL - 1);
        assert!(!jump.with_ball);
    }

    #[test]
    fn test_jump_timer_never_negative() {
        let mut jump = JumpState::default();
        jump.try_start(true);
        for _ in 0..(JUMP_DURATION_WITH_BALL + 10) {
            let before = jump.timer;
            jump.tick();
            assert!(jump.timer <= before);
        }
        assert_eq!(jump.timer, 0);
    }

    #[test]
    fn test_spawn_slots_face_each_other() {
        let a = Avatar::spawn(0, 0);
        let b = Avatar::spawn(1, 0);
        assert_eq!(a.x, -SPAWN_X);
        assert_eq!(b.x, SPAWN_X);
        assert_eq!(a.angle_y, 0.0);
        assert_eq!(b.angle_y, std::f32::consts::PI);

        assert_eq!(Avatar::spawn(0, 0).z, -SPAWN_Z_SPACING);
        assert_eq!(Avatar::spawn(0, 1).z, 0.0);
        assert_eq!(Avatar::spawn(0, 2).z, SPAWN_Z_SPACING);
    }

    #[test]
    fn test_team_capacity_and_removal() {
        let mut team = Team::new(0);
        for id in 0..MAX_PLAYERS_PER_TEAM as PlayerId {
            assert!(!team.is_full());
            team.players.push(id);
        }
        assert!(team.is_full());
        assert!(team.remove(1));
        assert!(!team.remove(1));
        assert_eq!(team.players, vec![0, 2]);
    }
}
