//! Snapshot building for network transmission

use serde::{Deserialize, Serialize};

use crate::ws::protocol::ServerMsg;

use super::ball::BallState;
use super::player::{Avatar, Player, PlayerId};
use super::r#match::{MatchPhase, MatchState};
use super::state::GameState;

/// Full game state sent to a newly connected player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub players: Vec<Player>,
    pub ball: BallState,
    pub phase: MatchPhase,
    #[serde(rename = "match")]
    pub match_state: Option<MatchState>,
}

/// Per-tick avatar state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarSnapshot {
    pub player_id: PlayerId,
    #[serde(flatten)]
    pub avatar: Avatar,
}

impl GameState {
    pub fn full_snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            players: self.registry.players().cloned().collect(),
            ball: self.ball.clone(),
            phase: self.phase(),
            match_state: self.match_state.clone(),
        }
    }

    pub fn avatar_snapshots(&self) -> Vec<AvatarSnapshot> {
        self.registry
            .players()
            .filter_map(|p| {
                p.avatar.as_ref().map(|avatar| AvatarSnapshot {
                    player_id: p.id,
                    avatar: avatar.clone(),
                })
            })
            .collect()
    }
}

/// Decides which ticks get a state broadcast
pub struct SnapshotBuilder {
    /// Tick counter since last snapshot
    ticks_since_snapshot: u32,
    /// Snapshot interval in ticks
    snapshot_interval: u32,
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            ticks_since_snapshot: 0,
            snapshot_interval: snapshot_interval.max(1),
        }
    }

    /// Check if it's time to send a snapshot
    pub fn should_send(&mut self) -> bool {
        self.ticks_since_snapshot += 1;
        if self.ticks_since_snapshot >= self.snapshot_interval {
            self.ticks_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Force snapshot on next check (used for important events)
    pub fn force_next(&mut self) {
        self.ticks_since_snapshot = self.snapshot_interval;
    }

    /// Build the per-tick state message
    pub fn build(&self, state: &GameState) -> ServerMsg {
        ServerMsg::Snapshot {
            tick: state.tick,
            ball: state.ball.clone(),
            avatars: state.avatar_snapshots(),
            match_state: state.match_state.clone(),
        }
    }
}
