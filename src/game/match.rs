//! Match state machine: Idle -> Running -> Idle

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ws::protocol::ServerMsg;

use super::constants::{MATCH_DURATION_TICKS, RESET_BALL_DURATION_TICKS, TEAM_COUNT};
use super::state::GameState;

/// Match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    /// No match; players may wait in the lobby or on a team
    Idle,
    /// Timer counting down, ball live
    Running,
}

/// A running match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    /// Ticks left in the match
    pub timer: u32,
    /// Ticks left in the post-score pause (0 = not paused)
    pub score_timer: u32,
    pub scores: [u32; TEAM_COUNT],
}

impl MatchState {
    pub fn new() -> Self {
        Self {
            timer: MATCH_DURATION_TICKS,
            score_timer: 0,
            scores: [0; TEAM_COUNT],
        }
    }

    pub fn is_paused(&self) -> bool {
        self.score_timer > 0
    }

    /// Credit a basket and open the scoring pause. Returns the new team score.
    pub fn credit(&mut self, team_index: usize) -> u32 {
        self.scores[team_index] += 1;
        self.score_timer = RESET_BALL_DURATION_TICKS;
        self.scores[team_index]
    }

    /// Count the pause down. Returns true on the tick it ends.
    pub fn tick_score_timer(&mut self) -> bool {
        if self.score_timer == 0 {
            return false;
        }
        self.score_timer -= 1;
        self.score_timer == 0
    }

    /// Count the match clock down. Returns true once time is up.
    pub fn tick_timer(&mut self) -> bool {
        self.timer = self.timer.saturating_sub(1);
        self.timer == 0
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Start a match once both teams field at least one player
    pub fn maybe_start_match(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        let counts = self.registry.team_counts();
        if counts.iter().all(|&n| n > 0) {
            self.start_match();
            true
        } else {
            false
        }
    }

    fn start_match(&mut self) {
        let match_state = MatchState::new();
        self.ball.reset();
        self.last_ball_player_id = None;
        for avatar in self.registry.active_avatars_mut() {
            avatar.score = 0;
        }

        info!(
            tick = self.tick,
            players = self.registry.active_count(),
            "Match started"
        );

        self.broadcast(ServerMsg::MatchStarted {
            match_state: match_state.clone(),
            ball: self.ball.clone(),
        });
        self.match_state = Some(match_state);
    }

    /// End a running match. Avatars stay on their teams.
    pub fn end_match(&mut self) {
        let Some(match_state) = self.match_state.take() else {
            return;
        };

        info!(
            tick = self.tick,
            team0 = match_state.scores[0],
            team1 = match_state.scores[1],
            "Match ended"
        );

        self.broadcast(ServerMsg::MatchEnded {
            scores: match_state.scores,
        });
    }

    /// Credit `team_index` for a basket and mirror the score onto its avatars
    pub fn score_basket(&mut self, team_index: usize) {
        let Some(match_state) = self.match_state.as_mut() else {
            return;
        };
        let team_score = match_state.credit(team_index);
        let scores = match_state.scores;

        for avatar in self
            .registry
            .active_avatars_mut()
            .filter(|avatar| avatar.team_index == team_index)
        {
            avatar.score = team_score;
        }

        info!(
            team_index,
            scorer_id = ?self.last_ball_player_id,
            team_score,
            "Basket scored"
        );

        self.broadcast(ServerMsg::Score {
            team_index,
            scorer_id: self.last_ball_player_id,
            scores,
        });
    }
}
