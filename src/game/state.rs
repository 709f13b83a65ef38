//! The game aggregate owned by the game actor

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::ws::protocol::ServerMsg;

use super::ball::BallState;
use super::player::PlayerId;
use super::r#match::{MatchPhase, MatchState};
use super::registry::PlayerRegistry;

/// Who an outbound message goes to
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Every connected player
    All(ServerMsg),
    /// Every connected player except one
    AllExcept(PlayerId, ServerMsg),
    /// A single player
    To(PlayerId, ServerMsg),
}

/// Everything the simulation knows about the one running game.
///
/// Handlers never do I/O; they queue `Dispatch` records which the owner
/// drains after each command or tick.
pub struct GameState {
    pub tick: u64,
    pub registry: PlayerRegistry,
    pub ball: BallState,
    /// Last player to have caught the ball, kept after release for scoring credit
    pub last_ball_player_id: Option<PlayerId>,
    pub match_state: Option<MatchState>,
    pub rng: ChaCha8Rng,
    outbox: Vec<Dispatch>,
}

impl GameState {
    pub fn new(seed: u64) -> Self {
        Self {
            tick: 0,
            registry: PlayerRegistry::new(),
            ball: BallState::new(),
            last_ball_player_id: None,
            match_state: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
            outbox: Vec::new(),
        }
    }

    pub fn phase(&self) -> MatchPhase {
        if self.match_state.is_some() {
            MatchPhase::Running
        } else {
            MatchPhase::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.match_state.is_some()
    }

    /// Running and not in a post-score pause
    pub fn is_live(&self) -> bool {
        self.match_state.as_ref().is_some_and(|m| !m.is_paused())
    }

    pub fn broadcast(&mut self, msg: ServerMsg) {
        self.outbox.push(Dispatch::All(msg));
    }

    pub fn broadcast_except(&mut self, player_id: PlayerId, msg: ServerMsg) {
        self.outbox.push(Dispatch::AllExcept(player_id, msg));
    }

    pub fn send_to(&mut self, player_id: PlayerId, msg: ServerMsg) {
        self.outbox.push(Dispatch::To(player_id, msg));
    }

    pub fn drain_outbox(&mut self) -> Vec<Dispatch> {
        std::mem::take(&mut self.outbox)
    }

    pub(crate) fn guest_name(&mut self) -> String {
        format!("Guest{}", self.rng.gen_range(1000..10000))
    }
}
