//! Fixed-step advancement of the game

use tracing::{debug, trace};

use super::physics::{BallStep, PhysicsSystem};
use super::state::GameState;

impl GameState {
    /// Advance the game by exactly one tick.
    ///
    /// Order: jump timers, free-ball physics, scoring pause, match clock.
    pub fn tick(&mut self) -> BallStep {
        self.tick += 1;

        for avatar in self.registry.active_avatars_mut() {
            avatar.jump.tick();
        }

        let Some(match_state) = self.match_state.as_ref() else {
            return BallStep::default();
        };

        let mut step = BallStep::default();
        if !self.ball.is_held() && !match_state.is_paused() {
            step = PhysicsSystem::step_ball(&mut self.ball);
            if step.bounce > 0.0 {
                trace!(tick = self.tick, bounce = step.bounce, "Ball bounced");
            }
            if let Some(team_index) = step.hit_basket_team {
                self.score_basket(team_index);
            }
        }

        let Some(match_state) = self.match_state.as_mut() else {
            return step;
        };

        if match_state.tick_score_timer() {
            self.ball.reset();
            debug!(tick = self.tick, "Ball respawned");
        }

        if match_state.tick_timer() {
            self.end_match();
        }

        step
    }
}
