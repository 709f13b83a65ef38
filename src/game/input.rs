//! Resolution of in-game intents: join, move/jump/catch, throw

use tracing::{debug, info};

use crate::ws::protocol::ServerMsg;

use super::constants::{CATCH_RADIUS, SHOULDER_Y, TEAM_COUNT, THROW_POWER};
use super::error::ActionError;
use super::physics::PhysicsSystem;
use super::player::PlayerId;
use super::state::GameState;
use super::AvatarInput;

impl GameState {
    /// Put a lobby player on a team and start the match if both sides are staffed
    pub fn join_team(&mut self, player_id: PlayerId, team_index: i64) -> Result<(), ActionError> {
        let player = self
            .registry
            .get(player_id)
            .ok_or(ActionError::UnknownPlayer(player_id))?;
        if player.is_active() {
            return Err(ActionError::AlreadyOnTeam(player_id));
        }

        let team_slot = usize::try_from(team_index)
            .ok()
            .filter(|&index| index < TEAM_COUNT)
            .ok_or(ActionError::UnknownTeam(team_index))?;
        let team = self
            .registry
            .team(team_slot)
            .ok_or(ActionError::UnknownTeam(team_index))?;
        if team.is_full() {
            return Err(ActionError::TeamFull);
        }

        let avatar = self
            .registry
            .assign_avatar(player_id, team_slot)
            .cloned()
            .ok_or(ActionError::UnknownPlayer(player_id))?;

        info!(player_id, team_index = team_slot, "Player joined team");
        self.broadcast(ServerMsg::JoinTeam { player_id, avatar });
        self.maybe_start_match();
        Ok(())
    }

    /// Apply one movement/orientation/jump/catch sample from a client.
    ///
    /// Orientation is taken as reported; position only while a match runs and
    /// the player is not holding the ball.
    pub fn apply_input(&mut self, player_id: PlayerId, input: &AvatarInput) -> Result<(), ActionError> {
        let running = self.is_running();
        let live = self.is_live();
        let has_ball = self.ball.is_held_by(player_id);
        let ball_free = !self.ball.is_held();

        let player = self
            .registry
            .get_mut(player_id)
            .ok_or(ActionError::UnknownPlayer(player_id))?;
        let Some(avatar) = player.avatar.as_mut() else {
            return Ok(());
        };

        if running && !has_ball {
            avatar.x = input.x;
            avatar.z = input.z;
        }

        if input.jumping && avatar.jump.try_start(has_ball) {
            debug!(player_id, with_ball = has_ball, "Jump started");
        }

        avatar.angle_x = input.angle_x;
        avatar.angle_y = input.angle_y;
        avatar.catching = ball_free && input.catching;

        if avatar.catching && live {
            self.try_catch(player_id);
        }
        Ok(())
    }

    /// Geometric catch test against the free ball
    fn try_catch(&mut self, player_id: PlayerId) -> bool {
        let Some(avatar) = self.registry.avatar(player_id) else {
            return false;
        };

        let arm = PhysicsSystem::arm_position(avatar);
        let dx = self.ball.x - arm.x;
        let dz = self.ball.z - arm.z;
        // A grounded player can scoop a low ball at any height
        let dy = if self.ball.y > SHOULDER_Y || avatar.jump.is_jumping() {
            self.ball.y - arm.y
        } else {
            0.0
        };

        if (dx * dx + dy * dy + dz * dz).sqrt() > CATCH_RADIUS {
            return false;
        }

        self.ball.player_id = Some(player_id);
        self.last_ball_player_id = Some(player_id);
        debug!(player_id, "Ball caught");
        self.broadcast(ServerMsg::CatchBall { player_id });
        true
    }

    /// Release the ball from the holder's hand along its aim
    pub fn throw_ball(&mut self, player_id: PlayerId) -> Result<(), ActionError> {
        if !self.ball.is_held_by(player_id) {
            return Ok(());
        }
        let avatar = self
            .registry
            .avatar(player_id)
            .ok_or(ActionError::UnknownPlayer(player_id))?;

        let arm = PhysicsSystem::arm_position(avatar);
        let horizontal = (1.0 + avatar.angle_x.cos()) * THROW_POWER;

        self.ball.x = arm.x;
        self.ball.y = arm.y;
        self.ball.z = arm.z;
        self.ball.vx = avatar.angle_y.cos() * horizontal;
        self.ball.vz = avatar.angle_y.sin() * horizontal;
        self.ball.vy = avatar.angle_x.sin() * THROW_POWER;
        self.ball.player_id = None;

        debug!(player_id, vx = self.ball.vx, vy = self.ball.vy, vz = self.ball.vz, "Ball thrown");
        self.broadcast(ServerMsg::ThrowBall {
            ball: self.ball.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::{
        BALL_RADIUS, JUMP_DURATION_NO_BALL, JUMP_DURATION_WITH_BALL, MAX_PLAYERS_PER_TEAM,
    };
    use crate::game::physics::PhysicsSystem;
    use crate::game::r#match::MatchPhase;
    use crate::game::state::Dispatch;

    fn input(x: f32, z: f32) -> AvatarInput {
        AvatarInput {
            x,
            z,
            angle_x: 0.0,
            angle_y: 0.0,
            jumping: false,
            catching: false,
        }
    }

    /// Two players on opposite teams with a running match
    fn running_game() -> (GameState, PlayerId, PlayerId) {
        let mut state = GameState::new(11);
        let a = state.create_player();
        let b = state.create_player();
        state.join_team(a, 0).ok();
        state.join_team(b, 1).ok();
        state.drain_outbox();
        (state, a, b)
    }

    /// Park the free ball right at `player_id`'s hand
    fn ball_at_hand(state: &mut GameState, player_id: PlayerId) {
        let arm = state
            .registry
            .avatar(player_id)
            .map(PhysicsSystem::arm_position)
            .unwrap();
        state.ball.x = arm.x;
        state.ball.y = arm.y;
        state.ball.z = arm.z;
        state.ball.player_id = None;
    }

    #[test]
    fn test_join_team_spawns_avatar_and_starts_match() {
        let mut state = GameState::new(11);
        let a = state.create_player();
        let b = state.create_player();
        state.drain_outbox();

        assert_eq!(state.join_team(a, 0), Ok(()));
        assert_eq!(state.phase(), MatchPhase::Idle);
        assert_eq!(state.join_team(b, 1), Ok(()));
        assert_eq!(state.phase(), MatchPhase::Running);

        let out = state.drain_outbox();
        assert!(matches!(out[0], Dispatch::All(ServerMsg::JoinTeam { player_id, .. }) if player_id == a));
        assert!(matches!(out[2], Dispatch::All(ServerMsg::MatchStarted { .. })));
        assert_eq!(state.registry.avatar(b).map(|av| av.team_index), Some(1));
    }

    #[test]
    fn test_join_team_twice_is_violation() {
        let (mut state, a, _) = running_game();
        let err = state.join_team(a, 1).unwrap_err();
        assert!(err.is_violation());
        assert_eq!(state.registry.avatar(a).map(|av| av.team_index), Some(0));
    }

    #[test]
    fn test_join_unknown_team_is_violation() {
        let mut state = GameState::new(11);
        let a = state.create_player();
        assert_eq!(state.join_team(a, 2), Err(ActionError::UnknownTeam(2)));
        assert_eq!(state.join_team(a, -1), Err(ActionError::UnknownTeam(-1)));
        assert!(state.registry.avatar(a).is_none());
    }

    #[test]
    fn test_join_full_team_is_soft_error() {
        let mut state = GameState::new(11);
        for _ in 0..MAX_PLAYERS_PER_TEAM {
            let id = state.create_player();
            state.join_team(id, 0).ok();
        }
        let late = state.create_player();
        state.drain_outbox();
        let roster_before = state.registry.team(0).cloned();

        let err = state.join_team(late, 0).unwrap_err();

        assert_eq!(err, ActionError::TeamFull);
        assert!(!err.is_violation());
        assert_eq!(state.registry.team(0).cloned(), roster_before);
        assert!(state.registry.avatar(late).is_none());
        assert!(state.drain_outbox().is_empty());
    }

    #[test]
    fn test_input_without_avatar_is_ignored() {
        let mut state = GameState::new(11);
        let a = state.create_player();
        assert_eq!(state.apply_input(a, &input(1.0, 1.0)), Ok(()));
        assert!(state.registry.avatar(a).is_none());
    }

    #[test]
    fn test_position_frozen_when_idle() {
        let mut state = GameState::new(11);
        let a = state.create_player();
        state.join_team(a, 0).ok();
        let mut sample = input(1.0, 2.0);
        sample.angle_y = 1.0;

        state.apply_input(a, &sample).ok();

        let avatar = state.registry.avatar(a).cloned().unwrap();
        assert_eq!(avatar.x, -5.0);
        assert_eq!(avatar.angle_y, 1.0);
    }

    #[test]
    fn test_position_applied_while_running() {
        let (mut state, a, _) = running_game();
        state.apply_input(a, &input(1.0, 2.0)).ok();
        let avatar = state.registry.avatar(a).cloned().unwrap();
        assert_eq!((avatar.x, avatar.z), (1.0, 2.0));
    }

    #[test]
    fn test_holder_position_frozen() {
        let (mut state, a, _) = running_game();
        state.ball.player_id = Some(a);
        let before = state.registry.avatar(a).map(|av| (av.x, av.z));

        state.apply_input(a, &input(3.0, 3.0)).ok();

        assert_eq!(state.registry.avatar(a).map(|av| (av.x, av.z)), before);
    }

    #[test]
    fn test_jump_profile_depends_on_possession() {
        let (mut state, a, b) = running_game();
        state.ball.player_id = Some(a);
        let mut sample = input(0.0, 0.0);
        sample.jumping = true;

        state.apply_input(a, &sample).ok();
        state.apply_input(b, &sample).ok();

        let jump_a = state.registry.avatar(a).map(|av| av.jump).unwrap();
        let jump_b = state.registry.avatar(b).map(|av| av.jump).unwrap();
        assert_eq!((jump_a.timer, jump_a.with_ball), (JUMP_DURATION_WITH_BALL, true));
        assert_eq!((jump_b.timer, jump_b.with_ball), (JUMP_DURATION_NO_BALL, false));
    }

    #[test]
    fn test_catch_within_radius() {
        let (mut state, a, _) = running_game();
        ball_at_hand(&mut state, a);
        let mut sample = input(-5.0, -3.0);
        sample.catching = true;

        state.apply_input(a, &sample).ok();

        assert!(state.ball.is_held_by(a));
        assert_eq!(state.last_ball_player_id, Some(a));
        assert!(state
            .drain_outbox()
            .contains(&Dispatch::All(ServerMsg::CatchBall { player_id: a })));
    }

    #[test]
    fn test_catch_out_of_reach() {
        let (mut state, a, _) = running_game();
        ball_at_hand(&mut state, a);
        state.ball.z += 1.0;
        let mut sample = input(-5.0, -3.0);
        sample.catching = true;

        state.apply_input(a, &sample).ok();

        assert!(!state.ball.is_held());
    }

    #[test]
    fn test_grounded_player_scoops_low_ball() {
        let (mut state, a, _) = running_game();
        ball_at_hand(&mut state, a);
        state.ball.y = BALL_RADIUS;
        let mut sample = input(-5.0, -3.0);
        sample.catching = true;

        state.apply_input(a, &sample).ok();

        assert!(state.ball.is_held_by(a));
    }

    #[test]
    fn test_grounded_player_misses_ball_overhead() {
        let (mut state, a, _) = running_game();
        ball_at_hand(&mut state, a);
        state.ball.y += 1.0;
        let mut sample = input(-5.0, -3.0);
        sample.catching = true;

        state.apply_input(a, &sample).ok();

        assert!(!state.ball.is_held());
        assert_eq!(state.last_ball_player_id, None);
    }

    #[test]
    fn test_jumping_player_misses_ball_on_floor() {
        let (mut state, a, _) = running_game();
        if let Some(avatar) = state.registry.get_mut(a).and_then(|p| p.avatar.as_mut()) {
            avatar.jump.try_start(false);
            for _ in 0..8 {
                avatar.jump.tick();
            }
        }
        ball_at_hand(&mut state, a);
        state.ball.y = BALL_RADIUS;
        let mut sample = input(-5.0, -3.0);
        sample.catching = true;

        state.apply_input(a, &sample).ok();

        assert!(!state.ball.is_held());
    }

    #[test]
    fn test_no_catch_during_score_pause() {
        let (mut state, a, _) = running_game();
        if let Some(m) = state.match_state.as_mut() {
            m.score_timer = 10;
        }
        ball_at_hand(&mut state, a);
        let mut sample = input(-5.0, -3.0);
        sample.catching = true;

        state.apply_input(a, &sample).ok();

        assert!(!state.ball.is_held());
        // the intent is still recorded
        assert_eq!(state.registry.avatar(a).map(|av| av.catching), Some(true));
    }

    #[test]
    fn test_no_catch_when_idle() {
        let mut state = GameState::new(11);
        let a = state.create_player();
        state.join_team(a, 0).ok();
        ball_at_hand(&mut state, a);
        let mut sample = input(0.0, 0.0);
        sample.catching = true;

        state.apply_input(a, &sample).ok();

        assert!(!state.ball.is_held());
    }

    #[test]
    fn test_catching_forced_off_while_ball_held() {
        let (mut state, a, b) = running_game();
        state.ball.player_id = Some(b);
        let mut sample = input(0.0, 0.0);
        sample.catching = true;

        state.apply_input(a, &sample).ok();

        assert_eq!(state.registry.avatar(a).map(|av| av.catching), Some(false));
        assert!(state.ball.is_held_by(b));
    }

    #[test]
    fn test_throw_requires_possession() {
        let (mut state, a, b) = running_game();
        state.ball.player_id = Some(b);
        let before = state.ball.clone();

        assert_eq!(state.throw_ball(a), Ok(()));

        assert_eq!(state.ball, before);
        assert!(state.drain_outbox().is_empty());
    }

    #[test]
    fn test_flat_throw_velocity() {
        let (mut state, a, _) = running_game();
        state.ball.player_id = Some(a);
        let arm = state.registry.avatar(a).map(PhysicsSystem::arm_position).unwrap();

        state.throw_ball(a).ok();

        assert!(!state.ball.is_held());
        assert!((state.ball.vx - 2.0 * THROW_POWER).abs() < 1e-6);
        assert!(state.ball.vz.abs() < 1e-6);
        assert_eq!(state.ball.vy, 0.0);
        assert_eq!((state.ball.x, state.ball.y, state.ball.z), (arm.x, arm.y, arm.z));
        assert_eq!(
            state.drain_outbox(),
            vec![Dispatch::All(ServerMsg::ThrowBall {
                ball: state.ball.clone()
            })]
        );
    }

    #[test]
    fn test_lob_throw_splits_power() {
        let (mut state, _, b) = running_game();
        state.ball.player_id = Some(b);
        let mut sample = input(5.0, 0.0);
        sample.angle_x = std::f32::consts::FRAC_PI_2;
        sample.angle_y = std::f32::consts::PI;
        state.apply_input(b, &sample).ok();

        state.throw_ball(b).ok();

        assert!((state.ball.vy - THROW_POWER).abs() < 1e-6);
        assert!((state.ball.vx + THROW_POWER).abs() < 1e-5);
    }
}
