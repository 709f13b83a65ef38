//! Avatar kinematics and ball integration

use serde::Serialize;

use super::ball::{BallState, BasketOpening, CourtBounds};
use super::constants::{
    ARM_LENGTH, BALL_BOUNCE, BALL_DRAG, BALL_GRAVITY, BALL_RADIUS, BALL_REST_THRESHOLD,
    JUMP_BOOST_NO_BALL, JUMP_BOOST_WITH_BALL, JUMP_DURATION_NO_BALL, JUMP_DURATION_WITH_BALL,
    JUMP_GRAVITY, SHOULDER_Y,
};
use super::player::{Avatar, JumpState};

/// A point in court space
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Outcome of one ball step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BallStep {
    /// Speed of the last wall/floor contact this tick (0 if none)
    pub bounce: f32,
    /// Team credited when the ball went through a basket opening
    pub hit_basket_team: Option<usize>,
}

/// Stateless physics helpers shared by the tick loop and input resolution
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// World position of the avatar's throwing hand
    pub fn arm_position(avatar: &Avatar) -> Point3 {
        let reach = avatar.angle_x.cos() * ARM_LENGTH;
        Point3 {
            x: avatar.x + avatar.angle_y.cos() * reach,
            y: SHOULDER_Y + Self::jump_height(&avatar.jump) + avatar.angle_x.sin() * ARM_LENGTH,
            z: avatar.z + avatar.angle_y.sin() * reach,
        }
    }

    /// Vertical offset of an avatar along its jump arc
    pub fn jump_height(jump: &JumpState) -> f32 {
        if jump.timer == 0 {
            return 0.0;
        }

        let (duration, boost) = if jump.with_ball {
            (JUMP_DURATION_WITH_BALL, JUMP_BOOST_WITH_BALL)
        } else {
            (JUMP_DURATION_NO_BALL, JUMP_BOOST_NO_BALL)
        };
        let n = duration.saturating_sub(jump.timer) as f32;
        (boost * n - JUMP_GRAVITY * (n - 1.0) * n / 2.0).max(0.0)
    }

    /// Advance a free ball by one tick: walls, basket detection, drag, gravity, floor.
    ///
    /// Horizontal axes are resolved before drag, drag before the vertical axis.
    /// When several contacts happen in one tick the last one sets `bounce`.
    pub fn step_ball(ball: &mut BallState) -> BallStep {
        let bounds = CourtBounds::for_ball();
        let basket = BasketOpening::standard();
        let mut step = BallStep::default();

        ball.x += ball.vx;
        if ball.x < bounds.x_min {
            if basket.contains(ball.y, ball.z) {
                step.hit_basket_team = Some(1);
            }
            step.bounce = ball.vx.abs();
            ball.x = reflect(bounds.x_min, ball.x, BALL_BOUNCE);
            ball.vx = -ball.vx * BALL_BOUNCE;
        } else if ball.x > bounds.x_max {
            if basket.contains(ball.y, ball.z) {
                step.hit_basket_team = Some(0);
            }
            step.bounce = ball.vx.abs();
            ball.x = reflect(bounds.x_max, ball.x, BALL_BOUNCE);
            ball.vx = -ball.vx * BALL_BOUNCE;
        }

        ball.z += ball.vz;
        if ball.z < bounds.z_min {
            step.bounce = ball.vz.abs();
            ball.z = reflect(bounds.z_min, ball.z, BALL_BOUNCE);
            ball.vz = -ball.vz * BALL_BOUNCE;
        } else if ball.z > bounds.z_max {
            step.bounce = ball.vz.abs();
            ball.z = reflect(bounds.z_max, ball.z, BALL_BOUNCE);
            ball.vz = -ball.vz * BALL_BOUNCE;
        }

        ball.vx *= BALL_DRAG;
        ball.vz *= BALL_DRAG;

        if ball.is_resting() {
            return step;
        }

        ball.y += ball.vy;
        ball.vy -= BALL_GRAVITY;

        if ball.y < BALL_RADIUS {
            step.bounce = ball.vy.abs();
            if ball.vy > -BALL_REST_THRESHOLD {
                ball.y = BALL_RADIUS;
                ball.vy = 0.0;
            } else {
                ball.y = reflect(BALL_RADIUS, ball.y, BALL_BOUNCE * BALL_BOUNCE);
                ball.vy = -ball.vy * BALL_BOUNCE;
            }
        }

        step
    }
}

/// Mirror an overshoot back inside `bound`, scaled by restitution
fn reflect(bound: f32, position: f32, restitution: f32) -> f32 {
    bound + (bound - position) * restitution
}
