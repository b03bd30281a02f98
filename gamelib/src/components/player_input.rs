use crate::input::{Controls, JUMP, MOVE_X, MOVE_Y};
use crate::math::Vec2;

use super::{InputComponent, InputView};

/// Side-on player control: the horizontal axis sets running speed, the
/// vertical axis or the jump action spends a single jump until the physics
/// response reports landing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerInput {
    pub run_speed: f32,
    pub jump_speed: f32,
}

impl Default for PlayerInput {
    fn default() -> Self {
        Self {
            run_speed: 10.0,
            jump_speed: 10.0,
        }
    }
}

impl PlayerInput {
    pub fn new(run_speed: f32, jump_speed: f32) -> Self {
        Self {
            run_speed,
            jump_speed,
        }
    }
}

impl InputComponent for PlayerInput {
    fn update(&mut self, actor: &mut InputView<'_>, controls: &Controls<'_>) {
        let axis = Vec2::new(controls.axis(MOVE_X), controls.axis(MOVE_Y));
        actor.intent_mut().axis = axis;
        actor.set_velocity_x(axis.x * self.run_speed);

        if actor.intent().jumped {
            return;
        }
        // Y grows downward, so "up" on the axis is negative.
        let lift = if axis.y != 0.0 {
            axis.y
        } else if controls.down(JUMP) {
            -1.0
        } else {
            return;
        };
        actor.set_velocity_y(lift * self.jump_speed);
        actor.intent_mut().jumped = true;
    }
}
