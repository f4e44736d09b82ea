//! Demo/idle-mode controller
//!
//! Decides, once per frame, whether the avatar should flap. It aims a little
//! above the bottom of the next gap the avatar has not cleared yet and flaps
//! when the next step would carry it below that line.

use super::machine::Command;
use super::state::{GamePhase, GameState};

/// Clearance kept between the hitbox bottom and the gap bottom
const BOTTOM_CLEARANCE: f32 = 16.0;
/// Do not flap again while still rising faster than this
const MIN_FLAP_VELOCITY: f32 = -4.0;

/// Height the autopilot tries to stay above
pub fn aim_height(state: &GameState) -> f32 {
    let half_height = state.avatar.size.y / 2.0 - state.tuning.hitbox_inset;
    let hitbox_left = state.avatar.pos.x - (state.avatar.size.x / 2.0 - state.tuning.hitbox_inset);
    let width = state.tuning.obstacle_width;

    state
        .course
        .obstacles()
        .iter()
        .find(|o| o.right(width) >= hitbox_left)
        .map(|o| o.gap_bottom - half_height - BOTTOM_CLEARANCE)
        .unwrap_or(state.playfield.height / 2.0)
}

/// Command the autopilot wants this frame, if any
pub fn autopilot(state: &GameState) -> Option<Command> {
    match state.phase {
        GamePhase::Idle | GamePhase::GameOver => Some(Command::Start),
        GamePhase::Paused => None,
        GamePhase::Running => {
            let avatar = &state.avatar;
            let next_y = avatar.pos.y + avatar.vel_y;
            if next_y > aim_height(state) && avatar.vel_y > MIN_FLAP_VELOCITY {
                Some(Command::Flap)
            } else {
                None
            }
        }
    }
}
