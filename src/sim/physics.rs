//! Avatar motion
//!
//! Semi-implicit Euler with no sub-stepping: velocity picks up gravity first,
//! then position moves by the new velocity. Both deltas are scaled by the
//! frame's elapsed time relative to the reference tick.

use super::state::Avatar;

/// Advance the avatar by one frame
pub fn integrate(avatar: &mut Avatar, gravity: f32, scale: f32) {
    avatar.vel_y += gravity * scale;
    avatar.pos.y += avatar.vel_y * scale;
}

/// Overwrite vertical velocity with the flap velocity
///
/// Not additive: the result is the same no matter how fast the avatar was
/// falling or rising.
#[inline]
pub fn flap(avatar: &mut Avatar, flap_velocity: f32) {
    avatar.vel_y = flap_velocity;
}
