//! Skyhop - a one-button arcade flyer
//!
//! Core modules:
//! - `sim`: Simulation core (physics, obstacles, difficulty, game state machine)
//! - `renderer`: WebGPU rendering of a read-only snapshot
//! - `platform`: Frame clock, input mapping and best-score storage
//! - `audio`: Sound cues driven by lifecycle events
//! - `tuning`: Data-driven physics and geometry constants

pub mod audio;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
///
/// Per-tick values are expressed in units per reference tick. The
/// simulation scales them by `dt / REFERENCE_DT`.
pub mod consts {
    /// Reference simulation cadence (one display refresh at 60 Hz)
    pub const REFERENCE_DT: f32 = 1.0 / 60.0;
    /// Longest frame the driver will feed into a single tick
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Default playfield, used until the surface reports its size
    pub const DEFAULT_PLAYFIELD_WIDTH: f32 = 480.0;
    pub const DEFAULT_PLAYFIELD_HEIGHT: f32 = 640.0;

    /// Downward acceleration (units/tick²)
    pub const GRAVITY: f32 = 0.9;
    /// Vertical velocity set by a flap (negative = upward)
    pub const FLAP_VELOCITY: f32 = -14.0;

    /// Avatar defaults
    pub const AVATAR_X: f32 = 100.0;
    pub const AVATAR_WIDTH: f32 = 50.0;
    pub const AVATAR_HEIGHT: f32 = 40.0;
    /// Hitbox shrink on every side of the avatar sprite
    pub const HITBOX_INSET: f32 = 5.0;

    /// Obstacle defaults
    pub const OBSTACLE_WIDTH: f32 = 60.0;
    /// Distance ahead of the avatar where a run's first obstacle appears
    pub const LEAD_DISTANCE: f32 = 200.0;
    /// Minimum distance between a gap and either playfield edge
    pub const GAP_MARGIN: f32 = 50.0;

    /// Visual tilt per unit of vertical velocity (radians)
    pub const TILT_FACTOR: f32 = 0.05;
    pub const MAX_TILT: f32 = 0.4;
}

/// Visual tilt for a vertical velocity, clamped to ±`MAX_TILT` radians
#[inline]
pub fn tilt_for_velocity(velocity: f32) -> f32 {
    (velocity * consts::TILT_FACTOR).clamp(-consts::MAX_TILT, consts::MAX_TILT)
}

/// Scale factor turning per-tick constants into per-frame deltas
#[inline]
pub fn step_scale(dt: f32) -> f32 {
    dt / consts::REFERENCE_DT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tilt_clamps() {
        assert_eq!(tilt_for_velocity(0.0), 0.0);
        assert!((tilt_for_velocity(4.0) - 0.2).abs() < 1e-6);
        assert_eq!(tilt_for_velocity(20.0), consts::MAX_TILT);
        assert_eq!(tilt_for_velocity(-14.0), -consts::MAX_TILT);
    }

    #[test]
    fn test_step_scale_reference() {
        assert_eq!(step_scale(consts::REFERENCE_DT), 1.0);
        assert!((step_scale(consts::REFERENCE_DT * 2.0) - 2.0).abs() < 1e-6);
    }
}
