//! Data-driven simulation tuning
//!
//! Physics and geometry constants bundled so a run can be rebalanced from a
//! JSON file without recompiling. Difficulty tiers are not tunable; they are
//! a fixed projection of the score.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::Tier;

/// Physics and geometry parameters for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Downward acceleration (units/tick²)
    pub gravity: f32,
    /// Velocity a flap overwrites the avatar's vertical speed with
    pub flap_velocity: f32,
    /// Fixed horizontal position of the avatar's center
    pub avatar_x: f32,
    pub avatar_width: f32,
    pub avatar_height: f32,
    /// Hitbox shrink on every side of the avatar sprite
    pub hitbox_inset: f32,
    pub obstacle_width: f32,
    /// Distance from the avatar to a run's first obstacle
    pub lead_distance: f32,
    /// Minimum distance between a gap and the playfield edges
    pub gap_margin: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            flap_velocity: FLAP_VELOCITY,
            avatar_x: AVATAR_X,
            avatar_width: AVATAR_WIDTH,
            avatar_height: AVATAR_HEIGHT,
            hitbox_inset: HITBOX_INSET,
            obstacle_width: OBSTACLE_WIDTH,
            lead_distance: LEAD_DISTANCE,
            gap_margin: GAP_MARGIN,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    /// Clamp values that would break the simulation's invariants
    ///
    /// The hitbox inset can never swallow the whole sprite and widths stay
    /// positive. Obstacles stay narrower than the tightest tier spacing so
    /// neighbours never overlap.
    pub fn sanitized(mut self) -> Self {
        self.avatar_width = self.avatar_width.max(1.0);
        self.avatar_height = self.avatar_height.max(1.0);
        let max_inset = (self.avatar_width.min(self.avatar_height) / 2.0 - 0.5).max(0.0);
        self.hitbox_inset = self.hitbox_inset.clamp(0.0, max_inset);
        self.obstacle_width = self.obstacle_width.clamp(1.0, max_obstacle_width());
        self.lead_distance = self.lead_distance.max(0.0);
        self.gap_margin = self.gap_margin.max(0.0);
        self
    }
}

/// Widest obstacle that still leaves a gap at the tightest tier spacing
fn max_obstacle_width() -> f32 {
    Tier::Hard.params().spacing - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_consts() {
        let tuning = Tuning::default();
        assert_eq!(tuning.gravity, 0.9);
        assert_eq!(tuning.flap_velocity, -14.0);
        assert_eq!(tuning.lead_distance, 200.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "gravity": 0.5 }"#).unwrap();
        assert_eq!(tuning.gravity, 0.5);
        assert_eq!(tuning.obstacle_width, OBSTACLE_WIDTH);
    }

    #[test]
    fn test_sanitize_clamps_inset() {
        let tuning = Tuning::from_json(r#"{ "avatar_height": 8.0, "hitbox_inset": 20.0 }"#).unwrap();
        assert!(tuning.hitbox_inset * 2.0 < tuning.avatar_height);
    }

    #[test]
    fn test_sanitize_caps_obstacle_width() {
        let tuning = Tuning::from_json(r#"{ "obstacle_width": 300.0 }"#).unwrap();
        assert_eq!(tuning.obstacle_width, 159.0);
        for tier in [Tier::Easy, Tier::Normal, Tier::Hard] {
            assert!(tuning.obstacle_width < tier.params().spacing);
        }

        let tuning = Tuning::from_json(r#"{ "obstacle_width": -4.0 }"#).unwrap();
        assert_eq!(tuning.obstacle_width, 1.0);
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(Tuning::from_json("{ not json").is_err());
    }
}
