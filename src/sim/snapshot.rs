//! Read-only view handed to the presentation layer once per frame

use glam::Vec2;
use serde::Serialize;

use super::difficulty::Tier;
use super::state::{GamePhase, GameState, Playfield};
use crate::tilt_for_velocity;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AvatarPose {
    pub pos: Vec2,
    pub size: Vec2,
    /// Visual tilt in radians; positive noses down
    pub tilt: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObstacleView {
    pub id: u32,
    pub x: f32,
    pub width: f32,
    pub gap_top: f32,
    pub gap_bottom: f32,
    pub scored: bool,
}

/// Everything a renderer or HUD may read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub playfield: Playfield,
    pub avatar: AvatarPose,
    /// In travel order (leftmost first)
    pub obstacles: Vec<ObstacleView>,
    pub score: u32,
    pub best_score: u32,
    pub tier: Tier,
    pub phase: GamePhase,
}

impl GameState {
    pub fn snapshot(&self) -> RenderSnapshot {
        let width = self.tuning.obstacle_width;
        RenderSnapshot {
            playfield: self.playfield,
            avatar: AvatarPose {
                pos: self.avatar.pos,
                size: self.avatar.size,
                tilt: tilt_for_velocity(self.avatar.vel_y),
            },
            obstacles: self
                .course
                .obstacles()
                .iter()
                .map(|o| ObstacleView {
                    id: o.id,
                    x: o.x,
                    width,
                    gap_top: o.gap_top,
                    gap_bottom: o.gap_bottom,
                    scored: o.scored,
                })
                .collect(),
            score: self.score,
            best_score: self.best_score,
            tier: self.difficulty().tier,
            phase: self.phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::machine::Command;

    #[test]
    fn test_snapshot_reflects_state() {
        let mut state = GameState::new(8, 3);
        state.handle(Command::Start);
        state.avatar.vel_y = 4.0;
        state.score = 12;

        let snap = state.snapshot();
        assert_eq!(snap.phase, GamePhase::Running);
        assert_eq!(snap.tier, Tier::Normal);
        assert_eq!(snap.score, 12);
        assert_eq!(snap.best_score, 3);
        assert!((snap.avatar.tilt - 0.2).abs() < 1e-6);
        assert_eq!(snap.obstacles.len(), 1);
        assert_eq!(snap.obstacles[0].width, OBSTACLE_WIDTH);
        assert_eq!(snap.obstacles[0].x, AVATAR_X + LEAD_DISTANCE);
    }

    #[test]
    fn test_tilt_is_clamped() {
        let mut state = GameState::new(8, 0);
        state.handle(Command::Start);
        state.handle(Command::Flap);
        assert_eq!(state.snapshot().avatar.tilt, -MAX_TILT);
    }
}
