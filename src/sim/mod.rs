//! Simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering,
//! audio and platform dependencies:
//! - One owned `GameState`, no globals
//! - Seeded RNG only
//! - Obstacles kept in travel order
//! - Per-tick constants scaled by elapsed time

pub mod autopilot;
pub mod collision;
pub mod difficulty;
pub mod machine;
pub mod obstacles;
pub mod physics;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use autopilot::autopilot;
pub use collision::{Rect, avatar_hitbox, boundary_hit, obstacle_hit};
pub use difficulty::{Difficulty, HARD_THRESHOLD, NORMAL_THRESHOLD, Tier, difficulty_for};
pub use machine::Command;
pub use obstacles::{ObstacleCourse, place_gap, score_if_passed};
pub use snapshot::{AvatarPose, ObstacleView, RenderSnapshot};
pub use state::{
    Avatar, CollisionCause, GameEvent, GamePhase, GameState, MAX_PENDING_EVENTS, Obstacle, Playfield,
    RngState,
};
pub use tick::tick;
