//! Game state and core simulation types
//!
//! Everything a run needs lives in one owned `GameState`. Entity types here
//! are plain data; behavior lives in the sibling modules.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::{Difficulty, difficulty_for};
use super::obstacles::ObstacleCourse;
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of the game state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first start; avatar inert, no obstacles
    Idle,
    /// Active gameplay
    Running,
    /// Simulation frozen until resumed
    Paused,
    /// Run ended by a collision, waiting for restart
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Idle => "Idle",
            GamePhase::Running => "Running",
            GamePhase::Paused => "Paused",
            GamePhase::GameOver => "GameOver",
        }
    }
}

/// What ended a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionCause {
    /// Avatar left the top of the playfield
    Ceiling,
    /// Avatar left the bottom of the playfield
    Ground,
    /// Avatar struck an obstacle outside its gap
    Obstacle { id: u32 },
}

/// Lifecycle notifications for external consumers (audio, HUD, storage)
///
/// Queued on the state and drained by the driver. Nothing in the simulation
/// reads them back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted,
    Flapped,
    Scored { score: u32 },
    Collided { cause: CollisionCause, score: u32 },
    PauseChanged { paused: bool },
    NewBest { best: u32 },
}

/// Visible play area in world units (origin top-left, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: DEFAULT_PLAYFIELD_WIDTH,
            height: DEFAULT_PLAYFIELD_HEIGHT,
        }
    }
}

impl Playfield {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }
}

/// The player's avatar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    /// Center position; x stays fixed for the whole run
    pub pos: Vec2,
    /// Vertical velocity (units/tick, positive = downward)
    pub vel_y: f32,
    /// Sprite size; the collision hitbox is this minus the inset
    pub size: Vec2,
}

impl Avatar {
    /// Avatar at rest in the vertical center of the playfield
    pub fn centered(tuning: &Tuning, playfield: &Playfield) -> Self {
        Self {
            pos: Vec2::new(tuning.avatar_x, playfield.height / 2.0),
            vel_y: 0.0,
            size: Vec2::new(tuning.avatar_width, tuning.avatar_height),
        }
    }
}

/// A gapped obstacle travelling toward the avatar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Left edge
    pub x: f32,
    /// Top of the passable band
    pub gap_top: f32,
    /// Bottom of the passable band (`gap_top + gap size` at creation)
    pub gap_bottom: f32,
    /// Set once the avatar has passed the trailing edge
    pub scored: bool,
}

impl Obstacle {
    /// Right edge, given the course's obstacle width
    #[inline]
    pub fn right(&self, width: f32) -> f32 {
        self.x + width
    }

    #[inline]
    pub fn gap_size(&self) -> f32 {
        self.gap_bottom - self.gap_top
    }
}

/// Seed and stream cursor for reproducible obstacle placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    /// Hand out a fresh generator on the next stream
    pub fn next_rng(&mut self) -> Pcg32 {
        let rng = Pcg32::new(self.seed, self.stream);
        self.stream = self.stream.wrapping_add(1);
        rng
    }
}

/// Events kept for a driver that stops draining; older ones are dropped first
pub const MAX_PENDING_EVENTS: usize = 256;

/// Complete simulation state (owned, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// RNG state
    pub rng_state: RngState,
    /// Physics and geometry parameters
    pub tuning: Tuning,
    /// Visible play area
    pub playfield: Playfield,
    /// Current phase
    pub phase: GamePhase,
    /// Player avatar
    pub avatar: Avatar,
    /// Live obstacles
    pub course: ObstacleCourse,
    /// Obstacles passed this run
    pub score: u32,
    /// Best score across runs (persisted by the driver)
    pub best_score: u32,
    /// Simulation tick counter for the current run
    pub time_ticks: u64,
    /// Pending lifecycle notifications, oldest first, at most
    /// [`MAX_PENDING_EVENTS`]
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create an idle game with the given seed and previously stored best score
    pub fn new(seed: u64, best_score: u32) -> Self {
        Self::with_tuning(seed, best_score, Tuning::default(), Playfield::default())
    }

    pub fn with_tuning(seed: u64, best_score: u32, tuning: Tuning, playfield: Playfield) -> Self {
        let tuning = tuning.sanitized();
        let avatar = Avatar::centered(&tuning, &playfield);
        Self {
            seed,
            rng_state: RngState::new(seed),
            tuning,
            playfield,
            phase: GamePhase::Idle,
            avatar,
            course: ObstacleCourse::default(),
            score: 0,
            best_score,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    /// Current difficulty, always derived from the score
    #[inline]
    pub fn difficulty(&self) -> Difficulty {
        difficulty_for(self.score)
    }

    /// Adopt a new surface size without disturbing the run
    pub fn resize(&mut self, width: f32, height: f32) {
        self.playfield = Playfield::new(width, height);
        if self.phase == GamePhase::Idle {
            self.avatar = Avatar::centered(&self.tuning, &self.playfield);
        }
    }

    /// Take every pending lifecycle event
    ///
    /// Drivers drain once per frame. Undrained events beyond
    /// [`MAX_PENDING_EVENTS`] are discarded oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            let excess = self.events.len() + 1 - MAX_PENDING_EVENTS;
            self.events.drain(..excess);
        }
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_idle() {
        let state = GameState::new(7, 12);
        assert_eq!(state.phase, GamePhase::Idle);
        assert!(state.course.is_empty());
        assert_eq!(state.score, 0);
        assert_eq!(state.best_score, 12);
        assert_eq!(state.avatar.pos.y, DEFAULT_PLAYFIELD_HEIGHT / 2.0);
        assert_eq!(state.avatar.vel_y, 0.0);
    }

    #[test]
    fn test_rng_streams_differ() {
        use rand::Rng;
        let mut rng_state = RngState::new(42);
        let a: u32 = rng_state.next_rng().random();
        let b: u32 = rng_state.next_rng().random();
        assert_ne!(a, b);
        assert_eq!(rng_state.stream, 2);

        let mut again = RngState::new(42);
        let a2: u32 = again.next_rng().random();
        assert_eq!(a, a2);
    }

    #[test]
    fn test_resize_while_idle_recenters() {
        let mut state = GameState::new(1, 0);
        state.resize(300.0, 1000.0);
        assert_eq!(state.playfield.height, 1000.0);
        assert_eq!(state.avatar.pos.y, 500.0);

        state.resize(-5.0, 0.0);
        assert_eq!(state.playfield, Playfield::new(1.0, 1.0));
    }

    #[test]
    fn test_drain_events_empties_queue() {
        let mut state = GameState::new(1, 0);
        state.emit(GameEvent::Flapped);
        assert_eq!(state.drain_events(), vec![GameEvent::Flapped]);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_undrained_events_are_capped() {
        use crate::sim::Command;

        let mut state = GameState::new(1, 0);
        state.handle(Command::Start);
        for _ in 0..10_000 {
            state.handle(Command::PauseToggle);
            state.handle(Command::PauseToggle);
            state.handle(Command::Flap);
        }
        assert_eq!(state.events.len(), MAX_PENDING_EVENTS);

        let events = state.drain_events();
        assert_eq!(
            &events[events.len() - 3..],
            &[
                GameEvent::PauseChanged { paused: true },
                GameEvent::PauseChanged { paused: false },
                GameEvent::Flapped,
            ]
        );
        assert!(!events.contains(&GameEvent::RunStarted));
    }
}
