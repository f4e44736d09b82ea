//! Game phase transitions
//!
//! Idle --start--> Running --collision--> GameOver --start--> Running, and
//! Running <--pause toggle--> Paused. Commands that do not apply to the
//! current phase are ignored.

use serde::{Deserialize, Serialize};

use super::difficulty::difficulty_for;
use super::physics;
use super::state::{Avatar, CollisionCause, GameEvent, GamePhase, GameState};

/// Discrete player commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Start,
    Flap,
    PauseToggle,
}

impl GameState {
    /// Apply a player command. Returns false when the command was ignored.
    pub fn handle(&mut self, command: Command) -> bool {
        let applied = match command {
            Command::Start => self.start(),
            Command::Flap => self.flap(),
            Command::PauseToggle => self.toggle_pause(),
        };
        if !applied {
            log::debug!("Ignored {:?} while {}", command, self.phase.as_str());
        }
        applied
    }

    /// Begin a run from Idle or GameOver
    ///
    /// Recenters the avatar at rest, clears the course, seeds one obstacle at
    /// the lead distance and zeroes the score.
    pub fn start(&mut self) -> bool {
        if !matches!(self.phase, GamePhase::Idle | GamePhase::GameOver) {
            return false;
        }

        self.avatar = Avatar::centered(&self.tuning, &self.playfield);
        self.score = 0;
        self.time_ticks = 0;
        self.course.clear();
        let mut rng = self.rng_state.next_rng();
        self.course
            .spawn_next(&self.tuning, &self.playfield, &difficulty_for(0), &mut rng);

        self.phase = GamePhase::Running;
        self.emit(GameEvent::RunStarted);
        log::info!("Run started (seed {}, stream {})", self.seed, self.rng_state.stream);
        true
    }

    /// Overwrite vertical velocity with the flap velocity (Running only)
    pub fn flap(&mut self) -> bool {
        if self.phase != GamePhase::Running {
            return false;
        }
        physics::flap(&mut self.avatar, self.tuning.flap_velocity);
        self.emit(GameEvent::Flapped);
        true
    }

    /// Running <-> Paused
    pub fn toggle_pause(&mut self) -> bool {
        let paused = match self.phase {
            GamePhase::Running => true,
            GamePhase::Paused => false,
            _ => return false,
        };
        self.phase = if paused {
            GamePhase::Paused
        } else {
            GamePhase::Running
        };
        self.emit(GameEvent::PauseChanged { paused });
        log::info!("{}", if paused { "Paused" } else { "Resumed" });
        true
    }

    /// Terminal transition after a collision
    ///
    /// Raises the best score when this run beat it; the driver persists it on
    /// the `NewBest` event.
    pub fn end_run(&mut self, cause: CollisionCause) {
        if self.phase != GamePhase::Running {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.emit(GameEvent::Collided {
            cause,
            score: self.score,
        });
        log::info!("Game over: {:?} at score {}", cause, self.score);

        if self.score > self.best_score {
            self.best_score = self.score;
            self.emit(GameEvent::NewBest { best: self.score });
            log::info!("New best score: {}", self.score);
        }
    }
}
