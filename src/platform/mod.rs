//! Platform abstraction layer
//!
//! Handles the parts of the driver that are not simulation:
//! - Frame timing
//! - Input mapping
//! - Best-score storage (LocalStorage on web, a JSON file on native)

pub mod clock;
pub mod input;
pub mod storage;

pub use clock::{FpsCounter, FrameClock};
pub use input::{command_for_key, command_for_pointer, is_game_key};
pub use storage::{MemoryStore, ScoreStore, StorageError};
