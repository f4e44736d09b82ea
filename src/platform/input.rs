//! Input mapping
//!
//! Raw key names and pointer presses become simulation commands. Anything
//! unrecognized maps to `None` and is dropped.

use crate::sim::{Command, GamePhase};

/// Map a `KeyboardEvent.key` value to a command for the current phase
///
/// Space and ArrowUp start a run from Idle or GameOver and flap otherwise.
pub fn command_for_key(key: &str, phase: GamePhase) -> Option<Command> {
    match key {
        " " | "Spacebar" | "ArrowUp" => Some(match phase {
            GamePhase::Idle | GamePhase::GameOver => Command::Start,
            GamePhase::Running | GamePhase::Paused => Command::Flap,
        }),
        "p" | "P" | "Escape" => Some(Command::PauseToggle),
        _ => None,
    }
}

/// Click or tap on the playfield
pub fn command_for_pointer() -> Command {
    Command::Flap
}

/// Keys whose browser default (page scroll) should be suppressed
pub fn is_game_key(key: &str) -> bool {
    matches!(key, " " | "Spacebar" | "ArrowUp")
}
