//! Per-frame simulation tick
//!
//! Core game loop that advances the engine by the elapsed frame time.

use serde::{Deserialize, Serialize};

use super::piece::Rotation;
use super::state::{GameState, Phase};

/// Lifecycle requests from the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Start the given level (clamped), from any status
    StartLevel(u32),
    /// Replay the current level
    Restart,
    /// Go to the next level after a level clear
    NextLevel,
}

/// Input intents for a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    /// Horizontal move: -1 left, +1 right, 0 none
    pub shift: i8,
    pub rotate: Option<Rotation>,
    /// Soft-drop held (a level, not an edge)
    pub soft_drop: bool,
    pub command: Option<Command>,
}

/// Advance the game by `elapsed_ms`.
///
/// Commands are handled first and end the tick. Otherwise movement intents
/// are applied, then exactly one phase concern runs.
pub fn tick(state: &mut GameState, input: &TickInput, elapsed_ms: u32) {
    state.time_ms += u64::from(elapsed_ms);

    if let Some(command) = input.command {
        match command {
            Command::StartLevel(level) => state.start_level(level),
            Command::Restart => state.restart(),
            Command::NextLevel => state.advance_level(),
        }
        return;
    }

    // Terminal until the driver sends a command
    if matches!(state.phase, Phase::GameOver | Phase::LevelClear) {
        return;
    }

    state.soft_drop = input.soft_drop;
    if input.shift != 0 {
        state.shift_active(input.shift);
    }
    if let Some(rotation) = input.rotate {
        state.rotate_active(rotation);
    }

    let before = state.phase;
    match state.phase {
        Phase::Animating => state.animate_falling(elapsed_ms),
        Phase::ApplyingGravity => state.apply_gravity(),
        Phase::ResolvingMatches => state.resolve_matches(),
        Phase::Spawning => state.finish_cascade(),
        Phase::Playing => state.step_active(elapsed_ms),
        Phase::GameOver | Phase::LevelClear => {}
    }
    if state.phase != before {
        log::trace!("Phase {:?} -> {:?} at {} ms", before, state.phase, state.time_ms);
    }
}
