//! Nyan Doctor - capsule and virus falling-block puzzle engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (board, capsules, matching, gravity, state machine)
//! - `settings`: Data-driven timing and scoring tuning
//! - `autopilot`: Demo/idle AI that plays through the public intent API

pub mod autopilot;
pub mod settings;
pub mod sim;

pub use autopilot::Autopilot;
pub use settings::{Settings, SettingsError};

/// Game configuration constants
pub mod consts {
    /// Playfield dimensions (rows grow downward, row 0 is the top visible row)
    pub const FIELD_ROWS: usize = 16;
    pub const FIELD_COLS: usize = 8;

    /// Automatic drop interval of the active capsule (ms per row)
    pub const NORMAL_DROP_INTERVAL_MS: u32 = 500;
    /// Drop interval while soft-drop is held
    pub const FAST_DROP_INTERVAL_MS: u32 = 80;
    /// Post-clear gravity falls this many times faster than a normal drop
    pub const AUTO_FALL_SPEED_MULTIPLIER: u32 = 2;

    /// Top rows never seeded with viruses
    pub const SAFE_ROWS: usize = 3;

    /// Capsules appear one row above the visible field
    pub const SPAWN_ROW: i32 = -1;
    pub const SPAWN_COL: i32 = FIELD_COLS as i32 / 2 - 1;

    /// Points per removed cell
    pub const SCORE_PER_CELL: u64 = 50;

    /// Supported level range (requests outside are clamped)
    pub const MIN_LEVEL: u32 = 0;
    pub const MAX_LEVEL: u32 = 20;

    /// Virus target = VIRUS_BASE + VIRUS_PER_LEVEL * level (before clamping)
    pub const VIRUS_BASE: u32 = 8;
    pub const VIRUS_PER_LEVEL: u32 = 3;
    /// Random draws allowed while scattering viruses
    pub const VIRUS_PLACEMENT_BUDGET: u32 = 4000;
}
