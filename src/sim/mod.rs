//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Elapsed milliseconds come in from the driver, never from a clock
//! - Seeded RNG only
//! - Stable iteration order (row-major board scans)
//! - No rendering or platform dependencies

pub mod board;
pub mod capsule;
pub mod gravity;
pub mod level;
pub mod matcher;
pub mod pairs;
pub mod piece;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use board::{Board, Cell, Color, ConnectorTag};
pub use capsule::{ActiveCapsule, CapsuleSpec, DropOutcome, KICKS};
pub use gravity::{FallingCell, FallingPiece, GravityObject};
pub use level::LevelConfig;
pub use matcher::{find_and_clear, remove_cell};
pub use pairs::PairRegistry;
pub use piece::{Orientation, Rotation, Segment, connector_tags, is_placement_legal, segment_positions};
pub use snapshot::{FallingCellView, SegmentView, Snapshot};
pub use state::{GameEvent, GameState, GameStatus, LockResult, Phase};
pub use tick::{Command, TickInput, tick};
