//! Game state and the guarded phase transitions driven by `tick`
//!
//! The engine is always in exactly one `Phase`. Each phase owns one concern
//! (animating, gravity, matching, spawning, player control), which gives the
//! per-tick ordering: a capsule can never spawn while a cascade is resolving,
//! and a clear is never re-processed while gravity is still settling.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::board::{Board, Cell};
use super::capsule::{ActiveCapsule, CapsuleSpec, DropOutcome};
use super::gravity::{self, FallingPiece};
use super::level::LevelConfig;
use super::matcher;
use super::pairs::PairRegistry;
use super::piece::Rotation;
use crate::Settings;
use crate::consts::*;

/// Externally visible run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Running,
    GameOver,
    LevelClear,
}

/// Internal state machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Player controls the active capsule
    Playing,
    /// Board matches pending (after a lock or after gravity settles)
    ResolvingMatches,
    /// Cells were cleared; loose pieces must be computed
    ApplyingGravity,
    /// Pieces in flight
    Animating,
    /// Cascade finished: finish the level or spawn the next capsule
    Spawning,
    LevelClear,
    GameOver,
}

/// Outcome of locking the active capsule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockResult {
    Locked { pair_id: u32 },
    /// Part of the capsule was still above the field
    ToppedOut,
}

/// Notifications for the driver (sound, haptics, HUD)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelStarted { level: u32, viruses: u32 },
    Spawned,
    Locked { pair_id: u32 },
    Cleared { cells: u32, viruses_remaining: u32 },
    GravityStarted { pieces: u32 },
    PieceSettled,
    LevelCleared { level: u32 },
    GameOver,
}

/// Complete game state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub settings: Settings,
    /// Current level (clamped to MIN_LEVEL..=MAX_LEVEL)
    pub level: u32,
    pub score: u64,
    pub viruses_remaining: u32,
    pub phase: Phase,
    /// Viruses hit zero; the level ends once the cascade finishes
    pub level_clear_pending: bool,
    pub board: Board,
    pub pairs: PairRegistry,
    pub active: Option<ActiveCapsule>,
    /// Preview of the capsule after the current one
    pub next: CapsuleSpec,
    pub falling: Vec<FallingPiece>,
    /// Soft-drop held this tick
    pub soft_drop: bool,
    /// Time since the active capsule last dropped
    pub drop_timer_ms: u32,
    /// Capsules brought into play over the whole run (never reset)
    pub capsules_spawned: u64,
    /// Total simulated time
    pub time_ms: u64,
    /// Pending notifications, drained by the driver
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a game at `level` with default settings
    pub fn new(seed: u64, level: u32) -> Self {
        Self::with_settings(seed, level, Settings::default())
    }

    pub fn with_settings(seed: u64, level: u32, settings: Settings) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let next = CapsuleSpec::random(&mut rng);
        let mut state = Self {
            seed,
            rng,
            settings: settings.validated(),
            level: 0,
            score: 0,
            viruses_remaining: 0,
            phase: Phase::Spawning,
            level_clear_pending: false,
            board: Board::new(),
            pairs: PairRegistry::new(),
            active: None,
            next,
            falling: Vec::new(),
            soft_drop: false,
            drop_timer_ms: 0,
            capsules_spawned: 0,
            time_ms: 0,
            events: Vec::new(),
        };
        state.start_level(level);
        state
    }

    /// Empty board with no viruses and no active capsule, waiting in `Spawning`
    #[cfg(test)]
    pub(crate) fn empty(seed: u64) -> Self {
        let mut state = Self::new(seed, MIN_LEVEL);
        state.board = Board::new();
        state.pairs = PairRegistry::new();
        state.active = None;
        state.viruses_remaining = 0;
        state.phase = Phase::Spawning;
        state.events.clear();
        state
    }

    pub fn status(&self) -> GameStatus {
        match self.phase {
            Phase::GameOver => GameStatus::GameOver,
            Phase::LevelClear => GameStatus::LevelClear,
            _ => GameStatus::Running,
        }
    }

    /// Reset everything and set up `level` (clamped) with a fresh capsule in play
    pub fn start_level(&mut self, level: u32) {
        let config = LevelConfig::for_level(level);
        self.level = config.level;
        self.score = 0;
        self.board = Board::new();
        self.pairs = PairRegistry::new();
        self.active = None;
        self.falling.clear();
        self.soft_drop = false;
        self.drop_timer_ms = 0;
        self.level_clear_pending = false;
        self.next = CapsuleSpec::random(&mut self.rng);

        let placed = config.place_viruses(&mut self.board, &mut self.rng, self.settings.virus_placement_budget);
        self.viruses_remaining = self.board.count_viruses();
        log::info!(
            "Level {} started: {} viruses (target {}), seed {}",
            self.level,
            placed,
            config.virus_target,
            self.seed
        );
        self.events.push(GameEvent::LevelStarted {
            level: self.level,
            viruses: self.viruses_remaining,
        });

        self.phase = Phase::Spawning;
        self.spawn_capsule();
    }

    /// Replay the current level from scratch
    pub fn restart(&mut self) {
        log::info!("Restarting level {}", self.level);
        self.start_level(self.level);
    }

    /// Move on from a cleared level. Ignored in any other status.
    pub fn advance_level(&mut self) {
        if self.phase != Phase::LevelClear {
            return;
        }
        self.start_level((self.level + 1).min(MAX_LEVEL));
    }

    /// Interval the active capsule currently drops at
    pub fn drop_interval_ms(&self) -> u32 {
        self.settings.drop_interval_ms(self.soft_drop)
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Shift the active capsule; no-op outside player control or when blocked
    pub fn shift_active(&mut self, delta: i8) -> bool {
        if self.phase != Phase::Playing {
            return false;
        }
        match self.active.as_mut() {
            Some(capsule) => capsule.shift(delta, &self.board),
            None => false,
        }
    }

    /// Rotate the active capsule with kicks; no-op outside player control or when boxed in
    pub fn rotate_active(&mut self, rotation: Rotation) -> bool {
        if self.phase != Phase::Playing {
            return false;
        }
        match self.active.as_mut() {
            Some(capsule) => capsule.rotate(rotation, &self.board),
            None => false,
        }
    }

    /// Bring the previewed capsule into play and roll a new preview.
    /// Blocked spawn cells end the game.
    pub fn spawn_capsule(&mut self) {
        let spec = self.next;
        self.next = CapsuleSpec::random(&mut self.rng);
        self.drop_timer_ms = 0;
        match ActiveCapsule::spawn(&spec, &self.board) {
            Some(capsule) => {
                self.active = Some(capsule);
                self.capsules_spawned += 1;
                self.phase = Phase::Playing;
                self.events.push(GameEvent::Spawned);
            }
            None => {
                log::info!("Spawn blocked at level {}", self.level);
                self.game_over();
            }
        }
    }

    /// Advance the drop clock and drop or lock the active capsule when due
    pub fn step_active(&mut self, elapsed_ms: u32) {
        let Some(mut capsule) = self.active else {
            self.phase = Phase::Spawning;
            return;
        };
        self.drop_timer_ms = self.drop_timer_ms.saturating_add(elapsed_ms);
        if self.drop_timer_ms < self.drop_interval_ms() {
            return;
        }
        self.drop_timer_ms = 0;
        match capsule.drop_one(&self.board) {
            DropOutcome::Moved => self.active = Some(capsule),
            DropOutcome::LockRequested => {
                if let LockResult::Locked { .. } = self.lock_active() {
                    self.phase = Phase::ResolvingMatches;
                }
            }
        }
    }

    /// Turn the active capsule into two linked board fragments.
    ///
    /// A capsule still poking above the field tops out: its visible half is left
    /// on the board unpaired, nothing is registered and the game ends.
    pub fn lock_active(&mut self) -> LockResult {
        let Some(capsule) = self.active.take() else {
            return LockResult::ToppedOut;
        };
        let segments = capsule.segments();
        let (tag_a, tag_b) = capsule.connector_tags();
        let tags = [tag_a, tag_b];

        if segments.iter().any(|seg| seg.row < 0) {
            for (seg, tag) in segments.iter().zip(tags) {
                if seg.row >= 0 {
                    self.board.set(seg.row, seg.col, Cell::capsule(seg.color));
                    self.board.set_tag(seg.row, seg.col, Some(tag));
                }
            }
            log::info!("Capsule locked above the field at level {}", self.level);
            self.game_over();
            return LockResult::ToppedOut;
        }

        let pair_id = self.pairs.mint();
        for (seg, tag) in segments.iter().zip(tags) {
            self.board.set(seg.row, seg.col, Cell::capsule(seg.color));
            self.board.set_pair_id(seg.row, seg.col, pair_id);
            self.board.set_tag(seg.row, seg.col, Some(tag));
        }
        self.pairs.link(pair_id, 2);
        log::debug!(
            "Locked pair {} at ({}, {}) / ({}, {})",
            pair_id,
            segments[0].row,
            segments[0].col,
            segments[1].row,
            segments[1].col
        );
        self.events.push(GameEvent::Locked { pair_id });
        LockResult::Locked { pair_id }
    }

    /// Clear runs, score them and queue gravity
    pub fn resolve_matches(&mut self) {
        let cleared = matcher::find_and_clear(&mut self.board, &mut self.pairs);
        if cleared == 0 {
            self.phase = Phase::Spawning;
            return;
        }
        self.score += u64::from(cleared) * self.settings.score_per_cell;
        self.viruses_remaining = self.board.count_viruses();
        if self.viruses_remaining == 0 {
            self.level_clear_pending = true;
        }
        self.events.push(GameEvent::Cleared {
            cells: cleared,
            viruses_remaining: self.viruses_remaining,
        });
        self.phase = Phase::ApplyingGravity;
    }

    /// Lift loose pieces into flight, or finish the cascade if nothing falls
    pub fn apply_gravity(&mut self) {
        self.falling = gravity::prepare(&mut self.board, &mut self.pairs);
        if self.falling.is_empty() {
            self.phase = Phase::Spawning;
            return;
        }
        self.events.push(GameEvent::GravityStarted {
            pieces: self.falling.len() as u32,
        });
        self.phase = Phase::Animating;
    }

    /// Advance pieces in flight; once all have landed, look for new matches
    pub fn animate_falling(&mut self, elapsed_ms: u32) {
        let landed = gravity::animate(
            &mut self.falling,
            &mut self.board,
            &mut self.pairs,
            elapsed_ms,
            self.settings.fall_interval_ms(),
        );
        for _ in 0..landed {
            self.events.push(GameEvent::PieceSettled);
        }
        if self.falling.is_empty() {
            self.phase = Phase::ResolvingMatches;
        }
    }

    /// Cascade is over: end the level if it was cleared, otherwise spawn
    pub fn finish_cascade(&mut self) {
        if self.level_clear_pending {
            self.level_cleared();
        } else {
            self.spawn_capsule();
        }
    }

    fn level_cleared(&mut self) {
        self.level_clear_pending = false;
        self.soft_drop = false;
        self.drop_timer_ms = 0;
        self.falling.clear();
        self.active = None;
        self.phase = Phase::LevelClear;
        log::info!("Level {} cleared with score {}", self.level, self.score);
        self.events.push(GameEvent::LevelCleared { level: self.level });
    }

    fn game_over(&mut self) {
        self.active = None;
        self.soft_drop = false;
        self.phase = Phase::GameOver;
        log::info!("Game over at level {} with score {}", self.level, self.score);
        self.events.push(GameEvent::GameOver);
    }
}
