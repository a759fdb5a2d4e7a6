//! Demo player
//!
//! Produces a `TickInput` from the visible state alone, so a headless run or an
//! attract screen can drive the engine exactly the way a person would.

use crate::sim::{ActiveCapsule, Board, GameState, Orientation, Phase, Rotation, TickInput, is_placement_legal};

/// Ticks without progress before the current plan is abandoned
const STALL_LIMIT: u32 = 12;

/// Where the current capsule should end up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Target {
    col: i32,
    orientation: Orientation,
}

#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    target: Option<Target>,
    /// Spawn serial of the capsule the target was planned for
    planned_for: Option<u64>,
    /// Last observed (row, col, orientation) of the active capsule
    last_seen: Option<(i32, i32, Orientation)>,
    stalled: u32,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_input(&mut self, state: &GameState) -> TickInput {
        let mut input = TickInput::default();
        let Some(active) = state.active.filter(|_| state.phase == Phase::Playing) else {
            self.target = None;
            self.last_seen = None;
            return input;
        };

        let seen = (active.row, active.col, active.orientation);
        if self.planned_for != Some(state.capsules_spawned) || self.target.is_none() {
            self.target = Some(plan(&active, &state.board));
            self.planned_for = Some(state.capsules_spawned);
            self.stalled = 0;
            log::trace!("Autopilot target {:?}", self.target);
        } else if self.last_seen == Some(seen) {
            self.stalled += 1;
        } else {
            self.stalled = 0;
        }
        self.last_seen = Some(seen);

        let Some(target) = self.target else {
            return input;
        };
        if self.stalled >= STALL_LIMIT {
            // Can't get there; let it fall where it is
            input.soft_drop = true;
        } else if active.orientation != target.orientation {
            input.rotate = Some(Rotation::Clockwise);
        } else if active.col < target.col {
            input.shift = 1;
        } else if active.col > target.col {
            input.shift = -1;
        } else {
            input.soft_drop = true;
        }
        input
    }
}

/// Best landing spot reachable by straight drops from the current height
fn plan(active: &ActiveCapsule, board: &Board) -> Target {
    let mut best = Target {
        col: active.col,
        orientation: active.orientation,
    };
    let mut best_score = i32::MIN;
    for orientation in Orientation::CYCLE {
        for col in 0..crate::consts::FIELD_COLS as i32 {
            let mut candidate = ActiveCapsule {
                col,
                orientation,
                ..*active
            };
            if !is_placement_legal(&candidate.segments(), board) {
                continue;
            }
            while candidate.try_translate(1, 0, board) {}
            let score = landing_score(&candidate, board);
            if score > best_score {
                best_score = score;
                best = Target { col, orientation };
            }
        }
    }
    best
}

/// Heuristic value of locking `capsule` where it sits
fn landing_score(capsule: &ActiveCapsule, board: &Board) -> i32 {
    let segments = capsule.segments();
    let mut score = 0;
    for seg in &segments {
        if seg.row < 0 {
            return i32::MIN + 1;
        }
        // Deeper is safer
        score += seg.row;
        for (dr, dc) in [(1, 0), (0, -1), (0, 1), (-1, 0)] {
            let (r, c) = (seg.row + dr, seg.col + dc);
            if segments.iter().any(|other| (other.row, other.col) == (r, c)) {
                continue;
            }
            match board.get(r, c).and_then(|cell| cell.color()) {
                Some(color) if color == seg.color => score += if dr == 1 { 14 } else { 8 },
                Some(_) if dr == 1 => score -= 6,
                _ => {}
            }
        }
    }
    // Burying the stack near the top is how games end
    let top = segments.iter().map(|seg| seg.row).min().unwrap_or(0);
    if top < 4 {
        score -= (4 - top) * 25;
    }
    score
}
