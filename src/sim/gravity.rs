//! Post-clear gravity
//!
//! Runs in two stages. `prepare` finds every loose object, simulates the whole
//! batch falling on a scratch board to get each object's final drop, lifts the
//! movers off the authoritative board and returns them as `FallingPiece`s.
//! `animate` then reveals those drops one row at a time and writes each piece
//! back when it lands. Animation never changes where a piece ends up.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::board::{Board, Cell, ConnectorTag};
use super::pairs::PairRegistry;
use super::piece::connector_tags;
use crate::consts::{FIELD_COLS, FIELD_ROWS};

/// A rigid 1- or 2-cell group found on the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GravityObject {
    /// 0 for a lone fragment
    pub pair_id: u32,
    /// (row, col, content, tag) in board scan order
    pub cells: Vec<(i32, i32, Cell, Option<ConnectorTag>)>,
}

/// One cell of a piece in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallingCell {
    pub row: i32,
    pub col: i32,
    pub cell: Cell,
    pub tag: Option<ConnectorTag>,
    pub target_row: i32,
}

/// A piece animating toward its precomputed resting place
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallingPiece {
    pub pair_id: u32,
    pub cells: Vec<FallingCell>,
    pub rows_remaining: u32,
    /// Milliseconds accumulated toward the next row
    pub fall_timer_ms: u32,
}

impl FallingPiece {
    pub fn bottom_row(&self) -> i32 {
        self.cells.iter().map(|c| c.row).max().unwrap_or(i32::MIN)
    }

    /// Accumulate time and step down whole rows. Returns true once landed.
    pub fn advance(&mut self, elapsed_ms: u32, row_interval_ms: u32) -> bool {
        let interval = row_interval_ms.max(1);
        self.fall_timer_ms = self.fall_timer_ms.saturating_add(elapsed_ms);
        while self.rows_remaining > 0 && self.fall_timer_ms >= interval {
            self.fall_timer_ms -= interval;
            for cell in &mut self.cells {
                cell.row += 1;
            }
            self.rows_remaining -= 1;
        }
        self.rows_remaining == 0
    }

    /// Write the landed piece back, re-linking and re-tagging a still-paired capsule
    pub fn settle(&self, board: &mut Board, pairs: &mut PairRegistry) {
        for cell in &self.cells {
            board.set(cell.row, cell.col, cell.cell);
            board.set_tag(cell.row, cell.col, cell.tag);
        }
        if self.pair_id != 0 {
            if let [a, b] = self.cells.as_slice() {
                let (tag_a, tag_b) = connector_tags((a.row, a.col), (b.row, b.col));
                board.set_tag(a.row, a.col, Some(tag_a));
                board.set_tag(b.row, b.col, Some(tag_b));
                board.set_pair_id(a.row, a.col, self.pair_id);
                board.set_pair_id(b.row, b.col, self.pair_id);
                pairs.link(self.pair_id, 2);
            }
        }
        log::debug!(
            "Piece settled (pair {}) at bottom row {}",
            self.pair_id,
            self.bottom_row()
        );
    }
}

/// Group every fragment on the board into gravity objects. Viruses never move.
pub fn discover_objects(board: &Board) -> Vec<GravityObject> {
    let mut objects = Vec::new();
    let mut visited_pairs = HashSet::new();

    for (row, col) in Board::positions() {
        let Some(cell) = board.get(row, col) else {
            continue;
        };
        if !cell.is_capsule() {
            continue;
        }
        let pair_id = board.pair_id(row, col);
        let here = (row, col, cell, board.tag(row, col));
        if pair_id != 0 {
            if !visited_pairs.insert(pair_id) {
                continue;
            }
            if let Some((pr, pc)) = board.partner_of(row, col, pair_id) {
                let partner = (pr, pc, board.get(pr, pc).unwrap_or(Cell::EMPTY), board.tag(pr, pc));
                objects.push(GravityObject {
                    pair_id,
                    cells: vec![here, partner],
                });
                continue;
            }
        }
        objects.push(GravityObject {
            pair_id: 0,
            cells: vec![here],
        });
    }
    objects
}

type Scratch = [[Cell; FIELD_COLS]; FIELD_ROWS];

fn can_fall(scratch: &Scratch, cells: &[(i32, i32)]) -> bool {
    cells.iter().all(|&(row, col)| {
        let next = row + 1;
        if next >= FIELD_ROWS as i32 {
            return false;
        }
        scratch[next as usize][col as usize].is_empty() || cells.contains(&(next, col))
    })
}

/// Final drop of every object, simulating all of them falling together
pub fn resting_drops(board: &Board, objects: &[GravityObject]) -> Vec<u32> {
    let mut scratch = board.contents();
    let mut positions: Vec<Vec<(i32, i32)>> = objects
        .iter()
        .map(|obj| obj.cells.iter().map(|&(r, c, _, _)| (r, c)).collect())
        .collect();
    let mut drops = vec![0u32; objects.len()];

    loop {
        let movable: Vec<usize> = (0..positions.len())
            .filter(|&i| can_fall(&scratch, &positions[i]))
            .collect();
        if movable.is_empty() {
            break;
        }
        for &i in &movable {
            for &(r, c) in &positions[i] {
                scratch[r as usize][c as usize] = Cell::EMPTY;
            }
        }
        for &i in &movable {
            for (k, pos) in positions[i].iter_mut().enumerate() {
                pos.0 += 1;
                scratch[pos.0 as usize][pos.1 as usize] = objects[i].cells[k].2;
            }
            drops[i] += 1;
        }
    }
    drops
}

/// Lift every object that will fall off the board and hand back the pieces in flight.
/// Empty result means nothing moves.
pub fn prepare(board: &mut Board, pairs: &mut PairRegistry) -> Vec<FallingPiece> {
    let objects = discover_objects(board);
    if objects.is_empty() {
        return Vec::new();
    }
    let drops = resting_drops(board, &objects);

    let mut falling = Vec::new();
    for (object, drop) in objects.into_iter().zip(drops) {
        if drop == 0 {
            continue;
        }
        for &(row, col, _, _) in &object.cells {
            board.clear(row, col);
        }
        if object.pair_id != 0 {
            pairs.unlink(object.pair_id);
        }
        falling.push(FallingPiece {
            pair_id: object.pair_id,
            cells: object
                .cells
                .iter()
                .map(|&(row, col, cell, tag)| FallingCell {
                    row,
                    col,
                    cell,
                    tag,
                    target_row: row + drop as i32,
                })
                .collect(),
            rows_remaining: drop,
            fall_timer_ms: 0,
        });
    }
    if !falling.is_empty() {
        log::debug!("Gravity: {} pieces falling", falling.len());
    }
    falling
}

/// Advance all pieces in flight, settling the ones that land. Returns how many landed.
pub fn animate(
    falling: &mut Vec<FallingPiece>,
    board: &mut Board,
    pairs: &mut PairRegistry,
    elapsed_ms: u32,
    row_interval_ms: u32,
) -> usize {
    // Lowest pieces first so landings are written bottom-up
    falling.sort_by_key(|piece| std::cmp::Reverse(piece.bottom_row()));

    let mut landed = 0;
    falling.retain_mut(|piece| {
        if piece.advance(elapsed_ms, row_interval_ms) {
            piece.settle(board, pairs);
            landed += 1;
            false
        } else {
            true
        }
    });
    landed
}
