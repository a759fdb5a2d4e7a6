//! Read-only view of the engine for presentation layers
//!
//! A `Snapshot` is a plain data copy: a renderer can draw from it (or ship it
//! as JSON) without touching the live state.

use serde::{Deserialize, Serialize};

use super::board::{Board, Cell, Color, ConnectorTag};
use super::piece::Orientation;
use super::state::{GameState, GameStatus};
use crate::consts::{FIELD_COLS, FIELD_ROWS};

/// One half of the active capsule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentView {
    pub row: i32,
    pub col: i32,
    pub color: Color,
    pub tag: ConnectorTag,
}

/// One cell of a piece in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallingCellView {
    pub row: i32,
    pub col: i32,
    pub color: Color,
    pub tag: Option<ConnectorTag>,
    pub target_row: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Cell codes, row-major (0 empty, 1..=3 virus, 11..=13 fragment)
    pub board: Vec<Vec<u8>>,
    pub tags: Vec<Vec<Option<ConnectorTag>>>,
    /// Empty when no capsule is under player control
    pub active: Vec<SegmentView>,
    /// One entry per piece in flight
    pub falling: Vec<Vec<FallingCellView>>,
    pub next_colors: [Color; 2],
    pub next_orientation: Orientation,
    pub score: u64,
    pub viruses_remaining: u32,
    pub level: u32,
    pub status: GameStatus,
    pub level_clear_pending: bool,
    pub drop_interval_ms: u32,
}

impl GameState {
    pub fn snapshot(&self) -> Snapshot {
        let active = match &self.active {
            Some(capsule) => {
                let (tag_a, tag_b) = capsule.connector_tags();
                capsule
                    .segments()
                    .iter()
                    .zip([tag_a, tag_b])
                    .map(|(seg, tag)| SegmentView {
                        row: seg.row,
                        col: seg.col,
                        color: seg.color,
                        tag,
                    })
                    .collect()
            }
            None => Vec::new(),
        };

        let falling = self
            .falling
            .iter()
            .map(|piece| {
                piece
                    .cells
                    .iter()
                    .filter_map(|cell| {
                        Some(FallingCellView {
                            row: cell.row,
                            col: cell.col,
                            color: cell.cell.color()?,
                            tag: cell.tag,
                            target_row: cell.target_row,
                        })
                    })
                    .collect()
            })
            .collect();

        Snapshot {
            board: self.board.code_grid(),
            tags: self.board.tag_grid(),
            active,
            falling,
            next_colors: self.next.colors,
            next_orientation: self.next.preview_orientation(),
            score: self.score,
            viruses_remaining: self.viruses_remaining,
            level: self.level,
            status: self.status(),
            level_clear_pending: self.level_clear_pending,
            drop_interval_ms: self.drop_interval_ms(),
        }
    }
}

impl Snapshot {
    /// Text picture of the bottle with the active capsule and falling pieces drawn in.
    ///
    /// Viruses are lowercase, fragments uppercase. Cells above the field are not shown.
    pub fn render_ascii(&self) -> String {
        let mut grid: Vec<Vec<char>> = self
            .board
            .iter()
            .map(|row| row.iter().map(|&code| Cell::from_code(code).glyph()).collect())
            .collect();

        let mut overlay = |row: i32, col: i32, color: Color| {
            if Board::in_bounds(row, col) {
                grid[row as usize][col as usize] = Cell::capsule(color).glyph();
            }
        };
        for seg in &self.active {
            overlay(seg.row, seg.col, seg.color);
        }
        for cell in self.falling.iter().flatten() {
            overlay(cell.row, cell.col, cell.color);
        }

        let mut out = String::with_capacity((FIELD_COLS + 3) * (FIELD_ROWS + 3));
        out.push_str(&format!(
            "level {}  score {}  viruses {}  {:?}\n",
            self.level, self.score, self.viruses_remaining, self.status
        ));
        out.push_str(&format!(
            "next {}{}\n",
            Cell::capsule(self.next_colors[0]).glyph(),
            Cell::capsule(self.next_colors[1]).glyph()
        ));
        for row in &grid {
            out.push('|');
            out.extend(row.iter());
            out.push_str("|\n");
        }
        out.push('+');
        out.push_str(&"-".repeat(FIELD_COLS));
        out.push_str("+\n");
        out
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
