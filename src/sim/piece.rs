//! Capsule geometry and placement legality
//!
//! Pure functions: no board mutation happens here.

use serde::{Deserialize, Serialize};

use super::board::{Board, Color, ConnectorTag};
use crate::consts::{FIELD_COLS, FIELD_ROWS};

/// Direction from the anchor cell to the second cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Up,
    Right,
    Down,
    Left,
}

/// Rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

impl Orientation {
    /// Cycle order used by rotation
    pub const CYCLE: [Orientation; 4] = [
        Orientation::Up,
        Orientation::Right,
        Orientation::Down,
        Orientation::Left,
    ];

    /// (row, col) offset of the second cell
    pub fn offset(self) -> (i32, i32) {
        match self {
            Orientation::Up => (-1, 0),
            Orientation::Right => (0, 1),
            Orientation::Down => (1, 0),
            Orientation::Left => (0, -1),
        }
    }

    pub fn rotated(self, rotation: Rotation) -> Self {
        let index = Self::CYCLE.iter().position(|&o| o == self).unwrap_or(0);
        let step = match rotation {
            Rotation::Clockwise => 1,
            Rotation::CounterClockwise => Self::CYCLE.len() - 1,
        };
        Self::CYCLE[(index + step) % Self::CYCLE.len()]
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Orientation::Up | Orientation::Down)
    }
}

/// One absolute cell of a capsule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub row: i32,
    pub col: i32,
    pub color: Color,
}

/// Absolute cells of a capsule: anchor first, then anchor + orientation offset
pub fn segment_positions(
    anchor_row: i32,
    anchor_col: i32,
    orientation: Orientation,
    colors: [Color; 2],
) -> [Segment; 2] {
    let (dr, dc) = orientation.offset();
    [
        Segment {
            row: anchor_row,
            col: anchor_col,
            color: colors[0],
        },
        Segment {
            row: anchor_row + dr,
            col: anchor_col + dc,
            color: colors[1],
        },
    ]
}

/// Connector tags for two adjacent cells, by relative position
pub fn connector_tags(a: (i32, i32), b: (i32, i32)) -> (ConnectorTag, ConnectorTag) {
    if a.0 == b.0 {
        if a.1 < b.1 {
            (ConnectorTag::Left, ConnectorTag::Right)
        } else {
            (ConnectorTag::Right, ConnectorTag::Left)
        }
    } else if a.0 < b.0 {
        (ConnectorTag::Top, ConnectorTag::Bottom)
    } else {
        (ConnectorTag::Bottom, ConnectorTag::Top)
    }
}

/// True if every segment fits. Rows above the field are always legal.
pub fn is_placement_legal(segments: &[Segment], board: &Board) -> bool {
    segments.iter().all(|seg| {
        if seg.col < 0 || seg.col >= FIELD_COLS as i32 || seg.row >= FIELD_ROWS as i32 {
            return false;
        }
        if seg.row < 0 {
            return true;
        }
        board.get(seg.row, seg.col).is_some_and(|cell| cell.is_empty())
    })
}
