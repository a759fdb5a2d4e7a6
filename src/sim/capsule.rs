//! Active capsule controller: spawn, shift, rotate with kicks, drop

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::board::{Board, Color, ConnectorTag};
use super::piece::{Orientation, Rotation, Segment, connector_tags, is_placement_legal, segment_positions};
use crate::consts::{SPAWN_COL, SPAWN_ROW};

/// Rotation kick trials (row, col), tried in order: stay, left, right, up, down
pub const KICKS: [(i32, i32); 5] = [(0, 0), (0, -1), (0, 1), (-1, 0), (1, 0)];

/// Orientations a fresh capsule may spawn in
const SPAWN_ORIENTATIONS: [Orientation; 2] = [Orientation::Right, Orientation::Down];

/// Colours and orientation of a capsule that has not spawned yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapsuleSpec {
    pub colors: [Color; 2],
    pub orientation: Orientation,
}

impl CapsuleSpec {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let a = Color::ALL[rng.random_range(0..Color::ALL.len())];
        let b = Color::ALL[rng.random_range(0..Color::ALL.len())];
        let orientation = SPAWN_ORIENTATIONS[rng.random_range(0..SPAWN_ORIENTATIONS.len())];
        Self {
            colors: [a, b],
            orientation,
        }
    }

    /// Orientation used to draw the preview (always reads left-to-right or top-to-bottom)
    pub fn preview_orientation(&self) -> Orientation {
        match self.orientation {
            Orientation::Left => Orientation::Right,
            Orientation::Up => Orientation::Down,
            other => other,
        }
    }
}

/// Result of a gravity step on the active capsule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Moved,
    /// Could not descend; the caller must lock the capsule
    LockRequested,
}

/// The single player-controlled falling capsule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCapsule {
    /// Anchor row (may be negative while in the spawn buffer)
    pub row: i32,
    pub col: i32,
    pub orientation: Orientation,
    /// Anchor colour, then the offset cell's colour
    pub colors: [Color; 2],
}

impl ActiveCapsule {
    /// Place `spec` at the spawn point; `None` if the spawn cells are occupied
    pub fn spawn(spec: &CapsuleSpec, board: &Board) -> Option<Self> {
        let capsule = Self {
            row: SPAWN_ROW,
            col: SPAWN_COL,
            orientation: spec.orientation,
            colors: spec.colors,
        };
        is_placement_legal(&capsule.segments(), board).then_some(capsule)
    }

    pub fn segments(&self) -> [Segment; 2] {
        segment_positions(self.row, self.col, self.orientation, self.colors)
    }

    fn segments_at(&self, orientation: Orientation, dr: i32, dc: i32) -> [Segment; 2] {
        segment_positions(self.row + dr, self.col + dc, orientation, self.colors)
    }

    /// Tags for the anchor and offset cells, in that order
    pub fn connector_tags(&self) -> (ConnectorTag, ConnectorTag) {
        let [a, b] = self.segments();
        connector_tags((a.row, a.col), (b.row, b.col))
    }

    /// Translate if legal; returns whether it moved
    pub fn try_translate(&mut self, dr: i32, dc: i32, board: &Board) -> bool {
        if !is_placement_legal(&self.segments_at(self.orientation, dr, dc), board) {
            return false;
        }
        self.row += dr;
        self.col += dc;
        true
    }

    /// Horizontal move by -1, 0 or +1 columns
    pub fn shift(&mut self, delta: i8, board: &Board) -> bool {
        let dc = i32::from(delta.signum());
        if dc == 0 {
            return false;
        }
        self.try_translate(0, dc, board)
    }

    /// Rotate one step, committing the first legal kick. Silent no-op if none fits.
    pub fn rotate(&mut self, rotation: Rotation, board: &Board) -> bool {
        let next = self.orientation.rotated(rotation);
        for (dr, dc) in KICKS {
            if is_placement_legal(&self.segments_at(next, dr, dc), board) {
                self.orientation = next;
                self.row += dr;
                self.col += dc;
                return true;
            }
        }
        false
    }

    pub fn drop_one(&mut self, board: &Board) -> DropOutcome {
        if self.try_translate(1, 0, board) {
            DropOutcome::Moved
        } else {
            DropOutcome::LockRequested
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::board::Cell;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn capsule(row: i32, col: i32, orientation: Orientation) -> ActiveCapsule {
        ActiveCapsule {
            row,
            col,
            orientation,
            colors: [Color::Red, Color::Yellow],
        }
    }

    #[test]
    fn test_spawn_uses_spec_and_spawn_point() {
        let board = Board::new();
        let spec = CapsuleSpec {
            colors: [Color::Blue, Color::Red],
            orientation: Orientation::Down,
        };
        let c = ActiveCapsule::spawn(&spec, &board).expect("empty board accepts spawn");
        assert_eq!((c.row, c.col), (SPAWN_ROW, SPAWN_COL));
        assert_eq!(c.orientation, Orientation::Down);
        assert_eq!(c.colors, [Color::Blue, Color::Red]);
    }

    #[test]
    fn test_spawn_blocked_by_row_zero() {
        let mut board = Board::new();
        for col in 0..8 {
            board.set(0, col, Cell::virus(Color::Red));
        }
        let down = CapsuleSpec {
            colors: [Color::Blue, Color::Red],
            orientation: Orientation::Down,
        };
        assert_eq!(ActiveCapsule::spawn(&down, &board), None);
    }

    #[test]
    fn test_shift_stops_at_walls() {
        let board = Board::new();
        let mut c = capsule(5, 0, Orientation::Right);
        assert!(!c.shift(-1, &board));
        assert_eq!(c.col, 0);
        assert!(c.shift(1, &board));
        assert_eq!(c.col, 1);
        let mut c = capsule(5, 6, Orientation::Right);
        assert!(!c.shift(1, &board));
        assert_eq!(c.col, 6);
        assert!(!c.shift(0, &board));
    }

    #[test]
    fn test_rotate_without_kick_in_open_space() {
        let board = Board::new();
        let mut c = capsule(5, 3, Orientation::Right);
        assert!(c.rotate(Rotation::Clockwise, &board));
        assert_eq!((c.row, c.col, c.orientation), (5, 3, Orientation::Down));
        assert!(c.rotate(Rotation::CounterClockwise, &board));
        assert_eq!(c.orientation, Orientation::Right);
    }

    #[test]
    fn test_right_wall_kick_prefers_shift_left() {
        let board = Board::new();
        // Vertical against the right wall; clockwise wants (5,8)
        let mut c = capsule(5, 7, Orientation::Up);
        assert!(c.rotate(Rotation::Clockwise, &board));
        assert_eq!((c.row, c.col, c.orientation), (5, 6, Orientation::Right));
    }

    #[test]
    fn test_left_kick_beats_right_and_up() {
        let mut board = Board::new();
        // Right -> Down needs (6,3); left, right and up kicks would all fit
        board.set(6, 3, Cell::virus(Color::Blue));
        let mut c = capsule(5, 3, Orientation::Right);
        assert!(c.rotate(Rotation::Clockwise, &board));
        assert_eq!((c.row, c.col, c.orientation), (5, 2, Orientation::Down));
    }

    #[test]
    fn test_right_kick_beats_up() {
        let mut board = Board::new();
        board.set(6, 3, Cell::virus(Color::Blue));
        board.set(6, 2, Cell::virus(Color::Blue));
        let mut c = capsule(5, 3, Orientation::Right);
        assert!(c.rotate(Rotation::Clockwise, &board));
        assert_eq!((c.row, c.col, c.orientation), (5, 4, Orientation::Down));
    }

    #[test]
    fn test_up_kick_beats_down() {
        let mut board = Board::new();
        // Down -> Left needs (5,2); stay, left and right blocked, up and down both fit
        board.set(5, 2, Cell::virus(Color::Blue));
        board.set(5, 4, Cell::virus(Color::Blue));
        let mut c = capsule(5, 3, Orientation::Down);
        assert!(c.rotate(Rotation::Clockwise, &board));
        assert_eq!((c.row, c.col, c.orientation), (4, 3, Orientation::Left));
    }

    #[test]
    fn test_kick_falls_through_to_up_then_down() {
        let mut board = Board::new();
        board.set(5, 6, Cell::virus(Color::Blue));
        // Down -> Left needs (5,6); left kick blocked by the virus, right kick off-field
        let mut c = capsule(5, 7, Orientation::Down);
        assert!(c.rotate(Rotation::Clockwise, &board));
        assert_eq!((c.row, c.col, c.orientation), (4, 7, Orientation::Left));

        board.set(4, 6, Cell::virus(Color::Blue));
        let mut c = capsule(5, 7, Orientation::Down);
        assert!(c.rotate(Rotation::Clockwise, &board));
        assert_eq!((c.row, c.col, c.orientation), (6, 7, Orientation::Left));
    }

    #[test]
    fn test_rotate_fails_silently_when_boxed_in() {
        let mut board = Board::new();
        for (r, c) in [(4, 6), (5, 6), (6, 6), (7, 7)] {
            board.set(r, c, Cell::virus(Color::Blue));
        }
        let mut c = capsule(5, 7, Orientation::Down);
        let before = c;
        assert!(!c.rotate(Rotation::Clockwise, &board));
        assert_eq!(c, before);
    }

    #[test]
    fn test_rotation_may_poke_into_spawn_buffer() {
        let board = Board::new();
        let mut c = capsule(0, 3, Orientation::Right);
        assert!(c.rotate(Rotation::CounterClockwise, &board));
        assert_eq!(c.orientation, Orientation::Up);
        assert_eq!(c.segments()[1].row, -1);
    }

    #[test]
    fn test_drop_requests_lock_on_floor() {
        let board = Board::new();
        let mut c = capsule(13, 3, Orientation::Down);
        assert_eq!(c.drop_one(&board), DropOutcome::Moved);
        assert_eq!(c.row, 14);
        assert_eq!(c.drop_one(&board), DropOutcome::LockRequested);
        assert_eq!(c.row, 14);
    }

    #[test]
    fn test_random_spec_uses_spawn_orientations() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..64 {
            let spec = CapsuleSpec::random(&mut rng);
            assert!(matches!(spec.orientation, Orientation::Right | Orientation::Down));
            assert_eq!(spec.preview_orientation(), spec.orientation);
        }
    }
}
