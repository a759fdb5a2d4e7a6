//! Run detection and cell removal
//!
//! Horizontal and vertical runs are found independently on the same board,
//! their marks unioned, and only then are cells removed.

use super::board::Board;
use super::pairs::PairRegistry;
use crate::consts::{FIELD_COLS, FIELD_ROWS};

/// Minimum run length that clears
pub const MIN_RUN: usize = 4;

type Marks = [[bool; FIELD_COLS]; FIELD_ROWS];

/// Mark runs along one line of cells given as (row, col) coordinates
fn mark_line(board: &Board, line: &[(i32, i32)], marks: &mut Marks) {
    let mut start = 0;
    while start < line.len() {
        let (row, col) = line[start];
        let Some(color) = board.get(row, col).and_then(|cell| cell.color()) else {
            start += 1;
            continue;
        };
        let mut len = 1;
        while start + len < line.len() {
            let (r, c) = line[start + len];
            if board.get(r, c).and_then(|cell| cell.color()) != Some(color) {
                break;
            }
            len += 1;
        }
        if len >= MIN_RUN {
            for &(r, c) in &line[start..start + len] {
                marks[r as usize][c as usize] = true;
            }
        }
        start += len;
    }
}

/// Cells belonging to any qualifying run, row-major
pub fn find_runs(board: &Board) -> Vec<(i32, i32)> {
    let mut marks: Marks = [[false; FIELD_COLS]; FIELD_ROWS];

    for row in 0..FIELD_ROWS as i32 {
        let line: Vec<_> = (0..FIELD_COLS as i32).map(|col| (row, col)).collect();
        mark_line(board, &line, &mut marks);
    }
    for col in 0..FIELD_COLS as i32 {
        let line: Vec<_> = (0..FIELD_ROWS as i32).map(|row| (row, col)).collect();
        mark_line(board, &line, &mut marks);
    }

    Board::positions()
        .filter(|&(r, c)| marks[r as usize][c as usize])
        .collect()
}

/// Remove every cell in a run of 4+; returns how many cells were removed
pub fn find_and_clear(board: &mut Board, pairs: &mut PairRegistry) -> u32 {
    let mut cleared = 0;
    for (row, col) in find_runs(board) {
        if remove_cell(board, pairs, row, col) {
            cleared += 1;
        }
    }
    if cleared > 0 {
        log::debug!("Cleared {} cells", cleared);
    }
    cleared
}

/// Clear one cell and keep the pair bookkeeping consistent.
///
/// Removing one half of a linked pair severs the link: the registry entry goes
/// away and the surviving half loses its pair id. Returns false if the cell was
/// already empty.
pub fn remove_cell(board: &mut Board, pairs: &mut PairRegistry, row: i32, col: i32) -> bool {
    let Some(cell) = board.get(row, col) else {
        return false;
    };
    if cell.is_empty() {
        return false;
    }
    if cell.is_capsule() {
        let pair_id = board.pair_id(row, col);
        if pair_id != 0 {
            let remaining = pairs.release_one(pair_id);
            if remaining == 1 {
                if let Some((pr, pc)) = board.partner_of(row, col, pair_id) {
                    board.set_pair_id(pr, pc, 0);
                }
            }
        }
    }
    board.clear(row, col);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::board::{Cell, Color, ConnectorTag};
    use proptest::prelude::*;

    fn place_pair(board: &mut Board, pairs: &mut PairRegistry, a: (i32, i32, Color), b: (i32, i32, Color)) -> u32 {
        let id = pairs.mint();
        for (r, c, color) in [a, b] {
            board.set(r, c, Cell::capsule(color));
            board.set_pair_id(r, c, id);
        }
        pairs.link(id, 2);
        id
    }

    #[test]
    fn test_run_of_four_clears_run_of_three_does_not() {
        let mut board = Board::new();
        let mut pairs = PairRegistry::new();
        for col in 0..4 {
            board.set(15, col, Cell::virus(Color::Red));
        }
        for row in 10..13 {
            board.set(row, 6, Cell::virus(Color::Blue));
        }
        assert_eq!(find_and_clear(&mut board, &mut pairs), 4);
        assert_eq!(board.count_viruses(), 3);
        assert_eq!(find_and_clear(&mut board, &mut pairs), 0);
    }

    #[test]
    fn test_different_color_breaks_run() {
        let mut board = Board::new();
        let mut pairs = PairRegistry::new();
        let row = [Color::Red, Color::Red, Color::Blue, Color::Red, Color::Red];
        for (col, color) in row.into_iter().enumerate() {
            board.set(15, col as i32, Cell::virus(color));
        }
        assert_eq!(find_and_clear(&mut board, &mut pairs), 0);
    }

    #[test]
    fn test_viruses_and_fragments_match_by_color() {
        let mut board = Board::new();
        let mut pairs = PairRegistry::new();
        board.set(12, 0, Cell::virus(Color::Yellow));
        board.set(13, 0, Cell::capsule(Color::Yellow));
        board.set(14, 0, Cell::virus(Color::Yellow));
        board.set(15, 0, Cell::capsule(Color::Yellow));
        assert_eq!(find_and_clear(&mut board, &mut pairs), 4);
        assert!(board.is_field_empty());
    }

    #[test]
    fn test_crossing_runs_remove_shared_cell_once() {
        let mut board = Board::new();
        let mut pairs = PairRegistry::new();
        // Plus shape: row 10 cols 1..=4 and col 2 rows 8..=11, sharing (10,2)
        for col in 1..=4 {
            board.set(10, col, Cell::virus(Color::Blue));
        }
        for row in 8..=11 {
            board.set(row, 2, Cell::virus(Color::Blue));
        }
        assert_eq!(find_and_clear(&mut board, &mut pairs), 7);
        assert!(board.is_field_empty());
    }

    #[test]
    fn test_clearing_one_half_unpairs_the_other() {
        let mut board = Board::new();
        let mut pairs = PairRegistry::new();
        let id = place_pair(&mut board, &mut pairs, (5, 3, Color::Red), (5, 4, Color::Blue));
        board.set_tag(5, 3, Some(ConnectorTag::Left));
        board.set_tag(5, 4, Some(ConnectorTag::Right));
        for row in 6..9 {
            board.set(row, 3, Cell::virus(Color::Red));
        }

        assert_eq!(find_and_clear(&mut board, &mut pairs), 4);
        assert!(!pairs.contains(id));
        assert_eq!(board.get(5, 4), Some(Cell::capsule(Color::Blue)));
        assert_eq!(board.pair_id(5, 4), 0);
        // Tag of the survivor is kept for rendering
        assert_eq!(board.tag(5, 4), Some(ConnectorTag::Right));
        assert_eq!(board.tag(5, 3), None);
    }

    #[test]
    fn test_clearing_both_halves_drops_registry_entry() {
        let mut board = Board::new();
        let mut pairs = PairRegistry::new();
        let id = place_pair(&mut board, &mut pairs, (12, 0, Color::Red), (12, 1, Color::Red));
        board.set(12, 2, Cell::virus(Color::Red));
        board.set(12, 3, Cell::virus(Color::Red));
        assert_eq!(find_and_clear(&mut board, &mut pairs), 4);
        assert!(!pairs.contains(id));
        assert!(pairs.is_empty());
        assert!(board.pair_id_grid().iter().flatten().all(|&p| p == 0));
    }

    #[test]
    fn test_remove_empty_cell_is_noop() {
        let mut board = Board::new();
        let mut pairs = PairRegistry::new();
        assert!(!remove_cell(&mut board, &mut pairs, 3, 3));
        assert!(!remove_cell(&mut board, &mut pairs, -1, 3));
    }

    fn arb_board() -> impl Strategy<Value = Board> {
        proptest::collection::vec(0u8..7, FIELD_ROWS * FIELD_COLS).prop_map(|codes| {
            let mut board = Board::new();
            for ((row, col), code) in Board::positions().zip(codes) {
                let cell = match code {
                    1..=3 => Color::from_code(code).map(Cell::virus),
                    4..=6 => Color::from_code(code - 3).map(Cell::capsule),
                    _ => None,
                };
                board.set(row, col, cell.unwrap_or(Cell::EMPTY));
            }
            board
        })
    }

    proptest! {
        #[test]
        fn prop_find_and_clear_is_idempotent(board in arb_board()) {
            let mut board = board;
            let mut pairs = PairRegistry::new();
            find_and_clear(&mut board, &mut pairs);
            prop_assert_eq!(find_and_clear(&mut board, &mut pairs), 0);
        }

        #[test]
        fn prop_cleared_count_matches_vanished_cells(board in arb_board()) {
            let before = Board::positions().filter(|&(r, c)| board.get(r, c).is_some_and(|x| !x.is_empty())).count();
            let mut board = board;
            let mut pairs = PairRegistry::new();
            let cleared = find_and_clear(&mut board, &mut pairs) as usize;
            let after = Board::positions().filter(|&(r, c)| board.get(r, c).is_some_and(|x| !x.is_empty())).count();
            prop_assert_eq!(before - after, cleared);
        }
    }
}
