//! Board storage: content codes plus the parallel pair-id and connector grids
//!
//! A content code packs kind and colour into one byte. Viruses use the bare
//! colour code (1..=3); capsule fragments add `CAPSULE_OFFSET`. Every other
//! subsystem derives "is this a fragment" and "which colour" from that byte.

use serde::{Deserialize, Serialize};

use crate::consts::{FIELD_COLS, FIELD_ROWS};

/// Offset separating fragment codes from virus codes
const CAPSULE_OFFSET: u8 = 10;

/// Cell colours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Blue,
    Yellow,
}

impl Color {
    pub const ALL: [Color; 3] = [Color::Red, Color::Blue, Color::Yellow];

    /// Numeric colour code (1-based, 0 means "no colour")
    pub fn code(self) -> u8 {
        match self {
            Color::Red => 1,
            Color::Blue => 2,
            Color::Yellow => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Color::Red),
            2 => Some(Color::Blue),
            3 => Some(Color::Yellow),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Yellow => "yellow",
        }
    }
}

/// Content code of a single board cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cell(u8);

impl Cell {
    pub const EMPTY: Cell = Cell(0);

    pub fn virus(color: Color) -> Self {
        Cell(color.code())
    }

    pub fn capsule(color: Color) -> Self {
        Cell(color.code() + CAPSULE_OFFSET)
    }

    /// Rebuild a cell from a raw code; anything unrecognised reads as empty
    pub fn from_code(code: u8) -> Self {
        match Color::from_code(code % CAPSULE_OFFSET) {
            Some(color) if code < CAPSULE_OFFSET => Cell::virus(color),
            Some(color) if code < 2 * CAPSULE_OFFSET => Cell::capsule(color),
            _ => Cell::EMPTY,
        }
    }

    /// Raw code as stored in the grid
    #[inline]
    pub fn code(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn is_virus(self) -> bool {
        self.0 > 0 && self.0 < CAPSULE_OFFSET
    }

    #[inline]
    pub fn is_capsule(self) -> bool {
        self.0 >= CAPSULE_OFFSET
    }

    /// Colour regardless of kind; viruses and fragments of one colour match
    pub fn color(self) -> Option<Color> {
        if self.is_empty() {
            return None;
        }
        Color::from_code(self.0 % CAPSULE_OFFSET)
    }

    /// Single-character glyph for text dumps
    pub fn glyph(self) -> char {
        match (self.color(), self.is_capsule()) {
            (Some(Color::Red), false) => 'r',
            (Some(Color::Blue), false) => 'b',
            (Some(Color::Yellow), false) => 'y',
            (Some(Color::Red), true) => 'R',
            (Some(Color::Blue), true) => 'B',
            (Some(Color::Yellow), true) => 'Y',
            (None, _) => '.',
        }
    }
}

/// Cosmetic orientation of a fragment relative to its partner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectorTag {
    Top,
    Bottom,
    Left,
    Right,
}

impl ConnectorTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectorTag::Top => "top",
            ConnectorTag::Bottom => "bottom",
            ConnectorTag::Left => "left",
            ConnectorTag::Right => "right",
        }
    }
}

/// Authoritative playfield. Row 0 is the top visible row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [[Cell; FIELD_COLS]; FIELD_ROWS],
    /// Nonzero only on fragments still linked to their partner
    pair_ids: [[u32; FIELD_COLS]; FIELD_ROWS],
    tags: [[Option<ConnectorTag>; FIELD_COLS]; FIELD_ROWS],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [[Cell::EMPTY; FIELD_COLS]; FIELD_ROWS],
            pair_ids: [[0; FIELD_COLS]; FIELD_ROWS],
            tags: [[None; FIELD_COLS]; FIELD_ROWS],
        }
    }

    #[inline]
    fn index(row: i32, col: i32) -> Option<(usize, usize)> {
        if row < 0 || col < 0 || row >= FIELD_ROWS as i32 || col >= FIELD_COLS as i32 {
            return None;
        }
        Some((row as usize, col as usize))
    }

    #[inline]
    pub fn in_bounds(row: i32, col: i32) -> bool {
        Self::index(row, col).is_some()
    }

    /// Content at (row, col); `None` outside the field
    #[inline]
    pub fn get(&self, row: i32, col: i32) -> Option<Cell> {
        Self::index(row, col).map(|(r, c)| self.cells[r][c])
    }

    pub fn set(&mut self, row: i32, col: i32, cell: Cell) {
        if let Some((r, c)) = Self::index(row, col) {
            self.cells[r][c] = cell;
        }
    }

    /// Pair id at (row, col); 0 when unpaired or outside the field
    #[inline]
    pub fn pair_id(&self, row: i32, col: i32) -> u32 {
        Self::index(row, col).map_or(0, |(r, c)| self.pair_ids[r][c])
    }

    pub fn set_pair_id(&mut self, row: i32, col: i32, pair_id: u32) {
        if let Some((r, c)) = Self::index(row, col) {
            self.pair_ids[r][c] = pair_id;
        }
    }

    #[inline]
    pub fn tag(&self, row: i32, col: i32) -> Option<ConnectorTag> {
        Self::index(row, col).and_then(|(r, c)| self.tags[r][c])
    }

    pub fn set_tag(&mut self, row: i32, col: i32, tag: Option<ConnectorTag>) {
        if let Some((r, c)) = Self::index(row, col) {
            self.tags[r][c] = tag;
        }
    }

    /// Wipe content, pair id and tag at one cell (no registry bookkeeping)
    pub fn clear(&mut self, row: i32, col: i32) {
        if let Some((r, c)) = Self::index(row, col) {
            self.cells[r][c] = Cell::EMPTY;
            self.pair_ids[r][c] = 0;
            self.tags[r][c] = None;
        }
    }

    /// Copy of the content grid (used as a scratch board by gravity)
    pub fn contents(&self) -> [[Cell; FIELD_COLS]; FIELD_ROWS] {
        self.cells
    }

    /// All in-field coordinates in row-major order
    pub fn positions() -> impl Iterator<Item = (i32, i32)> {
        (0..FIELD_ROWS as i32).flat_map(|row| (0..FIELD_COLS as i32).map(move |col| (row, col)))
    }

    /// Other cell carrying `pair_id`, searched among the 4 neighbours
    pub fn partner_of(&self, row: i32, col: i32, pair_id: u32) -> Option<(i32, i32)> {
        if pair_id == 0 {
            return None;
        }
        [(-1, 0), (1, 0), (0, -1), (0, 1)]
            .into_iter()
            .map(|(dr, dc)| (row + dr, col + dc))
            .find(|&(r, c)| self.pair_id(r, c) == pair_id)
    }

    pub fn count_viruses(&self) -> u32 {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| cell.is_virus())
            .count() as u32
    }

    pub fn is_field_empty(&self) -> bool {
        self.cells.iter().flatten().all(|cell| cell.is_empty())
    }

    /// Raw content codes, row-major, for renderers
    pub fn code_grid(&self) -> Vec<Vec<u8>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|cell| cell.code()).collect())
            .collect()
    }

    pub fn tag_grid(&self) -> Vec<Vec<Option<ConnectorTag>>> {
        self.tags.iter().map(|row| row.to_vec()).collect()
    }

    pub fn pair_id_grid(&self) -> Vec<Vec<u32>> {
        self.pair_ids.iter().map(|row| row.to_vec()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_encoding_round_trips_kind_and_color() {
        for color in Color::ALL {
            let virus = Cell::virus(color);
            let frag = Cell::capsule(color);
            assert!(virus.is_virus() && !virus.is_capsule());
            assert!(frag.is_capsule() && !frag.is_virus());
            assert_eq!(virus.color(), Some(color));
            assert_eq!(frag.color(), Some(color));
            assert_eq!(frag.code(), virus.code() + 10);
            assert_eq!(Cell::from_code(frag.code()), frag);
        }
        assert!(Cell::EMPTY.is_empty());
        assert_eq!(Cell::EMPTY.color(), None);
        assert_eq!(Cell::from_code(7), Cell::EMPTY);
        assert_eq!(Cell::from_code(42), Cell::EMPTY);
    }

    #[test]
    fn test_out_of_bounds_access_is_inert() {
        let mut board = Board::new();
        board.set(-1, 3, Cell::virus(Color::Red));
        board.set(16, 0, Cell::virus(Color::Red));
        board.set(0, 8, Cell::virus(Color::Red));
        assert!(board.is_field_empty());
        assert_eq!(board.get(-1, 3), None);
        assert_eq!(board.pair_id(99, 99), 0);
    }

    #[test]
    fn test_partner_lookup_and_virus_count() {
        let mut board = Board::new();
        board.set(5, 2, Cell::capsule(Color::Blue));
        board.set(5, 3, Cell::capsule(Color::Red));
        board.set_pair_id(5, 2, 7);
        board.set_pair_id(5, 3, 7);
        board.set(15, 0, Cell::virus(Color::Yellow));

        assert_eq!(board.partner_of(5, 2, 7), Some((5, 3)));
        assert_eq!(board.partner_of(5, 3, 7), Some((5, 2)));
        assert_eq!(board.partner_of(5, 3, 0), None);
        assert_eq!(board.count_viruses(), 1);

        board.clear(5, 3);
        assert_eq!(board.partner_of(5, 2, 7), None);
        assert_eq!(board.tag(5, 3), None);
    }
}
