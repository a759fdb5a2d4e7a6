//! Level configuration and virus placement

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::board::{Board, Cell, Color};
use crate::consts::*;

/// Virus layout parameters for one level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Level after clamping to the supported range
    pub level: u32,
    pub virus_target: u32,
    /// Highest row viruses may occupy; rows above it stay clear
    pub min_row: usize,
}

impl LevelConfig {
    pub fn for_level(level: u32) -> Self {
        let level = level.clamp(MIN_LEVEL, MAX_LEVEL);
        // Higher levels reach further up the bottle, never into the safe rows
        let min_row = SAFE_ROWS.max(FIELD_ROWS.saturating_sub(6 + level as usize / 2));
        let available_rows = FIELD_ROWS - min_row;
        let max_viruses = (available_rows * FIELD_COLS).saturating_sub(4) as u32;
        let virus_target = (VIRUS_BASE + VIRUS_PER_LEVEL * level).min(max_viruses).max(4);
        Self {
            level,
            virus_target,
            min_row,
        }
    }

    /// Scatter viruses into empty cells below `min_row`.
    ///
    /// At most `budget` random draws are made, so this always terminates; a
    /// crowded board can end up with fewer viruses than the target.
    pub fn place_viruses<R: Rng + ?Sized>(&self, board: &mut Board, rng: &mut R, budget: u32) -> u32 {
        let mut placed = 0;
        let mut draws = 0;
        while placed < self.virus_target && draws < budget {
            draws += 1;
            let row = rng.random_range(self.min_row..FIELD_ROWS) as i32;
            let col = rng.random_range(0..FIELD_COLS) as i32;
            if !board.get(row, col).is_some_and(|cell| cell.is_empty()) {
                continue;
            }
            let color = Color::ALL[rng.random_range(0..Color::ALL.len())];
            board.set(row, col, Cell::virus(color));
            placed += 1;
        }
        if placed < self.virus_target {
            log::warn!(
                "Level {}: placed {} of {} viruses before the draw budget ran out",
                self.level,
                placed,
                self.virus_target
            );
        }
        placed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_level_zero_config() {
        let cfg = LevelConfig::for_level(0);
        assert_eq!(cfg.min_row, 10);
        assert_eq!(cfg.virus_target, 8);
    }

    #[test]
    fn test_high_levels_respect_safe_rows_and_capacity() {
        let cfg = LevelConfig::for_level(20);
        assert_eq!(cfg.min_row, SAFE_ROWS);
        assert_eq!(cfg.virus_target, 68);
        assert!(cfg.virus_target <= ((FIELD_ROWS - cfg.min_row) * FIELD_COLS - 4) as u32);
    }

    #[test]
    fn test_out_of_range_level_is_clamped() {
        assert_eq!(LevelConfig::for_level(999), LevelConfig::for_level(MAX_LEVEL));
    }

    #[test]
    fn test_viruses_land_below_min_row() {
        let mut rng = Pcg32::seed_from_u64(42);
        for level in [0, 5, 10, 20] {
            let cfg = LevelConfig::for_level(level);
            let mut board = Board::new();
            let placed = cfg.place_viruses(&mut board, &mut rng, VIRUS_PLACEMENT_BUDGET);
            assert_eq!(placed, cfg.virus_target);
            assert_eq!(board.count_viruses(), placed);
            for (row, col) in Board::positions() {
                if board.get(row, col).is_some_and(|c| c.is_virus()) {
                    assert!(row as usize >= cfg.min_row);
                }
            }
        }
    }

    #[test]
    fn test_exhausted_budget_stops_short() {
        let mut rng = Pcg32::seed_from_u64(1);
        let cfg = LevelConfig::for_level(20);
        let mut board = Board::new();
        let placed = cfg.place_viruses(&mut board, &mut rng, 5);
        assert!(placed <= 5);
        assert!(placed < cfg.virus_target);
    }
}
