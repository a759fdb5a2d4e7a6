//! Engine tuning: timings and scoring
//!
//! Defaults reproduce the reference configuration in `consts`. A JSON file can
//! override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings json: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunable engine parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Active capsule drop interval (ms per row)
    pub normal_drop_interval_ms: u32,
    /// Drop interval while soft-drop is held
    pub fast_drop_interval_ms: u32,
    /// Post-clear gravity runs this many times faster than a normal drop
    pub auto_fall_speed_multiplier: u32,
    /// Points per removed cell
    pub score_per_cell: u64,
    /// Random draws allowed while scattering viruses
    pub virus_placement_budget: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            normal_drop_interval_ms: NORMAL_DROP_INTERVAL_MS,
            fast_drop_interval_ms: FAST_DROP_INTERVAL_MS,
            auto_fall_speed_multiplier: AUTO_FALL_SPEED_MULTIPLIER,
            score_per_cell: SCORE_PER_CELL,
            virus_placement_budget: VIRUS_PLACEMENT_BUDGET,
        }
    }
}

impl Settings {
    /// Per-row duration of post-clear gravity
    pub fn fall_interval_ms(&self) -> u32 {
        (self.normal_drop_interval_ms / self.auto_fall_speed_multiplier.max(1)).max(1)
    }

    /// Drop interval in effect for the given soft-drop state
    pub fn drop_interval_ms(&self, soft_drop: bool) -> u32 {
        if soft_drop {
            self.fast_drop_interval_ms
        } else {
            self.normal_drop_interval_ms
        }
    }

    /// Clamp values that would stall or divide by zero
    pub fn validated(mut self) -> Self {
        if self.normal_drop_interval_ms == 0 {
            log::warn!("normal_drop_interval_ms of 0 clamped to 1");
            self.normal_drop_interval_ms = 1;
        }
        if self.fast_drop_interval_ms == 0 {
            log::warn!("fast_drop_interval_ms of 0 clamped to 1");
            self.fast_drop_interval_ms = 1;
        }
        if self.auto_fall_speed_multiplier == 0 {
            log::warn!("auto_fall_speed_multiplier of 0 clamped to 1");
            self.auto_fall_speed_multiplier = 1;
        }
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings.validated())
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
