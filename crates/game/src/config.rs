//! Game configuration.
//!
//! Defaults match the classic board: 10x20 cells, one automatic step per
//! second, a 10 ms tick.
//!
//! # Environment Variables
//!
//! - `BLOCCS_FIELD_WIDTH`: field width in cells (default: 10)
//! - `BLOCCS_FIELD_HEIGHT`: field height in cells (default: 20)
//! - `BLOCCS_FALL_SPEED`: automatic fall rate in cells per second (default: 1.0)
//! - `BLOCCS_TICK_MS`: tick period in milliseconds (default: 10)
//! - `BLOCCS_SEED`: piece generator seed (default: 1)
//! - `BLOCCS_BUS_CAPACITY`: per-topic event buffer (default: 256)
//!
//! Unset or unparsable values fall back to the default; [`GameConfig::validate`]
//! rejects values that parse but make no sense.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use crate::types::{DEFAULT_FALL_SPEED, DEFAULT_FIELD_HEIGHT, DEFAULT_FIELD_WIDTH, PIECE_BOX, TICK_MS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    /// Cells per second
    pub fall_speed: f64,
    pub tick_ms: u64,
    pub seed: u32,
    pub bus_capacity: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_FIELD_WIDTH,
            height: DEFAULT_FIELD_HEIGHT,
            fall_speed: DEFAULT_FALL_SPEED,
            tick_ms: TICK_MS,
            seed: 1,
            bus_capacity: bloccs_event::DEFAULT_CAPACITY,
        }
    }
}

impl GameConfig {
    /// Read `BLOCCS_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (environment, parsed file, test map)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
            lookup(key).and_then(|s| s.trim().parse().ok())
        }

        let defaults = Self::default();
        Self {
            width: parse(&lookup, "BLOCCS_FIELD_WIDTH").unwrap_or(defaults.width),
            height: parse(&lookup, "BLOCCS_FIELD_HEIGHT").unwrap_or(defaults.height),
            fall_speed: parse(&lookup, "BLOCCS_FALL_SPEED").unwrap_or(defaults.fall_speed),
            tick_ms: parse(&lookup, "BLOCCS_TICK_MS").unwrap_or(defaults.tick_ms),
            seed: parse(&lookup, "BLOCCS_SEED").unwrap_or(defaults.seed),
            bus_capacity: parse(&lookup, "BLOCCS_BUS_CAPACITY").unwrap_or(defaults.bus_capacity),
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.width >= PIECE_BOX && self.height >= PIECE_BOX,
            "field must be at least {}x{}, got {}x{}",
            PIECE_BOX,
            PIECE_BOX,
            self.width,
            self.height
        );
        ensure!(
            self.fall_speed.is_finite() && self.fall_speed > 0.0,
            "fall speed must be a positive number of cells per second, got {}",
            self.fall_speed
        );
        ensure!(self.tick_ms >= 1, "tick period must be at least 1 ms");
        ensure!(self.bus_capacity >= 1, "bus capacity must be at least 1");
        Ok(())
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}
