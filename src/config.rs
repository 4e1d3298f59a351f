//! Numeric inputs for both variants
//!
//! Values from the page or a JSON file are clamped into safe ranges rather
//! than rejected; missing fields fall back to defaults.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Bouncing-ball toy inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BounceConfig {
    /// Number of balls
    pub count: u32,
    /// Nominal speed (pixels/s)
    pub base_speed: f64,
    /// RNG seed for placement and colors
    pub seed: u64,
}

impl Default for BounceConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            base_speed: DEFAULT_BASE_SPEED,
            seed: 0,
        }
    }
}

impl BounceConfig {
    /// Count clamped to `[MIN_COUNT, MAX_COUNT]`; 0 means "unset" and takes the default
    pub fn clamp_count(count: u32) -> u32 {
        if count == 0 {
            DEFAULT_COUNT
        } else {
            count.clamp(MIN_COUNT, MAX_COUNT)
        }
    }

    /// Speed clamped to `[MIN_BASE_SPEED, MAX_BASE_SPEED]`; non-finite or 0 takes the default
    pub fn clamp_speed(speed: f64) -> f64 {
        if !speed.is_finite() || speed == 0.0 {
            DEFAULT_BASE_SPEED
        } else {
            speed.clamp(MIN_BASE_SPEED, MAX_BASE_SPEED)
        }
    }

    /// Parse loosely typed text inputs (form fields), clamping the result.
    /// Blank, unparseable or zero counts take the default; anything else,
    /// negatives included, is clamped into range.
    pub fn from_inputs(count: &str, speed: &str, seed: u64) -> Self {
        let count = match count.trim().parse::<f64>() {
            Ok(c) if !c.is_nan() && c != 0.0 => c.clamp(MIN_COUNT as f64, MAX_COUNT as f64) as u32,
            _ => 0,
        };
        Self {
            count: Self::clamp_count(count),
            base_speed: Self::clamp_speed(speed.trim().parse().unwrap_or(0.0)),
            seed,
        }
    }

    pub fn clamped(&self) -> Self {
        Self {
            count: Self::clamp_count(self.count),
            base_speed: Self::clamp_speed(self.base_speed),
            seed: self.seed,
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Self>(json).map(|c| c.clamped())
    }
}

/// Pop-the-targets game inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcadeConfig {
    /// Targets per level
    pub items_per_level: u32,
    /// Levels in a run
    pub levels: u32,
    /// Speed multiplier added per level past the first
    pub speed_step: f64,
    /// Settle time before the level-end report (ms)
    pub level_end_delay_ms: f64,
    /// Level-1 upward speed (pixels/s)
    pub rise_speed: f64,
    pub seed: u64,
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            items_per_level: ITEMS_PER_LEVEL,
            levels: LEVELS,
            speed_step: SPEED_STEP,
            level_end_delay_ms: LEVEL_END_DELAY_MS,
            rise_speed: RISE_SPEED,
            seed: 0,
        }
    }
}

impl ArcadeConfig {
    pub fn clamped(&self) -> Self {
        let finite_or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
        Self {
            items_per_level: self.items_per_level.clamp(1, 100),
            levels: self.levels.clamp(1, 50),
            speed_step: finite_or(self.speed_step, SPEED_STEP).clamp(0.0, 2.0),
            level_end_delay_ms: finite_or(self.level_end_delay_ms, LEVEL_END_DELAY_MS)
                .clamp(0.0, 5000.0),
            rise_speed: finite_or(self.rise_speed, RISE_SPEED).clamp(20.0, 1000.0),
            seed: self.seed,
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Self>(json).map(|c| c.clamped())
    }
}

/// Both configs in one file, for the native demo
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bounce: BounceConfig,
    pub arcade: ArcadeConfig,
}

impl Config {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Self>(json).map(|c| Self {
            bounce: c.bounce.clamped(),
            arcade: c.arcade.clamped(),
        })
    }
}
