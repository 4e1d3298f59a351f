//! Bounce Pop - two small canvas animations over one simulation core
//!
//! Core modules:
//! - `sim`: Simulation (integration, collisions, spawning, clock, levels)
//! - `config`: Clamped numeric inputs for both variants
//! - `records`: Per-level records and the end-of-run summary
//! - `renderer`: Canvas 2D drawing (wasm only)

pub mod config;
pub mod records;
#[cfg(target_arch = "wasm32")]
pub mod renderer;
pub mod sim;

pub use config::{ArcadeConfig, BounceConfig, Config};
pub use records::{LevelRecord, RunSummary};

use glam::DVec2;

/// Simulation constants
pub mod consts {
    /// Largest integration step per frame (seconds)
    pub const MAX_DT: f64 = 0.035;

    /// How long an entity stays in the alert color after a collision or hit (ms)
    pub const FLASH_MS: f64 = 240.0;

    /// Entity radius range (pixels)
    pub const MIN_RADIUS: f64 = 24.0;
    pub const MAX_RADIUS: f64 = 50.0;

    /// Post-collision speed floor as a fraction of the base speed
    pub const MIN_SPEED_FACTOR: f64 = 0.7;
    /// Velocity retained after a wall bounce (1 = elastic)
    pub const BORDER_RESTITUTION: f64 = 1.0;
    /// Stand-in distance for coincident centers
    pub const COINCIDENT_EPSILON: f64 = 0.01;

    /// Random placement candidates per entity before accepting an overlap
    pub const PLACEMENT_ATTEMPTS: u32 = 100;
    /// Extra clearance between freshly placed entities
    pub const PLACEMENT_GAP: f64 = 2.0;

    /// Bounce variant spawn speed jitter and floor (pixels/s)
    pub const SPEED_JITTER: f64 = 40.0;
    pub const MIN_SPAWN_SPEED: f64 = 10.0;

    /// Bounce variant input ranges
    pub const MIN_COUNT: u32 = 2;
    pub const MAX_COUNT: u32 = 300;
    pub const DEFAULT_COUNT: u32 = 20;
    pub const MIN_BASE_SPEED: f64 = 50.0;
    pub const MAX_BASE_SPEED: f64 = 600.0;
    pub const DEFAULT_BASE_SPEED: f64 = 180.0;

    /// Arcade defaults
    pub const ITEMS_PER_LEVEL: u32 = 10;
    pub const LEVELS: u32 = 5;
    /// Speed multiplier added per level past the first
    pub const SPEED_STEP: f64 = 0.15;
    /// Settle time between the last target leaving and the level-end report (ms)
    pub const LEVEL_END_DELAY_MS: f64 = 600.0;
    /// Upward target speed at level 1 (pixels/s)
    pub const RISE_SPEED: f64 = 120.0;
    /// Lateral drift range (pixels/s)
    pub const DRIFT: f64 = 30.0;
    /// Wobble amplitude (pixels) and frequency (Hz) ranges
    pub const WOBBLE_AMPLITUDE: (f64, f64) = (6.0, 18.0);
    pub const WOBBLE_FREQUENCY: (f64, f64) = (0.6, 1.6);
    /// Time for a hit target to fade out (seconds)
    pub const FADE_SECS: f64 = 0.3;
    /// Depth of the band below the screen targets spawn in, as a fraction of height
    pub const SPAWN_BAND: f64 = 0.6;
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: DVec2, b: DVec2) -> f64 {
    (b - a).length()
}

/// Uniform sample from `[lo, hi)`, collapsing to `lo` for an empty range
#[inline]
pub fn sample_span<R: rand::Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

/// Whole-number percentage, 0 when the denominator is 0
#[inline]
pub fn percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        0
    } else {
        ((part as f64 / whole as f64) * 100.0).round() as u32
    }
}
