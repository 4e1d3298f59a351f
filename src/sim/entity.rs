//! Moving circles and their visual state

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fill colors entities cycle through after a collision
pub const PALETTE: [&str; 7] = [
    "#60a5fa", "#34d399", "#fbbf24", "#f472b6", "#a78bfa", "#22d3ee", "#f87171",
];

/// Fill used while an entity is flashing
pub const ALERT_COLOR: &str = "red";

/// Index into [`PALETTE`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorId(pub u8);

impl ColorId {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.random_range(0..PALETTE.len()) as u8)
    }

    pub fn hex(self) -> &'static str {
        PALETTE[self.0 as usize % PALETTE.len()]
    }
}

/// Sinusoidal lateral sway layered on top of horizontal drift
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wobble {
    /// Peak lateral offset (pixels)
    pub amplitude: f64,
    /// Oscillations per second
    pub frequency: f64,
    /// Phase offset (radians)
    pub phase: f64,
}

impl Wobble {
    /// Lateral velocity contributed at `age` seconds (derivative of the offset)
    pub fn velocity(&self, age: f64) -> f64 {
        let omega = std::f64::consts::TAU * self.frequency;
        self.amplitude * omega * (omega * age + self.phase).cos()
    }
}

/// A moving circle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub pos: DVec2,
    /// Velocity in pixels per second
    pub vel: DVec2,
    radius: f64,
    pub base_color: ColorId,
    /// Color adopted once the current flash expires
    pub pending_color: Option<ColorId>,
    /// Timestamp (ms) the flash ends at
    pub flash_until: f64,
    pub label: Option<String>,
    pub wobble: Option<Wobble>,
    /// Seconds since spawn
    pub age: f64,
    /// Opacity; hit targets fade to 0
    pub alpha: f64,
    /// Popped by the player
    pub hit: bool,
    /// Left through the top edge without being hit
    pub escaped: bool,
}

impl Entity {
    pub fn new(id: u32, pos: DVec2, vel: DVec2, radius: f64, color: ColorId) -> Self {
        Self {
            id,
            pos,
            vel,
            radius,
            base_color: color,
            pending_color: None,
            flash_until: 0.0,
            label: None,
            wobble: None,
            age: 0.0,
            alpha: 1.0,
            hit: false,
            escaped: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_wobble(mut self, wobble: Wobble) -> Self {
        self.wobble = Some(wobble);
        self
    }

    /// Radius is fixed at construction
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.vel.length()
    }

    #[inline]
    pub fn is_flashing(&self, now_ms: f64) -> bool {
        now_ms < self.flash_until
    }

    /// Start a flash lasting `duration_ms` and queue the color to show afterwards
    pub fn flash(&mut self, now_ms: f64, duration_ms: f64, next_color: Option<ColorId>) {
        self.flash_until = now_ms + duration_ms;
        if next_color.is_some() {
            self.pending_color = next_color;
        }
    }

    /// Apply the queued color once the flash window has elapsed
    pub fn settle_flash(&mut self, now_ms: f64) {
        if !self.is_flashing(now_ms) {
            if let Some(color) = self.pending_color.take() {
                self.base_color = color;
            }
        }
    }

    /// Fill color to draw with at `now_ms`
    pub fn fill(&self, now_ms: f64) -> &'static str {
        if self.is_flashing(now_ms) {
            ALERT_COLOR
        } else {
            self.base_color.hex()
        }
    }

    /// Pointer containment test (boundary counts as inside)
    #[inline]
    pub fn contains(&self, point: DVec2) -> bool {
        crate::distance(point, self.pos) <= self.radius
    }

    /// Still part of the active set
    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.escaped && self.alpha > 0.0
    }

    /// Can be hit or collided with
    #[inline]
    pub fn is_interactive(&self) -> bool {
        !self.hit && !self.escaped
    }

    /// Rescale velocity up to `min_speed` if slower, keeping its direction.
    /// A stationary entity has no direction and is sent along `fallback`.
    pub fn ensure_min_speed(&mut self, min_speed: f64, fallback: DVec2) {
        let speed = self.speed();
        if speed >= min_speed {
            return;
        }
        if speed > 1e-9 {
            self.vel *= min_speed / speed;
        } else {
            self.vel = fallback.normalize_or(DVec2::X) * min_speed;
        }
    }

    pub fn snapshot(&self, now_ms: f64) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            x: self.pos.x,
            y: self.pos.y,
            radius: self.radius,
            fill: self.fill(now_ms),
            flashing: self.is_flashing(now_ms),
            label: self.label.clone(),
            alpha: self.alpha,
        }
    }
}

/// What the renderer needs to draw one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySnapshot {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub fill: &'static str,
    pub flashing: bool,
    pub label: Option<String>,
    pub alpha: f64,
}
