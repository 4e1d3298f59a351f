//! Circle-circle collision detection and response
//!
//! Masses are equal, so an elastic collision reduces to swapping the normal
//! components of the two velocities. Pairs are resolved one at a time in
//! index order; with three or more simultaneous overlaps later pairs see
//! positions already moved by earlier ones.

use glam::DVec2;
use rand::Rng;

use super::entity::{ColorId, Entity};
use crate::consts::COINCIDENT_EPSILON;

/// Tunables for a resolution pass
#[derive(Debug, Clone, Copy)]
pub struct CollisionConfig {
    /// Alert flash length (ms)
    pub flash_ms: f64,
    /// Speed floor applied after an exchange (bounce variant only)
    pub min_speed: Option<f64>,
}

/// Result of resolving one pair
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the circles overlapped
    pub hit: bool,
    /// Unit normal pointing from `a` to `b`
    pub normal: DVec2,
    /// Overlap depth before separation
    pub penetration: f64,
    /// Whether normal velocities were swapped (false when already separating)
    pub exchanged: bool,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: DVec2::ZERO,
            penetration: 0.0,
            exchanged: false,
        }
    }
}

/// Counters from one full pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub pairs: usize,
    pub contacts: usize,
    pub exchanges: usize,
}

/// Detect and resolve a single pair in place
pub fn resolve_pair<R: Rng + ?Sized>(
    a: &mut Entity,
    b: &mut Entity,
    now_ms: f64,
    config: &CollisionConfig,
    rng: &mut R,
) -> CollisionResult {
    let delta = b.pos - a.pos;
    let mut dist = delta.length();
    let min_dist = a.radius() + b.radius();

    if dist >= min_dist {
        return CollisionResult::miss();
    }

    // Coincident centers: any axis works, pick +x
    let normal = if dist == 0.0 {
        dist = COINCIDENT_EPSILON;
        DVec2::X
    } else {
        delta / dist
    };
    let tangent = normal.perp();

    a.flash(now_ms, config.flash_ms, Some(ColorId::random(rng)));
    b.flash(now_ms, config.flash_ms, Some(ColorId::random(rng)));

    // Split the correction evenly
    let penetration = min_dist - dist;
    let half = normal * (penetration / 2.0);
    a.pos -= half;
    b.pos += half;

    let a_n = a.vel.dot(normal);
    let a_t = a.vel.dot(tangent);
    let b_n = b.vel.dot(normal);
    let b_t = b.vel.dot(tangent);

    // Already moving apart along the normal
    if b_n - a_n > 0.0 {
        return CollisionResult {
            hit: true,
            normal,
            penetration,
            exchanged: false,
        };
    }

    a.vel = normal * b_n + tangent * a_t;
    b.vel = normal * a_n + tangent * b_t;

    if let Some(min_speed) = config.min_speed {
        a.ensure_min_speed(min_speed, -normal);
        b.ensure_min_speed(min_speed, normal);
    }

    CollisionResult {
        hit: true,
        normal,
        penetration,
        exchanged: true,
    }
}

/// Resolve every unordered pair exactly once, in index order
///
/// Pairs where either entity is no longer interactive are counted but skipped.
pub fn resolve_all<R: Rng + ?Sized>(
    entities: &mut [Entity],
    now_ms: f64,
    config: &CollisionConfig,
    rng: &mut R,
) -> ResolveStats {
    let mut stats = ResolveStats::default();

    for i in 0..entities.len() {
        let (head, tail) = entities.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            stats.pairs += 1;
            if !a.is_interactive() || !b.is_interactive() {
                continue;
            }
            let result = resolve_pair(a, b, now_ms, config, rng);
            if result.hit {
                stats.contacts += 1;
            }
            if result.exchanged {
                stats.exchanges += 1;
            }
        }
    }

    stats
}
