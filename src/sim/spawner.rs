//! Entity batch generation
//!
//! Placement is rejection sampling with a fixed attempt budget per entity.
//! When the budget runs out the last candidate is kept anyway, and the
//! returned [`Placement`] records that the layout is best-effort.

use glam::DVec2;
use rand::Rng;

use super::entity::{ColorId, Entity, Wobble};
use super::integrator::Bounds;
use crate::consts::*;
use crate::sample_span;

/// A freshly spawned batch
#[derive(Debug, Clone)]
pub struct Placement {
    pub entities: Vec<Entity>,
    /// Every entity kept the placement gap from all earlier ones
    pub overlap_free: bool,
}

/// Rectangle candidate centers are drawn from (before shrinking by radius)
#[derive(Debug, Clone, Copy)]
struct Region {
    min: DVec2,
    max: DVec2,
}

impl Region {
    fn sample<R: Rng + ?Sized>(&self, radius: f64, rng: &mut R) -> DVec2 {
        DVec2::new(
            sample_span(rng, self.min.x + radius, self.max.x - radius),
            sample_span(rng, self.min.y + radius, self.max.y - radius),
        )
    }
}

/// Pick a position for a circle of `radius`, avoiding `placed`.
/// Returns the position and whether it met the gap requirement.
fn place<R: Rng + ?Sized>(
    region: Region,
    radius: f64,
    placed: &[Entity],
    rng: &mut R,
) -> (DVec2, bool) {
    let mut candidate = region.sample(radius, rng);
    for attempt in 0..PLACEMENT_ATTEMPTS {
        if attempt > 0 {
            candidate = region.sample(radius, rng);
        }
        let clear = placed.iter().all(|other| {
            crate::distance(candidate, other.pos) >= radius + other.radius() + PLACEMENT_GAP
        });
        if clear {
            return (candidate, true);
        }
    }
    (candidate, false)
}

fn random_radius<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random_range(MIN_RADIUS..=MAX_RADIUS)
}

/// Spawn `count` labelled balls anywhere in `bounds`, moving in random
/// directions at roughly `base_speed`
pub fn spawn_bouncers<R: Rng + ?Sized>(
    count: u32,
    bounds: Bounds,
    base_speed: f64,
    rng: &mut R,
) -> Placement {
    let region = Region {
        min: DVec2::ZERO,
        max: DVec2::new(bounds.width, bounds.height),
    };
    let mut entities: Vec<Entity> = Vec::with_capacity(count as usize);
    let mut overlap_free = true;

    for i in 0..count {
        let radius = random_radius(rng);
        let (pos, clear) = place(region, radius, &entities, rng);
        overlap_free &= clear;

        let angle = rng.random_range(0.0..std::f64::consts::TAU);
        let speed = (base_speed + rng.random_range(-SPEED_JITTER..SPEED_JITTER)).max(MIN_SPAWN_SPEED);
        let vel = DVec2::from_angle(angle) * speed;

        let entity = Entity::new(i + 1, pos, vel, radius, ColorId::random(rng))
            .with_label((i + 1).to_string());
        entities.push(entity);
    }

    if !overlap_free {
        log::warn!("Placed {} balls best-effort; some start overlapping", count);
    }

    Placement {
        entities,
        overlap_free,
    }
}

/// Spawn `count` targets in a band below the visible area, rising at
/// `rise_speed` with lateral drift and wobble
pub fn spawn_targets<R: Rng + ?Sized>(
    count: u32,
    bounds: Bounds,
    rise_speed: f64,
    first_id: u32,
    rng: &mut R,
) -> Placement {
    let band = (bounds.height * SPAWN_BAND).max(2.0 * MAX_RADIUS);
    let region = Region {
        min: DVec2::new(0.0, bounds.height + MAX_RADIUS),
        max: DVec2::new(bounds.width, bounds.height + MAX_RADIUS + band),
    };
    let mut entities: Vec<Entity> = Vec::with_capacity(count as usize);
    let mut overlap_free = true;

    for i in 0..count {
        let radius = random_radius(rng);
        let (pos, clear) = place(region, radius, &entities, rng);
        overlap_free &= clear;

        let vel = DVec2::new(rng.random_range(-DRIFT..DRIFT), -rise_speed);
        let wobble = Wobble {
            amplitude: rng.random_range(WOBBLE_AMPLITUDE.0..WOBBLE_AMPLITUDE.1),
            frequency: rng.random_range(WOBBLE_FREQUENCY.0..WOBBLE_FREQUENCY.1),
            phase: rng.random_range(0.0..std::f64::consts::TAU),
        };

        let entity =
            Entity::new(first_id + i, pos, vel, radius, ColorId::random(rng)).with_wobble(wobble);
        entities.push(entity);
    }

    if !overlap_free {
        log::warn!("Placed {} targets best-effort; some start overlapping", count);
    }

    Placement {
        entities,
        overlap_free,
    }
}
