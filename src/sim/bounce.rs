//! Bouncing-ball session
//!
//! Balls live for the whole session, reflect off all four walls and never
//! drop below the speed floor after a collision.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::clock::Simulation;
use super::collision::{CollisionConfig, ResolveStats, resolve_all};
use super::entity::{Entity, EntitySnapshot};
use super::integrator::{Bounds, Walls, integrate, reflect_walls};
use super::report::Reporter;
use super::spawner::spawn_bouncers;
use crate::config::BounceConfig;
use crate::consts::{BORDER_RESTITUTION, FLASH_MS, MIN_SPEED_FACTOR};

#[derive(Debug, Clone)]
pub struct BounceWorld {
    config: BounceConfig,
    bounds: Bounds,
    entities: Vec<Entity>,
    rng: Pcg32,
    /// Last placement met the non-overlap gap
    overlap_free: bool,
    last_stats: ResolveStats,
    snapshots: Vec<EntitySnapshot>,
}

impl BounceWorld {
    pub fn new(config: BounceConfig, bounds: Bounds) -> Self {
        let config = config.clamped();
        let mut world = Self {
            rng: Pcg32::seed_from_u64(config.seed),
            config,
            bounds,
            entities: Vec::new(),
            overlap_free: true,
            last_stats: ResolveStats::default(),
            snapshots: Vec::new(),
        };
        world.regenerate();
        world
    }

    /// Replace every ball with a fresh batch from the current config
    pub fn regenerate(&mut self) {
        let placement = spawn_bouncers(
            self.config.count,
            self.bounds,
            self.config.base_speed,
            &mut self.rng,
        );
        self.entities = placement.entities;
        self.overlap_free = placement.overlap_free;
        log::info!(
            "Spawned {} balls at base speed {}",
            self.entities.len(),
            self.config.base_speed
        );
    }

    /// Apply new inputs (clamped) and regenerate
    pub fn reconfigure(&mut self, count: u32, base_speed: f64) {
        self.config.count = BounceConfig::clamp_count(count);
        self.config.base_speed = BounceConfig::clamp_speed(base_speed);
        self.regenerate();
    }

    /// Change the base speed without regenerating; affects the collision floor only
    pub fn set_base_speed(&mut self, base_speed: f64) {
        self.config.base_speed = BounceConfig::clamp_speed(base_speed);
    }

    /// Resize the play area; balls are pulled back inside on the next frame
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn config(&self) -> &BounceConfig {
        &self.config
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut Vec<Entity> {
        &mut self.entities
    }

    pub fn overlap_free(&self) -> bool {
        self.overlap_free
    }

    pub fn last_stats(&self) -> ResolveStats {
        self.last_stats
    }

    /// Post-collision speed floor
    pub fn min_speed(&self) -> f64 {
        self.config.base_speed * MIN_SPEED_FACTOR
    }

    fn collision_config(&self) -> CollisionConfig {
        CollisionConfig {
            flash_ms: FLASH_MS,
            min_speed: Some(self.min_speed()),
        }
    }
}

impl Simulation for BounceWorld {
    fn integrate(&mut self, dt: f64, _now_ms: f64) {
        for entity in &mut self.entities {
            integrate(entity, dt, self.bounds, Walls::All, BORDER_RESTITUTION);
        }
    }

    fn resolve(&mut self, now_ms: f64) {
        let config = self.collision_config();
        self.last_stats = resolve_all(&mut self.entities, now_ms, &config, &mut self.rng);
        if self.last_stats.contacts > 0 {
            log::debug!(
                "{} contacts, {} exchanges over {} pairs",
                self.last_stats.contacts,
                self.last_stats.exchanges,
                self.last_stats.pairs
            );
        }
        // Separation can push a ball past a wall
        for entity in &mut self.entities {
            reflect_walls(entity, self.bounds, Walls::All, BORDER_RESTITUTION);
        }
    }

    fn report(&mut self, now_ms: f64, reporter: &mut dyn Reporter) {
        self.snapshots.clear();
        for entity in &mut self.entities {
            entity.settle_flash(now_ms);
            self.snapshots.push(entity.snapshot(now_ms));
        }
        reporter.frame(now_ms, &self.snapshots);
    }
}
