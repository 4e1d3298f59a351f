//! Pop-the-targets session
//!
//! Targets rise from below the screen. Clicking one pops it (it flashes and
//! fades out); a target that leaves through the top escapes. Once the level's
//! batch is gone the level machine schedules the level-end report.
//!
//! Lifecycle actions are applied between frames. Pointer activations are
//! queued and only interpreted at the start of the next frame.

use glam::DVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::clock::Simulation;
use super::collision::{CollisionConfig, resolve_all};
use super::entity::{Entity, EntitySnapshot};
use super::integrator::{Bounds, Walls, above_top, integrate, reflect_walls};
use super::level::{Advance, LevelStateMachine, Phase};
use super::report::{GameEvent, Hud, Reporter};
use super::spawner::spawn_targets;
use crate::config::ArcadeConfig;
use crate::consts::{BORDER_RESTITUTION, FADE_SECS, FLASH_MS, MIN_SPEED_FACTOR};
use crate::records::{LevelRecord, RunSummary};

/// Input gathered between frames
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer activations, in arrival order
    pub clicks: Vec<DVec2>,
}

#[derive(Debug, Clone)]
pub struct ArcadeGame {
    config: ArcadeConfig,
    bounds: Bounds,
    entities: Vec<Entity>,
    rng: Pcg32,
    level: LevelStateMachine,
    input: TickInput,
    /// Events waiting for the next report
    outbox: Vec<GameEvent>,
    hud_dirty: bool,
    next_id: u32,
    snapshots: Vec<EntitySnapshot>,
}

impl ArcadeGame {
    pub fn new(config: ArcadeConfig, bounds: Bounds) -> Self {
        let config = config.clamped();
        Self {
            rng: Pcg32::seed_from_u64(config.seed),
            level: LevelStateMachine::new(&config),
            config,
            bounds,
            entities: Vec::new(),
            input: TickInput::default(),
            outbox: Vec::new(),
            hud_dirty: true,
            next_id: 1,
            snapshots: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.level.phase()
    }

    pub fn level(&self) -> &LevelStateMachine {
        &self.level
    }

    pub fn hud(&self) -> Hud {
        self.level.hud()
    }

    pub fn records(&self) -> &[LevelRecord] {
        self.level.records()
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        self.level.summary()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut Vec<Entity> {
        &mut self.entities
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    /// Topmost target under the pointer that can still be popped
    pub fn entity_at(&self, x: f64, y: f64) -> Option<&Entity> {
        let point = DVec2::new(x, y);
        self.entities
            .iter()
            .rev()
            .find(|e| e.is_interactive() && e.contains(point))
    }

    /// Queue a pointer activation for the next frame
    pub fn click(&mut self, x: f64, y: f64) -> bool {
        if self.level.phase() != Phase::Running {
            return false;
        }
        self.input.clicks.push(DVec2::new(x, y));
        true
    }

    pub fn start(&mut self) -> bool {
        if !self.level.start() {
            return false;
        }
        self.begin_level();
        true
    }

    pub fn pause(&mut self) -> bool {
        if !self.level.pause() {
            return false;
        }
        self.input.clicks.clear();
        self.emit(GameEvent::Paused);
        true
    }

    pub fn resume(&mut self) -> bool {
        if !self.level.resume() {
            return false;
        }
        self.emit(GameEvent::Resumed);
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.level.phase() {
            Phase::Running => self.pause(),
            Phase::Paused => self.resume(),
            _ => false,
        }
    }

    /// Confirm the level report
    pub fn next_level(&mut self) -> bool {
        match self.level.next_level() {
            Some(Advance::NextLevel { .. }) => {
                self.begin_level();
                true
            }
            Some(Advance::Finished(summary)) => {
                self.entities.clear();
                self.emit(GameEvent::RunFinished(summary));
                true
            }
            None => false,
        }
    }

    /// Stop after the current level report
    pub fn end_run(&mut self) -> bool {
        match self.level.end_run() {
            Some(summary) => {
                self.entities.clear();
                self.emit(GameEvent::RunFinished(summary));
                true
            }
            None => false,
        }
    }

    /// Restart at level 1; cancels any pending level-end report
    pub fn reset(&mut self) -> bool {
        if !self.level.reset() {
            return false;
        }
        self.emit(GameEvent::Reset);
        self.begin_level();
        true
    }

    fn emit(&mut self, event: GameEvent) {
        self.outbox.push(event);
        self.hud_dirty = true;
    }

    /// Spawn the batch for the level the machine is now on
    fn begin_level(&mut self) {
        let rise_speed = self.rise_speed();
        let placement = spawn_targets(
            self.level.target(),
            self.bounds,
            rise_speed,
            self.next_id,
            &mut self.rng,
        );
        self.next_id += placement.entities.len() as u32;
        self.entities = placement.entities;
        self.input.clicks.clear();
        log::info!(
            "Level {} begins: {} targets rising at {:.0} px/s",
            self.level.level(),
            self.entities.len(),
            rise_speed
        );
        self.emit(GameEvent::LevelStarted {
            level: self.level.level(),
            target: self.level.target(),
        });
    }

    /// Upward speed of the current level's targets
    fn rise_speed(&self) -> f64 {
        self.config.rise_speed * self.level.speed_multiplier()
    }

    fn apply_clicks(&mut self, now_ms: f64) {
        let clicks = std::mem::take(&mut self.input.clicks);
        for point in clicks {
            let Some(entity) = self
                .entities
                .iter_mut()
                .rev()
                .find(|e| e.is_interactive() && e.contains(point))
            else {
                continue;
            };
            entity.hit = true;
            entity.flash(now_ms, FLASH_MS, None);
            self.level.record_hit();
            self.hud_dirty = true;
        }
    }
}

impl Simulation for ArcadeGame {
    fn suspended(&self) -> bool {
        self.level.phase() != Phase::Running
    }

    fn integrate(&mut self, dt: f64, now_ms: f64) {
        self.apply_clicks(now_ms);
        self.level.advance_clock(dt);

        for entity in &mut self.entities {
            integrate(entity, dt, self.bounds, Walls::Sides, BORDER_RESTITUTION);
            if entity.hit {
                entity.alpha = (entity.alpha - dt / FADE_SECS).max(0.0);
            }
        }
    }

    fn resolve(&mut self, now_ms: f64) {
        let config = CollisionConfig {
            flash_ms: FLASH_MS,
            min_speed: None,
        };
        resolve_all(&mut self.entities, now_ms, &config, &mut self.rng);

        // Live targets keep rising so every one eventually leaves the top
        let lift = self.rise_speed() * MIN_SPEED_FACTOR;
        for entity in &mut self.entities {
            if entity.is_interactive() {
                entity.vel.y = entity.vel.y.min(-lift);
            }
            reflect_walls(entity, self.bounds, Walls::Sides, BORDER_RESTITUTION);
        }
    }

    fn evict(&mut self, now_ms: f64) {
        for entity in &mut self.entities {
            if entity.is_interactive() && above_top(entity) {
                entity.escaped = true;
                self.level.record_escape();
                self.hud_dirty = true;
            }
        }
        self.entities.retain(|e| e.is_alive());

        if self.entities.is_empty() && self.level.notify_cleared(now_ms) {
            log::debug!("Level {} cleared, report pending", self.level.level());
        }
        if let Some(record) = self.level.poll(now_ms) {
            self.emit(GameEvent::LevelEnded(record));
        }
    }

    fn report(&mut self, now_ms: f64, reporter: &mut dyn Reporter) {
        self.snapshots.clear();
        for entity in &mut self.entities {
            entity.settle_flash(now_ms);
            self.snapshots.push(entity.snapshot(now_ms));
        }
        reporter.frame(now_ms, &self.snapshots);

        for event in self.outbox.drain(..) {
            reporter.event(&event);
        }
        if self.hud_dirty {
            self.hud_dirty = false;
            reporter.hud(&self.level.hud());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{ITEMS_PER_LEVEL, LEVEL_END_DELAY_MS};
    use crate::sim::clock::SimulationClock;
    use crate::sim::report::EventLog;

    const FRAME_MS: f64 = 16.0;

    fn game(config: ArcadeConfig) -> SimulationClock<ArcadeGame> {
        SimulationClock::new(ArcadeGame::new(config, Bounds::new(800.0, 600.0)))
    }

    fn ended(e: &GameEvent) -> bool {
        matches!(e, GameEvent::LevelEnded(_))
    }

    /// Run frames until `done` or the frame budget runs out; returns the final timestamp
    fn run_until(
        clock: &mut SimulationClock<ArcadeGame>,
        log: &mut EventLog,
        mut now: f64,
        max_frames: usize,
        mut each: impl FnMut(&mut ArcadeGame),
        done: impl Fn(&EventLog) -> bool,
    ) -> f64 {
        for _ in 0..max_frames {
            each(clock.state_mut());
            clock.frame(now, log);
            now += FRAME_MS;
            if done(log) {
                break;
            }
        }
        now
    }

    #[test]
    fn test_nothing_moves_before_start() {
        let mut clock = game(ArcadeConfig::default());
        let mut log = EventLog::default();
        clock.frame(0.0, &mut log);
        clock.frame(16.0, &mut log);
        assert_eq!(clock.state().phase(), Phase::NotStarted);
        assert!(clock.state().entities().is_empty());
        assert!(!clock.state_mut().click(10.0, 10.0));
        assert!(!clock.state_mut().reset());
    }

    #[test]
    fn test_start_spawns_a_level() {
        let mut clock = game(ArcadeConfig::default());
        let mut log = EventLog::default();
        assert!(clock.state_mut().start());
        clock.frame(0.0, &mut log);

        assert_eq!(clock.state().entities().len(), ITEMS_PER_LEVEL as usize);
        assert_eq!(
            log.events,
            vec![GameEvent::LevelStarted {
                level: 1,
                target: ITEMS_PER_LEVEL
            }]
        );
        let hud = log.last_hud.clone().expect("hud sent");
        assert_eq!(hud.level, 1);
        assert_eq!(hud.phase, Phase::Running);
    }

    #[test]
    fn test_all_targets_escape() {
        let mut clock = game(ArcadeConfig {
            seed: 11,
            ..ArcadeConfig::default()
        });
        let mut log = EventLog::default();
        clock.state_mut().start();

        let now = run_until(&mut clock, &mut log, 0.0, 60 * 60, |_| {}, |l| l.count(ended) > 0);

        assert_eq!(log.count(ended), 1);
        assert!(clock.state().entities().is_empty());
        let record = match log.events.iter().find(|e| ended(e)) {
            Some(GameEvent::LevelEnded(r)) => r.clone(),
            _ => unreachable!(),
        };
        assert_eq!(record.level, 1);
        assert_eq!(record.escaped, 10);
        assert_eq!(record.killed, 0);
        assert_eq!(record.killed + record.escaped, ITEMS_PER_LEVEL);
        assert_eq!(record.efficiency_pct, 0);
        assert!(record.elapsed_sec > 0.0);
        assert_eq!(clock.state().phase(), Phase::LevelEndPending);

        // Nothing more fires while waiting on the player
        run_until(&mut clock, &mut log, now, 200, |_| {}, |_| false);
        assert_eq!(log.count(ended), 1);
    }

    #[test]
    fn test_click_pops_target() {
        let mut clock = game(ArcadeConfig::default());
        let mut log = EventLog::default();
        clock.state_mut().start();
        clock.frame(0.0, &mut log);

        let (id, pos) = {
            let e = &clock.state().entities()[0];
            (e.id, e.pos)
        };
        assert!(clock.state_mut().click(pos.x, pos.y));
        // Not applied until the next frame
        assert_eq!(clock.state().level().killed(), 0);

        clock.frame(FRAME_MS, &mut log);
        assert_eq!(clock.state().level().killed(), 1);
        let popped = clock
            .state()
            .entities()
            .iter()
            .find(|e| e.id == id)
            .expect("fading, still present");
        assert!(popped.hit);
        assert!(popped.alpha < 1.0);
        assert!(clock.state().entity_at(popped.pos.x, popped.pos.y).map(|e| e.id) != Some(id));
        assert_eq!(log.last_hud.as_ref().map(|h| h.percent), Some(10));

        // Fully faded after FADE_SECS and evicted
        let mut now = 2.0 * FRAME_MS;
        for _ in 0..40 {
            clock.frame(now, &mut log);
            now += FRAME_MS;
        }
        assert!(clock.state().entities().iter().all(|e| e.id != id));
        assert_eq!(clock.state().entities().len(), ITEMS_PER_LEVEL as usize - 1);
        // Nine targets still in play, so the level has not ended
        assert_eq!(log.count(ended), 0);
        assert_eq!(clock.state().phase(), Phase::Running);
    }

    #[test]
    fn test_click_on_empty_space() {
        let mut clock = game(ArcadeConfig::default());
        let mut log = EventLog::default();
        clock.state_mut().start();
        clock.frame(0.0, &mut log);
        clock.state_mut().click(-500.0, -500.0);
        clock.frame(FRAME_MS, &mut log);
        assert_eq!(clock.state().level().killed(), 0);
    }

    #[test]
    fn test_pause_freezes_targets() {
        let mut clock = game(ArcadeConfig::default());
        let mut log = EventLog::default();
        clock.state_mut().start();
        clock.frame(0.0, &mut log);
        clock.frame(FRAME_MS, &mut log);

        assert!(clock.state_mut().toggle_pause());
        let before: Vec<DVec2> = clock.state().entities().iter().map(|e| e.pos).collect();
        assert!(!clock.state_mut().click(before[0].x, before[0].y));

        let mut now = 2.0 * FRAME_MS;
        for _ in 0..30 {
            clock.frame(now, &mut log);
            now += FRAME_MS;
        }
        let after: Vec<DVec2> = clock.state().entities().iter().map(|e| e.pos).collect();
        assert_eq!(before, after);
        assert_eq!(log.count(|e| *e == GameEvent::Paused), 1);

        assert!(clock.state_mut().toggle_pause());
        clock.frame(now, &mut log);
        clock.frame(now + FRAME_MS, &mut log);
        assert_eq!(log.count(|e| *e == GameEvent::Resumed), 1);
        let moved: Vec<DVec2> = clock.state().entities().iter().map(|e| e.pos).collect();
        assert_ne!(before, moved);
    }

    #[test]
    fn test_reset_cancels_pending_level_end() {
        let mut clock = game(ArcadeConfig::default());
        let mut log = EventLog::default();
        clock.state_mut().start();
        clock.frame(0.0, &mut log);

        // Everything jumps off the top at once
        for e in clock.state_mut().entities_mut() {
            e.pos.y = -500.0;
        }
        clock.frame(FRAME_MS, &mut log);
        assert!(clock.state().entities().is_empty());
        assert!(clock.state().level().is_transition_pending());
        assert_eq!(clock.state().level().escaped(), ITEMS_PER_LEVEL);

        assert!(clock.state_mut().reset());
        let mut now = 2.0 * FRAME_MS;
        let frames = (2.0 * LEVEL_END_DELAY_MS / FRAME_MS) as usize;
        for _ in 0..frames {
            clock.frame(now, &mut log);
            now += FRAME_MS;
        }

        let state = clock.state();
        assert_eq!(log.count(ended), 0);
        assert_eq!(log.count(|e| *e == GameEvent::Reset), 1);
        assert_eq!(state.level().level(), 1);
        assert_eq!(state.level().killed(), 0);
        assert_eq!(state.level().escaped(), 0);
        assert!(!state.level().is_transition_pending());
        assert_eq!(state.entities().len(), ITEMS_PER_LEVEL as usize);
    }

    #[test]
    fn test_full_run_popping_everything() {
        let mut clock = game(ArcadeConfig {
            items_per_level: 4,
            levels: 2,
            seed: 5,
            ..ArcadeConfig::default()
        });
        let mut log = EventLog::default();
        clock.state_mut().start();

        let pop_all = |g: &mut ArcadeGame| {
            let targets: Vec<DVec2> = g
                .entities()
                .iter()
                .filter(|e| e.is_interactive())
                .map(|e| e.pos)
                .collect();
            for p in targets {
                g.click(p.x, p.y);
            }
        };

        let now = run_until(&mut clock, &mut log, 0.0, 600, pop_all, |l| l.count(ended) == 1);
        assert_eq!(clock.state().records()[0].killed, 4);
        assert_eq!(clock.state().records()[0].efficiency_pct, 100);

        assert!(clock.state_mut().next_level());
        assert_eq!(clock.state().level().level(), 2);
        let rise = clock.state().entities()[0].vel.y;
        assert!(rise < 0.0);

        run_until(&mut clock, &mut log, now, 600, pop_all, |l| l.count(ended) == 2);
        assert!(clock.state_mut().next_level());
        assert_eq!(clock.state().phase(), Phase::Finished);
        clock.frame(1e6, &mut log);

        let summary = clock.state().summary().expect("run finished").clone();
        assert_eq!(summary.total_killed, 8);
        assert_eq!(summary.total_escaped, 0);
        assert_eq!(summary.efficiency_pct, 100);
        assert_eq!(log.count(|e| matches!(e, GameEvent::RunFinished(_))), 1);
        assert!(!clock.state_mut().next_level());
    }

    #[test]
    fn test_end_run_after_level() {
        let mut clock = game(ArcadeConfig::default());
        let mut log = EventLog::default();
        clock.state_mut().start();
        clock.frame(0.0, &mut log);
        assert!(!clock.state_mut().end_run());

        for e in clock.state_mut().entities_mut() {
            e.pos.y = -500.0;
        }
        let mut now = FRAME_MS;
        for _ in 0..60 {
            clock.frame(now, &mut log);
            now += FRAME_MS;
        }
        assert_eq!(clock.state().phase(), Phase::LevelEndPending);
        assert!(clock.state_mut().end_run());
        assert_eq!(clock.state().phase(), Phase::Finished);
        assert_eq!(clock.state().summary().map(|s| s.total_escaped), Some(ITEMS_PER_LEVEL));
    }

    #[test]
    fn test_slow_rise_levels_always_end() {
        let bounds = Bounds::new(400.0, 600.0);
        let rise_speed = 20.0;
        let lift = rise_speed * MIN_SPEED_FACTOR;

        for seed in 0..12 {
            let config = ArcadeConfig {
                rise_speed,
                seed,
                ..ArcadeConfig::default()
            };
            let mut clock = SimulationClock::new(ArcadeGame::new(config, bounds));
            let mut log = EventLog::default();
            clock.state_mut().start();

            let mut now = 0.0;
            for _ in 0..12_000 {
                clock.frame(now, &mut log);
                now += FRAME_MS;

                let game = clock.state();
                assert!(
                    game.entities()
                        .iter()
                        .filter(|e| e.is_interactive())
                        .all(|e| e.vel.y <= -lift + 1e-9),
                    "seed {}: a live target stopped rising",
                    seed
                );
                if log.count(ended) > 0 {
                    break;
                }
                assert_eq!(game.phase(), Phase::Running);
            }

            let game = clock.state();
            assert_eq!(game.phase(), Phase::LevelEndPending, "seed {} never ended", seed);
            assert!(game.entities().is_empty());
            let record = &game.records()[0];
            assert_eq!(record.killed + record.escaped, ITEMS_PER_LEVEL);
        }
    }
}
