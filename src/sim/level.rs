//! Arcade level lifecycle
//!
//! ```text
//! NotStarted -> Running <-> Paused
//! Running -> LevelEndPending -> Running(level + 1) | Finished
//! ```
//!
//! Out-of-state actions are no-ops and report `false` / `None`.

use serde::{Deserialize, Serialize};

use super::report::Hud;
use super::timer::Timer;
use crate::config::ArcadeConfig;
use crate::records::{LevelRecord, RunSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the first start
    NotStarted,
    /// Targets moving
    Running,
    /// Frozen by the player
    Paused,
    /// Level report shown, waiting for next level / end run
    LevelEndPending,
    /// Run summary shown
    Finished,
}

/// What `next_level` moved to
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    NextLevel { level: u32, speed_multiplier: f64 },
    Finished(RunSummary),
}

#[derive(Debug, Clone)]
pub struct LevelStateMachine {
    phase: Phase,
    level: u32,
    killed: u32,
    escaped: u32,
    target: u32,
    levels: u32,
    speed_step: f64,
    end_delay_ms: f64,
    /// Running time on the current level (seconds)
    elapsed_sec: f64,
    records: Vec<LevelRecord>,
    level_end: Timer,
    summary: Option<RunSummary>,
}

impl LevelStateMachine {
    pub fn new(config: &ArcadeConfig) -> Self {
        Self {
            phase: Phase::NotStarted,
            level: 1,
            killed: 0,
            escaped: 0,
            target: config.items_per_level,
            levels: config.levels,
            speed_step: config.speed_step,
            end_delay_ms: config.level_end_delay_ms,
            elapsed_sec: 0.0,
            records: Vec::new(),
            level_end: Timer::new(),
            summary: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn killed(&self) -> u32 {
        self.killed
    }

    pub fn escaped(&self) -> u32 {
        self.escaped
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn records(&self) -> &[LevelRecord] {
        &self.records
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    /// A level-end report is scheduled but hasn't fired yet
    pub fn is_transition_pending(&self) -> bool {
        self.level_end.is_pending()
    }

    /// Speed factor for the current level
    pub fn speed_multiplier(&self) -> f64 {
        1.0 + (self.level.saturating_sub(1)) as f64 * self.speed_step
    }

    pub fn is_last_level(&self) -> bool {
        self.level >= self.levels
    }

    pub fn hud(&self) -> Hud {
        Hud {
            level: self.level,
            levels: self.levels,
            killed: self.killed,
            escaped: self.escaped,
            target: self.target,
            percent: crate::percent(self.killed, self.target),
            phase: self.phase,
        }
    }

    fn begin_level(&mut self, level: u32) {
        self.level_end.cancel();
        self.level = level;
        self.killed = 0;
        self.escaped = 0;
        self.elapsed_sec = 0.0;
        self.phase = Phase::Running;
    }

    pub fn start(&mut self) -> bool {
        if self.phase != Phase::NotStarted {
            return false;
        }
        self.records.clear();
        self.summary = None;
        self.begin_level(1);
        log::info!("Run started");
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        self.phase = Phase::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase != Phase::Paused {
            return false;
        }
        self.phase = Phase::Running;
        true
    }

    /// Count a popped target, capped at the level target
    pub fn record_hit(&mut self) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        self.killed = (self.killed + 1).min(self.target);
        true
    }

    /// Count a target lost through the top, capped at the level target
    pub fn record_escape(&mut self) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        self.escaped = (self.escaped + 1).min(self.target);
        true
    }

    /// Accumulate running time on the current level
    pub fn advance_clock(&mut self, dt: f64) {
        if self.phase == Phase::Running {
            self.elapsed_sec += dt;
        }
    }

    /// Every target is gone: arm the level-end report. Ignored while a
    /// report is already pending or outside `Running`.
    pub fn notify_cleared(&mut self, now_ms: f64) -> bool {
        if self.phase != Phase::Running || self.level_end.is_pending() {
            return false;
        }
        self.level_end.schedule(now_ms, self.end_delay_ms);
        true
    }

    /// Fire the level-end report if its delay has elapsed
    pub fn poll(&mut self, now_ms: f64) -> Option<LevelRecord> {
        if self.phase != Phase::Running || !self.level_end.fire_due(now_ms) {
            return None;
        }
        let record = LevelRecord::new(self.level, self.killed, self.escaped, self.elapsed_sec);
        self.records.push(record.clone());
        self.phase = Phase::LevelEndPending;
        log::info!(
            "Level {} ended: {} popped, {} escaped ({}%)",
            record.level,
            record.killed,
            record.escaped,
            record.efficiency_pct
        );
        Some(record)
    }

    /// Confirm the level report: go to the next level, or finish after the last
    pub fn next_level(&mut self) -> Option<Advance> {
        if self.phase != Phase::LevelEndPending {
            return None;
        }
        if self.is_last_level() {
            return Some(Advance::Finished(self.finish()));
        }
        let level = self.level + 1;
        self.begin_level(level);
        log::info!("Level {} started", level);
        Some(Advance::NextLevel {
            level,
            speed_multiplier: self.speed_multiplier(),
        })
    }

    /// Stop after the current level report
    pub fn end_run(&mut self) -> Option<RunSummary> {
        if self.phase != Phase::LevelEndPending {
            return None;
        }
        Some(self.finish())
    }

    fn finish(&mut self) -> RunSummary {
        let summary = RunSummary::from_records(&self.records);
        self.phase = Phase::Finished;
        self.summary = Some(summary.clone());
        log::info!(
            "Run finished: {} popped, {} escaped over {} levels ({}%)",
            summary.total_killed,
            summary.total_escaped,
            summary.levels.len(),
            summary.efficiency_pct
        );
        summary
    }

    /// Back to level 1 with everything cleared; valid once the run has started
    pub fn reset(&mut self) -> bool {
        if self.phase == Phase::NotStarted {
            return false;
        }
        self.records.clear();
        self.summary = None;
        self.begin_level(1);
        log::info!("Run reset");
        true
    }
}
