//! Outbound interface to whatever draws the simulation

use serde::Serialize;

use super::entity::EntitySnapshot;
use super::level::Phase;
use crate::records::{LevelRecord, RunSummary};

/// Lifecycle notifications for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    LevelStarted { level: u32, target: u32 },
    LevelEnded(LevelRecord),
    RunFinished(RunSummary),
    Paused,
    Resumed,
    Reset,
}

/// Counters shown in the heads-up display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub level: u32,
    pub levels: u32,
    pub killed: u32,
    pub escaped: u32,
    pub target: u32,
    /// killed / target as a whole percentage
    pub percent: u32,
    pub phase: Phase,
}

/// Receives per-frame output. All methods default to no-ops.
pub trait Reporter {
    /// Entity state to draw this frame
    fn frame(&mut self, _now_ms: f64, _entities: &[EntitySnapshot]) {}

    fn event(&mut self, _event: &GameEvent) {}

    /// Sent after every state-changing action
    fn hud(&mut self, _hud: &Hud) {}
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {}

/// Keeps events and the latest HUD; handy for headless runs
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    pub events: Vec<GameEvent>,
    pub last_hud: Option<Hud>,
    pub frames: u64,
}

impl EventLog {
    pub fn count(&self, pred: impl Fn(&GameEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Reporter for EventLog {
    fn frame(&mut self, _now_ms: f64, _entities: &[EntitySnapshot]) {
        self.frames += 1;
    }

    fn event(&mut self, event: &GameEvent) {
        self.events.push(event.clone());
    }

    fn hud(&mut self, hud: &Hud) {
        self.last_hud = Some(hud.clone());
    }
}
