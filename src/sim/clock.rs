//! Per-frame driver
//!
//! One call per display refresh: clamp the elapsed time, then run
//! integrate -> resolve -> evict on the owned session and hand the result to
//! the reporter. The clock itself knows nothing about the variant it drives.

use super::report::Reporter;
use crate::consts::MAX_DT;

/// A session the clock can step
pub trait Simulation {
    /// No entity updates this frame (e.g. paused)
    fn suspended(&self) -> bool {
        false
    }

    /// Move every entity by `dt` seconds
    fn integrate(&mut self, dt: f64, now_ms: f64);

    /// Resolve overlapping pairs
    fn resolve(&mut self, now_ms: f64);

    /// Drop entities that left the play area or faded out
    fn evict(&mut self, _now_ms: f64) {}

    /// Publish this frame's state
    fn report(&mut self, now_ms: f64, reporter: &mut dyn Reporter);
}

#[derive(Debug, Clone)]
pub struct SimulationClock<S> {
    sim: S,
    last_ms: Option<f64>,
    max_dt: f64,
    frames: u64,
}

impl<S: Simulation> SimulationClock<S> {
    pub fn new(sim: S) -> Self {
        Self {
            sim,
            last_ms: None,
            max_dt: MAX_DT,
            frames: 0,
        }
    }

    pub fn with_max_dt(mut self, max_dt: f64) -> Self {
        self.max_dt = max_dt.max(0.0);
        self
    }

    pub fn state(&self) -> &S {
        &self.sim
    }

    /// Mutable access between frames (user actions, resize)
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.sim
    }

    pub fn into_state(self) -> S {
        self.sim
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Seconds since the previous frame, clamped to `[0, max_dt]`.
    /// The first frame has nothing to measure against and gets 0.
    pub fn step_for(&self, now_ms: f64) -> f64 {
        match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0).clamp(0.0, self.max_dt),
            None => 0.0,
        }
    }

    /// Run one frame; returns the dt used
    pub fn frame(&mut self, now_ms: f64, reporter: &mut dyn Reporter) -> f64 {
        let dt = self.step_for(now_ms);
        self.last_ms = Some(now_ms);
        self.frames += 1;

        if !self.sim.suspended() {
            self.sim.integrate(dt, now_ms);
            self.sim.resolve(now_ms);
            self.sim.evict(now_ms);
        }
        self.sim.report(now_ms, reporter);
        dt
    }
}
