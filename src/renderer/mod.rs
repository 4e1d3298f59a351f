//! Canvas 2D rendering module
//!
//! Draws entity snapshots and keeps the page's HUD and dialogs in sync with
//! the simulation's events.

pub mod canvas;

pub use canvas::CanvasReporter;
