//! Simulation module
//!
//! All motion, collision and level logic lives here. Nothing in this module
//! touches the DOM or a drawing surface:
//! - Seeded RNG owned by each session
//! - Stable iteration order (entity index) for collision pairs
//! - Output only through the `Reporter` trait

pub mod arcade;
pub mod bounce;
pub mod clock;
pub mod collision;
pub mod entity;
pub mod integrator;
pub mod level;
pub mod report;
pub mod spawner;
pub mod timer;

pub use arcade::{ArcadeGame, TickInput};
pub use bounce::BounceWorld;
pub use clock::{Simulation, SimulationClock};
pub use collision::{CollisionConfig, CollisionResult, ResolveStats, resolve_all, resolve_pair};
pub use entity::{ALERT_COLOR, ColorId, Entity, EntitySnapshot, PALETTE, Wobble};
pub use integrator::{Bounds, Walls, integrate, reflect_walls};
pub use level::{Advance, LevelStateMachine, Phase};
pub use report::{EventLog, GameEvent, Hud, NullReporter, Reporter};
pub use spawner::{Placement, spawn_bouncers, spawn_targets};
pub use timer::Timer;
