//! Motion integration and wall reflection
//!
//! Walls are checked against the current position before translating so a
//! fast entity can't tunnel through an edge in one step, then once more
//! after translating so nothing is left outside `[radius, bound - radius]`.

use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// The play area (origin at top-left, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }
}

/// Which edges reflect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Walls {
    /// All four edges (bounce variant)
    All,
    /// Left and right only; targets enter from below and leave through the top
    Sides,
}

/// Advance `entity` by `dt` seconds inside `bounds`
pub fn integrate(entity: &mut Entity, dt: f64, bounds: Bounds, walls: Walls, restitution: f64) {
    reflect_walls(entity, bounds, walls, restitution);

    let mut step = entity.vel;
    if let Some(wobble) = entity.wobble {
        step.x += wobble.velocity(entity.age);
    }
    entity.pos += step * dt;
    entity.age += dt;

    reflect_walls(entity, bounds, walls, restitution);
}

/// Clamp an entity touching or crossing an edge back inside, reflecting the
/// velocity component that points into that edge
pub fn reflect_walls(entity: &mut Entity, bounds: Bounds, walls: Walls, restitution: f64) {
    let r = entity.radius();
    let (x, vx) = reflect_axis(entity.pos.x, entity.vel.x, r, bounds.width, restitution);
    entity.pos.x = x;
    entity.vel.x = vx;

    if walls == Walls::All {
        let (y, vy) = reflect_axis(entity.pos.y, entity.vel.y, r, bounds.height, restitution);
        entity.pos.y = y;
        entity.vel.y = vy;
    }
}

/// One axis of [`reflect_walls`]: returns the corrected (position, velocity)
fn reflect_axis(pos: f64, vel: f64, radius: f64, extent: f64, restitution: f64) -> (f64, f64) {
    let max = extent - radius;
    if pos + radius >= extent {
        let vel = if vel > 0.0 { -vel * restitution } else { vel };
        // An extent narrower than the entity centers it
        (max.max(radius.min(extent / 2.0)), vel)
    } else if pos - radius <= 0.0 {
        let vel = if vel < 0.0 { -vel * restitution } else { vel };
        (radius.min(max.max(extent / 2.0)), vel)
    } else {
        (pos, vel)
    }
}

/// True once the entity has fully crossed the top edge
#[inline]
pub fn above_top(entity: &Entity) -> bool {
    entity.pos.y + entity.radius() < 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::BORDER_RESTITUTION;
    use crate::sim::entity::ColorId;
    use glam::DVec2;
    use proptest::prelude::*;

    fn ball(x: f64, y: f64, vx: f64, vy: f64, r: f64) -> Entity {
        Entity::new(1, DVec2::new(x, y), DVec2::new(vx, vy), r, ColorId(0))
    }

    #[test]
    fn test_free_flight() {
        let bounds = Bounds::new(800.0, 600.0);
        let mut e = ball(400.0, 300.0, 100.0, -50.0, 20.0);
        integrate(&mut e, 0.1, bounds, Walls::All, BORDER_RESTITUTION);
        assert!((e.pos.x - 410.0).abs() < 1e-9);
        assert!((e.pos.y - 295.0).abs() < 1e-9);
        assert_eq!(e.vel, DVec2::new(100.0, -50.0));
    }

    #[test]
    fn test_right_wall_bounce() {
        let bounds = Bounds::new(800.0, 600.0);
        let r = 20.0;
        let v = 150.0;
        let dt = 0.016;
        let mut e = ball(800.0 - r / 2.0, 300.0, v, 0.0, r);

        integrate(&mut e, dt, bounds, Walls::All, BORDER_RESTITUTION);

        // Clamped to the wall first, then moved one step back inward
        assert!((e.vel.x - (-v * BORDER_RESTITUTION)).abs() < 1e-9);
        assert!((e.pos.x - (800.0 - r - v * dt)).abs() < 1e-9);
    }

    #[test]
    fn test_right_wall_bounce_zero_dt_sits_on_wall() {
        let bounds = Bounds::new(800.0, 600.0);
        let mut e = ball(790.0, 300.0, 150.0, 0.0, 20.0);
        integrate(&mut e, 0.0, bounds, Walls::All, 0.5);
        assert_eq!(e.pos.x, 780.0);
        assert_eq!(e.vel.x, -75.0);
    }

    #[test]
    fn test_moving_away_is_not_flipped() {
        let bounds = Bounds::new(800.0, 600.0);
        let mut e = ball(10.0, 300.0, 40.0, 0.0, 20.0);
        reflect_walls(&mut e, bounds, Walls::All, 1.0);
        assert_eq!(e.pos.x, 20.0);
        assert_eq!(e.vel.x, 40.0);
    }

    #[test]
    fn test_sides_ignore_vertical_edges() {
        let bounds = Bounds::new(800.0, 600.0);
        let mut e = ball(400.0, 700.0, 0.0, -100.0, 20.0);
        integrate(&mut e, 0.1, bounds, Walls::Sides, 1.0);
        assert!((e.pos.y - 690.0).abs() < 1e-9);
        assert_eq!(e.vel.y, -100.0);
    }

    #[test]
    fn test_above_top() {
        let e = ball(100.0, -21.0, 0.0, 0.0, 20.0);
        assert!(above_top(&e));
        let e = ball(100.0, -19.0, 0.0, 0.0, 20.0);
        assert!(!above_top(&e));
    }

    proptest! {
        #[test]
        fn prop_stays_in_bounds(
            x in 0.0f64..800.0,
            y in 0.0f64..600.0,
            vx in -600.0f64..600.0,
            vy in -600.0f64..600.0,
            r in 24.0f64..50.0,
            steps in 1usize..200,
        ) {
            let bounds = Bounds::new(800.0, 600.0);
            let mut e = ball(x, y, vx, vy, r);
            for _ in 0..steps {
                integrate(&mut e, crate::consts::MAX_DT, bounds, Walls::All, BORDER_RESTITUTION);
                prop_assert_eq!(e.radius(), r);
                prop_assert!(e.pos.x >= r - 1e-9 && e.pos.x <= bounds.width - r + 1e-9);
                prop_assert!(e.pos.y >= r - 1e-9 && e.pos.y <= bounds.height - r + 1e-9);
            }
        }
    }
}
