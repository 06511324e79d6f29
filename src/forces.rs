//! Force accumulation: gravity and velocity-proportional friction.
//!
//! Forces are applied directly as per-tick velocity changes, which is the first
//! half of the semi-implicit Euler step (see [`crate::integrator`]).
//!
//! ## Time direction
//!
//! Gravity is scaled by the *signed* step, so a backward tick removes exactly
//! the velocity a forward tick added.  The position update still sees the
//! post-kick velocity in both directions, so a gravity run reversed tick for
//! tick does not retrace its path exactly.  That asymmetry is a known caveat of
//! reversing a driven system.
//!
//! Friction is scaled by `|dt|`: it always slows particles down, in either time
//! direction.  Running time backwards with friction on therefore does not
//! recover the earlier state.  This is the irreversibility the simulator exists
//! to demonstrate.

use crate::particle::ParticleStore;
use bevy::math::Vec2;

/// Per-tick force parameters, assembled by the simulation loop from its
/// config and flags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceSettings {
    /// Downward acceleration (px/s²), or `None` when gravity is off.
    pub gravity: Option<f32>,
    /// Drag coefficient (1/s), or `None` when friction is off.
    pub drag: Option<f32>,
}

impl ForceSettings {
    pub const NONE: ForceSettings = ForceSettings {
        gravity: None,
        drag: None,
    };
}

/// Fraction of speed that survives one tick of drag.  Never negative, so a
/// large coefficient or step stops a particle instead of reversing it.
#[inline]
pub fn drag_retention(coefficient: f32, dt: f32) -> f32 {
    (1.0 - coefficient * dt.abs()).max(0.0)
}

/// Apply this tick's forces to every particle's linear and angular velocity.
pub fn apply_forces(store: &mut ParticleStore, settings: &ForceSettings, dt: f32) {
    let gravity_kick = settings
        .gravity
        .map_or(Vec2::ZERO, |g| Vec2::new(0.0, -g) * dt);
    let retention = settings.drag.map(|k| drag_retention(k, dt));

    for p in store.iter_mut() {
        p.velocity += gravity_kick;
        if let Some(keep) = retention {
            p.velocity *= keep;
            p.angular_velocity *= keep;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(velocity: Vec2, angular_velocity: f32) -> ParticleStore {
        let mut store = ParticleStore::new(1.0).unwrap();
        store
            .add_particle(Vec2::splat(100.0), 10.0, velocity, angular_velocity)
            .unwrap();
        store
    }

    #[test]
    fn no_forces_leave_velocity_untouched() {
        let mut store = single(Vec2::new(3.0, -4.0), 1.5);
        apply_forces(&mut store, &ForceSettings::NONE, 1.0 / 60.0);
        let p = store.get(0).unwrap();
        assert_eq!(p.velocity, Vec2::new(3.0, -4.0));
        assert_eq!(p.angular_velocity, 1.5);
    }

    #[test]
    fn gravity_pulls_down_and_reverses_with_time() {
        let settings = ForceSettings {
            gravity: Some(981.0),
            drag: None,
        };
        let mut store = single(Vec2::ZERO, 0.0);
        apply_forces(&mut store, &settings, 0.01);
        assert!((store.get(0).unwrap().velocity.y + 9.81).abs() < 1e-4);

        apply_forces(&mut store, &settings, -0.01);
        assert!(store.get(0).unwrap().velocity.length() < 1e-5);
    }

    #[test]
    fn drag_slows_in_both_time_directions() {
        let settings = ForceSettings {
            gravity: None,
            drag: Some(0.5),
        };
        let mut store = single(Vec2::new(100.0, 0.0), 4.0);
        apply_forces(&mut store, &settings, 0.1);
        let after_forward = *store.get(0).unwrap();
        assert!((after_forward.velocity.x - 95.0).abs() < 1e-3);
        assert!((after_forward.angular_velocity - 3.8).abs() < 1e-5);

        apply_forces(&mut store, &settings, -0.1);
        assert!(store.get(0).unwrap().velocity.x < after_forward.velocity.x);
    }

    #[test]
    fn drag_never_reverses_velocity() {
        let settings = ForceSettings {
            gravity: None,
            drag: Some(1000.0),
        };
        let mut store = single(Vec2::new(-50.0, 20.0), -3.0);
        apply_forces(&mut store, &settings, 0.1);
        let p = store.get(0).unwrap();
        assert_eq!(p.velocity, Vec2::ZERO);
        assert_eq!(p.angular_velocity, 0.0);
        assert_eq!(drag_retention(1000.0, 0.1), 0.0);
    }
}
