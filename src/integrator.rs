//! Semi-implicit (symplectic) Euler integration.
//!
//! The velocity half of the step happens in [`crate::forces::apply_forces`];
//! this stage moves positions and orientations with the *updated* velocities.
//! With a constant velocity field the update is exactly invertible by flipping
//! the sign of `dt`, which is what makes the time-direction toggle meaningful.

use crate::particle::ParticleStore;
use std::f32::consts::TAU;

/// Advance every particle's position and orientation by a signed `dt`.
pub fn integrate(store: &mut ParticleStore, dt: f32) {
    for p in store.iter_mut() {
        p.position += p.velocity * dt;
        p.orientation += p.angular_velocity * dt;
    }
}

/// Orientation folded into `[0, 2π)`, for display.
///
/// The stored angle is left unwrapped so reversing time retraces it exactly.
pub fn wrapped_orientation(angle: f32) -> f32 {
    angle.rem_euclid(TAU)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec2;

    #[test]
    fn position_advances_by_velocity_times_dt() {
        let mut store = ParticleStore::new(1.0).unwrap();
        store
            .add_particle(Vec2::new(10.0, 10.0), 1.0, Vec2::new(60.0, -30.0), 2.0)
            .unwrap();
        integrate(&mut store, 0.5);
        let p = store.get(0).unwrap();
        assert_eq!(p.position, Vec2::new(40.0, -5.0));
        assert_eq!(p.orientation, 1.0);
    }

    #[test]
    fn negative_dt_undoes_a_step() {
        let mut store = ParticleStore::new(1.0).unwrap();
        store
            .add_particle(Vec2::new(123.25, 77.5), 3.0, Vec2::new(12.5, -7.25), 0.75)
            .unwrap();
        let before = *store.get(0).unwrap();
        integrate(&mut store, 0.25);
        integrate(&mut store, -0.25);
        let after = store.get(0).unwrap();
        assert!((after.position - before.position).length() < 1e-4);
        assert!((after.orientation - before.orientation).abs() < 1e-6);
    }

    #[test]
    fn wrapped_orientation_stays_in_range() {
        assert!((wrapped_orientation(-0.5) - (TAU - 0.5)).abs() < 1e-5);
        assert!((wrapped_orientation(TAU + 1.0) - 1.0).abs() < 1e-5);
    }
}
