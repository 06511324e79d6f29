//! Particle state and the store that owns it.
//!
//! A particle is a solid disk.  Mass and moment of inertia are derived from the
//! radius once, at creation, and never change afterwards.  The store is the only
//! owner of particle data; the force, integration and collision stages borrow it
//! for the duration of one tick.

use crate::error::{ensure_finite, ensure_positive, SimResult};
use bevy::math::Vec2;
use std::f32::consts::PI;

/// A rigid disk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Orientation angle (rad), counter-clockwise.
    pub orientation: f32,
    /// Angular velocity (rad/s), counter-clockwise positive.
    pub angular_velocity: f32,
    radius: f32,
    mass: f32,
    inertia: f32,
}

impl Particle {
    /// Build a disk of the given radius and area density.
    ///
    /// Errors with [`crate::error::SimError::InvalidParameter`] if the radius or
    /// density is not strictly positive, or if any vector component is not finite.
    pub fn new(
        position: Vec2,
        radius: f32,
        velocity: Vec2,
        angular_velocity: f32,
        density: f32,
    ) -> SimResult<Self> {
        ensure_positive("radius", radius)?;
        ensure_positive("density", density)?;
        ensure_finite("position.x", position.x)?;
        ensure_finite("position.y", position.y)?;
        ensure_finite("velocity.x", velocity.x)?;
        ensure_finite("velocity.y", velocity.y)?;
        ensure_finite("angular_velocity", angular_velocity)?;

        let mass = PI * radius * radius * density;
        Ok(Self {
            position,
            velocity,
            orientation: 0.0,
            angular_velocity,
            radius,
            mass,
            inertia: 0.5 * mass * radius * radius,
        })
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn inverse_mass(&self) -> f32 {
        1.0 / self.mass
    }

    /// Moment of inertia of a solid disk about its centre: ½·m·r².
    #[inline]
    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    #[inline]
    pub fn inverse_inertia(&self) -> f32 {
        1.0 / self.inertia
    }

    /// Linear momentum m·v.
    #[inline]
    pub fn momentum(&self) -> Vec2 {
        self.velocity * self.mass
    }

    /// Total kinetic energy: ½·m·|v|² + ½·I·ω².
    #[inline]
    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.velocity.length_squared()
            + 0.5 * self.inertia * self.angular_velocity * self.angular_velocity
    }

    /// Angular momentum about the world origin: r × m·v + I·ω.
    #[inline]
    pub fn angular_momentum(&self) -> f32 {
        self.position.perp_dot(self.momentum()) + self.inertia * self.angular_velocity
    }

    /// Velocity of the material point at `offset` from the centre: v + ω × offset.
    #[inline]
    pub fn velocity_at(&self, offset: Vec2) -> Vec2 {
        self.velocity + offset.perp() * self.angular_velocity
    }
}

/// Ordered collection of every particle in the simulation.
///
/// Indices are stable between resets: particles are only ever appended, and the
/// only removal is the batch [`ParticleStore::remove_all`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleStore {
    density: f32,
    particles: Vec<Particle>,
}

impl ParticleStore {
    /// An empty store whose particles get `mass = π·r²·density`.
    pub fn new(density: f32) -> SimResult<Self> {
        ensure_positive("density", density)?;
        Ok(Self {
            density,
            particles: Vec::new(),
        })
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    /// Append a disk and return its index.  Nothing is appended on error.
    pub fn add_particle(
        &mut self,
        position: Vec2,
        radius: f32,
        velocity: Vec2,
        angular_velocity: f32,
    ) -> SimResult<usize> {
        let particle = Particle::new(position, radius, velocity, angular_velocity, self.density)?;
        self.particles.push(particle);
        Ok(self.particles.len() - 1)
    }

    /// Drop every particle (used by reset).
    pub fn remove_all(&mut self) {
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.particles.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Particle> {
        self.particles.iter_mut()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    // ── Diagnostics ───────────────────────────────────────────────────────────

    /// Σ mᵢ·vᵢ
    pub fn total_momentum(&self) -> Vec2 {
        self.particles.iter().map(Particle::momentum).sum()
    }

    /// Σ ½mᵢ|vᵢ|² + ½Iᵢωᵢ²
    pub fn total_kinetic_energy(&self) -> f32 {
        self.particles.iter().map(Particle::kinetic_energy).sum()
    }

    /// Σ (rᵢ × mᵢvᵢ + Iᵢωᵢ) about the world origin.
    pub fn total_angular_momentum(&self) -> f32 {
        self.particles.iter().map(Particle::angular_momentum).sum()
    }

    /// Largest radius in the store, or 0.0 when empty.
    pub fn max_radius(&self) -> f32 {
        self.particles
            .iter()
            .map(Particle::radius)
            .fold(0.0, f32::max)
    }
}

impl<'a> IntoIterator for &'a ParticleStore {
    type Item = &'a Particle;
    type IntoIter = std::slice::Iter<'a, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.particles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;

    #[test]
    fn mass_is_area_times_density() {
        let p = Particle::new(Vec2::ZERO, 10.0, Vec2::ZERO, 0.0, 1.0).unwrap();
        assert!((p.mass() - PI * 100.0).abs() < 1e-3);
        assert!((p.inertia() - 0.5 * p.mass() * 100.0).abs() < 1e-1);

        let dense = Particle::new(Vec2::ZERO, 10.0, Vec2::ZERO, 0.0, 2.0).unwrap();
        assert!((dense.mass() - 2.0 * p.mass()).abs() < 1e-3);
    }

    #[test]
    fn non_positive_radius_is_rejected() {
        let mut store = ParticleStore::new(1.0).unwrap();
        for radius in [0.0, -5.0, f32::NAN] {
            let err = store
                .add_particle(Vec2::ZERO, radius, Vec2::ZERO, 0.0)
                .unwrap_err();
            assert!(matches!(
                err,
                SimError::InvalidParameter { name: "radius", .. }
            ));
        }
        assert!(store.is_empty(), "rejected particles must not be appended");
    }

    #[test]
    fn non_finite_velocity_is_rejected() {
        let mut store = ParticleStore::new(1.0).unwrap();
        let result = store.add_particle(Vec2::ZERO, 5.0, Vec2::new(f32::INFINITY, 0.0), 0.0);
        assert!(result.is_err());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn add_returns_sequential_indices_and_remove_all_clears() {
        let mut store = ParticleStore::new(1.0).unwrap();
        assert_eq!(store.add_particle(Vec2::ZERO, 1.0, Vec2::ZERO, 0.0), Ok(0));
        assert_eq!(store.add_particle(Vec2::X, 2.0, Vec2::ZERO, 0.0), Ok(1));
        assert_eq!(store.max_radius(), 2.0);
        store.remove_all();
        assert!(store.is_empty());
        assert_eq!(store.max_radius(), 0.0);
    }

    #[test]
    fn kinetic_energy_includes_rotation() {
        // m = π, I = π/2 for a unit disk
        let p = Particle::new(Vec2::ZERO, 1.0, Vec2::new(3.0, 4.0), 2.0, 1.0).unwrap();
        let expected = 0.5 * PI * 25.0 + 0.5 * (0.5 * PI) * 4.0;
        assert!((p.kinetic_energy() - expected).abs() < 1e-4);
    }

    #[test]
    fn velocity_at_rim_adds_spin() {
        let p = Particle::new(Vec2::ZERO, 1.0, Vec2::ZERO, 2.0, 1.0).unwrap();
        // Counter-clockwise spin: the +x rim point moves toward +y.
        let v = p.velocity_at(Vec2::X);
        assert!((v - Vec2::new(0.0, 2.0)).length() < 1e-6);
    }

    #[test]
    fn store_totals_sum_over_particles() {
        let mut store = ParticleStore::new(1.0).unwrap();
        store
            .add_particle(Vec2::ZERO, 1.0, Vec2::new(1.0, 0.0), 0.0)
            .unwrap();
        store
            .add_particle(Vec2::new(10.0, 0.0), 1.0, Vec2::new(-1.0, 0.0), 0.0)
            .unwrap();
        assert!(store.total_momentum().length() < 1e-6);
        assert!((store.total_kinetic_energy() - PI).abs() < 1e-4);
    }
}
