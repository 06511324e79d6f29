//! Sequential impulse collision response.
//!
//! Pairs are resolved one at a time in detector order, each seeing the
//! velocities left by earlier pairs in the same tick.  Every pair gets:
//!
//! 1. **Positional correction**: the disks are pushed apart along the contact
//!    normal, split by inverse mass.  Velocities are not touched, so this step
//!    adds no kinetic energy.
//! 2. **Normal impulse**: `j = -(1 + e)·v_rel·n / (1/m_a + 1/m_b)`, applied
//!    equal and opposite, only while the disks approach each other.
//! 3. **Tangential impulse** (friction on only): Coulomb friction at the contact
//!    point, clamped to `μ·j` and to the impulse that stops sliding.  This is the
//!    only path by which collisions exchange linear and angular momentum.
//!
//! Walls are resolved after all pairs.  They are frictionless and immovable.
//!
//! A single sequential pass cannot settle a resting pile: the floor push after
//! the pairs drives the bottom row back into the row above.  [`relax_positions`]
//! repeats the positional part of both stages on freshly detected contacts and
//! leaves every velocity alone.

use crate::collision::{ContactPair, Contacts, Wall, WallContact};
use crate::particle::{Particle, ParticleStore};
use bevy::math::Vec2;

/// Contact parameters for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverSettings {
    /// Coefficient of restitution `e` in `[0, 1]`.
    pub restitution: f32,
    /// Coulomb coefficient at disk–disk contacts, or `None` for no angular exchange.
    pub contact_friction: Option<f32>,
    /// `(min, max)` corners of the region disks may occupy.
    pub bounds: (Vec2, Vec2),
}

/// Counts of what the resolver actually changed this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Pairs that received a normal impulse (were approaching).
    pub pair_impulses: usize,
    /// Wall contacts whose normal velocity was reflected.
    pub wall_bounces: usize,
    /// Position-only passes run after the impulse pass.
    pub relaxation_passes: usize,
}

/// Resolve every pair, then every wall contact.
pub fn resolve(
    store: &mut ParticleStore,
    contacts: &Contacts,
    settings: &ResolverSettings,
) -> ResolveReport {
    let mut report = ResolveReport::default();
    for contact in &contacts.pairs {
        if resolve_pair(store, contact, settings) {
            report.pair_impulses += 1;
        }
    }
    for contact in &contacts.walls {
        if resolve_wall(store, contact, settings) {
            report.wall_bounces += 1;
        }
    }
    report
}

/// Separate every overlapping pair, then pull every disk back inside the walls.
/// Velocities are not touched.  Returns the deepest penetration found.
pub fn relax_positions(
    store: &mut ParticleStore,
    contacts: &Contacts,
    settings: &ResolverSettings,
) -> f32 {
    let mut deepest = 0.0_f32;
    for contact in &contacts.pairs {
        if let Some((a, b)) = pair_mut(store.as_mut_slice(), contact.a, contact.b) {
            let (_, penetration) = separate(a, b, contact.normal);
            deepest = deepest.max(penetration);
        }
    }
    for contact in &contacts.walls {
        if let Some(p) = store.get_mut(contact.index) {
            deepest = deepest.max(push_inside(p, contact, settings.bounds));
        }
    }
    deepest
}

/// Two distinct mutable particles; `None` if the indices are equal or out of range.
fn pair_mut(particles: &mut [Particle], a: usize, b: usize) -> Option<(&mut Particle, &mut Particle)> {
    if a == b || a.max(b) >= particles.len() {
        return None;
    }
    if a < b {
        let (lo, hi) = particles.split_at_mut(b);
        Some((&mut lo[a], &mut hi[0]))
    } else {
        let (lo, hi) = particles.split_at_mut(a);
        Some((&mut hi[0], &mut lo[b]))
    }
}

/// Resolve one pair.  Returns whether a normal impulse was applied.
pub fn resolve_pair(
    store: &mut ParticleStore,
    contact: &ContactPair,
    settings: &ResolverSettings,
) -> bool {
    let Some((a, b)) = pair_mut(store.as_mut_slice(), contact.a, contact.b) else {
        return false;
    };

    let (normal, _) = separate(a, b, contact.normal);
    let inv_a = a.inverse_mass();
    let inv_b = b.inverse_mass();
    let inv_sum = inv_a + inv_b;

    let approach = (b.velocity - a.velocity).dot(normal);
    if approach >= 0.0 {
        return false;
    }

    let j = -(1.0 + settings.restitution) * approach / inv_sum;
    let impulse = normal * j;
    a.velocity -= impulse * inv_a;
    b.velocity += impulse * inv_b;

    if let Some(mu) = settings.contact_friction.filter(|&mu| mu > 0.0) {
        apply_contact_friction(a, b, normal, mu * j);
    }
    true
}

/// Push an overlapping pair apart along the line of centres, split by inverse
/// mass.  Returns the normal from `a` to `b` and the penetration before the push.
///
/// Geometry is recomputed here since an earlier pair may have moved either disk.
fn separate(a: &mut Particle, b: &mut Particle, fallback_normal: Vec2) -> (Vec2, f32) {
    let delta = b.position - a.position;
    let dist = delta.length();
    let normal = if dist > 0.0 {
        delta / dist
    } else {
        fallback_normal
    };
    let penetration = a.radius() + b.radius() - dist;
    if penetration > 0.0 {
        let (inv_a, inv_b) = (a.inverse_mass(), b.inverse_mass());
        let correction = normal * (penetration / (inv_a + inv_b));
        a.position -= correction * inv_a;
        b.position += correction * inv_b;
    }
    (normal, penetration)
}

/// Tangential impulse at the contact point, bounded by `max_impulse`.
fn apply_contact_friction(a: &mut Particle, b: &mut Particle, normal: Vec2, max_impulse: f32) {
    let arm_a = normal * a.radius();
    let arm_b = -normal * b.radius();
    let tangent = normal.perp();

    let slip = (b.velocity_at(arm_b) - a.velocity_at(arm_a)).dot(tangent);
    let cross_a = arm_a.perp_dot(tangent);
    let cross_b = arm_b.perp_dot(tangent);
    let effective = a.inverse_mass()
        + b.inverse_mass()
        + cross_a * cross_a * a.inverse_inertia()
        + cross_b * cross_b * b.inverse_inertia();

    let jt = (-slip / effective).clamp(-max_impulse, max_impulse);
    let impulse = tangent * jt;

    a.velocity -= impulse * a.inverse_mass();
    a.angular_velocity -= arm_a.perp_dot(impulse) * a.inverse_inertia();
    b.velocity += impulse * b.inverse_mass();
    b.angular_velocity += arm_b.perp_dot(impulse) * b.inverse_inertia();
}

/// Current depth of `p` past `wall`, negative when clear.
fn wall_penetration(p: &Particle, wall: Wall, (min, max): (Vec2, Vec2)) -> f32 {
    let r = p.radius();
    match wall {
        Wall::Left => min.x - (p.position.x - r),
        Wall::Right => (p.position.x + r) - max.x,
        Wall::Bottom => min.y - (p.position.y - r),
        Wall::Top => (p.position.y + r) - max.y,
    }
}

/// Move `p` back to the wall face.  Returns the penetration before the move.
fn push_inside(p: &mut Particle, contact: &WallContact, bounds: (Vec2, Vec2)) -> f32 {
    let penetration = wall_penetration(p, contact.wall, bounds);
    if penetration > 0.0 {
        p.position -= contact.normal() * penetration;
    }
    penetration
}

/// Push a disk back inside and reflect its velocity into the wall.
/// Returns whether the velocity was reflected.
pub fn resolve_wall(
    store: &mut ParticleStore,
    contact: &WallContact,
    settings: &ResolverSettings,
) -> bool {
    let Some(p) = store.get_mut(contact.index) else {
        return false;
    };
    push_inside(p, contact, settings.bounds);
    let normal = contact.normal();
    let into_wall = p.velocity.dot(normal);
    if into_wall <= 0.0 {
        return false;
    }
    p.velocity -= normal * ((1.0 + settings.restitution) * into_wall);
    true
}
