//! Collision detection: broad phase, circle–circle narrow phase, and wall tests.
//!
//! Output is recomputed every tick and is always sorted: particle pairs by
//! `(a, b)` with `a < b`, wall contacts by `(index, wall)`.  Resolution order is
//! therefore reproducible regardless of which broad phase produced the candidates.

use crate::particle::ParticleStore;
use crate::spatial_partition::SpatialGrid;
use bevy::math::Vec2;
use serde::Deserialize;

/// Normal used when two disk centres coincide exactly.
pub const FALLBACK_NORMAL: Vec2 = Vec2::X;

/// Candidate-pair strategy for the broad phase.  Both produce identical contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadPhase {
    /// Test every pair.  Fine at the ~100-disk scale of the default scene.
    AllPairs,
    /// Uniform hash grid (see [`SpatialGrid`]).
    #[default]
    Grid,
}

/// Two overlapping disks.  Ephemeral: valid for the tick that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPair {
    pub a: usize,
    pub b: usize,
    /// Unit vector from `a`'s centre toward `b`'s centre.
    pub normal: Vec2,
    /// `r_a + r_b - distance`, strictly positive.
    pub penetration: f32,
}

/// One side of the simulation box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Wall {
    Left,
    Right,
    Bottom,
    Top,
}

impl Wall {
    /// Unit normal pointing out of the box, i.e. from the disk into the wall.
    pub fn outward_normal(self) -> Vec2 {
        match self {
            Wall::Left => Vec2::NEG_X,
            Wall::Right => Vec2::X,
            Wall::Bottom => Vec2::NEG_Y,
            Wall::Top => Vec2::Y,
        }
    }
}

/// A disk crossing one side of the box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallContact {
    pub index: usize,
    pub wall: Wall,
    pub penetration: f32,
}

impl WallContact {
    pub fn normal(&self) -> Vec2 {
        self.wall.outward_normal()
    }
}

/// Everything the resolver needs for one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contacts {
    pub pairs: Vec<ContactPair>,
    pub walls: Vec<WallContact>,
}

impl Contacts {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.walls.is_empty()
    }
}

/// Narrow phase for a single pair.  `None` when the disks do not overlap.
pub fn circle_contact(
    a: usize,
    pos_a: Vec2,
    radius_a: f32,
    b: usize,
    pos_b: Vec2,
    radius_b: f32,
) -> Option<ContactPair> {
    let delta = pos_b - pos_a;
    let reach = radius_a + radius_b;
    let dist_sq = delta.length_squared();
    if dist_sq >= reach * reach {
        return None;
    }
    let dist = dist_sq.sqrt();
    let normal = if dist > 0.0 {
        delta / dist
    } else {
        FALLBACK_NORMAL
    };
    Some(ContactPair {
        a,
        b,
        normal,
        penetration: reach - dist,
    })
}

/// Produces the sorted contact lists for the current configuration.
///
/// Holds the broad-phase grid between ticks so its buckets are reused.
#[derive(Debug, Clone)]
pub struct CollisionDetector {
    broad_phase: BroadPhase,
    grid: SpatialGrid,
    positions: Vec<Vec2>,
}

impl CollisionDetector {
    pub fn new(broad_phase: BroadPhase, cell_size: f32) -> Self {
        Self {
            broad_phase,
            grid: SpatialGrid::new(cell_size),
            positions: Vec::new(),
        }
    }

    pub fn broad_phase(&self) -> BroadPhase {
        self.broad_phase
    }

    /// Find all overlapping pairs and wall crossings.
    ///
    /// `bounds` is the `(min, max)` corner pair of the region disks may occupy.
    pub fn detect(&mut self, store: &ParticleStore, bounds: (Vec2, Vec2)) -> Contacts {
        Contacts {
            pairs: self.detect_pairs(store),
            walls: detect_walls(store, bounds),
        }
    }

    /// Overlapping particle pairs, ascending by `(a, b)`.
    pub fn detect_pairs(&mut self, store: &ParticleStore) -> Vec<ContactPair> {
        let particles = store.as_slice();
        let narrow = |(i, j): (usize, usize)| {
            let (p, q) = (&particles[i], &particles[j]);
            circle_contact(i, p.position, p.radius(), j, q.position, q.radius())
        };

        match self.broad_phase {
            BroadPhase::AllPairs => (0..particles.len())
                .flat_map(|i| ((i + 1)..particles.len()).map(move |j| (i, j)))
                .filter_map(narrow)
                .collect(),
            BroadPhase::Grid => {
                self.positions.clear();
                self.positions.extend(particles.iter().map(|p| p.position));
                self.grid.rebuild(self.positions.iter().copied());
                let reach = 2.0 * store.max_radius();
                self.grid
                    .candidate_pairs(&self.positions, reach)
                    .into_iter()
                    .filter_map(narrow)
                    .collect()
            }
        }
    }
}

/// Disks crossing any side of the box, ascending by `(index, wall)`.
pub fn detect_walls(store: &ParticleStore, (min, max): (Vec2, Vec2)) -> Vec<WallContact> {
    let mut contacts = Vec::new();
    for (index, p) in store.iter().enumerate() {
        let r = p.radius();
        let checks = [
            (Wall::Left, min.x - (p.position.x - r)),
            (Wall::Right, (p.position.x + r) - max.x),
            (Wall::Bottom, min.y - (p.position.y - r)),
            (Wall::Top, (p.position.y + r) - max.y),
        ];
        contacts.extend(
            checks
                .into_iter()
                .filter(|&(_, penetration)| penetration > 0.0)
                .map(|(wall, penetration)| WallContact {
                    index,
                    wall,
                    penetration,
                }),
        );
    }
    contacts
}
