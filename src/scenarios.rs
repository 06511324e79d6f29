//! Named starting layouts, selected at launch with `DISKSIM_SCENARIO`.
//!
//! ```text
//! DISKSIM_SCENARIO=head_on_pair cargo run
//! ```
//!
//! Any scenario other than `seeded` also runs for a fixed number of ticks,
//! logs a summary and exits, so it can be used as a quick regression check
//! from the command line.

use crate::config::SimConfig;
use crate::error::SimResult;
use crate::particle::ParticleStore;
use crate::simulation::{DiskSpec, Seeding, Simulation};
use bevy::prelude::*;

/// Environment variable naming the scenario to run.
pub const SCENARIO_ENV_VAR: &str = "DISKSIM_SCENARIO";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scenario {
    /// Random seeding from the config; the normal interactive mode.
    #[default]
    Seeded,
    /// Two equal disks meeting head-on in the middle of the box.
    HeadOnPair,
    /// One disk travelling into the right wall.
    WallBounce,
    /// A square block of overlapping disks at rest, dropped under gravity.
    DensePack,
    /// A few spinning disks that never touch.  Reversing time retraces them.
    Drift,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::Seeded,
        Scenario::HeadOnPair,
        Scenario::WallBounce,
        Scenario::DensePack,
        Scenario::Drift,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::Seeded => "seeded",
            Scenario::HeadOnPair => "head_on_pair",
            Scenario::WallBounce => "wall_bounce",
            Scenario::DensePack => "dense_pack",
            Scenario::Drift => "drift",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Read [`SCENARIO_ENV_VAR`].  Unset means `Seeded`; an unknown name is
    /// logged and also falls back to `Seeded`.
    pub fn from_env() -> Self {
        let Ok(name) = std::env::var(SCENARIO_ENV_VAR) else {
            return Scenario::Seeded;
        };
        Self::from_name(name.trim()).unwrap_or_else(|| {
            let known: Vec<_> = Self::ALL.iter().map(|s| s.name()).collect();
            warn!(
                "Unknown scenario '{}' (expected one of: {}); using seeded",
                name,
                known.join(", ")
            );
            Scenario::Seeded
        })
    }

    /// Ticks to run before logging a summary and exiting; `None` runs forever.
    pub fn frame_limit(self) -> Option<u64> {
        match self {
            Scenario::Seeded => None,
            Scenario::HeadOnPair => Some(120),
            Scenario::WallBounce => Some(240),
            Scenario::DensePack => Some(300),
            Scenario::Drift => Some(200),
        }
    }

    /// Build a ready simulation.  Scenario flags override the config's.
    pub fn build(self, config: SimConfig) -> SimResult<Simulation> {
        let centre = Vec2::new(config.world_width, config.world_height) * 0.5;
        match self {
            Scenario::Seeded => Simulation::new(config),
            Scenario::HeadOnPair => {
                let config = SimConfig {
                    gravity_enabled: false,
                    friction_enabled: false,
                    ..config
                };
                let disk = |x: f32, vx: f32| DiskSpec {
                    position: centre + Vec2::new(x, 0.0),
                    radius: 20.0,
                    velocity: Vec2::new(vx, 0.0),
                    angular_velocity: 0.0,
                };
                Simulation::with_seeding(
                    config,
                    Seeding::Layout(vec![disk(-150.0, 200.0), disk(150.0, -200.0)]),
                )
            }
            Scenario::WallBounce => {
                let config = SimConfig {
                    gravity_enabled: false,
                    friction_enabled: false,
                    ..config
                };
                let disk = DiskSpec {
                    position: centre,
                    radius: 20.0,
                    velocity: Vec2::new(300.0, 0.0),
                    angular_velocity: 2.0,
                };
                Simulation::with_seeding(config, Seeding::Layout(vec![disk]))
            }
            Scenario::DensePack => {
                let config = SimConfig {
                    gravity_enabled: true,
                    friction_enabled: true,
                    ..config
                };
                let (side, spacing, radius) = (7, 30.0, 20.0);
                let origin = centre - Vec2::splat(spacing * (side - 1) as f32 * 0.5);
                let layout = (0..side * side)
                    .map(|i| DiskSpec {
                        position: origin
                            + Vec2::new((i % side) as f32, (i / side) as f32) * spacing,
                        radius,
                        velocity: Vec2::ZERO,
                        angular_velocity: 0.0,
                    })
                    .collect();
                Simulation::with_seeding(config, Seeding::Layout(layout))
            }
            Scenario::Drift => {
                let config = SimConfig {
                    gravity_enabled: false,
                    friction_enabled: false,
                    ..config
                };
                let layout = vec![
                    DiskSpec {
                        position: centre + Vec2::new(-200.0, -200.0),
                        radius: 25.0,
                        velocity: Vec2::new(30.0, 10.0),
                        angular_velocity: 1.5,
                    },
                    DiskSpec {
                        position: centre + Vec2::new(200.0, 0.0),
                        radius: 15.0,
                        velocity: Vec2::new(-10.0, 40.0),
                        angular_velocity: -3.0,
                    },
                    DiskSpec {
                        position: centre + Vec2::new(0.0, 220.0),
                        radius: 20.0,
                        velocity: Vec2::new(20.0, -15.0),
                        angular_velocity: 0.5,
                    },
                ];
                Simulation::with_seeding(config, Seeding::Layout(layout))
            }
        }
    }
}

/// Deepest current overlap between any two disks (0 when none overlap).
pub fn max_overlap(store: &ParticleStore) -> f32 {
    let ps = store.as_slice();
    let mut worst = 0.0_f32;
    for (i, a) in ps.iter().enumerate() {
        for b in &ps[i + 1..] {
            let overlap = a.radius() + b.radius() - a.position.distance(b.position);
            worst = worst.max(overlap);
        }
    }
    worst
}

/// Fixed-length scenario run.  Present only when a scenario with a frame
/// limit was selected.
#[derive(Resource, Debug, Clone)]
pub struct ScenarioRun {
    pub scenario: Scenario,
    pub frame_limit: u64,
    pub initial_energy: f32,
    pub initial_momentum: Vec2,
}

/// Log a summary and exit once the simulation reaches the scenario's limit.
pub fn scenario_summary_system(
    run: Option<Res<ScenarioRun>>,
    sim: Option<Res<Simulation>>,
    mut exit: MessageWriter<bevy::app::AppExit>,
) {
    let (Some(run), Some(sim)) = (run, sim) else {
        return;
    };
    if sim.tick_count() != run.frame_limit {
        return;
    }

    let store = sim.store();
    info!(
        "Scenario '{}' finished after {} ticks: {} disks",
        run.scenario.name(),
        sim.tick_count(),
        store.len()
    );
    info!(
        "  kinetic energy {:.1} -> {:.1}",
        run.initial_energy,
        store.total_kinetic_energy()
    );
    info!(
        "  momentum ({:.1}, {:.1}) -> ({:.1}, {:.1})",
        run.initial_momentum.x,
        run.initial_momentum.y,
        store.total_momentum().x,
        store.total_momentum().y
    );
    info!("  max overlap {:.4}", max_overlap(store));
    exit.write(bevy::app::AppExit::Success);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SimConfig {
        SimConfig {
            seed: Some(5),
            initial_particle_count: 20,
            ..Default::default()
        }
    }

    #[test]
    fn names_round_trip() {
        for s in Scenario::ALL {
            assert_eq!(Scenario::from_name(s.name()), Some(s));
        }
        assert_eq!(Scenario::from_name("nope"), None);
    }

    #[test]
    fn every_scenario_builds_from_default_config() {
        for s in Scenario::ALL {
            let sim = s.build(config()).unwrap();
            assert!(!sim.store().is_empty(), "{} is empty", s.name());
        }
    }

    #[test]
    fn head_on_pair_swaps_velocities() {
        let mut sim = Scenario::HeadOnPair.build(config()).unwrap();
        for _ in 0..Scenario::HeadOnPair.frame_limit().unwrap() {
            sim.tick();
        }
        let a = sim.store().get(0).unwrap();
        let b = sim.store().get(1).unwrap();
        assert!((a.velocity.x + 200.0).abs() < 1e-2, "a.v = {:?}", a.velocity);
        assert!((b.velocity.x - 200.0).abs() < 1e-2, "b.v = {:?}", b.velocity);
    }

    #[test]
    fn wall_bounce_reverses_and_keeps_speed() {
        let mut sim = Scenario::WallBounce.build(config()).unwrap();
        for _ in 0..Scenario::WallBounce.frame_limit().unwrap() {
            sim.tick();
        }
        let p = sim.store().get(0).unwrap();
        assert!((p.velocity.x + 300.0).abs() < 1e-3);
        assert_eq!(p.angular_velocity, 2.0);
    }

    #[test]
    fn dense_pack_separates() {
        let mut sim = Scenario::DensePack.build(config()).unwrap();
        assert!(max_overlap(sim.store()) > 5.0);
        for _ in 0..Scenario::DensePack.frame_limit().unwrap() {
            sim.tick();
        }
        assert!(max_overlap(sim.store()) < 0.5, "{}", max_overlap(sim.store()));
    }
}
