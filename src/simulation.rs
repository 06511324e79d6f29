//! The simulation loop: owns the particle store, the flags, and the tick.
//!
//! [`Simulation`] is the single entry point the front end talks to.  It is
//! inserted as a Bevy resource by [`crate::plugin::SimulationPlugin`], but it has
//! no ECS dependencies of its own and can be driven directly from tests.
//!
//! One tick runs the stages in a fixed order:
//!
//! ```text
//! forces (velocity kick) → integrator (drift) → detector → resolver
//!     → up to `position_iterations` × (detector → position relaxation)
//! ```
//!
//! ## Determinism
//!
//! All randomness comes from one `StdRng` seeded from [`Simulation::seed`].
//! `reset()` re-creates the generator from that seed before re-seeding, so the
//! post-reset state matches the state right after construction.

use crate::collision::CollisionDetector;
use crate::config::SimConfig;
use crate::constants::RELAXATION_SLOP;
use crate::error::{ensure_finite, ensure_positive, SimResult};
use crate::forces::{apply_forces, ForceSettings};
use crate::integrator::{integrate, wrapped_orientation};
use crate::particle::ParticleStore;
use crate::resolver::{relax_positions, resolve, ResolveReport, ResolverSettings};
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ── State Types ──────────────────────────────────────────────────────────────

/// Sign applied to the time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeDirection {
    #[default]
    Forward,
    Backward,
}

impl TimeDirection {
    pub fn sign(self) -> f32 {
        match self {
            TimeDirection::Forward => 1.0,
            TimeDirection::Backward => -1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            TimeDirection::Forward => TimeDirection::Backward,
            TimeDirection::Backward => TimeDirection::Forward,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Running,
    Paused,
}

/// User-toggleable physics switches.  Preserved across `reset()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimFlags {
    pub gravity_enabled: bool,
    pub friction_enabled: bool,
    pub time_direction: TimeDirection,
}

impl SimFlags {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            gravity_enabled: config.gravity_enabled,
            friction_enabled: config.friction_enabled,
            time_direction: TimeDirection::Forward,
        }
    }
}

/// Requests from the front end, applied between ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    /// Add a random disk centred at this point (simulation coordinates).
    AddParticle(Vec2),
    TogglePause,
    Reset,
    ToggleFriction,
    ToggleGravity,
    ToggleTimeDirection,
    /// Scale the step magnitude by `time_step_scale^steps`.
    AdjustTimeStep(i32),
}

/// Explicit parameters for one disk of a fixed layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskSpec {
    pub position: Vec2,
    pub radius: f32,
    pub velocity: Vec2,
    pub angular_velocity: f32,
}

/// How the store is (re)populated on construction and on reset.
#[derive(Debug, Clone, PartialEq)]
pub enum Seeding {
    /// `count` random disks drawn from the seeded generator.
    Random { count: usize },
    /// A hand-placed layout, restored verbatim.
    Layout(Vec<DiskSpec>),
}

// ── Render View ──────────────────────────────────────────────────────────────

/// What the renderer needs for one disk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleView {
    pub position: Vec2,
    pub radius: f32,
    /// Orientation folded into `[0, 2π)`.
    pub orientation: f32,
    pub kinetic_energy: f32,
}

/// Snapshot of the simulation for one rendered frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub particles: Vec<ParticleView>,
    pub flags: SimFlags,
    pub run_state: RunState,
    pub tick: u64,
    /// Signed step of the next tick.
    pub dt: f32,
    /// Mean kinetic energy of the disks as they were added; the colour scale's midpoint.
    pub energy_baseline: f32,
}

/// Run state and switches without the per-disk views; what the HUD shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimStatus {
    pub flags: SimFlags,
    pub run_state: RunState,
    pub tick: u64,
    pub dt: f32,
    pub particle_count: usize,
}

// ── Simulation ───────────────────────────────────────────────────────────────

#[derive(Resource, Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    seeding: Seeding,
    store: ParticleStore,
    detector: CollisionDetector,
    flags: SimFlags,
    run_state: RunState,
    /// Step magnitude; the sign comes from `flags.time_direction`.
    time_step: f32,
    tick: u64,
    seed: u64,
    rng: StdRng,
    /// Running sum and count of kinetic energy at insertion time.
    energy_sum: f64,
    energy_count: usize,
    last_report: ResolveReport,
}

/// Uniform sample from `[lo, hi)`, or `lo` when the range is empty.
fn sample(rng: &mut StdRng, lo: f32, hi: f32) -> f32 {
    if lo < hi {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

impl Simulation {
    /// Validate `config`, then seed `config.initial_particle_count` random disks.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        let count = config.initial_particle_count;
        Self::with_seeding(config, Seeding::Random { count })
    }

    /// Validate `config`, then populate the store from `seeding`.
    pub fn with_seeding(config: SimConfig, seeding: Seeding) -> SimResult<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let mut sim = Self {
            store: ParticleStore::new(config.density)?,
            detector: CollisionDetector::new(config.broad_phase, config.grid_cell_size),
            flags: SimFlags::from_config(&config),
            run_state: RunState::Running,
            time_step: config.time_step,
            tick: 0,
            seed,
            rng: StdRng::seed_from_u64(seed),
            energy_sum: 0.0,
            energy_count: 0,
            last_report: ResolveReport::default(),
            seeding,
            config,
        };
        sim.populate()?;
        Ok(sim)
    }

    /// Fill the empty store according to `self.seeding`.
    fn populate(&mut self) -> SimResult<()> {
        match self.seeding.clone() {
            Seeding::Random { count } => {
                for _ in 0..count {
                    self.seed_one()?;
                }
            }
            Seeding::Layout(disks) => {
                for d in disks {
                    self.add_particle(d.position, d.radius, d.velocity, d.angular_velocity)?;
                }
            }
        }
        debug!(
            "Seeded {} disks (seed {}, broad phase {:?})",
            self.store.len(),
            self.seed,
            self.detector.broad_phase()
        );
        Ok(())
    }

    /// Place one random disk, avoiding overlaps by rejection sampling.
    /// After `spawn_attempts` misses the last candidate is accepted anyway.
    fn seed_one(&mut self) -> SimResult<usize> {
        let c = &self.config;
        let radius = sample(&mut self.rng, c.radius_min, c.radius_max);
        let (lo, hi) = (
            Vec2::splat(c.spawn_margin),
            Vec2::new(c.world_width - c.spawn_margin, c.world_height - c.spawn_margin),
        );

        let mut candidate = lo;
        for _ in 0..c.spawn_attempts {
            candidate = Vec2::new(
                sample(&mut self.rng, lo.x, hi.x),
                sample(&mut self.rng, lo.y, hi.y),
            );
            candidate = self.clamp_inside(candidate, radius);
            let clear = self
                .store
                .iter()
                .all(|p| p.position.distance(candidate) >= p.radius() + radius);
            if clear {
                break;
            }
        }

        let velocity = self.random_velocity();
        let angular_velocity = self.random_angular_velocity();
        self.add_particle(candidate, radius, velocity, angular_velocity)
    }

    fn random_velocity(&mut self) -> Vec2 {
        let s = self.config.initial_speed_range;
        Vec2::new(
            sample(&mut self.rng, -s, s),
            sample(&mut self.rng, -s, s),
        )
    }

    fn random_angular_velocity(&mut self) -> f32 {
        let w = self.config.initial_angvel_range;
        sample(&mut self.rng, -w, w)
    }

    /// Clamp a centre so a disk of `radius` lies inside the walls.
    fn clamp_inside(&self, position: Vec2, radius: f32) -> Vec2 {
        let (min, max) = self.config.inner_bounds();
        position.clamp(min + Vec2::splat(radius), max - Vec2::splat(radius))
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    /// Mutable access for scenario setup and tests.
    pub fn store_mut(&mut self) -> &mut ParticleStore {
        &mut self.store
    }

    pub fn flags(&self) -> SimFlags {
        self.flags
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_paused(&self) -> bool {
        self.run_state == RunState::Paused
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Step magnitude, always positive.
    pub fn time_step(&self) -> f32 {
        self.time_step
    }

    /// Step of the next tick, negative when running backwards.
    pub fn signed_dt(&self) -> f32 {
        self.time_step * self.flags.time_direction.sign()
    }

    /// Contacts the resolver acted on during the last tick.
    pub fn last_report(&self) -> ResolveReport {
        self.last_report
    }

    /// Mean kinetic energy of the disks at the moment each was added.
    pub fn energy_baseline(&self) -> f32 {
        if self.energy_count == 0 {
            0.0
        } else {
            (self.energy_sum / self.energy_count as f64) as f32
        }
    }

    pub fn status(&self) -> SimStatus {
        SimStatus {
            flags: self.flags,
            run_state: self.run_state,
            tick: self.tick,
            dt: self.signed_dt(),
            particle_count: self.store.len(),
        }
    }

    pub fn frame(&self) -> Frame {
        Frame {
            particles: self
                .store
                .iter()
                .map(|p| ParticleView {
                    position: p.position,
                    radius: p.radius(),
                    orientation: wrapped_orientation(p.orientation),
                    kinetic_energy: p.kinetic_energy(),
                })
                .collect(),
            flags: self.flags,
            run_state: self.run_state,
            tick: self.tick,
            dt: self.signed_dt(),
            energy_baseline: self.energy_baseline(),
        }
    }

    fn force_settings(&self) -> ForceSettings {
        ForceSettings {
            gravity: self.flags.gravity_enabled.then_some(self.config.gravity),
            drag: self
                .flags
                .friction_enabled
                .then_some(self.config.drag_coefficient),
        }
    }

    fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            restitution: self.config.restitution,
            contact_friction: self
                .flags
                .friction_enabled
                .then_some(self.config.contact_friction),
            bounds: self.config.inner_bounds(),
        }
    }

    // ── Operations ───────────────────────────────────────────────────────────

    /// Advance one step.  Returns `false` (and changes nothing) while paused.
    pub fn tick(&mut self) -> bool {
        if self.is_paused() {
            return false;
        }
        let dt = self.signed_dt();
        let forces = self.force_settings();
        apply_forces(&mut self.store, &forces, dt);
        integrate(&mut self.store, dt);

        let bounds = self.config.inner_bounds();
        let settings = self.resolver_settings();
        let contacts = self.detector.detect(&self.store, bounds);
        let mut report = resolve(&mut self.store, &contacts, &settings);

        // Corrections can open new overlaps (a floor push into the pile above),
        // so each relaxation pass re-detects before separating again.
        for _ in 0..self.config.position_iterations {
            let contacts = self.detector.detect(&self.store, bounds);
            if contacts.is_empty() {
                break;
            }
            report.relaxation_passes += 1;
            if relax_positions(&mut self.store, &contacts, &settings) <= RELAXATION_SLOP {
                break;
            }
        }
        self.last_report = report;
        self.tick += 1;
        true
    }

    pub fn toggle_pause(&mut self) -> RunState {
        self.run_state = match self.run_state {
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
        };
        self.run_state
    }

    /// Clear the store and replay the initial seeding from the stored seed.
    ///
    /// The tick counter returns to zero and the loop resumes; flags and the
    /// current step magnitude are kept.
    pub fn reset(&mut self) -> SimResult<()> {
        self.store.remove_all();
        self.rng = StdRng::seed_from_u64(self.seed);
        self.energy_sum = 0.0;
        self.energy_count = 0;
        self.tick = 0;
        self.run_state = RunState::Running;
        self.last_report = ResolveReport::default();
        self.populate()
    }

    pub fn toggle_gravity(&mut self) -> bool {
        self.flags.gravity_enabled = !self.flags.gravity_enabled;
        self.flags.gravity_enabled
    }

    pub fn toggle_friction(&mut self) -> bool {
        self.flags.friction_enabled = !self.flags.friction_enabled;
        self.flags.friction_enabled
    }

    pub fn toggle_time_direction(&mut self) -> TimeDirection {
        self.flags.time_direction = self.flags.time_direction.flipped();
        self.flags.time_direction
    }

    /// Multiply the step magnitude by `time_step_scale^steps`, clamped to the
    /// configured bounds.  Returns the new magnitude.
    pub fn adjust_time_step(&mut self, steps: i32) -> f32 {
        let factor = self.config.time_step_scale.powi(steps);
        self.time_step = (self.time_step * factor)
            .clamp(self.config.time_step_min, self.config.time_step_max);
        self.time_step
    }

    /// Set the step magnitude directly, clamped to the configured bounds.
    ///
    /// Zero, negative and non-finite values are rejected and leave the step
    /// unchanged.
    pub fn set_time_step(&mut self, value: f32) -> SimResult<f32> {
        ensure_positive("time_step", value)?;
        self.time_step = value.clamp(self.config.time_step_min, self.config.time_step_max);
        Ok(self.time_step)
    }

    /// Add a disk with explicit parameters.  Returns its index.
    pub fn add_particle(
        &mut self,
        position: Vec2,
        radius: f32,
        velocity: Vec2,
        angular_velocity: f32,
    ) -> SimResult<usize> {
        let index = self
            .store
            .add_particle(position, radius, velocity, angular_velocity)?;
        if let Some(p) = self.store.get(index) {
            self.energy_sum += p.kinetic_energy() as f64;
            self.energy_count += 1;
        }
        Ok(index)
    }

    /// Add a random disk near `position`, pulled inside the walls if needed.
    pub fn add_particle_at(&mut self, position: Vec2) -> SimResult<usize> {
        ensure_finite("position.x", position.x)?;
        ensure_finite("position.y", position.y)?;
        let radius = sample(&mut self.rng, self.config.radius_min, self.config.radius_max);
        let position = self.clamp_inside(position, radius);
        let velocity = self.random_velocity();
        let angular_velocity = self.random_angular_velocity();
        self.add_particle(position, radius, velocity, angular_velocity)
    }

    /// Apply one front-end request.
    pub fn handle_event(&mut self, event: SimEvent) -> SimResult<()> {
        match event {
            SimEvent::AddParticle(position) => {
                self.add_particle_at(position)?;
            }
            SimEvent::TogglePause => {
                self.toggle_pause();
            }
            SimEvent::Reset => self.reset()?,
            SimEvent::ToggleFriction => {
                self.toggle_friction();
            }
            SimEvent::ToggleGravity => {
                self.toggle_gravity();
            }
            SimEvent::ToggleTimeDirection => {
                self.toggle_time_direction();
            }
            SimEvent::AdjustTimeStep(steps) => {
                self.adjust_time_step(steps);
            }
        }
        Ok(())
    }
}
