//! Centralised physics and presentation constants.
//!
//! All tuneable defaults live here so they can be found, reasoned-about, and
//! modified in one place.  [`crate::config::SimConfig::default`] mirrors every
//! value; `assets/sim.toml` can override any subset at startup.
//!
//! Units are pixels, seconds and radians.  The simulation space spans
//! `[0, WORLD_WIDTH] × [0, WORLD_HEIGHT]` with +y pointing up.

// ── World Bounds ──────────────────────────────────────────────────────────────

/// Width of the simulation box (px).  Also the default window width.
pub const WORLD_WIDTH: f32 = 1000.0;

/// Height of the simulation box (px).  Also the default window height.
pub const WORLD_HEIGHT: f32 = 1000.0;

/// Thickness of the static wall slab on each side of the box (px).
///
/// Disks collide with the inner faces, so the usable region is
/// `[WALL_THICKNESS, WORLD_WIDTH - WALL_THICKNESS]` on x (same on y).
pub const WALL_THICKNESS: f32 = 20.0;

/// Margin from the box edge inside which initial disk centres are placed.
pub const SPAWN_MARGIN: f32 = 50.0;

// ── Particles ─────────────────────────────────────────────────────────────────

/// Mass per unit area.  With 1.0, mass = π·r² exactly.
pub const DENSITY: f32 = 1.0;

/// Smallest radius drawn for a seeded or user-added disk (px).
pub const RADIUS_MIN: f32 = 10.0;

/// Largest radius drawn for a seeded or user-added disk (px).
pub const RADIUS_MAX: f32 = 30.0;

/// Number of disks seeded on startup and after every reset.
pub const INITIAL_PARTICLE_COUNT: usize = 100;

/// Initial velocity range (px/s) for each axis component: `[-R, R)`.
pub const INITIAL_SPEED_RANGE: f32 = 200.0;

/// Initial angular velocity range (rad/s): `[-R, R)`.
pub const INITIAL_ANGVEL_RANGE: f32 = 5.0;

/// Rejection-sampling attempts per disk when looking for a non-overlapping
/// spawn position.  After the last attempt the candidate is accepted anyway and
/// positional correction separates it over the next few ticks.
pub const SPAWN_ATTEMPTS: u32 = 64;

// ── Forces ────────────────────────────────────────────────────────────────────

/// Gravity magnitude (px/s²) pulling toward -y.  981 px/s² ≈ 9.81 m/s² at 100 px/m.
pub const GRAVITY: f32 = 981.0;

/// Velocity-proportional drag coefficient (1/s) applied while friction is on.
///
/// Each tick removes `DRAG_COEFFICIENT · |dt|` of the linear and angular speed.
pub const DRAG_COEFFICIENT: f32 = 0.1;

/// Coulomb friction coefficient at disk–disk contacts while friction is on.
/// Set to 0.0 to keep angular velocity fully decoupled from collisions.
pub const CONTACT_FRICTION: f32 = 0.1;

/// Restitution coefficient for disk–disk and disk–wall contacts.
/// 1.0 = perfectly elastic.
pub const RESTITUTION: f32 = 1.0;

/// Position-only relaxation passes per tick after the impulse pass.
///
/// Each pass re-detects contacts, so corrections reach the top of a pile one
/// row per pass.  0 leaves only the single pass inside the impulse stage.
pub const POSITION_ITERATIONS: u32 = 16;

/// Relaxation stops early once no contact is deeper than this (px).
pub const RELAXATION_SLOP: f32 = 0.01;

// ── Time Step ─────────────────────────────────────────────────────────────────

/// Default time-step magnitude (s): one tick per 60 Hz frame.
pub const TIME_STEP: f32 = 1.0 / 60.0;

/// Lower clamp for the time-step magnitude.  Keeps the step away from zero.
pub const TIME_STEP_MIN: f32 = 1.0e-4;

/// Upper clamp for the time-step magnitude.
/// Above ~0.1 s fast disks tunnel through each other in one tick.
pub const TIME_STEP_MAX: f32 = 0.1;

/// Multiplicative factor applied per `AdjustTimeStep` unit.
pub const TIME_STEP_SCALE: f32 = 1.25;

// ── Broad Phase ───────────────────────────────────────────────────────────────

/// World-space size of each spatial grid cell (px).
///
/// Should be at least the largest disk diameter; smaller cells still work but
/// the grid widens its neighbourhood query to compensate.
pub const GRID_CELL_SIZE: f32 = 64.0;

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Font size for the on-screen HUD.
pub const HUD_FONT_SIZE: f32 = 18.0;
