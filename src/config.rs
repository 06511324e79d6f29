//! Runtime simulation configuration loaded from `assets/sim.toml`.
//!
//! [`SimConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_sim_config`] reads the file named
//! by [`ConfigPath`] and overwrites the defaults with any values present in it.
//! Missing keys fall back to the compile-time defaults, so a minimal TOML can
//! override just the values you care about:
//!
//! ```toml
//! gravity_enabled = true
//! restitution = 0.9
//! broad_phase = "all_pairs"
//! ```
//!
//! The physics core never reads the file itself; it receives a validated
//! `SimConfig` by reference.

use crate::collision::BroadPhase;
use crate::constants::*;
use crate::error::{SimError, SimResult};
use bevy::prelude::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "assets/sim.toml";

/// Runtime-tunable physics and presentation configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // ── World Bounds ─────────────────────────────────────────────────────────
    pub world_width: f32,
    pub world_height: f32,
    pub wall_thickness: f32,
    pub spawn_margin: f32,

    // ── Particles ────────────────────────────────────────────────────────────
    pub density: f32,
    pub radius_min: f32,
    pub radius_max: f32,
    pub initial_particle_count: usize,
    pub initial_speed_range: f32,
    pub initial_angvel_range: f32,
    pub spawn_attempts: u32,
    /// Seed for initial seeding and user-added disks.  `None` draws a fresh
    /// seed once per process; reset always replays the same seed.
    pub seed: Option<u64>,

    // ── Forces & Contacts ────────────────────────────────────────────────────
    pub gravity: f32,
    pub drag_coefficient: f32,
    pub contact_friction: f32,
    pub restitution: f32,
    pub position_iterations: u32,
    pub gravity_enabled: bool,
    pub friction_enabled: bool,

    // ── Time Step ────────────────────────────────────────────────────────────
    pub time_step: f32,
    pub time_step_min: f32,
    pub time_step_max: f32,
    pub time_step_scale: f32,

    // ── Broad Phase ──────────────────────────────────────────────────────────
    pub broad_phase: BroadPhase,
    pub grid_cell_size: f32,

    // ── Rendering ────────────────────────────────────────────────────────────
    pub hud_font_size: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            // World Bounds
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            wall_thickness: WALL_THICKNESS,
            spawn_margin: SPAWN_MARGIN,
            // Particles
            density: DENSITY,
            radius_min: RADIUS_MIN,
            radius_max: RADIUS_MAX,
            initial_particle_count: INITIAL_PARTICLE_COUNT,
            initial_speed_range: INITIAL_SPEED_RANGE,
            initial_angvel_range: INITIAL_ANGVEL_RANGE,
            spawn_attempts: SPAWN_ATTEMPTS,
            seed: None,
            // Forces & Contacts
            gravity: GRAVITY,
            drag_coefficient: DRAG_COEFFICIENT,
            contact_friction: CONTACT_FRICTION,
            restitution: RESTITUTION,
            position_iterations: POSITION_ITERATIONS,
            gravity_enabled: false,
            friction_enabled: true,
            // Time Step
            time_step: TIME_STEP,
            time_step_min: TIME_STEP_MIN,
            time_step_max: TIME_STEP_MAX,
            time_step_scale: TIME_STEP_SCALE,
            // Broad Phase
            broad_phase: BroadPhase::Grid,
            grid_cell_size: GRID_CELL_SIZE,
            // Rendering
            hud_font_size: HUD_FONT_SIZE,
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> SimError {
    SimError::InvalidConfig {
        field,
        reason: reason.into(),
    }
}

fn require_positive(field: &'static str, value: f32) -> SimResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be finite and > 0 (got {value})")))
    }
}

fn require_non_negative(field: &'static str, value: f32) -> SimResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be finite and >= 0 (got {value})")))
    }
}

impl SimConfig {
    /// Parse a TOML document and validate the result.
    ///
    /// `label` names the source in error messages (usually the file path).
    pub fn from_toml_str(contents: &str, label: &str) -> SimResult<Self> {
        let config: SimConfig = toml::from_str(contents).map_err(|e| SimError::ConfigParse {
            path: label.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a config file.  Returns `Ok(None)` if the file does
    /// not exist.
    pub fn from_file(path: &Path) -> SimResult<Option<Self>> {
        let label = path.display().to_string();
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents, &label).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SimError::ConfigRead {
                path: label,
                message: e.to_string(),
            }),
        }
    }

    /// Check every cross-field constraint the physics core relies on.
    pub fn validate(&self) -> SimResult<()> {
        require_positive("world_width", self.world_width)?;
        require_positive("world_height", self.world_height)?;
        require_non_negative("wall_thickness", self.wall_thickness)?;
        require_non_negative("spawn_margin", self.spawn_margin)?;
        require_positive("density", self.density)?;
        require_positive("radius_min", self.radius_min)?;
        require_positive("radius_max", self.radius_max)?;
        if self.radius_min > self.radius_max {
            return Err(invalid("radius_min", "must be <= radius_max"));
        }

        // The widest disk must fit between the walls.
        let inner_w = self.world_width - 2.0 * self.wall_thickness;
        let inner_h = self.world_height - 2.0 * self.wall_thickness;
        if inner_w <= 2.0 * self.radius_max || inner_h <= 2.0 * self.radius_max {
            return Err(invalid(
                "wall_thickness",
                "inner box must be wider and taller than the largest disk",
            ));
        }
        if 2.0 * self.spawn_margin >= self.world_width.min(self.world_height) {
            return Err(invalid("spawn_margin", "spawn region is empty"));
        }

        require_non_negative("initial_speed_range", self.initial_speed_range)?;
        require_non_negative("initial_angvel_range", self.initial_angvel_range)?;
        if self.spawn_attempts == 0 {
            return Err(invalid("spawn_attempts", "must be >= 1"));
        }

        require_non_negative("gravity", self.gravity)?;
        require_non_negative("drag_coefficient", self.drag_coefficient)?;
        require_non_negative("contact_friction", self.contact_friction)?;
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(invalid(
                "restitution",
                format!("must lie in [0, 1] (got {})", self.restitution),
            ));
        }

        require_positive("time_step_min", self.time_step_min)?;
        require_positive("time_step_max", self.time_step_max)?;
        require_positive("time_step", self.time_step)?;
        if !(self.time_step_min <= self.time_step && self.time_step <= self.time_step_max) {
            return Err(invalid(
                "time_step",
                "must satisfy time_step_min <= time_step <= time_step_max",
            ));
        }
        if !(self.time_step_scale.is_finite() && self.time_step_scale > 1.0) {
            return Err(invalid("time_step_scale", "must be finite and > 1"));
        }

        require_positive("grid_cell_size", self.grid_cell_size)?;
        require_positive("hud_font_size", self.hud_font_size)?;
        Ok(())
    }

    /// Lower-left and upper-right corners of the region disks may occupy.
    pub fn inner_bounds(&self) -> (Vec2, Vec2) {
        (
            Vec2::splat(self.wall_thickness),
            Vec2::new(
                self.world_width - self.wall_thickness,
                self.world_height - self.wall_thickness,
            ),
        )
    }
}

/// Where [`load_sim_config`] looks for the TOML file.  `None` skips loading.
#[derive(Resource, Debug, Clone)]
pub struct ConfigPath(pub Option<PathBuf>);

impl Default for ConfigPath {
    fn default() -> Self {
        Self(Some(PathBuf::from(DEFAULT_CONFIG_PATH)))
    }
}

/// Startup system: attempt to load the config file and overwrite the
/// `SimConfig` resource with its values.
///
/// Parse and validation errors are logged but do not abort the simulation;
/// the compiled defaults stay in place.  A missing file is not an error.
pub fn load_sim_config(mut config: ResMut<SimConfig>, path: Res<ConfigPath>) {
    let Some(path) = path.0.as_deref() else {
        return;
    };
    match SimConfig::from_file(path) {
        Ok(Some(loaded)) => {
            *config = loaded;
            info!("Loaded simulation config from {}", path.display());
        }
        Ok(None) => {
            info!("No {} found; using compiled defaults", path.display());
        }
        Err(e) => {
            warn!("{e}; using defaults");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_keys() {
        let config = SimConfig::from_toml_str(
            "gravity_enabled = true\nrestitution = 0.5\nbroad_phase = \"all_pairs\"\nseed = 7\n",
            "inline",
        )
        .unwrap();
        assert!(config.gravity_enabled);
        assert_eq!(config.restitution, 0.5);
        assert_eq!(config.broad_phase, BroadPhase::AllPairs);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.world_width, WORLD_WIDTH);
        assert_eq!(config.initial_particle_count, INITIAL_PARTICLE_COUNT);
    }

    #[test]
    fn malformed_toml_reports_parse_error() {
        let err = SimConfig::from_toml_str("gravity = [", "broken.toml").unwrap_err();
        match err {
            SimError::ConfigParse { path, .. } => assert_eq!(path, "broken.toml"),
            other => panic!("expected ConfigParse, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_restitution_is_rejected() {
        let err = SimConfig::from_toml_str("restitution = 1.5", "inline").unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidConfig {
                field: "restitution",
                ..
            }
        ));
    }

    #[test]
    fn time_step_outside_bounds_is_rejected() {
        let config = SimConfig {
            time_step: 0.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SimConfig {
            time_step_min: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn inverted_radius_range_is_rejected() {
        let config = SimConfig {
            radius_min: 40.0,
            radius_max: 30.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidConfig {
                field: "radius_min",
                ..
            })
        ));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let path = Path::new("definitely/not/here/sim.toml");
        assert_eq!(SimConfig::from_file(path), Ok(None));
    }

    #[test]
    fn inner_bounds_exclude_walls() {
        let (min, max) = SimConfig::default().inner_bounds();
        assert_eq!(min, Vec2::splat(WALL_THICKNESS));
        assert_eq!(max, Vec2::new(WORLD_WIDTH - WALL_THICKNESS, WORLD_HEIGHT - WALL_THICKNESS));
    }

    #[test]
    fn load_system_without_path_keeps_existing_resource() {
        let mut world = World::new();
        let custom = SimConfig {
            initial_particle_count: 3,
            ..Default::default()
        };
        world.insert_resource(custom.clone());
        world.insert_resource(ConfigPath(None));

        let mut schedule = Schedule::default();
        schedule.add_systems(load_sim_config);
        schedule.run(&mut world);

        assert_eq!(*world.resource::<SimConfig>(), custom);
    }
}
