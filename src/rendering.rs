//! Rendering: gizmo disks, the wall outline, and the HUD text overlay.
//!
//! ## System Responsibilities
//!
//! | System                    | Schedule   | Purpose                              |
//! |---------------------------|------------|--------------------------------------|
//! | `setup_hud`               | Startup    | Spawn the HUD text node              |
//! | `hud_display_system`      | PostUpdate | Refresh run state, flags, dt, counts |
//! | `gizmo_rendering_system`  | PostUpdate | Draw walls and every disk            |
//!
//! Both update systems run after the tick, so what is drawn is always the
//! post-tick state.  The gizmos read the per-disk [`crate::simulation::Frame`];
//! the HUD only needs the [`SimStatus`].

use crate::config::SimConfig;
use crate::input::sim_to_world;
use crate::simulation::{RunState, SimStatus, Simulation, TimeDirection};
use bevy::prelude::*;

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_hud.after(crate::config::load_sim_config))
            .add_systems(PostUpdate, (hud_display_system, gizmo_rendering_system));
    }
}

const WALL_COLOR: Color = Color::srgb(0.6, 0.6, 0.6);
const HUD_COLOR: Color = Color::WHITE;

/// Marker for the HUD text root node.
#[derive(Component)]
pub struct HudDisplay;

// ── Colour mapping ────────────────────────────────────────────────────────────

/// RGB for a disk's kinetic energy relative to the baseline.
///
/// Below the baseline the colour runs blue → white, above it white → red,
/// saturating at twice the baseline.  A non-positive baseline maps to white.
pub fn energy_rgb(energy: f32, baseline: f32) -> [f32; 3] {
    if baseline <= 0.0 || !energy.is_finite() {
        return [1.0, 1.0, 1.0];
    }
    if energy < baseline {
        let n = (energy / baseline).clamp(0.0, 1.0);
        [n, n, 1.0]
    } else {
        let n = ((energy - baseline) / baseline).clamp(0.0, 1.0);
        [1.0, 1.0 - n, 1.0 - n]
    }
}

pub fn energy_color(energy: f32, baseline: f32) -> Color {
    let [r, g, b] = energy_rgb(energy, baseline);
    Color::srgb(r, g, b)
}

// ── HUD ───────────────────────────────────────────────────────────────────────

/// Multi-line HUD text, matching the on-screen key bindings.
pub fn hud_text(status: &SimStatus) -> String {
    let state = match status.run_state {
        RunState::Running => "Running",
        RunState::Paused => "Paused",
    };
    let direction = match status.flags.time_direction {
        TimeDirection::Forward => "Forward",
        TimeDirection::Backward => "Backward",
    };
    let on_off = |b: bool| if b { "On" } else { "Off" };
    [
        format!("State: {state}  (Space pause, R reset)"),
        format!("Friction: {}  (F)", on_off(status.flags.friction_enabled)),
        format!("Gravity: {}  (G)", on_off(status.flags.gravity_enabled)),
        format!("Time: {direction}  (T)"),
        format!("dt: {:+.5} s  (Up/Down or ]/[)", status.dt),
        format!("Tick: {}  Disks: {}", status.tick, status.particle_count),
        "Click to add a disk".to_string(),
    ]
    .join("\n")
}

/// Spawn the top-left HUD node.
pub fn setup_hud(mut commands: Commands, config: Res<SimConfig>) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0),
                ..default()
            },
            HudDisplay,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: config.hud_font_size,
                    ..default()
                },
                TextColor(HUD_COLOR),
            ));
        });
}

pub fn hud_display_system(
    sim: Option<Res<Simulation>>,
    parent_query: Query<&Children, With<HudDisplay>>,
    mut text_query: Query<&mut Text>,
) {
    let Some(sim) = sim else {
        return;
    };
    let content = hud_text(&sim.status());
    for children in parent_query.iter() {
        for child in children.iter() {
            if let Ok(mut text) = text_query.get_mut(child) {
                if text.0 != content {
                    text.0.clone_from(&content);
                }
            }
        }
    }
}

// ── Gizmos ────────────────────────────────────────────────────────────────────

/// Draw the walls' inner edge, each disk's outline coloured by energy, and a
/// radius line showing its orientation.
pub fn gizmo_rendering_system(mut gizmos: Gizmos, sim: Option<Res<Simulation>>) {
    let Some(sim) = sim else {
        return;
    };
    let config = sim.config();
    let world_size = Vec2::new(config.world_width, config.world_height);
    let (min, max) = config.inner_bounds();
    gizmos.rect_2d(
        sim_to_world((min + max) * 0.5, world_size),
        max - min,
        WALL_COLOR,
    );

    let frame = sim.frame();
    for disk in &frame.particles {
        let centre = sim_to_world(disk.position, world_size);
        let color = energy_color(disk.kinetic_energy, frame.energy_baseline);
        gizmos.circle_2d(centre, disk.radius, color);
        let rim = centre + Vec2::from_angle(disk.orientation) * disk.radius;
        gizmos.line_2d(centre, rim, color);
    }
}
