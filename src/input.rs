//! Keyboard and mouse bindings.
//!
//! | Input          | Event                      |
//! |----------------|----------------------------|
//! | Space          | `TogglePause`              |
//! | R              | `Reset`                    |
//! | F              | `ToggleFriction`           |
//! | G              | `ToggleGravity`            |
//! | T              | `ToggleTimeDirection`      |
//! | Up / `]`       | `AdjustTimeStep(+1)`       |
//! | Down / `[`     | `AdjustTimeStep(-1)`       |
//! | Left click     | `AddParticle(cursor)`      |

use crate::config::SimConfig;
use crate::plugin::PendingSimEvents;
use crate::simulation::SimEvent;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingSimEvents>().add_systems(
            Update,
            (keyboard_input_system, mouse_input_system)
                .before(crate::plugin::simulation_step_system),
        );
    }
}

/// One-shot keys and the event each produces.
const KEY_BINDINGS: [(KeyCode, SimEvent); 9] = [
    (KeyCode::Space, SimEvent::TogglePause),
    (KeyCode::KeyR, SimEvent::Reset),
    (KeyCode::KeyF, SimEvent::ToggleFriction),
    (KeyCode::KeyG, SimEvent::ToggleGravity),
    (KeyCode::KeyT, SimEvent::ToggleTimeDirection),
    (KeyCode::ArrowUp, SimEvent::AdjustTimeStep(1)),
    (KeyCode::BracketRight, SimEvent::AdjustTimeStep(1)),
    (KeyCode::ArrowDown, SimEvent::AdjustTimeStep(-1)),
    (KeyCode::BracketLeft, SimEvent::AdjustTimeStep(-1)),
];

pub fn keyboard_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut pending: ResMut<PendingSimEvents>,
) {
    for (key, event) in KEY_BINDINGS {
        if keys.just_pressed(key) {
            pending.push(event);
        }
    }
}

pub fn mouse_input_system(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    config: Res<SimConfig>,
    mut pending: ResMut<PendingSimEvents>,
) {
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let world_size = Vec2::new(config.world_width, config.world_height);
    pending.push(SimEvent::AddParticle(cursor_to_sim(
        cursor,
        window.size(),
        world_size,
    )));
}

/// Map a window cursor position (origin top-left, y down) to simulation
/// coordinates (origin bottom-left of the world, y up).
///
/// The camera sits at the world centre with unit scale, so window and world
/// pixels coincide around the centre.
pub fn cursor_to_sim(cursor: Vec2, window_size: Vec2, world_size: Vec2) -> Vec2 {
    let camera_space = Vec2::new(
        cursor.x - window_size.x * 0.5,
        window_size.y * 0.5 - cursor.y,
    );
    camera_space + world_size * 0.5
}

/// Inverse of the camera placement: simulation coordinates to Bevy world space.
pub fn sim_to_world(position: Vec2, world_size: Vec2) -> Vec2 {
    position - world_size * 0.5
}
