use bevy::prelude::*;

/// Setup camera for 2D rendering
pub fn setup_camera(mut commands: Commands) {
    // Unit scale at the origin: one world pixel per window pixel, centred on the box.
    commands.spawn(Camera2d);
    debug!("Camera spawned");
}
