use bevy::prelude::*;
use bevy::window::WindowResolution;
use disksim::config::{ConfigPath, SimConfig, DEFAULT_CONFIG_PATH};
use disksim::graphics;
use disksim::input::InputPlugin;
use disksim::plugin::SimulationPlugin;
use disksim::rendering::RenderingPlugin;
use disksim::scenarios::Scenario;
use std::env;
use std::path::PathBuf;

/// Overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_ENV_VAR: &str = "DISKSIM_CONFIG";

fn main() {
    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
    let scenario = Scenario::from_env();

    // The window is sized before Startup runs, so peek at the file here.
    // load_sim_config reads it again and reports any problem through the log.
    let window_config = SimConfig::from_file(&config_path)
        .ok()
        .flatten()
        .unwrap_or_default();

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: format!("Disk Simulation ({})", scenario.name()),
            resolution: WindowResolution::new(
                window_config.world_width as u32,
                window_config.world_height as u32,
            ),
            ..Default::default()
        }),
        ..Default::default()
    }))
    .insert_resource(ClearColor(Color::BLACK))
    // Compiled defaults; load_sim_config overwrites them from the file in Startup.
    .insert_resource(SimConfig::default())
    .insert_resource(ConfigPath(Some(config_path)))
    .add_plugins((SimulationPlugin { scenario }, InputPlugin, RenderingPlugin))
    .add_systems(Startup, graphics::setup_camera);

    app.run();
}
