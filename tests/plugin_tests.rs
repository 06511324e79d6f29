//! Headless tests for [`SimulationPlugin`]'s startup and per-frame wiring.
//!
//! These tests use [`MinimalPlugins`] with no window and no rendering, so they
//! run fast and deterministically in CI.
//!
//! Covered scenarios:
//! 1. Startup builds the `Simulation` from the inserted config and ticks once per update.
//! 2. Queued events are applied before the frame's tick.
//! 3. A `Reset` event replays the seeded start.
//! 4. A rejected event is dropped and the loop keeps running.
//! 5. A config file on disk overrides the inserted defaults.
//! 6. Fixed-length scenarios register a `ScenarioRun`.

use bevy::prelude::*;
use disksim::config::{ConfigPath, SimConfig};
use disksim::plugin::{PendingSimEvents, SimulationPlugin};
use disksim::scenarios::{Scenario, ScenarioRun};
use disksim::simulation::{RunState, SimEvent, Simulation};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_config() -> SimConfig {
    SimConfig {
        seed: Some(2024),
        initial_particle_count: 15,
        ..Default::default()
    }
}

/// Build a minimal headless app around the simulation plugin.
///
/// `ConfigPath(None)` keeps the startup loader away from the real
/// `assets/sim.toml`, so the inserted config is what the simulation sees.
fn headless_app(config: SimConfig, scenario: Scenario) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(config);
    app.insert_resource(ConfigPath(None));
    app.add_plugins(SimulationPlugin { scenario });
    app
}

fn queue(app: &mut App, event: SimEvent) {
    app.world_mut().resource_mut::<PendingSimEvents>().push(event);
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn startup_builds_simulation_and_update_ticks_it() {
    let mut app = headless_app(test_config(), Scenario::Seeded);
    app.update();

    let sim = app.world().resource::<Simulation>();
    assert_eq!(sim.store().len(), 15);
    assert_eq!(sim.seed(), 2024);
    assert_eq!(sim.tick_count(), 1);

    app.update();
    app.update();
    assert_eq!(app.world().resource::<Simulation>().tick_count(), 3);
}

#[test]
fn pause_event_applies_before_the_tick() {
    let mut app = headless_app(test_config(), Scenario::Seeded);
    app.update();

    queue(&mut app, SimEvent::TogglePause);
    app.update();
    let sim = app.world().resource::<Simulation>();
    assert_eq!(sim.run_state(), RunState::Paused);
    assert_eq!(sim.tick_count(), 1, "paused frame must not tick");
    assert!(app.world().resource::<PendingSimEvents>().0.is_empty());

    queue(&mut app, SimEvent::TogglePause);
    app.update();
    assert_eq!(app.world().resource::<Simulation>().tick_count(), 2);
}

#[test]
fn reset_event_replays_seeded_start() {
    let mut app = headless_app(test_config(), Scenario::Seeded);
    for _ in 0..20 {
        app.update();
    }
    queue(&mut app, SimEvent::AddParticle(Vec2::new(500.0, 500.0)));
    queue(&mut app, SimEvent::ToggleGravity);
    app.update();
    assert_eq!(app.world().resource::<Simulation>().store().len(), 16);

    queue(&mut app, SimEvent::Reset);
    app.update();

    // Same seed, same flags, one tick after a fresh start.
    let mut expected = Simulation::new(test_config()).unwrap();
    expected.toggle_gravity();
    expected.tick();

    let sim = app.world().resource::<Simulation>();
    assert_eq!(sim.tick_count(), 1);
    assert!(sim.flags().gravity_enabled);
    assert_eq!(sim.store(), expected.store());
}

#[test]
fn rejected_event_is_dropped_and_loop_continues() {
    let mut app = headless_app(test_config(), Scenario::Seeded);
    app.update();

    queue(&mut app, SimEvent::AddParticle(Vec2::new(f32::NAN, 10.0)));
    queue(&mut app, SimEvent::ToggleFriction);
    app.update();

    let sim = app.world().resource::<Simulation>();
    assert_eq!(sim.store().len(), 15);
    assert!(!sim.flags().friction_enabled, "later events still apply");
    assert_eq!(sim.tick_count(), 2);
}

#[test]
fn config_file_overrides_inserted_defaults() {
    let path = std::env::temp_dir().join(format!("disksim_plugin_test_{}.toml", std::process::id()));
    std::fs::write(
        &path,
        "initial_particle_count = 4\nseed = 99\ngravity_enabled = true\nrestitution = 0.8\n",
    )
    .unwrap();

    let mut app = headless_app(test_config(), Scenario::Seeded);
    app.insert_resource(ConfigPath(Some(path.clone())));
    app.update();
    std::fs::remove_file(&path).ok();

    let config = app.world().resource::<SimConfig>();
    assert_eq!(config.initial_particle_count, 4);
    assert_eq!(config.restitution, 0.8);

    let sim = app.world().resource::<Simulation>();
    assert_eq!(sim.store().len(), 4);
    assert_eq!(sim.seed(), 99);
    assert!(sim.flags().gravity_enabled);
}

#[test]
fn invalid_config_file_keeps_defaults() {
    let path = std::env::temp_dir().join(format!("disksim_bad_config_{}.toml", std::process::id()));
    std::fs::write(&path, "restitution = 3.0\n").unwrap();

    let mut app = headless_app(test_config(), Scenario::Seeded);
    app.insert_resource(ConfigPath(Some(path.clone())));
    app.update();
    std::fs::remove_file(&path).ok();

    assert_eq!(*app.world().resource::<SimConfig>(), test_config());
    assert_eq!(app.world().resource::<Simulation>().store().len(), 15);
}

#[test]
fn fixed_length_scenario_registers_run() {
    let mut app = headless_app(test_config(), Scenario::HeadOnPair);
    app.update();

    let run = app.world().resource::<ScenarioRun>();
    assert_eq!(run.scenario, Scenario::HeadOnPair);
    assert_eq!(Some(run.frame_limit), Scenario::HeadOnPair.frame_limit());
    assert!(run.initial_energy > 0.0);
    assert_eq!(app.world().resource::<Simulation>().store().len(), 2);
}

#[test]
fn seeded_scenario_has_no_frame_limit() {
    let mut app = headless_app(test_config(), Scenario::Seeded);
    app.update();
    assert!(app.world().get_resource::<ScenarioRun>().is_none());
}
