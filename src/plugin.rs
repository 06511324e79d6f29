//! Bevy wiring for the simulation core.
//!
//! The plugin owns no physics.  It loads the config, builds a [`Simulation`]
//! resource, and once per frame drains [`PendingSimEvents`] into it before
//! calling `tick()`.  Input and rendering live in their own plugins so that
//! headless tests can run this one with `MinimalPlugins` only.

use crate::config::{load_sim_config, ConfigPath, SimConfig};
use crate::scenarios::{scenario_summary_system, Scenario, ScenarioRun};
use crate::simulation::{SimEvent, Simulation};
use bevy::prelude::*;

/// Front-end requests queued since the last frame, applied in arrival order.
#[derive(Resource, Debug, Default)]
pub struct PendingSimEvents(pub Vec<SimEvent>);

impl PendingSimEvents {
    pub fn push(&mut self, event: SimEvent) {
        self.0.push(event);
    }
}

/// Which layout [`init_simulation`] builds.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct ActiveScenario(pub Scenario);

#[derive(Default)]
pub struct SimulationPlugin {
    pub scenario: Scenario,
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // init_resource leaves a caller-inserted config/path untouched.
        app.init_resource::<SimConfig>()
            .init_resource::<ConfigPath>()
            .init_resource::<PendingSimEvents>()
            .insert_resource(ActiveScenario(self.scenario))
            .add_systems(Startup, (load_sim_config, init_simulation).chain())
            .add_systems(Update, simulation_step_system)
            .add_systems(PostUpdate, scenario_summary_system);
    }
}

/// Startup system: build the simulation from the (already loaded) config.
pub fn init_simulation(
    mut commands: Commands,
    config: Res<SimConfig>,
    scenario: Res<ActiveScenario>,
) {
    let scenario = scenario.0;
    match scenario.build(config.clone()) {
        Ok(sim) => {
            info!(
                "Scenario '{}': {} disks, seed {}, dt {:.4}",
                scenario.name(),
                sim.store().len(),
                sim.seed(),
                sim.time_step()
            );
            if let Some(frame_limit) = scenario.frame_limit() {
                commands.insert_resource(ScenarioRun {
                    scenario,
                    frame_limit,
                    initial_energy: sim.store().total_kinetic_energy(),
                    initial_momentum: sim.store().total_momentum(),
                });
            }
            commands.insert_resource(sim);
        }
        Err(e) => error!("Could not start scenario '{}': {e}", scenario.name()),
    }
}

/// Apply queued events, then advance one tick.
pub fn simulation_step_system(
    sim: Option<ResMut<Simulation>>,
    mut pending: ResMut<PendingSimEvents>,
) {
    let Some(mut sim) = sim else {
        pending.0.clear();
        return;
    };

    for event in pending.0.drain(..) {
        match sim.handle_event(event) {
            Ok(()) => log_event(&sim, event),
            Err(e) => warn!("Ignored {event:?}: {e}"),
        }
    }
    sim.tick();
}

fn log_event(sim: &Simulation, event: SimEvent) {
    match event {
        SimEvent::Reset => info!("Reset: {} disks from seed {}", sim.store().len(), sim.seed()),
        SimEvent::AddParticle(_) => debug!("Added disk; {} total", sim.store().len()),
        SimEvent::TogglePause => debug!("Run state: {:?}", sim.run_state()),
        SimEvent::ToggleFriction => debug!("Friction: {}", sim.flags().friction_enabled),
        SimEvent::ToggleGravity => debug!("Gravity: {}", sim.flags().gravity_enabled),
        SimEvent::ToggleTimeDirection => {
            debug!("Time direction: {:?}", sim.flags().time_direction)
        }
        SimEvent::AdjustTimeStep(_) => debug!("Time step: {:.5}", sim.time_step()),
    }
}
