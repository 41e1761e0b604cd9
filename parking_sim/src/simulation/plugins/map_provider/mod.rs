// parking_sim/src/simulation/plugins/map_provider/mod.rs

use crate::prelude::*;
use crate::simulation::core::simulation_setup::LinkEndpoints;
use parking_core::provider::{MapProvider, MapProviderNode};

/// The provider node, holding the surveyed truth of the scenario.
#[derive(Resource)]
pub struct ProviderNode(pub MapProviderNode);

pub struct MapProviderPlugin;

impl Plugin for MapProviderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            spawn_map_provider.in_set(SceneBuildSet::World),
        )
        .add_systems(
            FixedUpdate,
            map_provider_system.in_set(SimulationSet::Messaging),
        );
    }
}

fn spawn_map_provider(
    mut commands: Commands,
    config: Res<ScenarioConfig>,
    mut endpoints: ResMut<LinkEndpoints>,
) {
    let Some(endpoint) = endpoints.provider.take() else {
        error!("The provider end of the link was already claimed.");
        return;
    };
    let provider = MapProvider::new(
        config.surveyed_spots(),
        config.simulation.resend_interval,
    );
    commands.insert_resource(ProviderNode(MapProviderNode::new(endpoint, provider)));
}

/// Handles whatever the vehicle sent last tick, then republishes the map if due.
fn map_provider_system(time: Res<Time>, mut provider: ResMut<ProviderNode>) {
    provider.0.step(time.elapsed_secs_f64());
}
