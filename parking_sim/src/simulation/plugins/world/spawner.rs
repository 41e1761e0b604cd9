// parking_sim/src/simulation/plugins/world/spawner.rs

use crate::prelude::*;

pub struct WorldSpawnerPlugin;

impl Plugin for WorldSpawnerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            spawn_parking_lot.in_set(SceneBuildSet::World),
        );
    }
}

/// Tags the obstacle standing on an occupied spot.
#[derive(Component, Debug, Clone)]
pub struct ParkedCar {
    pub spot_id: String,
}

#[derive(Component, Debug, Default)]
pub struct Wall;

/// Places a car-sized box on every occupied spot and a box for every wall.
/// These are the only things the lidar can see.
fn spawn_parking_lot(mut commands: Commands, config: Res<ScenarioConfig>) {
    let world = &config.world;

    for spot in world.spots.iter().filter(|s| s.occupied) {
        info!("  -> Parking a car on spot '{}' at ({:.2}, {:.2})", spot.id, spot.x, spot.z);
        commands.spawn((
            Name::new(format!("parked_car_{}", spot.id)),
            ParkedCar {
                spot_id: spot.id.clone(),
            },
            Obstacle::new(
                Position::new(spot.x, spot.z),
                world.car_length,
                world.car_width,
            ),
        ));
    }

    for (n, wall) in world.walls.iter().enumerate() {
        debug!(
            "  -> Wall {} centred at ({:.2}, {:.2}), {:.1} x {:.1} m",
            n, wall.x, wall.z, wall.length, wall.width
        );
        commands.spawn((
            Name::new(format!("wall_{}", n)),
            Wall,
            Obstacle::new(Position::new(wall.x, wall.z), wall.length, wall.width),
        ));
    }
}
