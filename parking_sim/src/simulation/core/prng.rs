// parking_sim/src/simulation/core/prng.rs

use bevy::prelude::Resource;
use rand_chacha::ChaCha8Rng;

/// A newtype wrapper around `ChaCha8Rng` to make it a Bevy Resource.
/// Every noise source in the simulation draws from it, so a fixed seed
/// reproduces a run exactly.
#[derive(Resource)]
pub struct SimulationRng(pub ChaCha8Rng);
