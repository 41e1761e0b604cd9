// parking_sim/src/simulation/plugins/world/mod.rs

pub mod spawner;
