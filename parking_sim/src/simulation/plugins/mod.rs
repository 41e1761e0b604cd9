// parking_sim/src/simulation/plugins/mod.rs

pub mod autonomy;
pub mod map_provider;
pub mod sensors;
pub mod validation;
pub mod vehicles;
pub mod world;
