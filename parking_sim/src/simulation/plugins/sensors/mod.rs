// parking_sim/src/simulation/plugins/sensors/mod.rs

pub mod gps;
pub mod raycasting;
