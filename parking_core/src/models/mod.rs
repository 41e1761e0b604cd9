// parking_core/src/models/mod.rs

pub mod lidar;
