// parking_core/src/perception/mod.rs

pub mod occupancy;
