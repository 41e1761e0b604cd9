// parking_core/src/lib.rs

// Pure mission logic: no engine, no devices. The simulator crate wires these
// types to sensors and actuators.
pub mod channel;
pub mod config;
pub mod control;
pub mod controller;
pub mod error;
pub mod messages;
pub mod mission;
pub mod models;
pub mod perception;
pub mod pose;
pub mod prelude;
pub mod provider;
pub mod spots;
pub mod types;
pub mod utils;
