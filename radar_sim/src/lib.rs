// radar_sim/src/lib.rs

//! Host for the radar engine: scenario files, a moving target world and a
//! fixed-step runner that feeds every mounted radar.

// This prelude is for convenience for other files WITHIN the radar_sim crate.
pub mod prelude;

pub mod cli;
pub mod simulation;
