// radar_core/src/lib.rs

pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod labels;
pub mod messages;
pub mod perception;
pub mod prelude;
pub mod scene;
pub mod snapshot;
pub mod tracking;
pub mod types;

pub use error::{HitRejection, RadarConfigError};
