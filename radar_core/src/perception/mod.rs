// radar_core/src/perception/mod.rs

//! Per-tick stages of the radar: beam layout, hit classification and cluster collection.

pub mod beams;
pub mod classifier;
pub mod clusters;

pub use beams::{plan_beams, BeamPlan, BeamSegment};
pub use classifier::{classify, ClassifyContext, Hit};
pub use clusters::{Cluster, ClusterAggregator};
