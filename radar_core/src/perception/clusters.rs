// radar_core/src/perception/clusters.rs

use super::Hit;
use crate::labels::SemanticLabel;
use nalgebra::{Point3, Vector2};

/// One detection of cluster mode. Every accepted hit becomes its own cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Position in this tick's list.
    pub index: usize,
    /// Sensor-local position, world units.
    pub position: Point3<f64>,
    pub distance: f64,
    pub azimuth_deg: f64,
    pub label: SemanticLabel,
    pub rcs: f64,
    /// `(longitudinal, lateral)` relative velocity, m/s.
    pub velocity: Vector2<f64>,
}

/// Collects the clusters of one tick.
#[derive(Debug, Clone, Default)]
pub struct ClusterAggregator {
    clusters: Vec<Cluster>,
}

impl ClusterAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.clusters.clear();
    }

    pub fn add_hit(&mut self, hit: &Hit) {
        self.clusters.push(Cluster {
            index: self.clusters.len(),
            position: hit.local_point,
            distance: hit.distance,
            azimuth_deg: hit.azimuth_deg,
            label: hit.label,
            rcs: hit.rcs,
            velocity: hit.velocity,
        });
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}
