// radar_core/src/messages.rs

use crate::labels::SemanticLabel;
use crate::perception::Cluster;
use crate::tracking::TrackedObject;
use crate::types::ObjectId;
use serde::{Deserialize, Serialize};

// =========================================================================
// == Report Records ==
// =========================================================================

/// A cluster as handed to the wire encoder. Lengths in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterReport {
    pub id: u32,
    pub position_m: [f64; 3],
    pub distance_m: f64,
    pub azimuth_deg: f64,
    pub label: SemanticLabel,
    pub rcs: f64,
    pub velocity_lon: f64,
    pub velocity_lat: f64,
}

impl ClusterReport {
    pub fn from_cluster(cluster: &Cluster, units_per_meter: f64) -> Self {
        let p = cluster.position / units_per_meter;
        Self {
            id: cluster.index as u32,
            position_m: [p.x, p.y, p.z],
            distance_m: cluster.distance / units_per_meter,
            azimuth_deg: cluster.azimuth_deg,
            label: cluster.label,
            rcs: cluster.rcs,
            velocity_lon: cluster.velocity.x,
            velocity_lat: cluster.velocity.y,
        }
    }
}

/// A tracked object as handed to the wire encoder. Lengths in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectReport {
    pub id: ObjectId,
    pub label: SemanticLabel,
    pub nearest_point_m: [f64; 3],
    pub box_center_m: [f64; 3],
    pub box_extents_m: [f64; 3],
    pub velocity_lon: f64,
    pub velocity_lat: f64,
    pub accel_lon: f64,
    pub accel_lat: f64,
    pub distance_m: f64,
    pub azimuth_deg: f64,
    pub rcs: f64,
    pub updated: bool,
    pub probability_counter: i32,
    pub lifecycles: u32,
}

impl ObjectReport {
    pub fn from_object(object: &TrackedObject, units_per_meter: f64) -> Self {
        let to_m = |v: nalgebra::Vector3<f64>| {
            let m = v / units_per_meter;
            [m.x, m.y, m.z]
        };
        Self {
            id: object.id,
            label: object.label,
            nearest_point_m: to_m(object.nearest_point.coords),
            box_center_m: to_m(object.bbox.center().coords),
            box_extents_m: to_m(object.bbox.size()),
            velocity_lon: object.velocity.x,
            velocity_lat: object.velocity.y,
            accel_lon: object.acceleration.x,
            accel_lat: object.acceleration.y,
            distance_m: object.distance / units_per_meter,
            azimuth_deg: object.azimuth_deg,
            rcs: object.rcs,
            updated: object.updated,
            probability_counter: object.probability_counter,
            lifecycles: object.lifecycles,
        }
    }
}

// =========================================================================
// == Scan ==
// =========================================================================

/// The mode-specific content of a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScanPayload {
    /// Clusters in hit order.
    Clusters(Vec<ClusterReport>),
    /// Live objects ordered by id.
    Objects(Vec<ObjectReport>),
}

impl ScanPayload {
    pub fn len(&self) -> usize {
        match self {
            ScanPayload::Clusters(c) => c.len(),
            ScanPayload::Objects(o) => o.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One completed radar scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarScan {
    pub device_id: u32,
    /// Milliseconds since the Unix epoch.
    pub device_timestamp_ms: u64,
    /// Wraps around after `u16::MAX`.
    pub measurement_counter: u16,
    /// Simulation time of the tick that produced the scan, seconds.
    pub sim_time: f64,
    pub payload: ScanPayload,
}

impl RadarScan {
    pub fn clusters(&self) -> Option<&[ClusterReport]> {
        match &self.payload {
            ScanPayload::Clusters(c) => Some(c),
            ScanPayload::Objects(_) => None,
        }
    }

    pub fn objects(&self) -> Option<&[ObjectReport]> {
        match &self.payload {
            ScanPayload::Objects(o) => Some(o),
            ScanPayload::Clusters(_) => None,
        }
    }
}
