// radar_core/src/tracking/object.rs

use crate::geometry::{azimuth_deg, Aabb};
use crate::labels::SemanticLabel;
use crate::perception::Hit;
use crate::types::{EntityHandle, ObjectId, Timestamp};
use nalgebra::{Point3, Vector2};

/// One entity followed across ticks.
///
/// Positions and boxes are sensor-local, in world units. Velocity and
/// acceleration are `(longitudinal, lateral)` in m/s and m/s².
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedObject {
    pub entity: EntityHandle,
    pub id: ObjectId,
    pub label: SemanticLabel,
    /// Reflectivity summed over this tick's hits.
    pub rcs: f64,
    pub velocity: Vector2<f64>,
    pub acceleration: Vector2<f64>,
    pub bbox: Aabb,
    /// Box center in the entity's own frame, captured on the last observed tick.
    pub anchor: Point3<f64>,
    pub updated: bool,
    pub probability_counter: i32,
    /// Number of finished scans this object lived through.
    pub lifecycles: u32,
    pub nearest_point: Point3<f64>,
    pub distance: f64,
    pub azimuth_deg: f64,
    prev_velocity: Vector2<f64>,
    last_update: Timestamp,
}

impl TrackedObject {
    pub(crate) fn from_hit(hit: &Hit, id: ObjectId, timestamp: Timestamp) -> Self {
        let mut bbox = Aabb::empty();
        bbox.include(&hit.local_point);
        Self {
            entity: hit.entity,
            id,
            label: hit.label,
            rcs: hit.rcs,
            velocity: hit.velocity,
            acceleration: Vector2::zeros(),
            bbox,
            anchor: Point3::origin(),
            updated: true,
            probability_counter: 0,
            lifecycles: 0,
            nearest_point: hit.local_point,
            distance: hit.distance,
            azimuth_deg: hit.azimuth_deg,
            prev_velocity: hit.velocity,
            last_update: timestamp,
        }
    }

    /// Folds another hit of the current tick into the record.
    pub(crate) fn accumulate(&mut self, hit: &Hit) {
        self.bbox.include(&hit.local_point);
        self.rcs += hit.rcs;
        self.velocity = hit.velocity;
    }

    /// First hit of a tick on an object seen before: the stale box is dropped.
    pub(crate) fn reobserve(&mut self, hit: &Hit, counter_max: i32) {
        self.bbox = Aabb::empty();
        self.bbox.include(&hit.local_point);
        self.rcs = hit.rcs;
        self.velocity = hit.velocity;
        self.label = hit.label;
        self.updated = true;
        self.probability_counter = (self.probability_counter + 1).min(counter_max);
    }

    pub(crate) fn update_acceleration(&mut self, timestamp: Timestamp) {
        let dt = timestamp - self.last_update;
        self.acceleration = if dt > f64::EPSILON {
            (self.velocity - self.prev_velocity) / dt
        } else {
            Vector2::zeros()
        };
        self.prev_velocity = self.velocity;
        self.last_update = timestamp;
    }

    /// Caches the report point: the box's near face, centred laterally, on the sensor plane.
    pub(crate) fn refresh_nearest_point(&mut self) {
        let (min, max) = (self.bbox.min, self.bbox.max);
        self.nearest_point = Point3::new(min.x, (min.y + max.y) * 0.5, 0.0);
        self.distance = self.nearest_point.coords.norm();
        self.azimuth_deg = azimuth_deg(&self.nearest_point);
    }

    pub fn last_update(&self) -> Timestamp {
        self.last_update
    }
}
