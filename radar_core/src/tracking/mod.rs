// radar_core/src/tracking/mod.rs

//! Object mode: persistent, id-stable tracks built from per-tick hits.

pub mod ids;
mod object;

pub use ids::{IdAllocator, ID_SPACE};
pub use object::TrackedObject;

use crate::perception::Hit;
use crate::scene::SceneView;
use crate::types::{EntityHandle, Timestamp};
use nalgebra::{Isometry3, Point3};
use std::collections::HashMap;
use tracing::debug;

/// Limits that shape an [`ObjectTracker`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerParams {
    pub max_objects: usize,
    pub probability_counter_max: i32,
    /// Minimum box extent along every axis, in world units.
    pub min_box_size: f64,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            max_objects: 50,
            probability_counter_max: 10,
            min_box_size: 0.1,
        }
    }
}

/// Keeps one [`TrackedObject`] per struck entity across ticks.
///
/// A tick is `reset_scan`, any number of `add_hit` calls in beam order, then
/// `finish_scan`.
#[derive(Debug, Clone, Default)]
pub struct ObjectTracker {
    params: TrackerParams,
    objects: HashMap<EntityHandle, TrackedObject>,
    ids: IdAllocator,
}

impl ObjectTracker {
    /// `max_objects` is capped at the size of the id space.
    pub fn new(mut params: TrackerParams) -> Self {
        params.max_objects = params.max_objects.min(ID_SPACE);
        Self {
            params,
            objects: HashMap::new(),
            ids: IdAllocator::new(),
        }
    }

    pub fn params(&self) -> &TrackerParams {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, entity: EntityHandle) -> Option<&TrackedObject> {
        self.objects.get(&entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedObject> {
        self.objects.values()
    }

    /// All live objects ordered by object id.
    pub fn objects(&self) -> Vec<&TrackedObject> {
        let mut objects: Vec<_> = self.objects.values().collect();
        objects.sort_by_key(|o| o.id);
        objects
    }

    /// All live objects, farthest first.
    pub fn sorted_by_distance(&self) -> Vec<&TrackedObject> {
        let mut objects: Vec<_> = self.objects.values().collect();
        objects.sort_by(|a, b| b.distance.total_cmp(&a.distance));
        objects
    }

    /// Marks every object as not yet seen this tick.
    pub fn reset_scan(&mut self) {
        for object in self.objects.values_mut() {
            object.updated = false;
        }
    }

    /// Folds one accepted hit into the tracks.
    ///
    /// Returns false when the hit was dropped because the tracker is full.
    pub fn add_hit(&mut self, hit: &Hit, timestamp: Timestamp) -> bool {
        if let Some(object) = self.objects.get_mut(&hit.entity) {
            if object.updated {
                object.accumulate(hit);
            } else {
                object.reobserve(hit, self.params.probability_counter_max);
            }
            return true;
        }

        if self.objects.len() >= self.params.max_objects {
            return false;
        }
        let id = self.ids.acquire(hit.entity);
        debug!(entity = %hit.entity, id, label = ?hit.label, "new tracked object");
        self.objects
            .insert(hit.entity, TrackedObject::from_hit(hit, id, timestamp));
        true
    }

    /// Closes the tick: ages, refreshes or drops every object.
    ///
    /// `sensor_pose` is the world pose the hits of this tick were taken from.
    pub fn finish_scan<S>(&mut self, scene: &S, sensor_pose: &Isometry3<f64>, timestamp: Timestamp)
    where
        S: SceneView + ?Sized,
    {
        let params = self.params;
        let sensor_inv = sensor_pose.inverse();
        let ids = &mut self.ids;

        self.objects.retain(|entity, object| {
            object.lifecycles = object.lifecycles.saturating_add(1);
            object.update_acceleration(timestamp);

            let Some(entity_pose) = scene.entity_pose(*entity) else {
                debug!(%entity, id = object.id, "tracked entity is gone");
                ids.release(object.id);
                return false;
            };

            if object.updated {
                if let Some(bounds) = scene.entity_bounds(*entity) {
                    let local = bounds.transformed_by(&sensor_inv);
                    object.bbox.min.z = local.min.z;
                    object.bbox.max.z = local.max.z;
                }
                object.bbox.inflate_to_min_size(params.min_box_size);
                let world_center = sensor_pose * object.bbox.center();
                object.anchor = entity_pose.inverse() * world_center;
            } else {
                object.probability_counter -= 1;
                if object.probability_counter < 0 {
                    debug!(%entity, id = object.id, "tracked object expired");
                    ids.release(object.id);
                    return false;
                }
                let center: Point3<f64> = sensor_inv * (entity_pose * object.anchor);
                object.bbox = object.bbox.moved_to(center);
            }

            object.refresh_nearest_point();
            true
        });
    }

    /// Drops every object and frees all ids.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{SemanticLabel, TaggedSurface};
    use crate::scene::{MemoryScene, SceneEntity};
    use approx::assert_abs_diff_eq;
    use nalgebra::{Vector2, Vector3};

    fn spawn_box(scene: &mut MemoryScene, x: f64, y: f64) -> EntityHandle {
        scene.spawn(
            SceneEntity::new(
                "target",
                Isometry3::translation(x, y, 0.5),
                Vector3::new(1.0, 1.0, 0.5),
            )
            .with_surface(TaggedSurface::RigidMesh {
                label: Some(SemanticLabel::Vehicles),
            }),
        )
    }

    fn hit_on(entity: EntityHandle, x: f64, y: f64, lon: f64) -> Hit {
        let local_point = Point3::new(x, y, 0.0);
        Hit {
            world_point: local_point,
            local_point,
            distance: local_point.coords.norm(),
            azimuth_deg: crate::geometry::azimuth_deg(&local_point),
            resolution_deg: 1.0,
            beam_index: 0,
            label: SemanticLabel::Vehicles,
            rcs: 3.0,
            velocity: Vector2::new(lon, 0.0),
            entity,
        }
    }

    fn tick(tracker: &mut ObjectTracker, scene: &MemoryScene, t: f64, hits: &[Hit]) {
        tracker.reset_scan();
        for hit in hits {
            tracker.add_hit(hit, t);
        }
        tracker.finish_scan(scene, &Isometry3::identity(), t);
    }

    #[test]
    fn first_hit_creates_an_updated_object() {
        let mut scene = MemoryScene::new();
        let car = spawn_box(&mut scene, 10.0, 0.0);
        let mut tracker = ObjectTracker::new(TrackerParams::default());
        tick(&mut tracker, &scene, 0.0, &[hit_on(car, 9.0, 0.0, 1.0)]);

        let object = tracker.get(car).unwrap();
        assert_eq!(object.id, 0);
        assert_eq!(object.probability_counter, 0);
        assert!(object.updated);
        assert_eq!(object.lifecycles, 1);
        // Height comes from the entity bounds.
        assert_abs_diff_eq!(object.bbox.min.z, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(object.bbox.max.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn same_tick_hits_union_box_sum_rcs_and_keep_last_velocity() {
        let mut scene = MemoryScene::new();
        let car = spawn_box(&mut scene, 10.0, 0.0);
        let mut tracker = ObjectTracker::new(TrackerParams::default());
        let hits = [hit_on(car, 9.0, -0.5, 1.0), hit_on(car, 9.5, 0.8, 2.0)];
        tick(&mut tracker, &scene, 0.0, &hits);

        let object = tracker.get(car).unwrap();
        assert_abs_diff_eq!(object.bbox.min.x, 9.0, epsilon = 1e-12);
        assert_abs_diff_eq!(object.bbox.max.x, 9.5, epsilon = 1e-12);
        assert_abs_diff_eq!(object.bbox.min.y, -0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(object.bbox.max.y, 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(object.rcs, 6.0, epsilon = 1e-12);
        assert_eq!(object.velocity, Vector2::new(2.0, 0.0));
    }

    #[test]
    fn small_boxes_grow_to_the_minimum_size() {
        let mut scene = MemoryScene::new();
        let car = spawn_box(&mut scene, 10.0, 0.0);
        let mut tracker = ObjectTracker::new(TrackerParams {
            min_box_size: 0.4,
            ..Default::default()
        });
        tick(&mut tracker, &scene, 0.0, &[hit_on(car, 9.0, 0.0, 0.0)]);

        let bbox = tracker.get(car).unwrap().bbox;
        assert_abs_diff_eq!(bbox.size(), Vector3::new(0.4, 0.4, 1.0), epsilon = 1e-12);
        assert_abs_diff_eq!(bbox.center().x, 9.0, epsilon = 1e-12);
    }

    #[test]
    fn reobserved_object_resets_box_and_gains_persistence() {
        let mut scene = MemoryScene::new();
        let car = spawn_box(&mut scene, 10.0, 0.0);
        let mut tracker = ObjectTracker::new(TrackerParams {
            probability_counter_max: 2,
            ..Default::default()
        });
        tick(&mut tracker, &scene, 0.0, &[hit_on(car, 9.0, -0.9, 0.0)]);
        for step in 1..5 {
            tick(&mut tracker, &scene, step as f64, &[hit_on(car, 9.0, 0.3, 0.0)]);
        }

        let object = tracker.get(car).unwrap();
        assert_eq!(object.probability_counter, 2);
        assert_eq!(object.lifecycles, 5);
        // The stale lateral extent from the first tick is gone.
        assert_abs_diff_eq!(object.bbox.center().y, 0.3, epsilon = 1e-12);
    }

    #[test]
    fn acceleration_is_the_velocity_difference_over_time() {
        let mut scene = MemoryScene::new();
        let car = spawn_box(&mut scene, 10.0, 0.0);
        let mut tracker = ObjectTracker::new(TrackerParams::default());
        tick(&mut tracker, &scene, 1.0, &[hit_on(car, 9.0, 0.0, 2.0)]);
        assert_eq!(tracker.get(car).unwrap().acceleration, Vector2::zeros());

        tick(&mut tracker, &scene, 1.5, &[hit_on(car, 9.0, 0.0, 5.0)]);
        let object = tracker.get(car).unwrap();
        assert_abs_diff_eq!(object.acceleration, Vector2::new(6.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(object.last_update(), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn single_sighting_expires_on_its_first_miss() {
        let mut scene = MemoryScene::new();
        let car = spawn_box(&mut scene, 10.0, 0.0);
        let mut tracker = ObjectTracker::new(TrackerParams::default());
        tick(&mut tracker, &scene, 0.0, &[hit_on(car, 9.0, 0.0, 0.0)]);
        assert_eq!(tracker.get(car).unwrap().probability_counter, 0);

        tick(&mut tracker, &scene, 1.0, &[]);
        assert!(tracker.get(car).is_none());
    }

    #[test]
    fn unseen_object_decays_then_disappears_and_frees_its_id() {
        let mut scene = MemoryScene::new();
        let car = spawn_box(&mut scene, 10.0, 0.0);
        let mut tracker = ObjectTracker::new(TrackerParams {
            probability_counter_max: 3,
            ..Default::default()
        });
        tick(&mut tracker, &scene, 0.0, &[hit_on(car, 9.0, 0.0, 0.0)]);
        for step in 1..=3 {
            tick(&mut tracker, &scene, step as f64, &[hit_on(car, 9.0, 0.0, 0.0)]);
        }
        assert_eq!(tracker.get(car).unwrap().probability_counter, 3);

        // Counter 3 survives three silent ticks and expires on the fourth.
        for step in 4..7 {
            tick(&mut tracker, &scene, step as f64, &[]);
            assert!(tracker.get(car).is_some(), "removed too early at {step}");
        }
        tick(&mut tracker, &scene, 7.0, &[]);
        assert!(tracker.is_empty());

        let other = spawn_box(&mut scene, 20.0, 0.0);
        tick(&mut tracker, &scene, 8.0, &[hit_on(other, 19.0, 0.0, 0.0)]);
        assert_eq!(tracker.get(other).unwrap().id, 0);
    }

    #[test]
    fn coasting_box_follows_the_moving_entity() {
        let mut scene = MemoryScene::new();
        let car = spawn_box(&mut scene, 10.0, 0.0);
        let mut tracker = ObjectTracker::new(TrackerParams::default());
        tick(&mut tracker, &scene, 0.0, &[hit_on(car, 9.0, 0.0, 0.0)]);
        let before = tracker.get(car).unwrap().bbox;

        scene.get_mut(car).unwrap().pose.translation.vector += Vector3::new(3.0, 1.0, 0.0);
        tick(&mut tracker, &scene, 0.1, &[]);

        let after = tracker.get(car).unwrap().bbox;
        assert_abs_diff_eq!(
            after.center(),
            before.center() + Vector3::new(3.0, 1.0, 0.0),
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(after.size(), before.size(), epsilon = 1e-9);
    }

    #[test]
    fn despawned_entity_drops_its_object() {
        let mut scene = MemoryScene::new();
        let car = spawn_box(&mut scene, 10.0, 0.0);
        let mut tracker = ObjectTracker::new(TrackerParams::default());
        tick(&mut tracker, &scene, 0.0, &[hit_on(car, 9.0, 0.0, 0.0)]);
        scene.despawn(car);
        tick(&mut tracker, &scene, 0.1, &[]);
        assert!(tracker.is_empty());
    }

    #[test]
    fn full_tracker_drops_new_entities() {
        let mut scene = MemoryScene::new();
        let mut tracker = ObjectTracker::new(TrackerParams {
            max_objects: 2,
            ..Default::default()
        });
        let cars: Vec<_> = (0..4)
            .map(|i| spawn_box(&mut scene, 10.0, i as f64 * 5.0))
            .collect();
        tracker.reset_scan();
        let accepted: Vec<bool> = cars
            .iter()
            .map(|car| tracker.add_hit(&hit_on(*car, 9.0, 0.0, 0.0), 0.0))
            .collect();
        tracker.finish_scan(&scene, &Isometry3::identity(), 0.0);

        assert_eq!(accepted, vec![true, true, false, false]);
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn distance_order_is_far_to_near() {
        let mut scene = MemoryScene::new();
        let near = spawn_box(&mut scene, 5.0, 0.0);
        let far = spawn_box(&mut scene, 30.0, 0.0);
        let mut tracker = ObjectTracker::new(TrackerParams::default());
        tick(
            &mut tracker,
            &scene,
            0.0,
            &[hit_on(near, 4.0, 0.0, 0.0), hit_on(far, 29.0, 0.0, 0.0)],
        );

        let order: Vec<_> = tracker.sorted_by_distance().iter().map(|o| o.entity).collect();
        assert_eq!(order, vec![far, near]);
        let ids: Vec<_> = tracker.objects().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![0, 1]);
    }
}
