// radar_core/src/scene/memory.rs

use super::{RawHit, SceneQuery, SceneView, SweepRequest, SweepShape};
use crate::geometry::Aabb;
use crate::labels::TaggedSurface;
use crate::types::EntityHandle;
use nalgebra::{Isometry3, Point3, Vector3};

/// A box-shaped body living in a [`MemoryScene`].
#[derive(Debug, Clone)]
pub struct SceneEntity {
    pub name: String,
    /// World pose of the box center.
    pub pose: Isometry3<f64>,
    /// Linear velocity in world units per second.
    pub velocity: Vector3<f64>,
    /// Half size of the box along the entity's own axes.
    pub half_extents: Vector3<f64>,
    pub surfaces: Vec<TaggedSurface>,
    /// A blocking entity ends a sweep; anything behind it is not reported.
    pub blocking: bool,
}

impl SceneEntity {
    pub fn new(name: impl Into<String>, pose: Isometry3<f64>, half_extents: Vector3<f64>) -> Self {
        Self {
            name: name.into(),
            pose,
            velocity: Vector3::zeros(),
            half_extents,
            surfaces: Vec::new(),
            blocking: true,
        }
    }

    pub fn with_velocity(mut self, velocity: Vector3<f64>) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_surface(mut self, surface: TaggedSurface) -> Self {
        self.surfaces.push(surface);
        self
    }

    pub fn with_blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    fn local_box(&self) -> Aabb {
        Aabb::from_center_half_extents(Point3::origin(), self.half_extents)
    }
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    entity: Option<SceneEntity>,
}

/// A generational arena of box entities with a brute-force sweep.
///
/// Sweeps treat the capsule as upright in the entity frame: each entity box is
/// inflated by the capsule radius horizontally and by its half height
/// vertically, and the segment is tested against the inflated box.
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, entity: SceneEntity) -> EntityHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entity = Some(entity);
            EntityHandle::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                entity: Some(entity),
            });
            EntityHandle::new(index, 0)
        }
    }

    /// Removes the entity. Its handle, and every copy of it, goes stale.
    pub fn despawn(&mut self, handle: EntityHandle) -> Option<SceneEntity> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let entity = slot.entity.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        Some(entity)
    }

    pub fn get(&self, handle: EntityHandle) -> Option<&SceneEntity> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entity.as_ref()
    }

    pub fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut SceneEntity> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entity.as_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityHandle, &SceneEntity)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.entity
                .as_ref()
                .map(|e| (EntityHandle::new(index as u32, slot.generation), e))
        })
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.entity.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Moves every entity along its velocity for `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        for entity in self.slots.iter_mut().filter_map(|s| s.entity.as_mut()) {
            entity.pose.translation.vector += entity.velocity * dt;
        }
    }

    fn sweep_segment(
        &self,
        start: &Point3<f64>,
        end: &Point3<f64>,
        inflation: Vector3<f64>,
        ignore: Option<EntityHandle>,
    ) -> Vec<RawHit> {
        let length = (end - start).norm();
        let mut hits: Vec<RawHit> = self
            .iter()
            .filter(|(handle, _)| Some(*handle) != ignore)
            .filter_map(|(handle, entity)| {
                let to_local = entity.pose.inverse();
                let (local_start, local_end) = (to_local * start, to_local * end);
                let core = entity.local_box();
                let inflated =
                    Aabb::from_center_half_extents(Point3::origin(), entity.half_extents + inflation);
                let t = inflated.segment_entry(&local_start, &local_end)?;

                let swept_center = local_start + (local_end - local_start) * t;
                let local_impact = core.clamp(&swept_center);
                let local_normal = (swept_center - local_impact)
                    .try_normalize(f64::EPSILON)
                    .unwrap_or_else(|| (local_start - local_end).normalize());

                Some(RawHit {
                    point: entity.pose * local_impact,
                    normal: entity.pose.rotation * local_normal,
                    distance: length * t,
                    entity: Some(handle),
                    blocking: entity.blocking,
                })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        if let Some(first_blocking) = hits.iter().position(|h| h.blocking) {
            hits.truncate(first_blocking + 1);
        }
        hits
    }
}

impl SceneQuery for MemoryScene {
    fn sweep(&self, request: &SweepRequest<'_>) -> Vec<Vec<RawHit>> {
        let inflation = match request.shape {
            SweepShape::Capsule {
                radius,
                half_height,
            } => Vector3::new(radius, radius, half_height),
        };
        request
            .starts
            .iter()
            .zip(request.ends.iter())
            .map(|(start, end)| self.sweep_segment(start, end, inflation, request.ignore))
            .collect()
    }
}

impl SceneView for MemoryScene {
    fn entity_pose(&self, entity: EntityHandle) -> Option<Isometry3<f64>> {
        self.get(entity).map(|e| e.pose)
    }

    fn entity_velocity(&self, entity: EntityHandle) -> Option<Vector3<f64>> {
        self.get(entity).map(|e| e.velocity)
    }

    fn entity_bounds(&self, entity: EntityHandle) -> Option<Aabb> {
        self.get(entity).map(|e| e.local_box().transformed_by(&e.pose))
    }

    fn entity_surfaces(&self, entity: EntityHandle) -> Option<&[TaggedSurface]> {
        self.get(entity).map(|e| e.surfaces.as_slice())
    }
}
