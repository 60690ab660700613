// radar_core/src/scene/mod.rs

//! The boundary between the radar engine and the world it observes.
//!
//! The engine never walks a scene graph itself. It issues one batched sweep
//! per beam set through [`SceneQuery`] and looks up the state of struck
//! entities through [`SceneView`]. A physics engine adapter implements both;
//! [`MemoryScene`] is a self-contained implementation for headless runs and
//! tests.

mod memory;

pub use memory::{MemoryScene, SceneEntity};

use crate::geometry::Aabb;
use crate::labels::TaggedSurface;
use crate::types::EntityHandle;
use nalgebra::{Isometry3, Point3, UnitQuaternion, Vector3};

/// Collision channel the radar sweeps on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CollisionChannel(pub u8);

/// The shape swept along every beam segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweepShape {
    /// A capsule whose axis is the local Z axis of the sweep rotation.
    Capsule { radius: f64, half_height: f64 },
}

/// A batched sweep: one segment per beam, all with the same shape.
#[derive(Debug, Clone)]
pub struct SweepRequest<'a> {
    pub shape: SweepShape,
    pub rotation: UnitQuaternion<f64>,
    pub starts: &'a [Point3<f64>],
    pub ends: &'a [Point3<f64>],
    pub channel: CollisionChannel,
    /// Entity that never reports hits (the radar's own vehicle).
    pub ignore: Option<EntityHandle>,
}

/// One impact reported by a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawHit {
    /// Impact point in world space.
    pub point: Point3<f64>,
    pub normal: Vector3<f64>,
    /// Distance travelled along the segment from its start.
    pub distance: f64,
    pub entity: Option<EntityHandle>,
    pub blocking: bool,
}

/// Batched geometric sweeps against the scene.
pub trait SceneQuery {
    /// Sweeps every segment of the request.
    ///
    /// Must return exactly one list per segment, in request order. A segment
    /// that hits nothing yields an empty list.
    fn sweep(&self, request: &SweepRequest<'_>) -> Vec<Vec<RawHit>>;
}

/// Read access to the current state of scene entities.
///
/// Every lookup returns `None` for a handle whose entity has been destroyed.
pub trait SceneView {
    /// World pose of the entity.
    fn entity_pose(&self, entity: EntityHandle) -> Option<Isometry3<f64>>;

    /// Linear velocity of the entity in world units per second.
    fn entity_velocity(&self, entity: EntityHandle) -> Option<Vector3<f64>>;

    /// World-space box around all components of the entity.
    fn entity_bounds(&self, entity: EntityHandle) -> Option<Aabb>;

    /// The taggable surface components of the entity.
    fn entity_surfaces(&self, entity: EntityHandle) -> Option<&[TaggedSurface]>;

    fn is_alive(&self, entity: EntityHandle) -> bool {
        self.entity_pose(entity).is_some()
    }
}
