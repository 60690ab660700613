// radar_core/src/labels.rs

use serde::{Deserialize, Serialize};

/// The semantic class of a piece of world geometry, as tagged by the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum SemanticLabel {
    Buildings,
    Fences,
    Other,
    Pedestrians,
    Poles,
    RoadLines,
    Roads,
    Sidewalks,
    TrafficSigns,
    Vegetation,
    Vehicles,
    Walls,
    Terrain,
}

/// The kind of component a surface belongs to.
///
/// Rigid meshes are consulted before deformable (skinned) ones when resolving
/// the label of an entity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "PascalCase")]
pub enum SurfaceKind {
    #[default]
    RigidMesh,
    DeformableMesh,
}

/// One taggable surface component of a scene entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaggedSurface {
    RigidMesh { label: Option<SemanticLabel> },
    DeformableMesh { label: Option<SemanticLabel> },
}

impl TaggedSurface {
    pub fn new(kind: SurfaceKind, label: Option<SemanticLabel>) -> Self {
        match kind {
            SurfaceKind::RigidMesh => TaggedSurface::RigidMesh { label },
            SurfaceKind::DeformableMesh => TaggedSurface::DeformableMesh { label },
        }
    }

    pub fn kind(&self) -> SurfaceKind {
        match self {
            TaggedSurface::RigidMesh { .. } => SurfaceKind::RigidMesh,
            TaggedSurface::DeformableMesh { .. } => SurfaceKind::DeformableMesh,
        }
    }

    pub fn semantic_label(&self) -> Option<SemanticLabel> {
        match self {
            TaggedSurface::RigidMesh { label } | TaggedSurface::DeformableMesh { label } => *label,
        }
    }
}

/// Resolves the label of an entity from its surfaces.
///
/// All rigid meshes are inspected first, then all deformable meshes; within a
/// kind the surfaces keep their given order. The first tagged surface wins.
pub fn resolve_label(surfaces: &[TaggedSurface]) -> Option<SemanticLabel> {
    [SurfaceKind::RigidMesh, SurfaceKind::DeformableMesh]
        .into_iter()
        .flat_map(|kind| surfaces.iter().filter(move |s| s.kind() == kind))
        .find_map(TaggedSurface::semantic_label)
}
