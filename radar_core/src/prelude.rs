// radar_core/src/prelude.rs

// --- Engine and its inputs/outputs ---
pub use crate::engine::{RadarEngine, ScanStats, TickInput};
pub use crate::messages::{ClusterReport, ObjectReport, RadarScan, ScanPayload};
pub use crate::snapshot::ScanSnapshot;

// --- Configuration ---
pub use crate::config::{BeamParams, LabelReflectivity, RadarConfig, RadarMode, ReflectivityCatalog};
pub use crate::error::{HitRejection, RadarConfigError};

// --- Scene boundary ---
pub use crate::labels::{SemanticLabel, SurfaceKind, TaggedSurface};
pub use crate::scene::{MemoryScene, RawHit, SceneEntity, SceneQuery, SceneView, SweepRequest, SweepShape};
pub use crate::types::{EntityHandle, ObjectId, Timestamp};

// --- Pipeline stages ---
pub use crate::geometry::Aabb;
pub use crate::perception::{BeamPlan, Cluster, ClusterAggregator, Hit};
pub use crate::tracking::{ObjectTracker, TrackedObject, TrackerParams};
