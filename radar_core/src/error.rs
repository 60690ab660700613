// radar_core/src/error.rs

use crate::labels::SemanticLabel;
use crate::types::EntityHandle;
use thiserror::Error;

/// Problems found while validating a `RadarConfig`.
///
/// The engine never aborts a tick because of these. A radar with an invalid
/// configuration simply publishes empty scans and logs a warning.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RadarConfigError {
    #[error("radar has no enabled beam set")]
    NoEnabledBeams,
    #[error("beam set '{tag}' produces zero beams")]
    ZeroBeams { tag: String },
    #[error("beam set '{tag}' has a non-positive best resolution ({value} deg)")]
    InvalidResolution { tag: String, value: f64 },
    #[error("beam set '{tag}' asks for {count} beams, more than the {max} allowed")]
    TooManyBeams { tag: String, count: u32, max: u32 },
    #[error("beam set '{tag}' has distance_min ({min} m) >= distance_max ({max} m)")]
    InvertedDistances { tag: String, min: f64, max: f64 },
    #[error("beam set '{tag}' has full-distance angle {angle} deg outside its half FOV {half_fov} deg")]
    InvalidFullDistanceAngle {
        tag: String,
        angle: f64,
        half_fov: f64,
    },
    #[error("the reflectivity catalog is empty")]
    EmptyCatalog,
    #[error("max_objects = {0} exceeds the 256 available object ids")]
    TooManyObjects(usize),
    #[error("units_per_meter must be positive, got {0}")]
    InvalidUnits(f64),
    #[error("period_s must not be negative, got {0}")]
    NegativePeriod(f64),
}

/// Why a raw sweep result did not become a radar hit.
///
/// Rejections are ordinary outcomes of classification, not failures.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum HitRejection {
    #[error("non-positive sweep distance {0}")]
    NonPositiveDistance(f64),
    #[error("hit has no owning entity")]
    NoEntity,
    #[error("slant distance {distance} exceeds beam range {max_range}")]
    OutOfRange { distance: f64, max_range: f64 },
    #[error("entity {0} has no recognised semantic label")]
    Unlabeled(EntityHandle),
    #[error("label {0:?} is not in the reflectivity catalog")]
    NotCataloged(SemanticLabel),
    #[error("label {label:?} reflectivity {rcs} is below the minimum signal {min_signal}")]
    WeakSignal {
        label: SemanticLabel,
        rcs: f64,
        min_signal: f64,
    },
    #[error("entity {0} is no longer valid")]
    StaleEntity(EntityHandle),
}
