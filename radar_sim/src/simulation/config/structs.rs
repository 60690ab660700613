// radar_sim/src/simulation/config/structs.rs

use crate::simulation::utils::serde_helpers;
use figment::value::Value;
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use radar_core::config::RadarConfig;
use radar_core::labels::{SemanticLabel, SurfaceKind};
use serde::{Deserialize, Serialize};

// =========================================================================
// == Scenario File ==
// =========================================================================

/// A scenario as written on disk, before prefab references are resolved.
///
/// Radars and targets stay raw so that `from = "<prefab>"` entries can be
/// merged with catalog data before they are typed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioFile {
    #[serde(default)]
    pub simulation: Simulation,
    #[serde(default)]
    pub ego: EgoConfig,
    #[serde(default)]
    pub radars: Vec<Value>,
    #[serde(default)]
    pub targets: Vec<Value>,
}

/// A fully resolved, typed scenario.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    pub simulation: Simulation,
    pub ego: EgoConfig,
    pub radars: Vec<RadarMount>,
    pub targets: Vec<TargetConfig>,
}

// =========================================================================
// == Sections ==
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Simulation {
    /// Seed for the run's random source. Unseeded runs are not repeatable.
    pub seed: Option<u64>,
    pub step_rate_hz: f64,
    pub duration_seconds: f64,
    /// Scene units per meter. Every radar is configured to match.
    pub units_per_meter: f64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            seed: None,
            step_rate_hz: 100.0,
            duration_seconds: 10.0,
            units_per_meter: 1.0,
        }
    }
}

impl Simulation {
    pub fn dt(&self) -> f64 {
        1.0 / self.step_rate_hz
    }

    pub fn planned_steps(&self) -> u64 {
        (self.duration_seconds * self.step_rate_hz).round().max(0.0) as u64
    }
}

/// The vehicle carrying every radar of the scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EgoConfig {
    pub name: String,
    pub starting_pose: Pose,
    #[serde(with = "serde_helpers::vec3_from_array")]
    pub velocity: Vector3<f64>,
    #[serde(with = "serde_helpers::vec3_from_array")]
    pub half_extents: Vector3<f64>,
}

impl Default for EgoConfig {
    fn default() -> Self {
        Self {
            name: "ego".to_string(),
            starting_pose: Pose::default(),
            velocity: Vector3::zeros(),
            half_extents: Vector3::new(2.3, 1.0, 0.75),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RadarMount {
    pub name: String,
    /// Pose of the sensor relative to the ego body.
    #[serde(default)]
    pub mount: Pose,
    #[serde(default)]
    pub radar: RadarConfig,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    pub name: String,
    pub label: SemanticLabel,
    #[serde(default)]
    pub surface: SurfaceKind,
    #[serde(with = "serde_helpers::vec3_from_array")]
    pub half_extents: Vector3<f64>,
    #[serde(default)]
    pub pose: Pose,
    #[serde(with = "serde_helpers::vec3_from_array", default)]
    pub velocity: Vector3<f64>,
    #[serde(default = "default_true")]
    pub blocking: bool,
    /// Standard deviation of the horizontal velocity noise added every step, in
    /// scene units per second.
    #[serde(default)]
    pub velocity_jitter_stddev: f64,
    /// Simulation time at which the target leaves the world.
    #[serde(default)]
    pub despawn_after_s: Option<f64>,
}

// =========================================================================
// == Helper Structs ==
// =========================================================================

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct Pose {
    #[serde(with = "serde_helpers::vec3_from_array", default)]
    pub translation: Vector3<f64>,
    #[serde(with = "serde_helpers::quat_from_euler_deg", default)]
    pub rotation: UnitQuaternion<f64>,
}

impl Pose {
    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.translation), self.rotation)
    }
}
