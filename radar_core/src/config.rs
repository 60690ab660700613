// radar_core/src/config.rs

use crate::error::RadarConfigError;
use crate::geometry::lerp;
use crate::labels::SemanticLabel;
use crate::tracking::ids::ID_SPACE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =========================================================================
// == Radar Mode ==
// =========================================================================

/// Selects how accepted hits are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum RadarMode {
    /// One detection per accepted hit, rebuilt every tick.
    Cluster,
    /// Identity-preserving tracked objects across ticks.
    #[default]
    Object,
}

// =========================================================================
// == Beam Field ==
// =========================================================================

/// Upper bound on beams in one set: a full turn at 0.1 deg.
pub const MAX_BEAMS_PER_SET: u32 = 3600;

/// Describes one fan of beams swept by the radar every tick.
///
/// Angles are in degrees and distances in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BeamParams {
    pub tag: String,
    pub enabled: bool,
    /// Full horizontal FOV; beams cover `[-fov/2, fov/2)`.
    pub horizontal_fov_deg: f64,
    /// Beams with `|azimuth|` at or below this angle keep the full range.
    pub full_distance_angle_deg: f64,
    pub vertical_fov_deg: f64,
    pub distance_min_m: f64,
    pub distance_max_m: f64,
    /// Range reached at the edge of the horizontal FOV.
    pub distance_on_max_angle_m: f64,
    pub best_resolution_deg: f64,
    pub resolution_full_distance_angle_deg: f64,
    pub resolution_max_angle_deg: f64,
    /// Minimum catalog reflectivity that still produces a detection.
    pub min_signal: f64,
    /// Overrides the default `horizontal_fov_deg / best_resolution_deg`.
    pub beam_count: Option<u32>,
}

impl Default for BeamParams {
    fn default() -> Self {
        Self {
            tag: String::new(),
            enabled: true,
            horizontal_fov_deg: 120.0,
            full_distance_angle_deg: 45.0,
            vertical_fov_deg: 20.0,
            distance_min_m: 0.2,
            distance_max_m: 70.0,
            distance_on_max_angle_m: 40.0,
            best_resolution_deg: 1.0,
            resolution_full_distance_angle_deg: 4.5,
            resolution_max_angle_deg: 12.3,
            min_signal: 0.002,
            beam_count: None,
        }
    }
}

impl BeamParams {
    fn preset(tag: &str, fov: f64, full_dist_angle: f64, d_min: f64, d_max: f64, d_edge: f64) -> Self {
        Self {
            tag: tag.to_string(),
            horizontal_fov_deg: fov,
            full_distance_angle_deg: full_dist_angle,
            distance_min_m: d_min,
            distance_max_m: d_max,
            distance_on_max_angle_m: d_edge,
            ..Default::default()
        }
    }

    pub fn half_fov_deg(&self) -> f64 {
        self.horizontal_fov_deg * 0.5
    }

    pub fn beam_count(&self) -> u32 {
        match self.beam_count {
            Some(n) => n,
            None if self.best_resolution_deg > 0.0 => {
                (self.horizontal_fov_deg / self.best_resolution_deg).max(0.0) as u32
            }
            None => 0,
        }
    }

    /// Width of a beam at its maximum range.
    pub fn beam_width_m(&self) -> f64 {
        2.0 * self.distance_max_m * (self.best_resolution_deg.to_radians() * 0.5).tan()
    }

    /// Vertical extent of a beam at its maximum range.
    pub fn beam_height_m(&self) -> f64 {
        2.0 * self.distance_max_m * (self.vertical_fov_deg.to_radians() * 0.5).tan()
    }

    /// Fraction of the way from the full-distance angle to the FOV edge.
    fn edge_fraction(&self, abs_angle: f64) -> f64 {
        let span = self.half_fov_deg() - self.full_distance_angle_deg;
        if span <= 0.0 {
            1.0
        } else {
            (abs_angle - self.full_distance_angle_deg) / span
        }
    }

    /// Horizontal resolution at the given azimuth.
    pub fn resolution_for_angle(&self, angle_deg: f64) -> f64 {
        let a = angle_deg.abs();
        if a < self.full_distance_angle_deg {
            lerp(
                self.best_resolution_deg,
                self.resolution_full_distance_angle_deg,
                a / self.full_distance_angle_deg,
            )
        } else {
            lerp(
                self.resolution_full_distance_angle_deg,
                self.resolution_max_angle_deg,
                self.edge_fraction(a),
            )
        }
    }

    /// Maximum range of a beam pointing at `angle_deg`.
    pub fn max_range_for_angle(&self, angle_deg: f64) -> f64 {
        let a = angle_deg.abs();
        if a > self.full_distance_angle_deg {
            lerp(
                self.distance_max_m,
                self.distance_on_max_angle_m,
                self.edge_fraction(a),
            )
        } else {
            self.distance_max_m
        }
    }

    /// Length of the swept segment for a beam at `angle_deg`.
    pub fn ray_length_for_angle(&self, angle_deg: f64) -> f64 {
        self.max_range_for_angle(angle_deg) - self.distance_min_m
    }

    pub fn validate(&self) -> Result<(), RadarConfigError> {
        if self.beam_count.is_none() && self.best_resolution_deg <= 0.0 {
            return Err(RadarConfigError::InvalidResolution {
                tag: self.tag.clone(),
                value: self.best_resolution_deg,
            });
        }
        if self.beam_count() == 0 {
            return Err(RadarConfigError::ZeroBeams {
                tag: self.tag.clone(),
            });
        }
        if self.beam_count() > MAX_BEAMS_PER_SET {
            return Err(RadarConfigError::TooManyBeams {
                tag: self.tag.clone(),
                count: self.beam_count(),
                max: MAX_BEAMS_PER_SET,
            });
        }
        if self.distance_min_m >= self.distance_max_m {
            return Err(RadarConfigError::InvertedDistances {
                tag: self.tag.clone(),
                min: self.distance_min_m,
                max: self.distance_max_m,
            });
        }
        if self.full_distance_angle_deg < 0.0 || self.full_distance_angle_deg > self.half_fov_deg() {
            return Err(RadarConfigError::InvalidFullDistanceAngle {
                tag: self.tag.clone(),
                angle: self.full_distance_angle_deg,
                half_fov: self.half_fov_deg(),
            });
        }
        Ok(())
    }
}

// =========================================================================
// == Reflectivity Catalog ==
// =========================================================================

/// Radar response of one semantic class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelReflectivity {
    /// Radar cross-section coefficient.
    pub rcs: f64,
    /// Whether the class stops the radio wave.
    ///
    /// The engine never reads this. Occlusion is decided by the scene's sweep
    /// (`RawHit::blocking`), so a scene adapter backed by a physics engine
    /// uses it to set up its collision responses per label.
    #[serde(default)]
    pub blocking: bool,
}

impl LabelReflectivity {
    pub const fn new(rcs: f64, blocking: bool) -> Self {
        Self { rcs, blocking }
    }
}

/// Maps semantic labels to their reflectivity. Labels missing from the
/// catalog are invisible to the radar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReflectivityCatalog(pub BTreeMap<SemanticLabel, LabelReflectivity>);

impl Default for ReflectivityCatalog {
    fn default() -> Self {
        use SemanticLabel::*;
        Self(BTreeMap::from([
            (Buildings, LabelReflectivity::new(0.005, true)),
            (Fences, LabelReflectivity::new(0.2, false)),
            (Pedestrians, LabelReflectivity::new(1.0, false)),
            (Poles, LabelReflectivity::new(0.4, false)),
            (TrafficSigns, LabelReflectivity::new(0.5, true)),
            (Vegetation, LabelReflectivity::new(0.1, false)),
            (Vehicles, LabelReflectivity::new(3.0, true)),
            (Walls, LabelReflectivity::new(0.05, true)),
        ]))
    }
}

impl ReflectivityCatalog {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, label: SemanticLabel) -> Option<&LabelReflectivity> {
        self.0.get(&label)
    }

    pub fn insert(&mut self, label: SemanticLabel, value: LabelReflectivity) {
        self.0.insert(label, value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =========================================================================
// == Radar Configuration ==
// =========================================================================

/// Everything a single radar engine needs to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RadarConfig {
    pub mode: RadarMode,
    pub device_id: u32,
    /// Minimum simulation time between two scans, in seconds. Zero scans on every call.
    pub period_s: f64,
    /// Beam sets, swept in order every scan.
    pub beams: Vec<BeamParams>,
    pub reflectivity: ReflectivityCatalog,
    /// Boost applied to hit reflectivity in object mode.
    pub object_mode_rcs_multiplier: f64,
    /// Maximum number of simultaneously tracked objects.
    pub max_objects: usize,
    /// Upper bound of the persistence counter.
    pub probability_counter_max: i32,
    /// Smallest extent of a tracked object's box along any axis.
    pub min_box_size_m: f64,
    /// Scene units per meter (100 for a centimeter world).
    pub units_per_meter: f64,
    /// Log every rejected hit at debug level.
    pub debug_log: bool,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            mode: RadarMode::Object,
            device_id: 0,
            period_s: 0.07,
            beams: vec![
                BeamParams::preset("Nearest", 120.0, 40.0, 0.2, 70.0 * 0.18, 40.0),
                BeamParams::preset("Near", 120.0, 40.0, 70.0 * 0.18, 70.0, 40.0),
                BeamParams::preset("Far", 18.0, 4.0, 1.0, 250.0, 150.0),
            ],
            reflectivity: ReflectivityCatalog::default(),
            object_mode_rcs_multiplier: 6.0,
            max_objects: 50,
            probability_counter_max: 10,
            min_box_size_m: 0.1,
            units_per_meter: 1.0,
            debug_log: false,
        }
    }
}

impl RadarConfig {
    pub fn enabled_beams(&self) -> impl Iterator<Item = &BeamParams> {
        self.beams.iter().filter(|b| b.enabled)
    }

    /// Checks the configuration for values the engine cannot scan with.
    pub fn validate(&self) -> Result<(), RadarConfigError> {
        if self.enabled_beams().next().is_none() {
            return Err(RadarConfigError::NoEnabledBeams);
        }
        for beams in self.enabled_beams() {
            beams.validate()?;
        }
        if self.reflectivity.is_empty() {
            return Err(RadarConfigError::EmptyCatalog);
        }
        if self.max_objects > ID_SPACE {
            return Err(RadarConfigError::TooManyObjects(self.max_objects));
        }
        if !(self.units_per_meter > 0.0) {
            return Err(RadarConfigError::InvalidUnits(self.units_per_meter));
        }
        if self.period_s < 0.0 {
            return Err(RadarConfigError::NegativePeriod(self.period_s));
        }
        Ok(())
    }
}
