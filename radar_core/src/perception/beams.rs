// radar_core/src/perception/beams.rs

use crate::config::BeamParams;
use crate::scene::SweepShape;
use nalgebra::{Isometry3, Point3, Vector3};

/// One beam of the fan, ready to be swept. Positions are in world units.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamSegment {
    pub index: u32,
    /// Horizontal angle from boresight, degrees (positive to the left).
    pub azimuth_deg: f64,
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

/// The full sweep for one beam set on one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamPlan {
    pub segments: Vec<BeamSegment>,
    pub capsule_radius: f64,
    pub capsule_half_height: f64,
}

impl BeamPlan {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn shape(&self) -> SweepShape {
        SweepShape::Capsule {
            radius: self.capsule_radius,
            half_height: self.capsule_half_height,
        }
    }

    pub fn starts(&self) -> Vec<Point3<f64>> {
        self.segments.iter().map(|s| s.start).collect()
    }

    pub fn ends(&self) -> Vec<Point3<f64>> {
        self.segments.iter().map(|s| s.end).collect()
    }
}

/// Lays out the beams of `params` around the sensor `pose`.
///
/// Beam `i` of `N` points at `-fov/2 + i * fov/N` in the sensor's horizontal
/// plane. Each beam starts `distance_min` minus the capsule radius away from
/// the sensor (never behind it) and extends to the beam's range at that angle.
/// A beam set with zero beams yields an empty plan.
pub fn plan_beams(pose: &Isometry3<f64>, params: &BeamParams, units_per_meter: f64) -> BeamPlan {
    let capsule_radius = params.beam_width_m() * 0.5 * units_per_meter;
    let capsule_half_height = params.beam_height_m() * 0.5 * units_per_meter;
    let count = params.beam_count();
    if count == 0 {
        return BeamPlan {
            segments: Vec::new(),
            capsule_radius,
            capsule_half_height,
        };
    }

    let step = params.horizontal_fov_deg / count as f64;
    let near = (params.distance_min_m * units_per_meter - capsule_radius).max(0.0);
    let origin = Point3::from(pose.translation.vector);

    let segments = (0..count)
        .map(|i| {
            let azimuth_deg = -params.half_fov_deg() + step * i as f64;
            let a = azimuth_deg.to_radians();
            let dir = pose.rotation * Vector3::new(a.cos(), a.sin(), 0.0);
            let length = params.ray_length_for_angle(azimuth_deg) * units_per_meter;
            BeamSegment {
                index: i,
                azimuth_deg,
                start: origin + dir * near,
                end: origin + dir * (near + length),
            }
        })
        .collect();

    BeamPlan {
        segments,
        capsule_radius,
        capsule_half_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::{Translation3, UnitQuaternion};
    use std::f64::consts::FRAC_PI_2;

    fn params() -> BeamParams {
        BeamParams {
            horizontal_fov_deg: 120.0,
            full_distance_angle_deg: 45.0,
            distance_min_m: 1.0,
            distance_max_m: 70.0,
            distance_on_max_angle_m: 40.0,
            best_resolution_deg: 10.0,
            ..Default::default()
        }
    }

    #[test]
    fn beams_cover_fov_from_right_to_left() {
        let plan = plan_beams(&Isometry3::identity(), &params(), 1.0);
        assert_eq!(plan.len(), 12);
        let angles: Vec<f64> = plan.segments.iter().map(|s| s.azimuth_deg).collect();
        assert_abs_diff_eq!(angles[0], -60.0, epsilon = 1e-12);
        assert_abs_diff_eq!(angles[6], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(angles[11], 50.0, epsilon = 1e-12);
        assert!(plan.segments.iter().enumerate().all(|(i, s)| s.index == i as u32));
    }

    #[test]
    fn boresight_beam_keeps_full_range() {
        let p = params();
        let plan = plan_beams(&Isometry3::identity(), &p, 1.0);
        let boresight = &plan.segments[6];
        let near = (1.0 - plan.capsule_radius).max(0.0);
        assert_abs_diff_eq!(boresight.start, Point3::new(near, 0.0, 0.0), epsilon = 1e-9);
        assert_abs_diff_eq!(
            boresight.end,
            Point3::new(near + 69.0, 0.0, 0.0),
            epsilon = 1e-9
        );

        // The edge beam is cut down to the max-angle range.
        let edge = &plan.segments[0];
        let edge_length = (edge.end - edge.start).norm();
        assert_abs_diff_eq!(edge_length, 39.0, epsilon = 1e-9);
    }

    #[test]
    fn near_distance_never_goes_behind_the_sensor() {
        let p = BeamParams {
            distance_min_m: 0.2,
            ..params()
        };
        let plan = plan_beams(&Isometry3::identity(), &p, 1.0);
        assert!(plan.capsule_radius > 0.2);
        assert_abs_diff_eq!(plan.segments[6].start, Point3::origin(), epsilon = 1e-12);
    }

    #[test]
    fn capsule_matches_beam_footprint_and_units() {
        let p = params();
        let plan = plan_beams(&Isometry3::identity(), &p, 100.0);
        assert_abs_diff_eq!(
            plan.capsule_radius,
            70.0 * (5.0_f64).to_radians().tan() * 100.0,
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(
            plan.capsule_half_height,
            70.0 * (10.0_f64).to_radians().tan() * 100.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn plan_follows_sensor_pose() {
        let pose = Isometry3::from_parts(
            Translation3::new(5.0, 5.0, 1.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        );
        let plan = plan_beams(&pose, &params(), 1.0);
        let boresight = &plan.segments[6];
        let dir = (boresight.end - boresight.start).normalize();
        assert_abs_diff_eq!(dir, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-9);
        assert_abs_diff_eq!(boresight.start.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_beams_give_an_empty_plan() {
        let p = BeamParams {
            beam_count: Some(0),
            ..params()
        };
        assert!(plan_beams(&Isometry3::identity(), &p, 1.0).is_empty());
    }
}
