// radar_core/src/geometry.rs

use nalgebra::{Isometry3, Point3, Vector3};
use num_traits::Float;

/// Linear interpolation between `a` and `b`. `t` is not clamped.
pub fn lerp<T: Float>(a: T, b: T, t: T) -> T {
    a + (b - a) * t
}

/// An axis-aligned bounding box.
///
/// A freshly created box is *invalid* (contains nothing); the first point
/// added makes it a degenerate box around that point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
    valid: bool,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

impl Aabb {
    pub fn empty() -> Self {
        Self {
            min: Point3::origin(),
            max: Point3::origin(),
            valid: false,
        }
    }

    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self {
            min: min.inf(&max),
            max: min.sup(&max),
            valid: true,
        }
    }

    pub fn from_center_half_extents(center: Point3<f64>, half_extents: Vector3<f64>) -> Self {
        let half = half_extents.abs();
        Self::new(center - half, center + half)
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.include(p);
        }
        aabb
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Grows the box so that it contains `point`.
    pub fn include(&mut self, point: &Point3<f64>) {
        if self.valid {
            self.min = self.min.inf(point);
            self.max = self.max.sup(point);
        } else {
            self.min = *point;
            self.max = *point;
            self.valid = true;
        }
    }

    pub fn size(&self) -> Vector3<f64> {
        if self.valid {
            self.max - self.min
        } else {
            Vector3::zeros()
        }
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn half_extents(&self) -> Vector3<f64> {
        self.size() * 0.5
    }

    /// Returns the same-sized box re-centred on `center`.
    pub fn moved_to(&self, center: Point3<f64>) -> Self {
        Self::from_center_half_extents(center, self.half_extents())
    }

    /// Inflates each axis symmetrically until it is at least `min_size` wide.
    pub fn inflate_to_min_size(&mut self, min_size: f64) {
        let size = self.size();
        for axis in 0..3 {
            if size[axis] < min_size {
                let pad = (min_size - size[axis]) * 0.5;
                self.min[axis] -= pad;
                self.max[axis] += pad;
            }
        }
    }

    pub fn contains(&self, point: &Point3<f64>) -> bool {
        self.valid
            && (0..3).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }

    /// Closest point of the box to `point`.
    pub fn clamp(&self, point: &Point3<f64>) -> Point3<f64> {
        point.sup(&self.min).inf(&self.max)
    }

    pub fn corners(&self) -> [Point3<f64>; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(a.x, b.y, b.z),
            Point3::new(b.x, b.y, b.z),
        ]
    }

    /// The axis-aligned box enclosing this box after applying `iso`.
    pub fn transformed_by(&self, iso: &Isometry3<f64>) -> Self {
        if !self.valid {
            return *self;
        }
        let corners = self.corners().map(|c| iso * c);
        Self::from_points(corners.iter())
    }

    /// Intersects the segment `start + t * (end - start)`, `t` in `[0, 1]`,
    /// with the box (slab method). Returns the entry parameter.
    pub fn segment_entry(&self, start: &Point3<f64>, end: &Point3<f64>) -> Option<f64> {
        if !self.valid {
            return None;
        }
        let dir = end - start;
        let (mut t_min, mut t_max) = (0.0_f64, 1.0_f64);
        for axis in 0..3 {
            if dir[axis].abs() < f64::EPSILON {
                if start[axis] < self.min[axis] || start[axis] > self.max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / dir[axis];
            let mut t0 = (self.min[axis] - start[axis]) * inv;
            let mut t1 = (self.max[axis] - start[axis]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
        Some(t_min)
    }
}

/// Yaw of a sensor-local direction, in degrees (positive to the left).
pub fn azimuth_deg(local: &Point3<f64>) -> f64 {
    local.y.atan2(local.x).to_degrees()
}
