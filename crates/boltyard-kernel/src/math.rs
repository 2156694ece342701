//! Math types for the geometry layer.
//!
//! Thin wrappers around nalgebra: points, vectors, rigid locations and
//! tolerance constants.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// One of the three coordinate axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// The X axis.
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

impl Axis {
    /// Component index (0, 1, 2).
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Unit vector along the axis.
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::x(),
            Axis::Y => Vec3::y(),
            Axis::Z => Vec3::z(),
        }
    }
}

/// A rigid placement: rotation followed by translation.
///
/// Locations compose like matrices: `(a * b).apply_point(p)` equals
/// `a.apply_point(&b.apply_point(p))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    /// Rotation part (orthonormal).
    pub rotation: Matrix3<f64>,
    /// Translation part.
    pub translation: Vec3,
}

impl Location {
    /// Identity location.
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vec3::zeros(),
        }
    }

    /// Pure translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vec3::new(dx, dy, dz),
        }
    }

    /// Pure rotation from Euler angles in degrees, applied X, then Y, then Z.
    pub fn from_euler_deg(rx: f64, ry: f64, rz: f64) -> Self {
        let (sx, cx) = rx.to_radians().sin_cos();
        let (sy, cy) = ry.to_radians().sin_cos();
        let (sz, cz) = rz.to_radians().sin_cos();
        let rot_x = Matrix3::new(1.0, 0.0, 0.0, 0.0, cx, -sx, 0.0, sx, cx);
        let rot_y = Matrix3::new(cy, 0.0, sy, 0.0, 1.0, 0.0, -sy, 0.0, cy);
        let rot_z = Matrix3::new(cz, -sz, 0.0, sz, cz, 0.0, 0.0, 0.0, 1.0);
        Self {
            rotation: rot_z * rot_y * rot_x,
            translation: Vec3::zeros(),
        }
    }

    /// Translation `position` combined with Euler rotation `angles` (degrees).
    pub fn new(position: [f64; 3], angles: [f64; 3]) -> Self {
        let mut loc = Self::from_euler_deg(angles[0], angles[1], angles[2]);
        loc.translation = Vec3::new(position[0], position[1], position[2]);
        loc
    }

    /// Euler angles in degrees (X, Y, Z order) reproducing this rotation.
    pub fn to_euler_deg(&self) -> [f64; 3] {
        let r = &self.rotation;
        let sy = (-r[(2, 0)]).clamp(-1.0, 1.0);
        let ry = sy.asin();
        if sy.abs() < 1.0 - 1e-12 {
            let rx = r[(2, 1)].atan2(r[(2, 2)]);
            let rz = r[(1, 0)].atan2(r[(0, 0)]);
            [rx.to_degrees(), ry.to_degrees(), rz.to_degrees()]
        } else {
            // Gimbal lock: fold the X rotation into Z.
            let rz = (-r[(0, 1)]).atan2(r[(1, 1)]);
            [0.0, ry.to_degrees(), rz.to_degrees()]
        }
    }

    /// Origin of this frame in the parent frame.
    pub fn position(&self) -> Point3 {
        Point3::from(self.translation)
    }

    /// Local +Z direction expressed in the parent frame.
    pub fn z_axis(&self) -> Vec3 {
        self.rotation.column(2).into_owned()
    }

    /// Compose: apply `other` first, then `self`.
    pub fn then(&self, other: &Location) -> Self {
        Self {
            rotation: self.rotation * other.rotation,
            translation: self.rotation * other.translation + self.translation,
        }
    }

    /// Inverse placement.
    pub fn inverse(&self) -> Self {
        let rt = self.rotation.transpose();
        Self {
            rotation: rt,
            translation: -(rt * self.translation),
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        Point3::from(self.rotation * p.coords + self.translation)
    }

    /// Transform a direction vector (rotation only).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        self.rotation * v
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Location {
    type Output = Location;
    fn mul(self, rhs: Location) -> Location {
        self.then(&rhs)
    }
}

impl Mul<&Location> for &Location {
    type Output = Location;
    fn mul(self, rhs: &Location) -> Location {
        self.then(rhs)
    }
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in mm.
    pub linear: f64,
    /// Minimum penetration depth that counts as interference, in mm.
    pub penetration: f64,
}

impl Tolerance {
    /// Default tolerances (1e-6 mm linear, 0.01 mm penetration).
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        penetration: 0.01,
    };

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_location() {
        let p = Point3::new(1.0, 2.0, 3.0);
        let result = Location::identity().apply_point(&p);
        assert!((result - p).norm() < 1e-12);
    }

    #[test]
    fn test_translation() {
        let t = Location::translation(10.0, 20.0, 30.0);
        let result = t.apply_point(&Point3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(result.x, 11.0);
        assert_relative_eq!(result.y, 22.0);
        assert_relative_eq!(result.z, 33.0);
    }

    #[test]
    fn test_rotation_z_90() {
        let t = Location::from_euler_deg(0.0, 0.0, 90.0);
        let result = t.apply_point(&Point3::new(1.0, 0.0, 0.0));
        assert!(result.x.abs() < 1e-12);
        assert_relative_eq!(result.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_compose_applies_right_first() {
        let move_up = Location::translation(0.0, 0.0, 5.0);
        let flip = Location::from_euler_deg(180.0, 0.0, 0.0);
        // translate first, then flip about X: (0,0,0) -> (0,0,5) -> (0,0,-5)
        let p = (flip * move_up).apply_point(&Point3::origin());
        assert_relative_eq!(p.z, -5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_inverse() {
        let t = Location::new([1.0, 2.0, 3.0], [10.0, 20.0, 30.0]);
        let p = Point3::new(5.0, 6.0, 7.0);
        let back = t.inverse().apply_point(&t.apply_point(&p));
        assert!((back - p).norm() < 1e-12);
    }

    #[test]
    fn test_euler_roundtrip() {
        let angles = [15.0, -30.0, 45.0];
        let loc = Location::from_euler_deg(angles[0], angles[1], angles[2]);
        let back = loc.to_euler_deg();
        for i in 0..3 {
            assert_relative_eq!(back[i], angles[i], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_flip_reports_minus_180() {
        let flip = Location::from_euler_deg(-180.0, 0.0, 0.0);
        let placed = Location::translation(0.0, 0.0, -20.0) * flip;
        assert_relative_eq!(placed.to_euler_deg()[0], -180.0, epsilon = 1e-9);
        assert_relative_eq!(placed.z_axis().z, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_tolerance_points_equal() {
        let tol = Tolerance::DEFAULT;
        let a = Point3::new(1.0, 2.0, 3.0);
        assert!(tol.points_equal(&a, &Point3::new(1.0 + 1e-7, 2.0, 3.0)));
        assert!(!tol.points_equal(&a, &Point3::new(1.001, 2.0, 3.0)));
    }
}
