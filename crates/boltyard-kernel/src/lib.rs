#![warn(missing_docs)]

//! Implicit CSG geometry layer for boltyard.
//!
//! Provides the [`Solid`] type: an immutable tree of primitives combined
//! with boolean operations and rigid placements. Solids answer the
//! queries fastener code needs (containment, bounding box, volume,
//! interference) without building a boundary representation.
//!
//! # Example
//!
//! ```
//! use boltyard_kernel::{Location, Solid};
//!
//! let plate = Solid::cuboid(20.0, 20.0, 5.0);
//! let bore = Solid::cylinder(2.75, 5.0).moved(&Location::translation(10.0, 10.0, 0.0));
//! let drilled = plate.difference(&bore);
//! assert!(drilled.volume() < 20.0 * 20.0 * 5.0);
//! ```

pub mod bbox;
pub mod math;
pub mod octree;
pub mod sdf;

use std::sync::Arc;

use thiserror::Error;

pub use bbox::Aabb3;
pub use math::{Axis, Location, Point3, Tolerance, Vec3};
pub use sdf::Primitive;

/// Errors returned by geometry queries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    /// Resolution must be a positive, finite length.
    #[error("invalid resolution: {0}")]
    InvalidResolution(f64),
}

/// Number of leaf cells across the widest side of an integration region.
const CELLS_PER_REGION: f64 = 64.0;

/// Leaf size used by interference searches, in mm.
const INTERFERENCE_RESOLUTION: f64 = 0.05;

#[derive(Debug)]
enum Node {
    Empty,
    Primitive(Primitive),
    Union(Solid, Solid),
    Difference(Solid, Solid),
    Intersection(Solid, Solid),
    Placed {
        child: Solid,
        location: Location,
        inverse: Location,
    },
}

/// A 3D solid.
///
/// Cloning is cheap: the CSG tree is shared.
#[derive(Debug, Clone)]
pub struct Solid {
    node: Arc<Node>,
    bbox: Aabb3,
}

impl Solid {
    // =========================================================================
    // Constructors
    // =========================================================================

    fn from_node(node: Node, bbox: Aabb3) -> Self {
        Self {
            node: Arc::new(node),
            bbox,
        }
    }

    /// Create an empty solid.
    pub fn empty() -> Self {
        Self::from_node(Node::Empty, Aabb3::empty())
    }

    /// Wrap a primitive. Degenerate dimensions yield an empty solid.
    pub fn primitive(primitive: Primitive) -> Self {
        if !primitive.is_valid() {
            return Self::empty();
        }
        let bbox = primitive.local_bbox();
        Self::from_node(Node::Primitive(primitive), bbox)
    }

    /// Box with its minimum corner at the origin.
    pub fn cuboid(sx: f64, sy: f64, sz: f64) -> Self {
        Self::primitive(Primitive::Cuboid { size: [sx, sy, sz] })
    }

    /// Cylinder along +Z from z=0.
    pub fn cylinder(radius: f64, height: f64) -> Self {
        Self::primitive(Primitive::Cylinder { radius, height })
    }

    /// Cone frustum along +Z from z=0.
    pub fn cone(radius_bottom: f64, radius_top: f64, height: f64) -> Self {
        Self::primitive(Primitive::Cone {
            radius_bottom,
            radius_top,
            height,
        })
    }

    /// Sphere centered at the origin.
    pub fn sphere(radius: f64) -> Self {
        Self::primitive(Primitive::Sphere { radius })
    }

    /// Regular polygon prism along +Z from z=0, one vertex on +X.
    pub fn prism(sides: u32, circumradius: f64, height: f64) -> Self {
        Self::primitive(Primitive::Prism {
            sides,
            circumradius,
            height,
        })
    }

    /// Thread band along +Z from z=0.
    pub fn thread(
        minor_radius: f64,
        major_radius: f64,
        pitch: f64,
        length: f64,
        internal: bool,
    ) -> Self {
        Self::primitive(Primitive::Thread {
            minor_radius,
            major_radius,
            pitch,
            length,
            internal,
        })
    }

    // =========================================================================
    // CSG boolean operations
    // =========================================================================

    /// Boolean union (self ∪ other).
    pub fn union(&self, other: &Solid) -> Solid {
        match (self.is_empty(), other.is_empty()) {
            (true, _) => other.clone(),
            (_, true) => self.clone(),
            _ => Self::from_node(
                Node::Union(self.clone(), other.clone()),
                self.bbox.union(&other.bbox),
            ),
        }
    }

    /// Boolean difference (self − other).
    pub fn difference(&self, other: &Solid) -> Solid {
        if self.is_empty() {
            return Solid::empty();
        }
        if other.is_empty() || !self.bbox.overlaps(&other.bbox) {
            return self.clone();
        }
        Self::from_node(Node::Difference(self.clone(), other.clone()), self.bbox)
    }

    /// Boolean intersection (self ∩ other).
    pub fn intersection(&self, other: &Solid) -> Solid {
        let bbox = self.bbox.intersection(&other.bbox);
        if self.is_empty() || other.is_empty() || bbox.is_empty() {
            return Solid::empty();
        }
        Self::from_node(Node::Intersection(self.clone(), other.clone()), bbox)
    }

    /// Union of all solids in `parts`.
    pub fn union_all<'a>(parts: impl IntoIterator<Item = &'a Solid>) -> Solid {
        parts
            .into_iter()
            .fold(Solid::empty(), |acc, s| acc.union(s))
    }

    // =========================================================================
    // Placement
    // =========================================================================

    /// Apply a rigid placement.
    pub fn moved(&self, location: &Location) -> Solid {
        if self.is_empty() {
            return self.clone();
        }
        // Collapse nested placements into one.
        let (child, location) = match self.node.as_ref() {
            Node::Placed {
                child,
                location: inner,
                ..
            } => (child.clone(), location.then(inner)),
            _ => (self.clone(), *location),
        };
        let bbox = child.bbox.transformed(&location);
        Self::from_node(
            Node::Placed {
                child,
                location,
                inverse: location.inverse(),
            },
            bbox,
        )
    }

    /// Translate by `(dx, dy, dz)`.
    pub fn translate(&self, dx: f64, dy: f64, dz: f64) -> Solid {
        self.moved(&Location::translation(dx, dy, dz))
    }

    /// Rotate by Euler angles in degrees (X, then Y, then Z).
    pub fn rotate(&self, rx: f64, ry: f64, rz: f64) -> Solid {
        self.moved(&Location::from_euler_deg(rx, ry, rz))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// True if the solid has no geometry.
    pub fn is_empty(&self) -> bool {
        matches!(self.node.as_ref(), Node::Empty)
    }

    /// Signed distance bound at `p` (negative inside).
    pub fn sdf(&self, p: &Point3) -> f64 {
        match self.node.as_ref() {
            Node::Empty => f64::INFINITY,
            Node::Primitive(prim) => prim.sdf(p),
            Node::Union(a, b) => a.sdf(p).min(b.sdf(p)),
            Node::Difference(a, b) => a.sdf(p).max(-b.sdf(p)),
            Node::Intersection(a, b) => a.sdf(p).max(b.sdf(p)),
            Node::Placed { child, inverse, .. } => child.sdf(&inverse.apply_point(p)),
        }
    }

    /// True if `p` lies strictly inside.
    pub fn contains(&self, p: &Point3) -> bool {
        self.sdf(p) < 0.0
    }

    /// Axis-aligned bounding box (conservative after rotations).
    pub fn bounding_box(&self) -> Aabb3 {
        self.bbox
    }

    /// Enclosed volume at the default resolution.
    pub fn volume(&self) -> f64 {
        self.volume_at(None)
    }

    /// Enclosed volume with leaf cells no larger than `resolution` mm.
    pub fn volume_with_resolution(&self, resolution: f64) -> Result<f64, KernelError> {
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(KernelError::InvalidResolution(resolution));
        }
        Ok(self.volume_at(Some(resolution)))
    }

    /// Exact for primitives; booleans go through inclusion-exclusion so only
    /// the overlap of two operands is integrated numerically.
    fn volume_at(&self, resolution: Option<f64>) -> f64 {
        match self.node.as_ref() {
            Node::Empty => 0.0,
            Node::Primitive(prim) => prim.volume(),
            Node::Placed { child, .. } => child.volume_at(resolution),
            Node::Union(a, b) => {
                a.volume_at(resolution) + b.volume_at(resolution)
                    - overlap_volume(a, b, resolution)
            }
            Node::Difference(a, b) => {
                (a.volume_at(resolution) - overlap_volume(a, b, resolution)).max(0.0)
            }
            Node::Intersection(a, b) => overlap_volume(a, b, resolution),
        }
    }

    /// True if the interiors overlap deeper than the default penetration
    /// tolerance. Touching faces do not count.
    pub fn intersects(&self, other: &Solid) -> bool {
        self.interference_point(other, Tolerance::DEFAULT.penetration)
            .is_some()
    }

    /// A point inside both solids by more than `penetration`, if any.
    pub fn interference_point(&self, other: &Solid, penetration: f64) -> Option<Point3> {
        let region = self.bbox.intersection(&other.bbox);
        if self.is_empty() || other.is_empty() || region.is_empty() {
            return None;
        }
        octree::find_overlap(
            &|p: &Point3| self.sdf(p),
            &|p: &Point3| other.sdf(p),
            &region,
            penetration,
            INTERFERENCE_RESOLUTION,
        )
    }

    /// Number of primitive leaves in the tree.
    pub fn primitive_count(&self) -> usize {
        match self.node.as_ref() {
            Node::Empty => 0,
            Node::Primitive(_) => 1,
            Node::Union(a, b) | Node::Difference(a, b) | Node::Intersection(a, b) => {
                a.primitive_count() + b.primitive_count()
            }
            Node::Placed { child, .. } => child.primitive_count(),
        }
    }
}

/// Volume of `a ∩ b`, integrated over the overlap of their boxes.
fn overlap_volume(a: &Solid, b: &Solid, resolution: Option<f64>) -> f64 {
    let region = a.bbox.intersection(&b.bbox);
    if region.is_empty() {
        return 0.0;
    }
    let size = region.size();
    let widest = size.x.max(size.y).max(size.z);
    let res = match resolution {
        Some(r) => r,
        None => widest / CELLS_PER_REGION,
    };
    if res <= 0.0 {
        return 0.0;
    }
    octree::integrate(&|p: &Point3| a.sdf(p).max(b.sdf(p)), &region, res)
}

impl std::ops::Add for &Solid {
    type Output = Solid;
    fn add(self, rhs: &Solid) -> Solid {
        self.union(rhs)
    }
}

impl std::ops::Sub for &Solid {
    type Output = Solid;
    fn sub(self, rhs: &Solid) -> Solid {
        self.difference(rhs)
    }
}

impl std::ops::BitAnd for &Solid {
    type Output = Solid;
    fn bitand(self, rhs: &Solid) -> Solid {
        self.intersection(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_cuboid_volume_is_exact() {
        let b = Solid::cuboid(100.0, 100.0, 20.0);
        assert_relative_eq!(b.volume(), 200_000.0);
    }

    #[test]
    fn test_difference_removes_material() {
        let plate = Solid::cuboid(100.0, 100.0, 20.0);
        let bore = Solid::cylinder(2.75, 30.0).translate(50.0, 50.0, -5.0);
        let drilled = &plate - &bore;
        let removed = 200_000.0 - drilled.volume();
        let expected = PI * 2.75 * 2.75 * 20.0;
        assert_relative_eq!(removed, expected, max_relative = 0.03);
    }

    #[test]
    fn test_disjoint_difference_is_unchanged() {
        let plate = Solid::cuboid(10.0, 10.0, 10.0);
        let far = Solid::sphere(1.0).translate(50.0, 0.0, 0.0);
        let same = plate.difference(&far);
        assert_eq!(same.primitive_count(), 1);
    }

    #[test]
    fn test_union_volume_counts_overlap_once() {
        let a = Solid::cuboid(10.0, 10.0, 10.0);
        let b = Solid::cuboid(10.0, 10.0, 10.0).translate(5.0, 0.0, 0.0);
        assert_relative_eq!((&a + &b).volume(), 1500.0, max_relative = 0.01);
    }

    #[test]
    fn test_moved_bounding_box() {
        let c = Solid::cylinder(1.0, 10.0).rotate(180.0, 0.0, 0.0);
        let bb = c.bounding_box();
        assert_relative_eq!(bb.min.z, -10.0, epsilon = 1e-9);
        assert!(bb.max.z.abs() < 1e-9);
    }

    #[test]
    fn test_nested_moves_collapse() {
        let c = Solid::sphere(1.0).translate(1.0, 0.0, 0.0).translate(0.0, 2.0, 0.0);
        assert!(c.contains(&Point3::new(1.0, 2.0, 0.0)));
        assert_eq!(c.primitive_count(), 1);
    }

    #[test]
    fn test_touching_solids_do_not_intersect() {
        let a = Solid::cuboid(10.0, 10.0, 10.0);
        let b = Solid::cuboid(10.0, 10.0, 10.0).translate(10.0, 0.0, 0.0);
        assert!(!a.intersects(&b));
        let c = Solid::cuboid(10.0, 10.0, 10.0).translate(9.0, 0.0, 0.0);
        assert!(a.intersects(&c));
    }

    #[test]
    fn test_shaft_in_matching_bore_does_not_intersect() {
        let block = Solid::cuboid(20.0, 20.0, 10.0).translate(-10.0, -10.0, 0.0);
        let bored = block.difference(&Solid::cylinder(2.5, 10.0));
        let shaft = Solid::cylinder(2.5, 10.0);
        assert!(!bored.intersects(&shaft));
        let fat = Solid::cylinder(2.8, 10.0);
        assert!(bored.intersects(&fat));
    }

    #[test]
    fn test_invalid_resolution() {
        let b = Solid::cuboid(1.0, 1.0, 1.0);
        assert_eq!(
            b.volume_with_resolution(0.0),
            Err(KernelError::InvalidResolution(0.0))
        );
        assert!(b.volume_with_resolution(0.1).is_ok());
    }

    #[test]
    fn test_degenerate_primitive_is_empty() {
        assert!(Solid::cylinder(0.0, 5.0).is_empty());
        assert!(Solid::cuboid(1.0, -1.0, 1.0).is_empty());
    }
}
