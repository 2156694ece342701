//! Named solids with construction history.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use boltyard_ir::{CsgOp, Document, Node, NodeId, SceneEntry, Vec3 as IrVec3};
use boltyard_kernel::{Aabb3, Axis, KernelError, Location, Point3, Solid, Vec3};

/// Global atomic counter for unique IR node IDs.
static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a globally unique [`NodeId`].
fn alloc_node_id() -> NodeId {
    NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed)
}

/// A planar rectangular face of a box-shaped part.
///
/// The face location has its origin at the face center and its +Z axis
/// along the outward normal, so hole tools built along -Z go into the
/// material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    location: Location,
    width: f64,
    height: f64,
}

impl Face {
    /// Frame at the face center, +Z pointing out of the material.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Face center.
    pub fn center(&self) -> Point3 {
        self.location.position()
    }

    /// Outward unit normal.
    pub fn normal(&self) -> Vec3 {
        self.location.z_axis()
    }

    /// Face area.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Frame at `(u, v)` on the face, in the face's own X/Y axes.
    pub fn location_at(&self, u: f64, v: f64) -> Location {
        self.location * Location::translation(u, v, 0.0)
    }
}

/// An ordered selection of faces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceList(Vec<Face>);

impl FaceList {
    /// Sort by face center along `axis`, lowest first.
    pub fn sort_by(mut self, axis: Axis) -> Self {
        let i = axis.index();
        self.0.sort_by(|a, b| a.center()[i].total_cmp(&b.center()[i]));
        self
    }

    /// Keep faces whose normal is parallel to `axis`.
    pub fn filter_by(self, axis: Axis) -> Self {
        let unit = axis.unit();
        Self(
            self.0
                .into_iter()
                .filter(|f| (f.normal().dot(&unit).abs() - 1.0).abs() < 1e-9)
                .collect(),
        )
    }

    /// First face.
    pub fn first(&self) -> Option<&Face> {
        self.0.first()
    }

    /// Last face.
    pub fn last(&self) -> Option<&Face> {
        self.0.last()
    }

    /// Number of faces.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if no face is selected.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the faces.
    pub fn iter(&self) -> impl Iterator<Item = &Face> {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for FaceList {
    type Output = Face;
    fn index(&self, index: usize) -> &Face {
        &self.0[index]
    }
}

/// A named part with geometry.
///
/// Fastener shapes, hole tools and host parts are all `Part`s. Each one
/// carries an IR subtree recording its construction; extract it with
/// [`Part::to_document`].
#[derive(Debug, Clone)]
pub struct Part {
    /// Human-readable name.
    pub name: String,
    solid: Solid,
    ir_node_id: NodeId,
    ir_nodes: HashMap<NodeId, Node>,
    faces: Vec<Face>,
}

impl Part {
    // =========================================================================
    // Internal constructors
    // =========================================================================

    fn with_ir(
        name: String,
        solid: Solid,
        ir_node_id: NodeId,
        ir_nodes: HashMap<NodeId, Node>,
        faces: Vec<Face>,
    ) -> Self {
        Self {
            name,
            solid,
            ir_node_id,
            ir_nodes,
            faces,
        }
    }

    fn make_leaf(name: &str, op: CsgOp) -> (NodeId, HashMap<NodeId, Node>) {
        let id = alloc_node_id();
        let mut nodes = HashMap::new();
        nodes.insert(
            id,
            Node {
                id,
                name: Some(name.to_string()),
                op,
            },
        );
        (id, nodes)
    }

    fn make_binary(
        name: &str,
        left: &Part,
        right: &Part,
        op_fn: impl FnOnce(NodeId, NodeId) -> CsgOp,
    ) -> (NodeId, HashMap<NodeId, Node>) {
        let id = alloc_node_id();
        let mut nodes = left.ir_nodes.clone();
        nodes.extend(right.ir_nodes.iter().map(|(&k, v)| (k, v.clone())));
        nodes.insert(
            id,
            Node {
                id,
                name: Some(name.to_string()),
                op: op_fn(left.ir_node_id, right.ir_node_id),
            },
        );
        (id, nodes)
    }

    fn make_unary(
        name: &str,
        child: &Part,
        op_fn: impl FnOnce(NodeId) -> CsgOp,
    ) -> (NodeId, HashMap<NodeId, Node>) {
        let id = alloc_node_id();
        let mut nodes = child.ir_nodes.clone();
        nodes.insert(
            id,
            Node {
                id,
                name: Some(name.to_string()),
                op: op_fn(child.ir_node_id),
            },
        );
        (id, nodes)
    }

    fn leaf(name: impl Into<String>, op: CsgOp, solid: Solid) -> Self {
        let name = name.into();
        let (id, nodes) = Self::make_leaf(&name, op);
        Self::with_ir(name, solid, id, nodes, Vec::new())
    }

    // =========================================================================
    // Public constructors
    // =========================================================================

    /// Create an empty part.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::leaf(name, CsgOp::Empty, Solid::empty())
    }

    /// Box with its minimum corner at the origin.
    pub fn cuboid(name: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        let mut part = Self::leaf(
            name,
            CsgOp::Cuboid {
                size: IrVec3::new(x, y, z),
            },
            Solid::cuboid(x, y, z),
        );
        if !part.is_empty() {
            part.faces = box_faces(x, y, z);
        }
        part
    }

    /// Box centered at the origin.
    pub fn centered_box(name: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self::cuboid(name, x, y, z).translate(-x / 2.0, -y / 2.0, -z / 2.0)
    }

    /// Cylinder along +Z from z=0.
    pub fn cylinder(name: impl Into<String>, radius: f64, height: f64) -> Self {
        Self::leaf(
            name,
            CsgOp::Cylinder { radius, height },
            Solid::cylinder(radius, height),
        )
    }

    /// Cone frustum along +Z from z=0.
    pub fn cone(name: impl Into<String>, radius_bottom: f64, radius_top: f64, height: f64) -> Self {
        Self::leaf(
            name,
            CsgOp::Cone {
                radius_bottom,
                radius_top,
                height,
            },
            Solid::cone(radius_bottom, radius_top, height),
        )
    }

    /// Sphere centered at the origin.
    pub fn sphere(name: impl Into<String>, radius: f64) -> Self {
        Self::leaf(name, CsgOp::Sphere { radius }, Solid::sphere(radius))
    }

    /// Regular polygon prism along +Z from z=0, one vertex on +X.
    pub fn prism(name: impl Into<String>, sides: u32, circumradius: f64, height: f64) -> Self {
        Self::leaf(
            name,
            CsgOp::Prism {
                sides,
                circumradius,
                height,
            },
            Solid::prism(sides, circumradius, height),
        )
    }

    /// Thread band along +Z from z=0.
    pub fn thread(
        name: impl Into<String>,
        minor_radius: f64,
        major_radius: f64,
        pitch: f64,
        length: f64,
        internal: bool,
    ) -> Self {
        Self::leaf(
            name,
            CsgOp::Thread {
                minor_radius,
                major_radius,
                pitch,
                length,
                internal,
            },
            Solid::thread(minor_radius, major_radius, pitch, length, internal),
        )
    }

    /// Rename the part.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    // =========================================================================
    // CSG operations
    // =========================================================================

    /// Boolean difference (self - other). Faces of `self` are kept.
    pub fn difference(&self, other: &Part) -> Self {
        let (id, nodes) = Self::make_binary(&self.name, self, other, |l, r| CsgOp::Difference {
            left: l,
            right: r,
        });
        Self::with_ir(
            self.name.clone(),
            self.solid.difference(&other.solid),
            id,
            nodes,
            self.faces.clone(),
        )
    }

    /// Boolean union (self + other).
    pub fn union(&self, other: &Part) -> Self {
        let (id, nodes) = Self::make_binary(&self.name, self, other, |l, r| CsgOp::Union {
            left: l,
            right: r,
        });
        let mut faces = self.faces.clone();
        faces.extend_from_slice(&other.faces);
        Self::with_ir(
            self.name.clone(),
            self.solid.union(&other.solid),
            id,
            nodes,
            faces,
        )
    }

    /// Boolean intersection.
    pub fn intersection(&self, other: &Part) -> Self {
        let (id, nodes) = Self::make_binary(&self.name, self, other, |l, r| {
            CsgOp::Intersection { left: l, right: r }
        });
        Self::with_ir(
            self.name.clone(),
            self.solid.intersection(&other.solid),
            id,
            nodes,
            self.faces.clone(),
        )
    }

    /// Subtract `tool` placed at `at` from this part in place.
    pub fn cut(&mut self, tool: &Part, at: &Location) {
        *self = self.difference(&tool.moved(at));
    }

    // =========================================================================
    // Transforms
    // =========================================================================

    /// Apply a rigid placement.
    pub fn moved(&self, location: &Location) -> Self {
        let angles = location.to_euler_deg();
        let t = location.translation;
        let (id, nodes) = Self::make_unary(&self.name, self, |child| CsgOp::Transform {
            child,
            offset: IrVec3::new(t.x, t.y, t.z),
            angles: IrVec3::new(angles[0], angles[1], angles[2]),
        });
        let faces = self
            .faces
            .iter()
            .map(|f| Face {
                location: location * &f.location,
                ..*f
            })
            .collect();
        Self::with_ir(
            self.name.clone(),
            self.solid.moved(location),
            id,
            nodes,
            faces,
        )
    }

    /// Translate the part.
    pub fn translate(&self, x: f64, y: f64, z: f64) -> Self {
        self.moved(&Location::translation(x, y, z))
    }

    /// Rotate the part (angles in degrees, X then Y then Z).
    pub fn rotate(&self, x_deg: f64, y_deg: f64, z_deg: f64) -> Self {
        self.moved(&Location::from_euler_deg(x_deg, y_deg, z_deg))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Check if geometry is empty.
    pub fn is_empty(&self) -> bool {
        self.solid.is_empty()
    }

    /// The underlying solid.
    pub fn solid(&self) -> &Solid {
        &self.solid
    }

    /// Axis-aligned bounding box.
    pub fn bounding_box(&self) -> Aabb3 {
        self.solid.bounding_box()
    }

    /// Enclosed volume in mm³.
    pub fn volume(&self) -> f64 {
        self.solid.volume()
    }

    /// Enclosed volume with an explicit integration resolution in mm.
    pub fn volume_with_resolution(&self, resolution: f64) -> Result<f64, KernelError> {
        self.solid.volume_with_resolution(resolution)
    }

    /// True if the interiors of the two parts overlap.
    pub fn intersects(&self, other: &Part) -> bool {
        self.solid.intersects(&other.solid)
    }

    /// Planar faces of the box primitives this part was built from.
    pub fn faces(&self) -> FaceList {
        FaceList(self.faces.clone())
    }

    /// Root node of the construction DAG.
    pub fn ir_root(&self) -> NodeId {
        self.ir_node_id
    }

    /// Extract the IR document for this part.
    ///
    /// The document contains all nodes in this part's construction DAG
    /// with this part's root node as the single scene entry.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        self.append_to(&mut doc, &self.name);
        doc
    }

    /// Add this part's DAG and a root labeled `label` to `doc`.
    pub fn append_to(&self, doc: &mut Document, label: &str) {
        doc.nodes
            .extend(self.ir_nodes.iter().map(|(&k, v)| (k, v.clone())));
        doc.roots.push(SceneEntry {
            root: self.ir_node_id,
            label: label.to_string(),
        });
    }
}

/// Faces of an `x` by `y` by `z` box with its minimum corner at the origin.
fn box_faces(x: f64, y: f64, z: f64) -> Vec<Face> {
    let face = |center: [f64; 3], angles: [f64; 3], width: f64, height: f64| Face {
        location: Location::new(center, angles),
        width,
        height,
    };
    vec![
        face([x / 2.0, y / 2.0, 0.0], [180.0, 0.0, 0.0], x, y),
        face([x / 2.0, y / 2.0, z], [0.0, 0.0, 0.0], x, y),
        face([0.0, y / 2.0, z / 2.0], [0.0, -90.0, 0.0], z, y),
        face([x, y / 2.0, z / 2.0], [0.0, 90.0, 0.0], z, y),
        face([x / 2.0, 0.0, z / 2.0], [90.0, 0.0, 0.0], x, z),
        face([x / 2.0, y, z / 2.0], [-90.0, 0.0, 0.0], x, z),
    ]
}

// =============================================================================
// Operator overloads for ergonomic CSG
// =============================================================================

/// Union: `&a + &b`
impl std::ops::Add for &Part {
    type Output = Part;
    fn add(self, rhs: &Part) -> Part {
        self.union(rhs)
    }
}

/// Union: `a + b`
impl std::ops::Add for Part {
    type Output = Part;
    fn add(self, rhs: Part) -> Part {
        self.union(&rhs)
    }
}

/// Difference: `&a - &b`
impl std::ops::Sub for &Part {
    type Output = Part;
    fn sub(self, rhs: &Part) -> Part {
        self.difference(rhs)
    }
}

/// Difference: `a - b`
impl std::ops::Sub for Part {
    type Output = Part;
    fn sub(self, rhs: Part) -> Part {
        self.difference(&rhs)
    }
}

/// Intersection: `&a & &b`
impl std::ops::BitAnd for &Part {
    type Output = Part;
    fn bitand(self, rhs: &Part) -> Part {
        self.intersection(rhs)
    }
}

/// Intersection: `a & b`
impl std::ops::BitAnd for Part {
    type Output = Part;
    fn bitand(self, rhs: Part) -> Part {
        self.intersection(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cuboid_creation() {
        let cube = Part::cuboid("test", 10.0, 10.0, 10.0);
        assert!(!cube.is_empty());
        assert_eq!(cube.faces().len(), 6);
    }

    #[test]
    fn test_operator_overloads() {
        let a = Part::cuboid("a", 10.0, 10.0, 10.0);
        let b = Part::cuboid("b", 10.0, 10.0, 10.0).translate(5.0, 0.0, 0.0);

        let union = &a + &b;
        assert_relative_eq!(union.volume(), 1500.0, max_relative = 0.01);

        let diff = &a - &b;
        assert_relative_eq!(diff.volume(), 500.0, max_relative = 0.01);

        let isect = Part::cuboid("a", 10.0, 10.0, 10.0)
            & Part::cuboid("b", 10.0, 10.0, 10.0).translate(5.0, 5.0, 5.0);
        assert_relative_eq!(isect.volume(), 125.0, max_relative = 0.01);
    }

    #[test]
    fn test_centered_box_faces() {
        let plate = Part::centered_box("plate", 100.0, 100.0, 20.0);
        let faces = plate.faces().sort_by(Axis::Z);
        let bottom = faces.first().unwrap();
        let top = faces.last().unwrap();
        assert_relative_eq!(top.center().z, 10.0, epsilon = 1e-9);
        assert_relative_eq!(top.normal().z, 1.0, epsilon = 1e-9);
        assert_relative_eq!(bottom.center().z, -10.0, epsilon = 1e-9);
        assert_relative_eq!(bottom.normal().z, -1.0, epsilon = 1e-9);
        assert_relative_eq!(top.area(), 10_000.0);
    }

    #[test]
    fn test_side_faces_point_outward() {
        let block = Part::cuboid("block", 4.0, 6.0, 8.0);
        for face in block.faces().iter() {
            let probe = face.center() + face.normal() * 0.1;
            assert!(!block.solid().contains(&probe));
            let inside = face.center() - face.normal() * 0.1;
            assert!(block.solid().contains(&inside));
        }
        assert_eq!(block.faces().filter_by(Axis::X).len(), 2);
    }

    #[test]
    fn test_cut_at_face() {
        let mut plate = Part::centered_box("plate", 20.0, 20.0, 10.0);
        let top = plate.faces().sort_by(Axis::Z).last().unwrap().location();
        let bore = Part::cylinder("bore", 2.0, 4.0).translate(0.0, 0.0, -4.0);
        plate.cut(&bore, &top);
        let expected = 4000.0 - std::f64::consts::PI * 4.0 * 4.0;
        assert_relative_eq!(plate.volume(), expected, max_relative = 0.01);
        assert!(!plate.solid().contains(&Point3::new(0.0, 0.0, 4.0)));
        assert!(plate.solid().contains(&Point3::new(0.0, 0.0, -2.0)));
    }

    #[test]
    fn test_ir_csg_dag() {
        let cube = Part::cuboid("box", 10.0, 10.0, 10.0);
        let cyl = Part::cylinder("hole", 3.0, 15.0);
        let result = cube.difference(&cyl);
        let doc = result.to_document();
        assert_eq!(doc.nodes.len(), 3);
        assert_eq!(doc.roots.len(), 1);
        let root = &doc.nodes[&doc.roots[0].root];
        match &root.op {
            CsgOp::Difference { left, right } => {
                assert!(matches!(doc.nodes[left].op, CsgOp::Cuboid { .. }));
                assert!(matches!(doc.nodes[right].op, CsgOp::Cylinder { .. }));
            }
            other => panic!("expected Difference, got {other:?}"),
        }
    }

    #[test]
    fn test_ir_transform() {
        let moved = Part::cuboid("box", 5.0, 5.0, 5.0)
            .moved(&Location::new([1.0, 2.0, 3.0], [0.0, 0.0, 45.0]));
        let doc = moved.to_document();
        assert_eq!(doc.nodes.len(), 2);
        match &doc.nodes[&doc.roots[0].root].op {
            CsgOp::Transform { offset, angles, .. } => {
                assert_relative_eq!(offset.y, 2.0);
                assert_relative_eq!(angles.z, 45.0, epsilon = 1e-9);
            }
            other => panic!("expected Transform, got {other:?}"),
        }
    }

    #[test]
    fn test_ir_roundtrip() {
        let cube = Part::cuboid("box", 10.0, 20.0, 30.0);
        let hole = Part::cylinder("hole", 3.0, 40.0);
        let doc = cube.difference(&hole).to_document();
        let json = doc.to_json().expect("serialize");
        let restored = Document::from_json(&json).expect("deserialize");
        assert_eq!(doc, restored);
    }
}
