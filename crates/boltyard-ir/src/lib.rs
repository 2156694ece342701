//! Intermediate representation for boltyard shapes.
//!
//! Every generated fastener, hole tool and host part carries a DAG of the
//! CSG operations that produced it. The IR is purely declarative: it holds
//! the parameters, never the evaluated geometry.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a node in the IR graph.
pub type NodeId = u64;

/// 3D vector with f64 components (millimeters or degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// Create a new Vec3.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// CSG operation, the building block of the IR DAG.
///
/// Leaf variants are primitives; the rest reference child nodes by
/// [`NodeId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CsgOp {
    /// Axis-aligned box with its minimum corner at the origin.
    Cuboid {
        /// Size along each axis.
        size: Vec3,
    },
    /// Cylinder along +Z starting at z=0.
    Cylinder {
        /// Radius of the cylinder.
        radius: f64,
        /// Height of the cylinder.
        height: f64,
    },
    /// Cone frustum along +Z starting at z=0.
    Cone {
        /// Radius at z=0.
        radius_bottom: f64,
        /// Radius at z=height.
        radius_top: f64,
        /// Height of the frustum.
        height: f64,
    },
    /// Sphere centered at origin.
    Sphere {
        /// Radius of the sphere.
        radius: f64,
    },
    /// Regular polygon prism along +Z starting at z=0, one vertex on +X.
    Prism {
        /// Number of sides.
        sides: u32,
        /// Circumradius of the polygon.
        circumradius: f64,
        /// Height of the prism.
        height: f64,
    },
    /// Revolved periodic thread band along +Z starting at z=0.
    Thread {
        /// Root (minor) radius.
        minor_radius: f64,
        /// Crest (major) radius.
        major_radius: f64,
        /// Axial pitch.
        pitch: f64,
        /// Length of the band.
        length: f64,
        /// True for an internal (nut) thread.
        internal: bool,
    },
    /// Empty geometry (identity for union).
    Empty,
    /// Boolean union of two geometries.
    Union {
        /// Left operand.
        left: NodeId,
        /// Right operand.
        right: NodeId,
    },
    /// Boolean difference (left minus right).
    Difference {
        /// Left operand (base).
        left: NodeId,
        /// Right operand (subtracted).
        right: NodeId,
    },
    /// Boolean intersection of two geometries.
    Intersection {
        /// Left operand.
        left: NodeId,
        /// Right operand.
        right: NodeId,
    },
    /// Rigid placement: rotation by Euler angles in degrees (X, then Y,
    /// then Z) followed by a translation.
    Transform {
        /// Child node to place.
        child: NodeId,
        /// Translation offset.
        offset: Vec3,
        /// Rotation angles in degrees.
        angles: Vec3,
    },
}

/// A node in the IR graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier.
    pub id: NodeId,
    /// Optional human-readable name.
    pub name: Option<String>,
    /// The operation this node represents.
    pub op: CsgOp,
}

/// A scene root: one top-level shape and the label it was exported with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEntry {
    /// Root node of this entry.
    pub root: NodeId,
    /// Label of the part or fastener.
    pub label: String,
}

/// A boltyard document, the JSON export format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Format version string.
    pub version: String,
    /// All nodes in the graph, keyed by [`NodeId`].
    pub nodes: HashMap<NodeId, Node>,
    /// Exported roots.
    pub roots: Vec<SceneEntry>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            nodes: HashMap::new(),
            roots: Vec::new(),
        }
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Number of primitive leaves reachable from all roots.
    pub fn leaf_count(&self) -> usize {
        self.nodes
            .values()
            .filter(|n| {
                !matches!(
                    n.op,
                    CsgOp::Union { .. }
                        | CsgOp::Difference { .. }
                        | CsgOp::Intersection { .. }
                        | CsgOp::Transform { .. }
                        | CsgOp::Empty
                )
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_document() {
        let mut doc = Document::new();

        doc.nodes.insert(
            1,
            Node {
                id: 1,
                name: Some("host".to_string()),
                op: CsgOp::Cuboid {
                    size: Vec3::new(100.0, 100.0, 20.0),
                },
            },
        );
        doc.nodes.insert(
            2,
            Node {
                id: 2,
                name: Some("bore".to_string()),
                op: CsgOp::Cylinder {
                    radius: 2.75,
                    height: 20.0,
                },
            },
        );
        doc.nodes.insert(
            3,
            Node {
                id: 3,
                name: Some("host-with-hole".to_string()),
                op: CsgOp::Difference { left: 1, right: 2 },
            },
        );
        doc.roots.push(SceneEntry {
            root: 3,
            label: "host".to_string(),
        });

        let json = doc.to_json().expect("serialize");
        let restored = Document::from_json(&json).expect("deserialize");

        assert_eq!(doc, restored);
        assert_eq!(restored.nodes.len(), 3);
        assert_eq!(restored.leaf_count(), 2);
    }

    #[test]
    fn empty_document() {
        let doc = Document::new();
        assert_eq!(doc.version, "0.1");
        assert!(doc.nodes.is_empty());
        assert!(doc.roots.is_empty());
    }

    #[test]
    fn serde_tagged_enum() {
        let op = CsgOp::Prism {
            sides: 6,
            circumradius: 4.6,
            height: 4.7,
        };
        let json = serde_json::to_string(&op).unwrap();
        assert!(json.contains(r#""type":"Prism""#));

        let restored: CsgOp = serde_json::from_str(&json).unwrap();
        assert_eq!(op, restored);
    }
}
