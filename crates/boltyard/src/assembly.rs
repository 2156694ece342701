//! Assemblies of parts and placed fasteners.

use boltyard_ir::Document;
use boltyard_kernel::Aabb3;
use tracing::debug;

use crate::error::Result;
use crate::fastener::Fastener;
use crate::part::Part;

/// A labeled child of a [`Compound`].
#[derive(Debug, Clone)]
pub struct CompoundChild {
    /// Label of the child.
    pub label: String,
    /// Geometry in assembly coordinates.
    pub part: Part,
}

/// A collection of placed parts.
///
/// Unlike [`Part::union`], a compound keeps its children separate so they
/// can be checked against each other and exported as individual roots.
#[derive(Debug, Clone, Default)]
pub struct Compound {
    /// Name of the assembly.
    pub label: String,
    /// Ordered children.
    pub children: Vec<CompoundChild>,
}

impl Compound {
    /// Create an empty compound.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    /// Add a part.
    pub fn add_part(&mut self, label: impl Into<String>, part: Part) {
        self.children.push(CompoundChild {
            label: label.into(),
            part,
        });
    }

    /// Add a fastener at its current location, labeled with its label.
    pub fn add_fastener(&mut self, fastener: &dyn Fastener) {
        self.add_part(fastener.label(), fastener.located_shape());
    }

    /// Builder form of [`Compound::add_part`].
    pub fn with_part(mut self, label: impl Into<String>, part: Part) -> Self {
        self.add_part(label, part);
        self
    }

    /// Builder form of [`Compound::add_fastener`].
    pub fn with_fastener(mut self, fastener: &dyn Fastener) -> Self {
        self.add_fastener(fastener);
        self
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// True if there are no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Child labels in insertion order.
    pub fn labels(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.label.as_str()).collect()
    }

    /// Bounding box of all children.
    pub fn bounding_box(&self) -> Aabb3 {
        self.children
            .iter()
            .fold(Aabb3::empty(), |acc, c| acc.union(&c.part.bounding_box()))
    }

    /// Check every pair of children for overlapping interiors.
    ///
    /// Returns the labels of the first overlapping pair found. Touching
    /// surfaces do not count as an overlap.
    pub fn do_children_intersect(&self) -> (bool, Option<(String, String)>) {
        for (i, a) in self.children.iter().enumerate() {
            for b in &self.children[i + 1..] {
                if a.part.intersects(&b.part) {
                    debug!(first = %a.label, second = %b.label, "children intersect");
                    return (true, Some((a.label.clone(), b.label.clone())));
                }
            }
        }
        (false, None)
    }

    /// IR document with one root per child.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        for child in &self.children {
            child.part.append_to(&mut doc, &child.label);
        }
        doc
    }
}

/// Place `child` so its joint `child_joint` meets `parent`'s joint
/// `parent_joint` at travel `position`.
pub fn connect(
    parent: &dyn Fastener,
    parent_joint: &str,
    child: &mut dyn Fastener,
    child_joint: &str,
    position: f64,
) -> Result<()> {
    parent.connect_to(parent_joint, child, child_joint, position)
}
