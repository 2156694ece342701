//! Attachment frames used to position fasteners relative to each other.

use boltyard_kernel::Location;

use crate::error::{FastenerError, Result};

/// How a joint lets its mate move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JointKind {
    /// Fixed frame.
    Rigid,
    /// Frame slides along its local +Z axis within `range` (mm).
    Linear {
        /// Travel limits `(min, max)`.
        range: (f64, f64),
    },
}

/// A named frame on a fastener, relative to the fastener's own location.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    label: String,
    kind: JointKind,
    location: Location,
}

impl Joint {
    /// Rigid joint at `location`.
    pub fn rigid(label: impl Into<String>, location: Location) -> Self {
        Self {
            label: label.into(),
            kind: JointKind::Rigid,
            location,
        }
    }

    /// Linear joint at `location` sliding along its local +Z.
    pub fn linear(label: impl Into<String>, location: Location, range: (f64, f64)) -> Self {
        Self {
            label: label.into(),
            kind: JointKind::Linear { range },
            location,
        }
    }

    /// Joint name.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Joint kind.
    pub fn kind(&self) -> JointKind {
        self.kind
    }

    /// Frame at zero travel, relative to the owner.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Frame at `position`, relative to the owner.
    ///
    /// Rigid joints ignore the position. Linear joints reject positions
    /// outside their range.
    pub fn frame(&self, position: f64) -> Result<Location> {
        match self.kind {
            JointKind::Rigid => Ok(self.location),
            JointKind::Linear { range: (min, max) } => {
                if !(min..=max).contains(&position) {
                    return Err(FastenerError::JointOutOfRange {
                        joint: self.label.clone(),
                        position,
                        min,
                        max,
                    });
                }
                Ok(self.location * Location::translation(0.0, 0.0, position))
            }
        }
    }
}

/// Location that puts `child_joint` onto `parent_joint` of a parent placed
/// at `parent_location`.
pub fn mate(
    parent_location: &Location,
    parent_joint: &Joint,
    position: f64,
    child_joint: &Joint,
) -> Result<Location> {
    let frame = parent_location * &parent_joint.frame(position)?;
    Ok(frame * child_joint.location().inverse())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use boltyard_kernel::Point3;

    #[test]
    fn test_linear_frame_slides_along_local_z() {
        let flipped = Location::new([0.0, 0.0, -20.0], [-180.0, 0.0, 0.0]);
        let joint = Joint::linear("b", flipped, (-20.0, 0.0));
        let frame = joint.frame(-5.0).unwrap();
        // local +Z points down, so negative travel moves up
        assert_relative_eq!(frame.position().z, -15.0, epsilon = 1e-9);
    }

    #[test]
    fn test_linear_out_of_range() {
        let joint = Joint::linear("b", Location::identity(), (-10.0, 0.0));
        assert!(matches!(
            joint.frame(1.0),
            Err(FastenerError::JointOutOfRange { .. })
        ));
    }

    #[test]
    fn test_rigid_ignores_position() {
        let joint = Joint::rigid("a", Location::translation(0.0, 0.0, 3.0));
        assert_eq!(joint.frame(7.0).unwrap(), joint.location());
    }

    #[test]
    fn test_mate_aligns_frames() {
        let parent = Joint::rigid("top", Location::translation(0.0, 0.0, 10.0));
        let child = Joint::rigid("bottom", Location::translation(1.0, 0.0, 0.0));
        let placed = mate(&Location::translation(5.0, 0.0, 0.0), &parent, 0.0, &child).unwrap();
        // the child joint origin lands on the parent joint origin
        let joint_origin = placed.apply_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(joint_origin.x, 5.0, epsilon = 1e-9);
        assert_relative_eq!(joint_origin.z, 10.0, epsilon = 1e-9);
    }
}
