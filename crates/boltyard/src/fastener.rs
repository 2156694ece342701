//! Behavior shared by screws, nuts and washers.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use boltyard_kernel::{Aabb3, Location};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{catalog, ClearanceDrills, Dimensions, Family, TapDrills};
use crate::error::{FastenerError, Result};
use crate::joint::{self, Joint};
use crate::part::Part;
use crate::thread::ThreadSize;

/// Clearance hole fit (ISO 273 fine, medium, coarse).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    /// Fine fit.
    Close,
    /// Medium fit.
    #[default]
    Normal,
    /// Coarse fit.
    Loose,
}

impl Fit {
    /// All fits, tightest first.
    pub const ALL: [Fit; 3] = [Fit::Close, Fit::Normal, Fit::Loose];
}

/// Material class for tap drill selection.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TapMaterial {
    /// Soft materials such as aluminum or plastics.
    #[default]
    Soft,
    /// Hard materials such as steel.
    Hard,
}

impl TapMaterial {
    /// Both materials.
    pub const ALL: [TapMaterial; 2] = [TapMaterial::Soft, TapMaterial::Hard];
}

impl fmt::Display for Fit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Fit::Close => "Close",
            Fit::Normal => "Normal",
            Fit::Loose => "Loose",
        })
    }
}

impl fmt::Display for TapMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TapMaterial::Soft => "Soft",
            TapMaterial::Hard => "Hard",
        })
    }
}

impl FromStr for Fit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s.to_ascii_lowercase().as_str() {
            "close" => Ok(Fit::Close),
            "normal" => Ok(Fit::Normal),
            "loose" => Ok(Fit::Loose),
            other => Err(format!("unknown fit '{other}' (close, normal, loose)")),
        }
    }
}

impl FromStr for TapMaterial {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s.to_ascii_lowercase().as_str() {
            "soft" => Ok(TapMaterial::Soft),
            "hard" => Ok(TapMaterial::Hard),
            other => Err(format!("unknown material '{other}' (soft, hard)")),
        }
    }
}

/// How the top of a fastener meets the surface it is fitted into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeadSeat {
    /// Nothing above the shank (set screws).
    None,
    /// Flat bearing face; sinks into a counterbore.
    Flat {
        /// Largest diameter of the part above the bearing face.
        diameter: f64,
        /// Height above the bearing face.
        height: f64,
    },
    /// Conical head that sinks into a countersink with its top flush.
    Conical {
        /// Head diameter at the top of the cone.
        diameter: f64,
        /// Cone height.
        depth: f64,
        /// Dome height above the cone, zero for flat tops.
        raised: f64,
    },
}

/// Polygonal outline of a nut that can be held in a pocket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptiveProfile {
    /// Number of sides.
    pub sides: u32,
    /// Circumradius of the outline.
    pub circumradius: f64,
    /// Pocket depth.
    pub height: f64,
    /// Orientation of the outline in the fastener frame.
    pub orientation: Location,
}

/// State every fastener carries.
#[derive(Debug, Clone)]
pub struct FastenerCore {
    pub(crate) class: &'static str,
    pub(crate) fastener_type: String,
    pub(crate) standard: String,
    pub(crate) size: ThreadSize,
    pub(crate) dims: Dimensions,
    pub(crate) simple: bool,
    pub(crate) shape: Part,
    pub(crate) joints: BTreeMap<String, Joint>,
    pub(crate) location: Location,
    pub(crate) hole_locations: Vec<Location>,
    pub(crate) label: String,
}

impl FastenerCore {
    pub(crate) fn new(
        family: Family,
        class: &'static str,
        fastener_type: &str,
        size: ThreadSize,
        dims: Dimensions,
        simple: bool,
    ) -> Result<Self> {
        let standard = catalog()?
            .table(family, class, fastener_type)?
            .standard()
            .to_string();
        Ok(Self {
            class,
            fastener_type: fastener_type.to_string(),
            standard,
            label: format!("{class}-{}", size.designation()),
            size,
            dims,
            simple,
            shape: Part::empty(class),
            joints: BTreeMap::new(),
            location: Location::identity(),
            hole_locations: Vec::new(),
        })
    }

    pub(crate) fn add_joint(&mut self, joint: Joint) {
        self.joints.insert(joint.label().to_string(), joint);
    }
}

/// A catalog fastener with geometry, joints and drill data.
///
/// Implementors provide access to their [`FastenerCore`] and describe how
/// they seat in a hole; everything else is shared.
pub trait Fastener {
    /// Shared state.
    fn core(&self) -> &FastenerCore;

    /// Shared state, mutably.
    fn core_mut(&mut self) -> &mut FastenerCore;

    /// How the top of the fastener meets a surface.
    fn head_seat(&self) -> HeadSeat;

    /// Portion of the nominal length taken by the head.
    fn length_offset(&self) -> f64 {
        0.0
    }

    /// Outline for a captive pocket, if the fastener can be held in one.
    fn captive_profile(&self) -> Option<CaptiveProfile> {
        None
    }

    /// `(hole diameter, insert length)` for heat-set inserts.
    fn insert_bore(&self) -> Option<(f64, f64)> {
        None
    }

    /// Human-readable description.
    fn info(&self) -> String {
        let core = self.core();
        format!(
            "{}({}): {}",
            core.class,
            core.fastener_type,
            core.size.designation()
        )
    }

    /// Class name, e.g. `SocketHeadCapScrew`.
    fn class_name(&self) -> &'static str {
        self.core().class
    }

    /// Fastener type (standard key), e.g. `iso4762`.
    fn fastener_type(&self) -> &str {
        &self.core().fastener_type
    }

    /// Name of the standard, e.g. `ISO 4762`.
    fn standard(&self) -> &str {
        &self.core().standard
    }

    /// Parsed size.
    fn size(&self) -> &ThreadSize {
        &self.core().size
    }

    /// Nominal thread diameter in mm.
    fn thread_diameter(&self) -> f64 {
        self.core().size.diameter()
    }

    /// Catalog dimensions of this fastener.
    fn dimensions(&self) -> &Dimensions {
        &self.core().dims
    }

    /// True if threads are omitted from the shape.
    fn is_simple(&self) -> bool {
        self.core().simple
    }

    /// Label used in assemblies.
    fn label(&self) -> &str {
        &self.core().label
    }

    /// Change the label.
    fn set_label(&mut self, label: &str) {
        self.core_mut().label = label.to_string();
    }

    /// Shape in the fastener's own frame.
    fn shape(&self) -> &Part {
        &self.core().shape
    }

    /// Shape at the fastener's current location.
    fn located_shape(&self) -> Part {
        let core = self.core();
        core.shape.moved(&core.location)
    }

    /// Shape relocated by `location` relative to the current location.
    fn moved(&self, location: &Location) -> Part {
        let core = self.core();
        core.shape.moved(&(location * &core.location))
    }

    /// Current location.
    fn location(&self) -> Location {
        self.core().location
    }

    /// Place the fastener.
    fn set_location(&mut self, location: Location) {
        self.core_mut().location = location;
    }

    /// Euler angles in degrees (X, Y, Z) of the current location.
    fn orientation(&self) -> [f64; 3] {
        self.core().location.to_euler_deg()
    }

    /// Bounding box at the current location.
    fn bounding_box(&self) -> Aabb3 {
        let core = self.core();
        core.shape.solid().moved(&core.location).bounding_box()
    }

    /// Joints by name.
    fn joints(&self) -> &BTreeMap<String, Joint> {
        &self.core().joints
    }

    /// Joint `name`.
    fn joint(&self, name: &str) -> Result<&Joint> {
        let core = self.core();
        core.joints
            .get(name)
            .ok_or_else(|| FastenerError::UnknownJoint {
                owner: core.label.clone(),
                joint: name.to_string(),
            })
    }

    /// Locations recorded by hole features cut for this fastener.
    fn hole_locations(&self) -> &[Location] {
        &self.core().hole_locations
    }

    /// Record where a hole feature seats this fastener.
    fn push_hole_location(&mut self, location: Location) {
        self.core_mut().hole_locations.push(location);
    }

    /// Place `other` so its joint `other_joint` meets this fastener's
    /// joint `joint` at travel `position`.
    fn connect_to(
        &self,
        joint: &str,
        other: &mut dyn Fastener,
        other_joint: &str,
        position: f64,
    ) -> Result<()> {
        let location = joint::mate(
            &self.location(),
            self.joint(joint)?,
            position,
            other.joint(other_joint)?,
        )?;
        debug!(
            parent = self.label(),
            child = other.label(),
            joint,
            other_joint,
            position,
            "connected fasteners"
        );
        other.set_location(location);
        Ok(())
    }

    /// Tap drills for this thread.
    fn tap_drills(&self) -> Result<&'static TapDrills> {
        let size = self.size();
        catalog()?
            .tap_drill(size.thread())
            .ok_or_else(|| FastenerError::NoTapData(self.info()))
    }

    /// Clearance drills for this nominal size.
    fn clearance_drills(&self) -> Result<&'static ClearanceDrills> {
        let size = self.size();
        catalog()?
            .clearance_drill(size.nominal())
            .ok_or_else(|| FastenerError::NoClearanceData(self.info()))
    }

    /// Tap hole diameter for `material`.
    fn tap_hole_diameter(&self, material: TapMaterial) -> Result<f64> {
        let drills = self.tap_drills()?;
        Ok(match material {
            TapMaterial::Soft => drills.soft.diameter,
            TapMaterial::Hard => drills.hard.diameter,
        })
    }

    /// Clearance hole diameter for `fit`.
    fn clearance_hole_diameter(&self, fit: Fit) -> Result<f64> {
        let drills = self.clearance_drills()?;
        Ok(match fit {
            Fit::Close => drills.close.diameter,
            Fit::Normal => drills.normal.diameter,
            Fit::Loose => drills.loose.diameter,
        })
    }

    /// Tap drill designations by material; empty without tap data.
    fn tap_drill_sizes(&self) -> BTreeMap<TapMaterial, String> {
        self.tap_drills()
            .map(|d| {
                BTreeMap::from([
                    (TapMaterial::Soft, d.soft.name.clone()),
                    (TapMaterial::Hard, d.hard.name.clone()),
                ])
            })
            .unwrap_or_default()
    }

    /// Tap hole diameters (mm) by material; empty without tap data.
    fn tap_hole_diameters(&self) -> BTreeMap<TapMaterial, f64> {
        self.tap_drills()
            .map(|d| {
                BTreeMap::from([
                    (TapMaterial::Soft, d.soft.diameter),
                    (TapMaterial::Hard, d.hard.diameter),
                ])
            })
            .unwrap_or_default()
    }

    /// Clearance drill designations by fit; empty without clearance data.
    fn clearance_drill_sizes(&self) -> BTreeMap<Fit, String> {
        self.clearance_drills()
            .map(|d| {
                BTreeMap::from([
                    (Fit::Close, d.close.name.clone()),
                    (Fit::Normal, d.normal.name.clone()),
                    (Fit::Loose, d.loose.name.clone()),
                ])
            })
            .unwrap_or_default()
    }

    /// Clearance hole diameters (mm) by fit; empty without clearance data.
    fn clearance_hole_diameters(&self) -> BTreeMap<Fit, f64> {
        self.clearance_drills()
            .map(|d| {
                BTreeMap::from([
                    (Fit::Close, d.close.diameter),
                    (Fit::Normal, d.normal.diameter),
                    (Fit::Loose, d.loose.diameter),
                ])
            })
            .unwrap_or_default()
    }
}
