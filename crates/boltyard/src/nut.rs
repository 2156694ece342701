//! Nuts and heat-set inserts.
//!
//! Nut frame: the bearing face is at z=0 and the body extends along +Z.

use std::collections::BTreeMap;
use std::f64::consts::SQRT_2;
use std::fmt;
use std::str::FromStr;

use boltyard_kernel::Location;

use crate::catalog::{catalog, Dimensions, Family};
use crate::error::Result;
use crate::fastener::{CaptiveProfile, Fastener, FastenerCore, HeadSeat};
use crate::joint::Joint;
use crate::part::Part;
use crate::thread::ThreadSize;

/// Nut classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NutKind {
    /// Hex nut with a domed cap.
    DomedCap,
    /// Chamfered hex nut.
    Hex,
    /// Hex nut with a flange.
    HexWithFlange,
    /// Hex nut without chamfers.
    UnchamferedHex,
    /// Square nut.
    Square,
    /// Heat-set threaded insert.
    HeatSet,
}

impl NutKind {
    /// All nut kinds.
    pub const ALL: [NutKind; 6] = [
        NutKind::DomedCap,
        NutKind::Hex,
        NutKind::HexWithFlange,
        NutKind::UnchamferedHex,
        NutKind::Square,
        NutKind::HeatSet,
    ];

    /// Catalog class name.
    pub fn class_name(self) -> &'static str {
        match self {
            NutKind::DomedCap => "DomedCapNut",
            NutKind::Hex => "HexNut",
            NutKind::HexWithFlange => "HexNutWithFlange",
            NutKind::UnchamferedHex => "UnchamferedHexagonNut",
            NutKind::Square => "SquareNut",
            NutKind::HeatSet => "HeatSetNut",
        }
    }

    /// Fastener types defined for this kind.
    pub fn types(self) -> Result<Vec<String>> {
        Ok(catalog()?
            .types(Family::Nut, self.class_name())
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Sizes listed for `fastener_type`, ordered by diameter.
    pub fn sizes(self, fastener_type: &str) -> Result<Vec<String>> {
        catalog()?.sizes(Family::Nut, self.class_name(), fastener_type)
    }
}

impl fmt::Display for NutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

impl FromStr for NutKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        let wanted = s.to_ascii_lowercase();
        NutKind::ALL
            .into_iter()
            .find(|k| {
                let class = k.class_name().to_ascii_lowercase();
                class == wanted
                    || class.strip_suffix("nut") == Some(wanted.as_str())
                    || format!("{k:?}").to_ascii_lowercase() == wanted
            })
            .ok_or_else(|| format!("unknown nut kind '{s}'"))
    }
}

/// A nut of a catalog type and size.
#[derive(Debug, Clone)]
pub struct Nut {
    kind: NutKind,
    rotation: Location,
    core: FastenerCore,
}

impl Nut {
    /// Build a nut.
    pub fn new(kind: NutKind, size: &str, fastener_type: &str, simple: bool) -> Result<Self> {
        Self::with_rotation(kind, size, fastener_type, simple, [0.0; 3])
    }

    /// Build a nut rotated about its own origin by Euler angles in degrees.
    ///
    /// The rotation is part of the nut's shape, so a captive pocket cut for
    /// the nut follows it.
    pub fn with_rotation(
        kind: NutKind,
        size: &str,
        fastener_type: &str,
        simple: bool,
        rotation: [f64; 3],
    ) -> Result<Self> {
        let class = kind.class_name();
        let thread = ThreadSize::parse(size)?;
        let dims = catalog()?
            .row(Family::Nut, class, fastener_type, size)?
            .clone();
        let mut core = FastenerCore::new(Family::Nut, class, fastener_type, thread, dims, simple)?;

        let rotation = Location::from_euler_deg(rotation[0], rotation[1], rotation[2]);
        let body = body(kind, &core.dims)?;
        let shape = body
            .difference(&bore(kind, &core)?)
            .union(&internal_thread(kind, &core)?)
            .named(format!("{class}-{}", core.size.designation()));
        core.shape = shape.moved(&rotation);

        let thickness = thickness(kind, &core.dims)?;
        core.add_joint(Joint::rigid("a", Location::identity()));
        core.add_joint(Joint::rigid("b", Location::translation(0.0, 0.0, thickness)));

        Ok(Self {
            kind,
            rotation,
            core,
        })
    }

    /// Kinds and types that list `size`.
    pub fn select_by_size(size: &str) -> Result<BTreeMap<NutKind, Vec<String>>> {
        let found = catalog()?.select_by_size(Family::Nut, size);
        Ok(NutKind::ALL
            .into_iter()
            .filter_map(|k| found.get(k.class_name()).map(|t| (k, t.clone())))
            .collect())
    }

    /// Nut kind.
    pub fn kind(&self) -> NutKind {
        self.kind
    }

    /// Largest outer diameter (across corners for polygonal nuts).
    pub fn nut_diameter(&self) -> f64 {
        let d = &self.core.dims;
        let s = d.opt("s").unwrap_or(0.0);
        match self.kind {
            NutKind::Hex | NutKind::UnchamferedHex | NutKind::DomedCap => 2.0 * s / 3f64.sqrt(),
            NutKind::Square => s * SQRT_2,
            NutKind::HexWithFlange => d.opt("dc").unwrap_or(0.0).max(2.0 * s / 3f64.sqrt()),
            NutKind::HeatSet => d.opt("dk").unwrap_or(0.0),
        }
    }

    /// Overall height.
    pub fn nut_thickness(&self) -> f64 {
        thickness(self.kind, &self.core.dims).unwrap_or(0.0)
    }

    /// Ratio of the insert's knurl area to the hole area; heat-set only.
    ///
    /// Values above one mean the insert displaces material when set.
    pub fn fill_factor(&self) -> Option<f64> {
        if self.kind != NutKind::HeatSet {
            return None;
        }
        let d = &self.core.dims;
        match (d.opt("dk"), d.opt("dh")) {
            (Some(dk), Some(dh)) if dh > 0.0 => Some((dk / dh).powi(2)),
            _ => None,
        }
    }
}

impl Fastener for Nut {
    fn core(&self) -> &FastenerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FastenerCore {
        &mut self.core
    }

    fn head_seat(&self) -> HeadSeat {
        HeadSeat::Flat {
            diameter: self.nut_diameter(),
            height: self.nut_thickness(),
        }
    }

    fn captive_profile(&self) -> Option<CaptiveProfile> {
        let d = &self.core.dims;
        let (s, m) = (d.opt("s")?, d.opt("m")?);
        let (sides, circumradius, orientation) = match self.kind {
            NutKind::Hex | NutKind::UnchamferedHex | NutKind::DomedCap => {
                (6, s / 3f64.sqrt(), Location::identity())
            }
            NutKind::Square => (4, s / SQRT_2, Location::from_euler_deg(0.0, 0.0, 45.0)),
            NutKind::HexWithFlange | NutKind::HeatSet => return None,
        };
        Some(CaptiveProfile {
            sides,
            circumradius,
            height: m,
            orientation: self.rotation * orientation,
        })
    }

    fn insert_bore(&self) -> Option<(f64, f64)> {
        match self.kind {
            NutKind::HeatSet => Some((self.core.dims.opt("dh")?, self.core.dims.opt("m")?)),
            _ => None,
        }
    }
}

// =============================================================================
// Geometry
// =============================================================================

fn thickness(kind: NutKind, dims: &Dimensions) -> Result<f64> {
    match kind {
        NutKind::DomedCap => dims.get("h"),
        _ => dims.get("m"),
    }
}

fn hex(s: f64, height: f64) -> Part {
    Part::prism("hex", 6, s / 3f64.sqrt(), height)
}

fn body(kind: NutKind, dims: &Dimensions) -> Result<Part> {
    Ok(match kind {
        NutKind::Hex => {
            let (s, m) = (dims.get("s")?, dims.get("m")?);
            // 30 degree chamfer starting just inside the flats
            let r0 = 0.95 * s / 2.0;
            let flare = m / 30f64.to_radians().tan();
            let bottom = Part::cone("chamfer", r0, r0 + flare, m);
            let top = Part::cone("chamfer", r0 + flare, r0, m);
            hex(s, m).intersection(&bottom).intersection(&top)
        }
        NutKind::UnchamferedHex => hex(dims.get("s")?, dims.get("m")?),
        NutKind::Square => {
            let (s, m) = (dims.get("s")?, dims.get("m")?);
            Part::prism("square", 4, s / SQRT_2, m).rotate(0.0, 0.0, 45.0)
        }
        NutKind::HexWithFlange => {
            let (s, m, dc, c) = (
                dims.get("s")?,
                dims.get("m")?,
                dims.get("dc")?,
                dims.get("c")?,
            );
            let flange = Part::cylinder("flange", dc / 2.0, c);
            flange.union(&hex(s, m - c).translate(0.0, 0.0, c))
        }
        NutKind::DomedCap => {
            let (s, m, h, dk) = (
                dims.get("s")?,
                dims.get("m")?,
                dims.get("h")?,
                dims.get("dk")?,
            );
            let r = dk / 2.0;
            let crown = (h - r).max(m);
            let neck = Part::cylinder("neck", r, crown - m).translate(0.0, 0.0, m);
            let cap = Part::sphere("dome", r)
                .intersection(&Part::cylinder("dome", r, r))
                .translate(0.0, 0.0, crown);
            hex(s, m).union(&neck).union(&cap)
        }
        NutKind::HeatSet => {
            let (m, dk) = (dims.get("m")?, dims.get("dk")?);
            Part::prism("knurl", 12, dk / 2.0, m)
        }
    })
}

fn bore(kind: NutKind, core: &FastenerCore) -> Result<Part> {
    let r = core.size.diameter() / 2.0;
    // run the bore past the open faces
    let height = match kind {
        NutKind::DomedCap => core.dims.get("t")? + 0.5,
        _ => thickness(kind, &core.dims)? + 1.0,
    };
    Ok(Part::cylinder("bore", r, height).translate(0.0, 0.0, -0.5))
}

fn internal_thread(kind: NutKind, core: &FastenerCore) -> Result<Part> {
    let r = core.size.diameter() / 2.0;
    let (pitch, depth) = match (core.size.pitch(), core.size.internal_depth()) {
        (Some(p), Some(d)) if !core.simple => (p, d),
        _ => return Ok(Part::empty("thread")),
    };
    let length = match kind {
        NutKind::DomedCap => core.dims.get("t")?,
        _ => thickness(kind, &core.dims)?,
    };
    Ok(Part::thread("thread", r - depth, r, pitch, length, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use boltyard_kernel::Point3;

    #[test]
    fn test_hex_nut_dimensions() {
        let nut = Nut::new(NutKind::Hex, "M5-0.8", "iso4032", true).unwrap();
        assert_relative_eq!(nut.nut_thickness(), 4.7);
        assert_relative_eq!(nut.nut_diameter(), 16.0 / 3f64.sqrt(), epsilon = 1e-9);
        assert!(nut.nut_diameter() > nut.thread_diameter());
        assert_eq!(nut.length_offset(), 0.0);
        assert_eq!(nut.fill_factor(), None);
        let bb = nut.shape().bounding_box();
        assert!(bb.min.z.abs() < 1e-9);
        assert_relative_eq!(bb.max.z, 4.7, epsilon = 1e-9);
    }

    #[test]
    fn test_bore_is_open() {
        let nut = Nut::new(NutKind::Hex, "M5-0.8", "iso4032", true).unwrap();
        let solid = nut.shape().solid();
        assert!(!solid.contains(&Point3::new(0.0, 0.0, 2.0)));
        assert!(solid.contains(&Point3::new(3.5, 0.0, 2.0)));
    }

    #[test]
    fn test_domed_cap_is_blind() {
        let nut = Nut::new(NutKind::DomedCap, "M5-0.8", "iso1587", true).unwrap();
        assert_relative_eq!(nut.nut_thickness(), 10.0);
        let solid = nut.shape().solid();
        assert!(!solid.contains(&Point3::new(0.0, 0.0, 3.0)));
        assert!(solid.contains(&Point3::new(0.0, 0.0, 8.0)));
    }

    #[test]
    fn test_heat_set_insert() {
        let nut = Nut::new(NutKind::HeatSet, "M5-0.8-Standard", "McMaster-Carr", true).unwrap();
        let fill = nut.fill_factor().unwrap();
        assert!(fill > 1.0);
        assert_eq!(nut.insert_bore(), Some((6.4, 9.5)));
        assert!(nut.captive_profile().is_none());
        // tap data looked up without the length qualifier
        assert!(!nut.tap_hole_diameters().is_empty());
    }

    #[test]
    fn test_captive_profile_follows_rotation() {
        let nut =
            Nut::with_rotation(NutKind::Square, "M5-0.8", "din557", true, [0.0, 0.0, 15.0]).unwrap();
        let profile = nut.captive_profile().unwrap();
        assert_eq!(profile.sides, 4);
        assert_relative_eq!(profile.orientation.to_euler_deg()[2], 60.0, epsilon = 1e-9);
    }

    #[test]
    fn test_joints() {
        let nut = Nut::new(NutKind::Hex, "M5-0.8", "iso4032", true).unwrap();
        assert_relative_eq!(nut.joint("b").unwrap().location().position().z, 4.7);
        assert!(nut.joint("c").is_err());
    }

    #[test]
    fn test_select_by_size() {
        let found = Nut::select_by_size("M5-0.8").unwrap();
        assert!(found[&NutKind::Hex].contains(&"iso4032".to_string()));
        assert!(!found.contains_key(&NutKind::HeatSet));
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("hexnut".parse::<NutKind>().unwrap(), NutKind::Hex);
        assert_eq!("HeatSet".parse::<NutKind>().unwrap(), NutKind::HeatSet);
    }
}
