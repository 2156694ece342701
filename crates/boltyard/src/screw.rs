//! Screws.
//!
//! Screw frame: the bearing plane of the head is at z=0 and the shank runs
//! along -Z. Heads that are part of the nominal length (countersunk heads)
//! lie below z=0 with their top flush with it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use boltyard_kernel::Location;

use crate::catalog::{catalog, Dimensions, Family};
use crate::error::{FastenerError, Result};
use crate::fastener::{Fastener, FastenerCore, HeadSeat};
use crate::joint::Joint;
use crate::part::Part;
use crate::thread::ThreadSize;

/// Screw classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScrewKind {
    /// Button head with hex socket.
    ButtonHead,
    /// Button head with a flange collar.
    ButtonHeadWithCollar,
    /// Cylindrical cheese head.
    CheeseHead,
    /// Flat countersunk head.
    CounterSunk,
    /// Hex head bolts and screws.
    HexHead,
    /// Hex head with a flange.
    HexHeadWithFlange,
    /// Pan head.
    PanHead,
    /// Pan head with a collar.
    PanHeadWithCollar,
    /// Cheese head with a domed top.
    RaisedCheeseHead,
    /// Countersunk head with a domed top.
    RaisedCounterSunkOvalHead,
    /// Headless set screw.
    SetScrew,
    /// Socket head cap screw.
    SocketHeadCap,
}

impl ScrewKind {
    /// All screw kinds.
    pub const ALL: [ScrewKind; 12] = [
        ScrewKind::ButtonHead,
        ScrewKind::ButtonHeadWithCollar,
        ScrewKind::CheeseHead,
        ScrewKind::CounterSunk,
        ScrewKind::HexHead,
        ScrewKind::HexHeadWithFlange,
        ScrewKind::PanHead,
        ScrewKind::PanHeadWithCollar,
        ScrewKind::RaisedCheeseHead,
        ScrewKind::RaisedCounterSunkOvalHead,
        ScrewKind::SetScrew,
        ScrewKind::SocketHeadCap,
    ];

    /// Catalog class name.
    pub fn class_name(self) -> &'static str {
        match self {
            ScrewKind::ButtonHead => "ButtonHeadScrew",
            ScrewKind::ButtonHeadWithCollar => "ButtonHeadWithCollarScrew",
            ScrewKind::CheeseHead => "CheeseHeadScrew",
            ScrewKind::CounterSunk => "CounterSunkScrew",
            ScrewKind::HexHead => "HexHeadScrew",
            ScrewKind::HexHeadWithFlange => "HexHeadWithFlangeScrew",
            ScrewKind::PanHead => "PanHeadScrew",
            ScrewKind::PanHeadWithCollar => "PanHeadWithCollarScrew",
            ScrewKind::RaisedCheeseHead => "RaisedCheeseHeadScrew",
            ScrewKind::RaisedCounterSunkOvalHead => "RaisedCounterSunkOvalHeadScrew",
            ScrewKind::SetScrew => "SetScrew",
            ScrewKind::SocketHeadCap => "SocketHeadCapScrew",
        }
    }

    /// Fastener types defined for this kind.
    pub fn types(self) -> Result<Vec<String>> {
        Ok(catalog()?
            .types(Family::Screw, self.class_name())
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Sizes listed for `fastener_type`, ordered by diameter.
    pub fn sizes(self, fastener_type: &str) -> Result<Vec<String>> {
        catalog()?.sizes(Family::Screw, self.class_name(), fastener_type)
    }

    /// Nominal length range (mm) of `fastener_type`.
    pub fn nominal_length_range(self, fastener_type: &str) -> Result<(f64, f64)> {
        let class = self.class_name();
        catalog()?
            .length_range(Family::Screw, class, fastener_type)?
            .ok_or_else(|| FastenerError::MissingDimension {
                class: class.to_string(),
                fastener_type: fastener_type.to_string(),
                size: String::new(),
                parameter: "length_range".to_string(),
            })
    }

    /// Heads that sit in a conical countersink.
    pub fn is_countersunk(self) -> bool {
        matches!(
            self,
            ScrewKind::CounterSunk | ScrewKind::RaisedCounterSunkOvalHead
        )
    }
}

impl fmt::Display for ScrewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

impl FromStr for ScrewKind {
    type Err = String;

    /// Accepts the class name with or without the `Screw` suffix, any case.
    fn from_str(s: &str) -> std::result::Result<Self, String> {
        let wanted = s.to_ascii_lowercase();
        ScrewKind::ALL
            .into_iter()
            .find(|k| {
                let class = k.class_name().to_ascii_lowercase();
                class == wanted || class.strip_suffix("screw") == Some(wanted.as_str())
            })
            .ok_or_else(|| format!("unknown screw kind '{s}'"))
    }
}

/// A screw of a catalog type, size and length.
#[derive(Debug, Clone)]
pub struct Screw {
    kind: ScrewKind,
    length: f64,
    head: HeadSeat,
    core: FastenerCore,
}

impl Screw {
    /// Build a screw. `length` is the nominal length in mm.
    ///
    /// ```
    /// use boltyard::{Fastener, Screw, ScrewKind};
    ///
    /// let screw = Screw::new(ScrewKind::SocketHeadCap, "M5-0.8", 16.0, "iso4762", true).unwrap();
    /// assert_eq!(screw.info(), "SocketHeadCapScrew(iso4762): M5-0.8x16mm");
    /// ```
    pub fn new(
        kind: ScrewKind,
        size: &str,
        length: f64,
        fastener_type: &str,
        simple: bool,
    ) -> Result<Self> {
        let class = kind.class_name();
        let thread = ThreadSize::parse(size)?;
        let cat = catalog()?;
        let table = cat.table(Family::Screw, class, fastener_type)?;
        let dims = cat
            .row(Family::Screw, class, fastener_type, size)?
            .clone();
        let recess = table.recess().map(str::to_string);

        let head = head_seat(kind, &dims)?;
        let offset = match head {
            HeadSeat::Conical { depth, .. } => depth,
            _ => 0.0,
        };
        if !(length.is_finite() && length > offset) {
            return Err(FastenerError::InvalidLength {
                length,
                min: offset,
            });
        }

        let mut core = FastenerCore::new(Family::Screw, class, fastener_type, thread, dims, simple)?;
        core.shape = build_shape(kind, &core, length, head, recess.as_deref())?;

        let shank = length - offset;
        core.add_joint(Joint::rigid("a", Location::identity()));
        core.add_joint(Joint::linear(
            "b",
            Location::new([0.0, 0.0, -length], [-180.0, 0.0, 0.0]),
            (-shank, 0.0),
        ));

        Ok(Self {
            kind,
            length,
            head,
            core,
        })
    }

    /// Kinds and types that list `size`.
    pub fn select_by_size(size: &str) -> Result<BTreeMap<ScrewKind, Vec<String>>> {
        let found = catalog()?.select_by_size(Family::Screw, size);
        Ok(ScrewKind::ALL
            .into_iter()
            .filter_map(|k| found.get(k.class_name()).map(|t| (k, t.clone())))
            .collect())
    }

    /// Screw kind.
    pub fn kind(&self) -> ScrewKind {
        self.kind
    }

    /// Nominal length in mm.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Height of the head above the bearing plane, or the full head height
    /// for countersunk heads. Zero for set screws.
    pub fn head_height(&self) -> f64 {
        match self.head {
            HeadSeat::None => 0.0,
            HeadSeat::Flat { height, .. } => height,
            HeadSeat::Conical { depth, raised, .. } => depth + raised,
        }
    }

    /// Largest head diameter. Zero for set screws.
    pub fn head_diameter(&self) -> f64 {
        match self.head {
            HeadSeat::None => 0.0,
            HeadSeat::Flat { diameter, .. } | HeadSeat::Conical { diameter, .. } => diameter,
        }
    }

    /// Length of the shank below the head.
    pub fn shank_length(&self) -> f64 {
        self.length - self.length_offset()
    }

    /// Nominal length range (mm) of this screw's type.
    pub fn nominal_length_range(&self) -> Result<(f64, f64)> {
        self.kind.nominal_length_range(&self.core.fastener_type)
    }

    /// Preferred lengths (mm) within the type's nominal range.
    pub fn nominal_lengths(&self) -> Result<Vec<f64>> {
        let (min, max) = self.nominal_length_range()?;
        let eps = 1e-6;
        Ok(catalog()?
            .nominal_length_series(self.core.size.system())
            .iter()
            .copied()
            .filter(|l| *l >= min - eps && *l <= max + eps)
            .collect())
    }

    /// Minimum depth of a blind hole that seats the screw.
    ///
    /// The hole takes the whole shank, plus the sunk part of the head when
    /// `counter_sunk`. Set screws have no bearing face and report zero.
    pub fn min_hole_depth(&self, counter_sunk: bool) -> f64 {
        let sunk = match self.head {
            HeadSeat::None => return 0.0,
            HeadSeat::Flat { height, .. } if counter_sunk => height,
            HeadSeat::Conical { depth, .. } if counter_sunk => depth,
            _ => 0.0,
        };
        self.shank_length() + sunk
    }
}

impl Fastener for Screw {
    fn core(&self) -> &FastenerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FastenerCore {
        &mut self.core
    }

    fn head_seat(&self) -> HeadSeat {
        self.head
    }

    fn length_offset(&self) -> f64 {
        match self.head {
            HeadSeat::Conical { depth, .. } => depth,
            _ => 0.0,
        }
    }

    fn info(&self) -> String {
        format!(
            "{}({}): {}x{}mm",
            self.core.class,
            self.core.fastener_type,
            self.core.size.designation(),
            self.length
        )
    }
}

// =============================================================================
// Geometry
// =============================================================================

fn head_seat(kind: ScrewKind, dims: &Dimensions) -> Result<HeadSeat> {
    let hex_corners = |s: f64| 2.0 * s / 3f64.sqrt();
    Ok(match kind {
        ScrewKind::SetScrew => HeadSeat::None,
        ScrewKind::CounterSunk => HeadSeat::Conical {
            diameter: dims.get("dk")?,
            depth: dims.get("k")?,
            raised: 0.0,
        },
        ScrewKind::RaisedCounterSunkOvalHead => HeadSeat::Conical {
            diameter: dims.get("dk")?,
            depth: dims.get("k")?,
            raised: dims.get("f")?,
        },
        ScrewKind::HexHead => HeadSeat::Flat {
            diameter: hex_corners(dims.get("s")?),
            height: dims.get("k")?,
        },
        ScrewKind::HexHeadWithFlange => HeadSeat::Flat {
            diameter: dims.get("dc")?.max(hex_corners(dims.get("s")?)),
            height: dims.get("k")?,
        },
        ScrewKind::ButtonHeadWithCollar | ScrewKind::PanHeadWithCollar => HeadSeat::Flat {
            diameter: dims.get("dc")?.max(dims.get("dk")?),
            height: dims.get("k")?,
        },
        ScrewKind::ButtonHead
        | ScrewKind::CheeseHead
        | ScrewKind::PanHead
        | ScrewKind::RaisedCheeseHead
        | ScrewKind::SocketHeadCap => HeadSeat::Flat {
            diameter: dims.get("dk")?,
            height: dims.get("k")?,
        },
    })
}

/// Spherical cap of base `diameter` and `height`, base at z=0.
fn dome(diameter: f64, height: f64) -> Part {
    let r = diameter / 2.0;
    let radius = (r * r + height * height) / (2.0 * height);
    let sphere = Part::sphere("dome", radius).translate(0.0, 0.0, height - radius);
    sphere.intersection(&Part::cylinder("dome", r, height))
}

/// Flat cylinder with its upper rim rounded off.
fn pan(diameter: f64, height: f64) -> Part {
    let r = diameter / 2.0;
    let rim = 0.3 * height;
    let body = Part::cylinder("pan", r, height - rim);
    let top = Part::cone("pan", r, (r - rim).max(r / 2.0), rim).translate(0.0, 0.0, height - rim);
    body.union(&top)
}

fn head_shape(kind: ScrewKind, dims: &Dimensions, thread_diameter: f64) -> Result<(Part, f64)> {
    let hex = |s: f64, h: f64| Part::prism("hex", 6, s / 3f64.sqrt(), h);
    Ok(match kind {
        ScrewKind::SetScrew => (Part::empty("head"), 0.0),
        ScrewKind::SocketHeadCap | ScrewKind::CheeseHead => {
            let k = dims.get("k")?;
            (Part::cylinder("head", dims.get("dk")? / 2.0, k), k)
        }
        ScrewKind::ButtonHead => {
            let k = dims.get("k")?;
            (dome(dims.get("dk")?, k), k)
        }
        ScrewKind::ButtonHeadWithCollar => {
            let (k, c) = (dims.get("k")?, dims.get("c")?);
            let collar = Part::cylinder("collar", dims.get("dc")? / 2.0, c);
            let cap = dome(dims.get("dk")?, k - c).translate(0.0, 0.0, c);
            (collar.union(&cap), k)
        }
        ScrewKind::PanHead => {
            let k = dims.get("k")?;
            (pan(dims.get("dk")?, k), k)
        }
        ScrewKind::PanHeadWithCollar => {
            let (k, c) = (dims.get("k")?, dims.get("c")?);
            let collar = Part::cylinder("collar", dims.get("dc")? / 2.0, c);
            let top = pan(dims.get("dk")?, k - c).translate(0.0, 0.0, c);
            (collar.union(&top), k)
        }
        ScrewKind::RaisedCheeseHead => {
            let (dk, k, f) = (dims.get("dk")?, dims.get("k")?, dims.get("f")?);
            let body = Part::cylinder("head", dk / 2.0, k - f);
            let cap = dome(dk, f).translate(0.0, 0.0, k - f);
            (body.union(&cap), k)
        }
        ScrewKind::HexHead => {
            let k = dims.get("k")?;
            (hex(dims.get("s")?, k), k)
        }
        ScrewKind::HexHeadWithFlange => {
            let (k, c) = (dims.get("k")?, dims.get("c")?);
            let flange = Part::cylinder("flange", dims.get("dc")? / 2.0, c);
            let top = hex(dims.get("s")?, k - c).translate(0.0, 0.0, c);
            (flange.union(&top), k)
        }
        ScrewKind::CounterSunk | ScrewKind::RaisedCounterSunkOvalHead => {
            let (dk, k) = (dims.get("dk")?, dims.get("k")?);
            let cone =
                Part::cone("head", thread_diameter / 2.0, dk / 2.0, k).translate(0.0, 0.0, -k);
            if kind == ScrewKind::RaisedCounterSunkOvalHead {
                (cone.union(&dome(dk, dims.get("f")?)), dims.get("f")?)
            } else {
                (cone, 0.0)
            }
        }
    })
}

/// Drive recess tool, top at z=0 extending down by the recess depth.
fn recess_tool(recess: &str, dims: &Dimensions, depth: f64, span: f64) -> Result<Part> {
    let height = depth + 1.0;
    let tool = match recess {
        "hex" => Part::prism("hex socket", 6, dims.get("s")? / 3f64.sqrt(), height),
        "hexalobular" => Part::prism("hexalobular", 6, dims.get("a")? / 2.0, height),
        "slot" => {
            let n = dims.get("n")?;
            Part::cuboid("slot", span, n, height).translate(-span / 2.0, -n / 2.0, 0.0)
        }
        "cross" => {
            let m = dims.get("m")?;
            let w = m / 5.0;
            let arm = Part::cuboid("cross", m, w, height).translate(-m / 2.0, -w / 2.0, 0.0);
            arm.union(&arm.rotate(0.0, 0.0, 90.0))
        }
        _ => return Ok(Part::empty("recess")),
    };
    Ok(tool.translate(0.0, 0.0, -depth))
}

fn build_shape(
    kind: ScrewKind,
    core: &FastenerCore,
    length: f64,
    head: HeadSeat,
    recess: Option<&str>,
) -> Result<Part> {
    let dims = &core.dims;
    let d = core.size.diameter();
    let (head_part, top) = head_shape(kind, dims, d)?;

    let (shank_top, head_room) = match head {
        HeadSeat::None => (0.0, length),
        HeadSeat::Flat { height, .. } => (0.0, height),
        HeadSeat::Conical { depth, raised, .. } => (-depth, depth + raised),
    };
    let shank_length = length + shank_top;
    let shank = shank(core, shank_length)?.translate(0.0, 0.0, -length);

    let mut screw = head_part.union(&shank);
    if let Some(recess) = recess {
        let t = dims.get("t")?.min(0.8 * head_room);
        let tool = recess_tool(recess, dims, t, 2.0 * length.max(d) + 2.0)?;
        screw = screw.difference(&tool.translate(0.0, 0.0, top));
    }
    Ok(screw.named(format!("{}-{}", core.class, core.size.designation())))
}

/// Shank of `length` along +Z from z=0 (tip at z=0).
fn shank(core: &FastenerCore, length: f64) -> Result<Part> {
    let r = core.size.diameter() / 2.0;
    let (pitch, depth) = match (core.size.pitch(), core.size.external_depth()) {
        (Some(p), Some(d)) if !core.simple => (p, d),
        _ => return Ok(Part::cylinder("shank", r, length)),
    };
    let threaded = core.dims.opt("b").map_or(length, |b| b.min(length));
    let thread = Part::thread("thread", r - depth, r, pitch, threaded, false);
    if threaded < length {
        let plain = Part::cylinder("shank", r, length - threaded).translate(0.0, 0.0, threaded);
        Ok(thread.union(&plain))
    } else {
        Ok(thread)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use boltyard_kernel::Point3;

    fn shcs() -> Screw {
        Screw::new(ScrewKind::SocketHeadCap, "M5-0.8", 20.0, "iso4762", true).unwrap()
    }

    #[test]
    fn test_frame() {
        let screw = shcs();
        let bb = screw.bounding_box();
        assert_relative_eq!(bb.max.z, 5.0, epsilon = 1e-9);
        assert_relative_eq!(bb.min.z, -20.0, epsilon = 1e-9);
        assert!(screw.shape().solid().contains(&Point3::new(0.0, 0.0, -10.0)));
        // socket
        assert!(!screw.shape().solid().contains(&Point3::new(0.0, 0.0, 4.5)));
        assert!(screw.shape().solid().contains(&Point3::new(3.9, 0.0, 4.5)));
    }

    #[test]
    fn test_countersunk_head_is_inside_nominal_length() {
        let screw =
            Screw::new(ScrewKind::CounterSunk, "M5-0.8", 20.0, "iso10642", true).unwrap();
        assert_relative_eq!(screw.length_offset(), 3.1);
        let bb = screw.bounding_box();
        assert!(bb.max.z.abs() < 1e-9);
        assert_relative_eq!(bb.min.z, -20.0, epsilon = 1e-9);
        assert_relative_eq!(screw.shank_length(), 16.9, epsilon = 1e-9);
    }

    #[test]
    fn test_countersunk_kinds_have_conical_seats() {
        for kind in ScrewKind::ALL {
            let fastener_type = &kind.types().unwrap()[0];
            let size = &kind.sizes(fastener_type).unwrap()[0];
            let (min, _) = kind.nominal_length_range(fastener_type).unwrap();
            let screw = Screw::new(kind, size, min.max(10.0), fastener_type, true).unwrap();
            let conical = matches!(screw.head_seat(), HeadSeat::Conical { .. });
            assert_eq!(kind.is_countersunk(), conical, "{kind}");
            assert_eq!(screw.length_offset() > 0.0, conical, "{kind}");
        }
    }

    #[test]
    fn test_min_hole_depth() {
        let screw = shcs();
        assert_relative_eq!(screw.min_hole_depth(false), 20.0);
        assert_relative_eq!(screw.min_hole_depth(true), 25.0);
        let set = Screw::new(ScrewKind::SetScrew, "M5-0.8", 10.0, "iso4026", true).unwrap();
        assert_eq!(set.min_hole_depth(true), 0.0);
        assert_eq!(set.head_height(), 0.0);
    }

    #[test]
    fn test_invalid_length() {
        for length in [0.0, -3.0, f64::NAN] {
            assert!(matches!(
                Screw::new(ScrewKind::SocketHeadCap, "M5-0.8", length, "iso4762", true),
                Err(FastenerError::InvalidLength { .. })
            ));
        }
        assert!(matches!(
            Screw::new(ScrewKind::CounterSunk, "M5-0.8", 3.0, "iso10642", true),
            Err(FastenerError::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_unknown_type_and_size() {
        assert!(matches!(
            Screw::new(ScrewKind::SocketHeadCap, "M5-0.8", 20.0, "iso4014", true),
            Err(FastenerError::UnknownType { .. })
        ));
        assert!(matches!(
            Screw::new(ScrewKind::SocketHeadCap, "M7-1", 20.0, "iso4762", true),
            Err(FastenerError::UnknownSize { .. })
        ));
    }

    #[test]
    fn test_threaded_shank_stays_within_major_diameter() {
        let screw = Screw::new(ScrewKind::HexHead, "M8-1.25", 40.0, "iso4014", false).unwrap();
        let bb = screw.shape().solid().bounding_box();
        assert_relative_eq!(bb.min.z, -40.0, epsilon = 1e-9);
        // thread runs b = 22 mm up from the tip, plain shank above
        let solid = screw.shape().solid();
        assert!(solid.contains(&Point3::new(3.9, 0.0, -5.0)));
        assert!(solid.contains(&Point3::new(3.0, 0.0, -30.0)));
        assert!(!solid.contains(&Point3::new(4.1, 0.0, -30.0)));
    }

    #[test]
    fn test_nominal_lengths_within_range() {
        let screw = shcs();
        let (min, max) = screw.nominal_length_range().unwrap();
        let lengths = screw.nominal_lengths().unwrap();
        assert!(!lengths.is_empty());
        assert!(lengths.iter().all(|l| *l >= min && *l <= max));
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!(
            "SocketHeadCap".parse::<ScrewKind>().unwrap(),
            ScrewKind::SocketHeadCap
        );
        assert_eq!(
            "countersunkscrew".parse::<ScrewKind>().unwrap(),
            ScrewKind::CounterSunk
        );
        assert!("Lag".parse::<ScrewKind>().is_err());
    }

    #[test]
    fn test_joint_b_at_tip() {
        let screw = shcs();
        let b = screw.joint("b").unwrap();
        assert_relative_eq!(b.location().position().z, -20.0, epsilon = 1e-9);
        assert_relative_eq!(b.location().z_axis().z, -1.0, epsilon = 1e-9);
    }
}
