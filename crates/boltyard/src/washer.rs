//! Washers.
//!
//! Washer frame: the bottom face is at z=0.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use boltyard_kernel::Location;

use crate::catalog::{catalog, Family};
use crate::error::Result;
use crate::fastener::{Fastener, FastenerCore, HeadSeat};
use crate::joint::Joint;
use crate::part::Part;
use crate::thread::ThreadSize;

/// Washer classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WasherKind {
    /// Flat washer.
    Plain,
    /// Flat washer with a chamfered outer edge.
    Chamfered,
    /// Washer for cheese head screws.
    CheeseHead,
}

impl WasherKind {
    /// All washer kinds.
    pub const ALL: [WasherKind; 3] = [
        WasherKind::Plain,
        WasherKind::Chamfered,
        WasherKind::CheeseHead,
    ];

    /// Catalog class name.
    pub fn class_name(self) -> &'static str {
        match self {
            WasherKind::Plain => "PlainWasher",
            WasherKind::Chamfered => "ChamferedWasher",
            WasherKind::CheeseHead => "CheeseHeadWasher",
        }
    }

    /// Fastener types defined for this kind.
    pub fn types(self) -> Result<Vec<String>> {
        Ok(catalog()?
            .types(Family::Washer, self.class_name())
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Sizes listed for `fastener_type`, ordered by diameter.
    pub fn sizes(self, fastener_type: &str) -> Result<Vec<String>> {
        catalog()?.sizes(Family::Washer, self.class_name(), fastener_type)
    }
}

impl fmt::Display for WasherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

impl FromStr for WasherKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        let wanted = s.to_ascii_lowercase();
        WasherKind::ALL
            .into_iter()
            .find(|k| {
                let class = k.class_name().to_ascii_lowercase();
                class == wanted || class.strip_suffix("washer") == Some(wanted.as_str())
            })
            .ok_or_else(|| format!("unknown washer kind '{s}'"))
    }
}

/// A washer of a catalog type and nominal size.
#[derive(Debug, Clone)]
pub struct Washer {
    kind: WasherKind,
    core: FastenerCore,
}

impl Washer {
    /// Build a washer. `size` is the nominal size (`M5`, `1/4`, `#10`).
    pub fn new(kind: WasherKind, size: &str, fastener_type: &str) -> Result<Self> {
        let class = kind.class_name();
        let nominal = ThreadSize::parse(size)?;
        let dims = catalog()?
            .row(Family::Washer, class, fastener_type, size)?
            .clone();
        let mut core = FastenerCore::new(Family::Washer, class, fastener_type, nominal, dims, true)?;

        let (d1, d2, h) = (
            core.dims.get("d1")?,
            core.dims.get("d2")?,
            core.dims.get("h")?,
        );
        let ring = Part::cylinder("washer", d2 / 2.0, h)
            - Part::cylinder("hole", d1 / 2.0, h + 1.0).translate(0.0, 0.0, -0.5);
        let ring = match kind {
            // chamfer the top outer edge by half the thickness
            WasherKind::Chamfered => {
                ring.intersection(&Part::cone("chamfer", d2 / 2.0 + h, d2 / 2.0 - h / 2.0, h))
            }
            _ => ring,
        };
        core.shape = ring.named(format!("{class}-{size}"));

        core.add_joint(Joint::rigid("a", Location::translation(0.0, 0.0, h)));
        core.add_joint(Joint::rigid("b", Location::identity()));

        Ok(Self { kind, core })
    }

    /// Kinds and types that list `size`.
    pub fn select_by_size(size: &str) -> Result<BTreeMap<WasherKind, Vec<String>>> {
        let found = catalog()?.select_by_size(Family::Washer, size);
        Ok(WasherKind::ALL
            .into_iter()
            .filter_map(|k| found.get(k.class_name()).map(|t| (k, t.clone())))
            .collect())
    }

    /// Washer kind.
    pub fn kind(&self) -> WasherKind {
        self.kind
    }

    /// Outside diameter.
    pub fn washer_diameter(&self) -> f64 {
        self.core.dims.opt("d2").unwrap_or(0.0)
    }

    /// Inside diameter.
    pub fn hole_diameter(&self) -> f64 {
        self.core.dims.opt("d1").unwrap_or(0.0)
    }

    /// Thickness.
    pub fn washer_thickness(&self) -> f64 {
        self.core.dims.opt("h").unwrap_or(0.0)
    }
}

impl Fastener for Washer {
    fn core(&self) -> &FastenerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FastenerCore {
        &mut self.core
    }

    fn head_seat(&self) -> HeadSeat {
        HeadSeat::Flat {
            diameter: self.washer_diameter(),
            height: self.washer_thickness(),
        }
    }
}
