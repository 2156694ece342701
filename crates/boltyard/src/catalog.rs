//! Embedded fastener dimension tables.
//!
//! The tables ship with the crate as TOML and are parsed once on first use.
//! Rows written in inches are converted to millimeters on load, so every
//! dimension handed out by this module is in mm.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::error::{FastenerError, Result};
use crate::thread::{ThreadSize, UnitSystem, MM_PER_INCH};

const SCREWS: &str = include_str!("../data/screws.toml");
const NUTS: &str = include_str!("../data/nuts.toml");
const WASHERS: &str = include_str!("../data/washers.toml");
const DRILLS: &str = include_str!("../data/drills.toml");
const LENGTHS: &str = include_str!("../data/lengths.toml");

/// Errors raised while loading the embedded tables.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// A table failed to parse.
    #[error("failed to parse {table} table: {message}")]
    Parse {
        /// Table name.
        table: &'static str,
        /// Parser message.
        message: String,
    },

    /// A row does not match its parameter list.
    #[error("{class}({fastener_type}) {size}: expected {expected} values, found {found}")]
    RowWidth {
        /// Fastener class.
        class: String,
        /// Fastener type.
        fastener_type: String,
        /// Row size.
        size: String,
        /// Number of declared parameters.
        expected: usize,
        /// Number of values in the row.
        found: usize,
    },

    /// A drill entry has neither `mm` nor `inch`.
    #[error("drill {0} has no diameter")]
    DrillDiameter(String),
}

/// Fastener family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    /// Screws and bolts.
    Screw,
    /// Nuts and threaded inserts.
    Nut,
    /// Washers.
    Washer,
}

impl Family {
    /// All families.
    pub const ALL: [Family; 3] = [Family::Screw, Family::Nut, Family::Washer];
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Family::Screw => "screw",
            Family::Nut => "nut",
            Family::Washer => "washer",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
enum Units {
    #[default]
    #[serde(rename = "mm")]
    Millimeters,
    #[serde(rename = "in")]
    Inches,
}

impl Units {
    fn scale(self) -> f64 {
        match self {
            Units::Millimeters => 1.0,
            Units::Inches => MM_PER_INCH,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawTypeTable {
    standard: String,
    #[serde(default)]
    units: Units,
    #[serde(default)]
    recess: Option<String>,
    parameters: Vec<String>,
    #[serde(default)]
    length_range: Option<[f64; 2]>,
    sizes: BTreeMap<String, Vec<f64>>,
}

type RawFamily = BTreeMap<String, BTreeMap<String, RawTypeTable>>;

/// Named dimensions of one catalog row, in mm.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimensions {
    class: String,
    fastener_type: String,
    size: String,
    values: BTreeMap<String, f64>,
}

impl Dimensions {
    /// Dimension `name`, or [`FastenerError::MissingDimension`].
    pub fn get(&self, name: &str) -> Result<f64> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| FastenerError::MissingDimension {
                class: self.class.clone(),
                fastener_type: self.fastener_type.clone(),
                size: self.size.clone(),
                parameter: name.to_string(),
            })
    }

    /// Dimension `name` if the row defines it.
    pub fn opt(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// One fastener type (standard) of a class.
#[derive(Debug, Clone)]
pub struct TypeTable {
    standard: String,
    recess: Option<String>,
    length_range: Option<(f64, f64)>,
    rows: BTreeMap<String, Dimensions>,
}

impl TypeTable {
    /// Human-readable standard name, e.g. `ISO 4762`.
    pub fn standard(&self) -> &str {
        &self.standard
    }

    /// Drive recess cut into the head, if any.
    pub fn recess(&self) -> Option<&str> {
        self.recess.as_deref()
    }

    /// Nominal length range in mm.
    pub fn length_range(&self) -> Option<(f64, f64)> {
        self.length_range
    }

    /// Row for `size`.
    pub fn row(&self, size: &str) -> Option<&Dimensions> {
        self.rows.get(size)
    }

    /// Listed sizes ordered by diameter.
    pub fn sizes(&self) -> Vec<String> {
        let mut sizes: Vec<(f64, &String)> = self
            .rows
            .keys()
            .map(|s| (ThreadSize::parse(s).map_or(f64::MAX, |t| t.diameter()), s))
            .collect();
        sizes.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1)));
        sizes.into_iter().map(|(_, s)| s.clone()).collect()
    }
}

/// A drill: designation plus diameter in mm.
#[derive(Debug, Clone, PartialEq)]
pub struct Drill {
    /// Drill designation (`4.2mm`, `#7`, `F`, `9/32`).
    pub name: String,
    /// Diameter in mm.
    pub diameter: f64,
}

#[derive(Debug, Deserialize)]
struct RawDrill {
    drill: String,
    #[serde(default)]
    mm: Option<f64>,
    #[serde(default)]
    inch: Option<f64>,
}

impl RawDrill {
    fn into_drill(self) -> std::result::Result<Drill, CatalogError> {
        let diameter = match (self.mm, self.inch) {
            (Some(mm), _) => mm,
            (None, Some(inch)) => inch * MM_PER_INCH,
            (None, None) => return Err(CatalogError::DrillDiameter(self.drill)),
        };
        Ok(Drill {
            name: self.drill,
            diameter,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawTap {
    soft: RawDrill,
    hard: RawDrill,
}

#[derive(Debug, Deserialize)]
struct RawClearance {
    close: RawDrill,
    normal: RawDrill,
    loose: RawDrill,
}

#[derive(Debug, Deserialize)]
struct RawDrills {
    tap: BTreeMap<String, RawTap>,
    clearance: BTreeMap<String, RawClearance>,
}

#[derive(Debug, Deserialize)]
struct RawLengths {
    metric: Vec<f64>,
    imperial: Vec<f64>,
}

/// Tap drills for soft and hard materials.
#[derive(Debug, Clone, PartialEq)]
pub struct TapDrills {
    /// Drill for soft materials (larger thread engagement).
    pub soft: Drill,
    /// Drill for hard materials.
    pub hard: Drill,
}

/// Clearance drills for the three ISO 273 fits.
#[derive(Debug, Clone, PartialEq)]
pub struct ClearanceDrills {
    /// Close (fine) fit.
    pub close: Drill,
    /// Normal (medium) fit.
    pub normal: Drill,
    /// Loose (coarse) fit.
    pub loose: Drill,
}

/// The loaded catalog.
#[derive(Debug)]
pub struct Catalog {
    families: BTreeMap<Family, BTreeMap<String, BTreeMap<String, TypeTable>>>,
    tap: BTreeMap<String, TapDrills>,
    clearance: BTreeMap<String, ClearanceDrills>,
    metric_lengths: Vec<f64>,
    imperial_lengths: Vec<f64>,
}

static CATALOG: OnceLock<std::result::Result<Catalog, CatalogError>> = OnceLock::new();

/// The embedded catalog, parsed on first call.
pub fn catalog() -> Result<&'static Catalog> {
    CATALOG
        .get_or_init(Catalog::load)
        .as_ref()
        .map_err(|e| FastenerError::Catalog(e.clone()))
}

fn parse<T: serde::de::DeserializeOwned>(
    table: &'static str,
    text: &str,
) -> std::result::Result<T, CatalogError> {
    toml::from_str(text).map_err(|e| CatalogError::Parse {
        table,
        message: e.to_string(),
    })
}

fn convert_family(
    raw: RawFamily,
) -> std::result::Result<BTreeMap<String, BTreeMap<String, TypeTable>>, CatalogError> {
    let mut classes = BTreeMap::new();
    for (class, types) in raw {
        let mut tables = BTreeMap::new();
        for (fastener_type, table) in types {
            let scale = table.units.scale();
            let mut rows = BTreeMap::new();
            for (size, values) in table.sizes {
                if values.len() != table.parameters.len() {
                    return Err(CatalogError::RowWidth {
                        class,
                        fastener_type,
                        size,
                        expected: table.parameters.len(),
                        found: values.len(),
                    });
                }
                let values = table
                    .parameters
                    .iter()
                    .cloned()
                    .zip(values.into_iter().map(|v| v * scale))
                    .collect();
                let dims = Dimensions {
                    class: class.clone(),
                    fastener_type: fastener_type.clone(),
                    size: size.clone(),
                    values,
                };
                rows.insert(size, dims);
            }
            tables.insert(
                fastener_type,
                TypeTable {
                    standard: table.standard,
                    recess: table.recess,
                    length_range: table.length_range.map(|[lo, hi]| (lo * scale, hi * scale)),
                    rows,
                },
            );
        }
        classes.insert(class, tables);
    }
    Ok(classes)
}

impl Catalog {
    fn load() -> std::result::Result<Self, CatalogError> {
        let mut families = BTreeMap::new();
        families.insert(Family::Screw, convert_family(parse("screw", SCREWS)?)?);
        families.insert(Family::Nut, convert_family(parse("nut", NUTS)?)?);
        families.insert(Family::Washer, convert_family(parse("washer", WASHERS)?)?);

        let drills: RawDrills = parse("drill", DRILLS)?;
        let mut tap = BTreeMap::new();
        for (thread, t) in drills.tap {
            let drills = TapDrills {
                soft: t.soft.into_drill()?,
                hard: t.hard.into_drill()?,
            };
            tap.insert(thread, drills);
        }
        let mut clearance = BTreeMap::new();
        for (nominal, c) in drills.clearance {
            let drills = ClearanceDrills {
                close: c.close.into_drill()?,
                normal: c.normal.into_drill()?,
                loose: c.loose.into_drill()?,
            };
            clearance.insert(nominal, drills);
        }

        let lengths: RawLengths = parse("length", LENGTHS)?;

        let catalog = Self {
            families,
            tap,
            clearance,
            metric_lengths: lengths.metric,
            imperial_lengths: lengths
                .imperial
                .into_iter()
                .map(|l| l * MM_PER_INCH)
                .collect(),
        };
        debug!(
            classes = catalog.families.values().map(BTreeMap::len).sum::<usize>(),
            tap_sizes = catalog.tap.len(),
            clearance_sizes = catalog.clearance.len(),
            "loaded fastener catalog"
        );
        Ok(catalog)
    }

    /// Classes defined for a family, e.g. `SocketHeadCapScrew`.
    pub fn classes(&self, family: Family) -> Vec<&str> {
        self.families
            .get(&family)
            .map(|c| c.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Types defined for a class.
    pub fn types(&self, family: Family, class: &str) -> Vec<&str> {
        self.families
            .get(&family)
            .and_then(|c| c.get(class))
            .map(|t| t.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Table of one class and type.
    pub fn table(&self, family: Family, class: &str, fastener_type: &str) -> Result<&TypeTable> {
        self.families
            .get(&family)
            .and_then(|c| c.get(class))
            .and_then(|t| t.get(fastener_type))
            .ok_or_else(|| FastenerError::UnknownType {
                class: class.to_string(),
                fastener_type: fastener_type.to_string(),
            })
    }

    /// Sizes listed for a class and type, ordered by diameter.
    pub fn sizes(&self, family: Family, class: &str, fastener_type: &str) -> Result<Vec<String>> {
        Ok(self.table(family, class, fastener_type)?.sizes())
    }

    /// Dimensions of one row.
    pub fn row(
        &self,
        family: Family,
        class: &str,
        fastener_type: &str,
        size: &str,
    ) -> Result<&Dimensions> {
        self.table(family, class, fastener_type)?
            .row(size)
            .ok_or_else(|| FastenerError::UnknownSize {
                class: class.to_string(),
                fastener_type: fastener_type.to_string(),
                size: size.to_string(),
            })
    }

    /// Name of the standard behind a type.
    pub fn standard(&self, family: Family, class: &str, fastener_type: &str) -> Result<&str> {
        Ok(self.table(family, class, fastener_type)?.standard())
    }

    /// Nominal length range (mm) of a screw type.
    pub fn length_range(
        &self,
        family: Family,
        class: &str,
        fastener_type: &str,
    ) -> Result<Option<(f64, f64)>> {
        Ok(self.table(family, class, fastener_type)?.length_range())
    }

    /// Tap drills for a thread (`M5-0.8`, `1/4-20`).
    pub fn tap_drill(&self, thread: &str) -> Option<&TapDrills> {
        self.tap.get(thread)
    }

    /// Clearance drills for a nominal size (`M5`, `1/4`).
    pub fn clearance_drill(&self, nominal: &str) -> Option<&ClearanceDrills> {
        self.clearance.get(nominal)
    }

    /// Preferred nominal lengths (mm) for a unit system.
    pub fn nominal_length_series(&self, system: UnitSystem) -> &[f64] {
        match system {
            UnitSystem::Metric => &self.metric_lengths,
            UnitSystem::Imperial => &self.imperial_lengths,
        }
    }

    /// `(class, type)` pairs of a family that list `size`.
    pub fn select_by_size(&self, family: Family, size: &str) -> BTreeMap<String, Vec<String>> {
        let mut found = BTreeMap::new();
        if let Some(classes) = self.families.get(&family) {
            for (class, types) in classes {
                let matching: Vec<String> = types
                    .iter()
                    .filter(|(_, table)| table.rows.contains_key(size))
                    .map(|(t, _)| t.clone())
                    .collect();
                if !matching.is_empty() {
                    found.insert(class.clone(), matching);
                }
            }
        }
        found
    }
}
