#![warn(missing_docs)]

//! boltyard: parametric fasteners
//!
//! Screws, nuts and washers built from embedded ISO, DIN and ASME tables,
//! plus the clearance, tap and insert holes that fit them.
//!
//! # Example
//!
//! ```rust
//! use boltyard::{ClearanceHole, Fastener, HoleFeature, Nut, NutKind, Part, Screw, ScrewKind};
//! use boltyard::Axis;
//!
//! let mut plate = Part::cuboid("plate", 40.0, 40.0, 8.0);
//! let top = plate.faces().sort_by(Axis::Z).last().unwrap().location();
//!
//! let mut screw = Screw::new(ScrewKind::SocketHeadCap, "M5-0.8", 20.0, "iso4762", true).unwrap();
//! let seat = ClearanceHole::new().cut(&mut plate, &mut screw, &top).unwrap();
//! screw.set_location(seat);
//!
//! let mut nut = Nut::new(NutKind::Hex, "M5-0.8", "iso4032", true).unwrap();
//! screw.connect_to("b", &mut nut, "b", -2.0).unwrap();
//! assert!(!nut.located_shape().intersects(&screw.located_shape()));
//! ```

pub mod assembly;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fastener;
pub mod hole;
pub mod joint;
pub mod nut;
pub mod part;
pub mod screw;
pub mod thread;
pub mod washer;

pub use assembly::{connect, Compound, CompoundChild};
pub use boltyard_kernel::{Aabb3, Axis, Location, Point3, Vec3};
pub use catalog::{catalog, Catalog, CatalogError, Dimensions, Drill, Family};
pub use config::{ConfigError, Settings};
pub use error::{FastenerError, Result};
pub use fastener::{CaptiveProfile, Fastener, Fit, HeadSeat, TapMaterial};
pub use hole::{ClearanceHole, HoleFeature, InsertHole, TapHole};
pub use joint::{Joint, JointKind};
pub use nut::{Nut, NutKind};
pub use part::{Face, FaceList, Part};
pub use screw::{Screw, ScrewKind};
pub use thread::{ThreadSize, UnitSystem};
pub use washer::{Washer, WasherKind};
