//! Holes sized for a fastener and cut into a host part.
//!
//! A hole is cut at a face frame `at` whose +Z axis points out of the
//! material. Tools are built in that frame along -Z. Each cut returns the
//! location where the fastener seats and records it on the fastener.

use boltyard_kernel::Location;
use tracing::debug;

use crate::error::{FastenerError, Result};
use crate::fastener::{Fastener, Fit, HeadSeat, TapMaterial};
use crate::part::Part;

/// A hole feature for a fastener.
pub trait HoleFeature {
    /// Hole depth below the surface; `None` cuts through the host.
    fn hole_depth(&self) -> Option<f64>;

    /// Rotation of the tool about the face frame, Euler degrees.
    fn tool_rotation(&self) -> [f64; 3];

    /// Tool and fastener seat in the face frame, before rotation.
    fn tool(&self, fastener: &dyn Fastener, depth: f64) -> Result<(Part, Location)>;

    /// Cut the hole into `host` at `at` and return the fastener's seat.
    fn cut(&self, host: &mut Part, fastener: &mut dyn Fastener, at: &Location) -> Result<Location> {
        let depth = match self.hole_depth() {
            Some(d) => d,
            None => host.bounding_box().diagonal(),
        };
        let (tool, seat) = self.tool(&*fastener, depth)?;
        let [rx, ry, rz] = self.tool_rotation();
        let rotation = Location::from_euler_deg(rx, ry, rz);
        host.cut(&tool.moved(&rotation), at);

        let seat = at * &(rotation * seat);
        fastener.push_hole_location(seat);
        debug!(
            host = %host.name,
            fastener = fastener.label(),
            depth,
            "cut hole"
        );
        Ok(seat)
    }
}

fn bore(radius: f64, depth: f64) -> Part {
    Part::cylinder("bore", radius, depth).translate(0.0, 0.0, -depth)
}

/// Recess for the head, washer or nut and the resulting seat.
///
/// `gap` is the diametral clearance added around the recess. A countersink
/// follows the head's own cone, from the thread diameter at `-depth` to the
/// head diameter at the surface, widened by the gap.
fn recess(fastener: &dyn Fastener, gap: f64) -> (Part, Location) {
    match fastener.head_seat() {
        HeadSeat::None => (Part::empty("recess"), Location::identity()),
        HeadSeat::Flat { diameter, height } => (
            bore((diameter + gap) / 2.0, height).named("counterbore"),
            Location::translation(0.0, 0.0, -height),
        ),
        HeadSeat::Conical {
            diameter, depth, ..
        } => {
            let bottom = (fastener.thread_diameter() + gap) / 2.0;
            let top = (diameter + gap) / 2.0;
            let sink =
                Part::cone("countersink", bottom, top, depth).translate(0.0, 0.0, -depth);
            (sink, Location::identity())
        }
    }
}

/// Seat of a fastener resting on the surface without a recess.
fn surface_seat(fastener: &dyn Fastener) -> Location {
    match fastener.head_seat() {
        HeadSeat::Conical { depth, .. } => Location::translation(0.0, 0.0, depth),
        _ => Location::identity(),
    }
}

/// A hole the fastener passes through freely.
#[derive(Debug, Clone, PartialEq)]
pub struct ClearanceHole {
    /// Clearance fit.
    pub fit: Fit,
    /// Depth below the surface; `None` cuts through.
    pub depth: Option<f64>,
    /// Recess the head (or nut, or washer) below the surface.
    pub counter_sunk: bool,
    /// Cut a polygonal pocket that holds a nut.
    pub captive_nut: bool,
    /// Tool rotation in Euler degrees.
    pub rotation: [f64; 3],
}

impl Default for ClearanceHole {
    fn default() -> Self {
        Self {
            fit: Fit::Normal,
            depth: None,
            counter_sunk: true,
            captive_nut: false,
            rotation: [0.0; 3],
        }
    }
}

impl ClearanceHole {
    /// Through hole, normal fit, counter sunk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fit.
    pub fn fit(mut self, fit: Fit) -> Self {
        self.fit = fit;
        self
    }

    /// Set the depth.
    pub fn depth(mut self, depth: f64) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Set whether the head is recessed.
    pub fn counter_sunk(mut self, counter_sunk: bool) -> Self {
        self.counter_sunk = counter_sunk;
        self
    }

    /// Set whether to cut a captive nut pocket.
    pub fn captive_nut(mut self, captive_nut: bool) -> Self {
        self.captive_nut = captive_nut;
        self
    }

    /// Set the tool rotation.
    pub fn rotation(mut self, rotation: [f64; 3]) -> Self {
        self.rotation = rotation;
        self
    }
}

impl HoleFeature for ClearanceHole {
    fn hole_depth(&self) -> Option<f64> {
        self.depth
    }

    fn tool_rotation(&self) -> [f64; 3] {
        self.rotation
    }

    fn tool(&self, fastener: &dyn Fastener, depth: f64) -> Result<(Part, Location)> {
        let clearance = fastener.clearance_hole_diameter(self.fit)?;
        let radius = clearance / 2.0;
        let gap = clearance - fastener.thread_diameter();
        let hole = bore(radius, depth);

        if self.captive_nut {
            let profile = fastener
                .captive_profile()
                .ok_or_else(|| FastenerError::NotCaptive(fastener.info()))?;
            let pocket = Part::prism(
                "pocket",
                profile.sides,
                profile.circumradius,
                profile.height,
            )
            .moved(&profile.orientation)
            .translate(0.0, 0.0, -profile.height);
            let seat = Location::translation(0.0, 0.0, -profile.height);
            return Ok((hole.union(&pocket).named("captive nut hole"), seat));
        }

        if self.counter_sunk {
            let (head, seat) = recess(fastener, gap);
            Ok((hole.union(&head).named("clearance hole"), seat))
        } else {
            Ok((hole.named("clearance hole"), surface_seat(fastener)))
        }
    }
}

/// A hole drilled for tapping.
#[derive(Debug, Clone, PartialEq)]
pub struct TapHole {
    /// Material class for drill selection.
    pub material: TapMaterial,
    /// Depth below the surface; `None` cuts through.
    pub depth: Option<f64>,
    /// Recess the head below the surface.
    pub counter_sunk: bool,
    /// Tool rotation in Euler degrees.
    pub rotation: [f64; 3],
}

impl Default for TapHole {
    fn default() -> Self {
        Self {
            material: TapMaterial::Soft,
            depth: None,
            counter_sunk: true,
            rotation: [0.0; 3],
        }
    }
}

impl TapHole {
    /// Through hole for soft material, counter sunk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the material.
    pub fn material(mut self, material: TapMaterial) -> Self {
        self.material = material;
        self
    }

    /// Set the depth.
    pub fn depth(mut self, depth: f64) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Set whether the head is recessed.
    pub fn counter_sunk(mut self, counter_sunk: bool) -> Self {
        self.counter_sunk = counter_sunk;
        self
    }

    /// Set the tool rotation.
    pub fn rotation(mut self, rotation: [f64; 3]) -> Self {
        self.rotation = rotation;
        self
    }
}

impl HoleFeature for TapHole {
    fn hole_depth(&self) -> Option<f64> {
        self.depth
    }

    fn tool_rotation(&self) -> [f64; 3] {
        self.rotation
    }

    fn tool(&self, fastener: &dyn Fastener, depth: f64) -> Result<(Part, Location)> {
        let radius = fastener.tap_hole_diameter(self.material)? / 2.0;
        let hole = bore(radius, depth);
        if !self.counter_sunk {
            return Ok((hole.named("tap hole"), surface_seat(fastener)));
        }
        let gap = fastener
            .clearance_hole_diameter(Fit::Normal)
            .map_or(0.0, |c| c - fastener.thread_diameter());
        let (head, seat) = recess(fastener, gap);
        Ok((hole.union(&head).named("tap hole"), seat))
    }
}

/// A hole for a heat-set threaded insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertHole {
    /// Depth below the surface; `None` cuts through.
    pub depth: Option<f64>,
    /// Tool rotation in Euler degrees.
    pub rotation: [f64; 3],
}

impl InsertHole {
    /// Through hole.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the depth.
    pub fn depth(mut self, depth: f64) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Set the tool rotation.
    pub fn rotation(mut self, rotation: [f64; 3]) -> Self {
        self.rotation = rotation;
        self
    }
}

impl HoleFeature for InsertHole {
    fn hole_depth(&self) -> Option<f64> {
        self.depth
    }

    fn tool_rotation(&self) -> [f64; 3] {
        self.rotation
    }

    fn tool(&self, fastener: &dyn Fastener, depth: f64) -> Result<(Part, Location)> {
        let (diameter, length) = fastener
            .insert_bore()
            .ok_or_else(|| FastenerError::NotAnInsert(fastener.info()))?;
        // the insert sits flush with the surface
        Ok((
            bore(diameter / 2.0, depth).named("insert hole"),
            Location::translation(0.0, 0.0, -length),
        ))
    }
}
