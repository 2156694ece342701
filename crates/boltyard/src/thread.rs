//! Thread size designations.
//!
//! Three notations are understood:
//!
//! - metric `M<d>-<pitch>` (`M5-0.8`), or just `M<d>` for nominal sizes
//! - unified `<inches>-<tpi>` (`1/4-20`, `1-8`), or just `<inches>`
//! - numbered `#<n>-<tpi>` (`#10-32`) with diameter `0.060 + 0.013·n` in
//!
//! Any further `-`-separated text is kept as a qualifier (`M5-0.8-Standard`).

use std::fmt;
use std::str::FromStr;

use crate::error::{FastenerError, Result};

/// Millimeters per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Unit system a size is designated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitSystem {
    /// ISO metric.
    Metric,
    /// Unified inch.
    Imperial,
}

/// A parsed thread size.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadSize {
    designation: String,
    nominal: String,
    thread: String,
    diameter: f64,
    pitch: Option<f64>,
    qualifier: Option<String>,
    system: UnitSystem,
}

impl ThreadSize {
    /// Parse a size string.
    pub fn parse(size: &str) -> Result<Self> {
        let size = size.trim();
        let invalid = || FastenerError::InvalidSize(size.to_string());
        let mut parts = size.splitn(3, '-');
        let nominal = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let pitch_text = parts.next();
        let qualifier = parts
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let (system, diameter) = if let Some(d) = nominal.strip_prefix('M') {
            (UnitSystem::Metric, positive(d).ok_or_else(invalid)?)
        } else if let Some(n) = nominal.strip_prefix('#') {
            let n: u32 = n.parse().map_err(|_| invalid())?;
            let inches = 0.060 + 0.013 * f64::from(n);
            (UnitSystem::Imperial, inches * MM_PER_INCH)
        } else {
            let inches = parse_inches(nominal).ok_or_else(invalid)?;
            (UnitSystem::Imperial, inches * MM_PER_INCH)
        };

        let pitch = match pitch_text {
            None => None,
            Some(text) => {
                let value = positive(text).ok_or_else(invalid)?;
                Some(match system {
                    UnitSystem::Metric => value,
                    UnitSystem::Imperial => MM_PER_INCH / value,
                })
            }
        };
        if pitch.is_some_and(|p| p >= diameter) {
            return Err(invalid());
        }

        let thread = match pitch_text {
            Some(p) => format!("{nominal}-{p}"),
            None => nominal.to_string(),
        };

        Ok(Self {
            designation: size.to_string(),
            nominal: nominal.to_string(),
            thread,
            diameter,
            pitch,
            qualifier,
            system,
        })
    }

    /// The string the size was parsed from.
    pub fn designation(&self) -> &str {
        &self.designation
    }

    /// Nominal diameter designation without pitch (`M5`, `1/4`, `#10`).
    pub fn nominal(&self) -> &str {
        &self.nominal
    }

    /// Diameter and pitch without qualifier (`M5-0.8`).
    pub fn thread(&self) -> &str {
        &self.thread
    }

    /// Major diameter in mm.
    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    /// Pitch in mm, if the designation has one.
    pub fn pitch(&self) -> Option<f64> {
        self.pitch
    }

    /// Trailing qualifier such as `Standard` or `Short`.
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    /// Unit system of the designation.
    pub fn system(&self) -> UnitSystem {
        self.system
    }

    /// Radial depth of an external ISO thread (5/8 H below the crest).
    pub fn external_depth(&self) -> Option<f64> {
        self.pitch.map(|p| 0.613_43 * p)
    }

    /// Radial depth of an internal ISO thread (5/8 H of the basic profile).
    pub fn internal_depth(&self) -> Option<f64> {
        self.pitch.map(|p| 0.541_27 * p)
    }
}

impl FromStr for ThreadSize {
    type Err = FastenerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ThreadSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.designation)
    }
}

fn positive(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0)
}

/// `1/4`, `3/8`, `1`, `0.25`.
fn parse_inches(text: &str) -> Option<f64> {
    match text.split_once('/') {
        Some((num, den)) => {
            let num: u32 = num.parse().ok()?;
            let den: u32 = den.parse().ok()?;
            (num > 0 && den > 0).then(|| f64::from(num) / f64::from(den))
        }
        None => positive(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_metric() {
        let size = ThreadSize::parse("M5-0.8").unwrap();
        assert_eq!(size.system(), UnitSystem::Metric);
        assert_relative_eq!(size.diameter(), 5.0);
        assert_relative_eq!(size.pitch().unwrap(), 0.8);
        assert_eq!(size.nominal(), "M5");
        assert_eq!(size.thread(), "M5-0.8");
        assert_eq!(size.qualifier(), None);
    }

    #[test]
    fn test_metric_with_qualifier() {
        let size: ThreadSize = "M5-0.8-Standard".parse().unwrap();
        assert_eq!(size.thread(), "M5-0.8");
        assert_eq!(size.qualifier(), Some("Standard"));
        assert_eq!(size.to_string(), "M5-0.8-Standard");
    }

    #[test]
    fn test_unified_fraction() {
        let size = ThreadSize::parse("1/4-20").unwrap();
        assert_eq!(size.system(), UnitSystem::Imperial);
        assert_relative_eq!(size.diameter(), 6.35, epsilon = 1e-9);
        assert_relative_eq!(size.pitch().unwrap(), 1.27, epsilon = 1e-9);
        assert_eq!(size.nominal(), "1/4");
    }

    #[test]
    fn test_numbered() {
        let size = ThreadSize::parse("#10-32").unwrap();
        assert_relative_eq!(size.diameter(), 0.19 * MM_PER_INCH, epsilon = 1e-9);
        assert_eq!(size.nominal(), "#10");
    }

    #[test]
    fn test_nominal_only() {
        let washer = ThreadSize::parse("M5").unwrap();
        assert_eq!(washer.pitch(), None);
        assert_eq!(washer.thread(), "M5");
        let imperial = ThreadSize::parse("1/4").unwrap();
        assert_relative_eq!(imperial.diameter(), 6.35, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid() {
        for bad in ["", "M", "Mx-1", "#a-32", "1/0-20", "M5-0", "M5-6", "banana"] {
            assert!(
                matches!(ThreadSize::parse(bad), Err(FastenerError::InvalidSize(_))),
                "{bad} should be rejected"
            );
        }
    }
}
