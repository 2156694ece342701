//! Error types for fastener construction and hole cutting.

use thiserror::Error;

use crate::catalog::CatalogError;

/// Errors that can occur while building fasteners, holes or assemblies.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FastenerError {
    /// Size string could not be parsed.
    #[error("invalid size: {0}")]
    InvalidSize(String),

    /// Fastener type is not defined for the class.
    #[error("{class} has no type {fastener_type}")]
    UnknownType {
        /// Fastener class, e.g. `SocketHeadCapScrew`.
        class: String,
        /// Requested type, e.g. `iso4762`.
        fastener_type: String,
    },

    /// Size is not listed for the class and type.
    #[error("{class}({fastener_type}) has no size {size}")]
    UnknownSize {
        /// Fastener class.
        class: String,
        /// Fastener type.
        fastener_type: String,
        /// Requested size.
        size: String,
    },

    /// A catalog row lacks a dimension the shape needs.
    #[error("{class}({fastener_type}) {size}: missing dimension '{parameter}'")]
    MissingDimension {
        /// Fastener class.
        class: String,
        /// Fastener type.
        fastener_type: String,
        /// Size of the row.
        size: String,
        /// Missing parameter name.
        parameter: String,
    },

    /// Screw length does not leave room for a shank.
    #[error("invalid length {length} mm: must exceed {min} mm")]
    InvalidLength {
        /// Requested length.
        length: f64,
        /// Exclusive lower bound.
        min: f64,
    },

    /// No tap drill is defined for the fastener.
    #[error("no tap drill data for {0}")]
    NoTapData(String),

    /// No clearance drill is defined for the fastener.
    #[error("no clearance drill data for {0}")]
    NoClearanceData(String),

    /// Insert holes require a heat-set insert.
    #[error("{0} is not a heat-set insert")]
    NotAnInsert(String),

    /// Captive pockets require a nut with a polygonal outline.
    #[error("{0} cannot be held captive")]
    NotCaptive(String),

    /// Joint name not defined on the fastener.
    #[error("joint '{joint}' not found on {owner}")]
    UnknownJoint {
        /// Label of the fastener.
        owner: String,
        /// Requested joint name.
        joint: String,
    },

    /// Linear joint position outside its travel.
    #[error("position {position} outside joint '{joint}' range [{min}, {max}]")]
    JointOutOfRange {
        /// Joint name.
        joint: String,
        /// Requested position.
        position: f64,
        /// Lower travel limit.
        min: f64,
        /// Upper travel limit.
        max: f64,
    },

    /// Catalog data could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Geometry query failed.
    #[error(transparent)]
    Kernel(#[from] boltyard_kernel::KernelError),
}

/// Result type for fastener operations.
pub type Result<T> = std::result::Result<T, FastenerError>;
