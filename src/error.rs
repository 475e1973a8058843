//! Error types.

use thiserror::Error;

/// Errors produced by grid construction, cell updates and rule evaluation.
///
/// Every error is raised before anything is mutated, so a failed call leaves
/// the grid and the simulation history exactly as they were.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A coordinate lies outside the grid.
    #[error("position {position:?} is outside of grid dimensions {dimensions:?}")]
    OutOfBounds {
        position: Vec<usize>,
        dimensions: Vec<usize>,
    },

    /// The rule configuration is structurally invalid.
    #[error("invalid rule configuration: {0}")]
    InvalidRuleConfig(#[from] RuleConfigError),

    /// Two things that must share a dimensionality do not.
    #[error("dimension mismatch: expected {expected} axes, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// Only 2-D and 3-D grids and windows are supported.
    ///
    /// Kept apart from [`Error::DimensionMismatch`], which compares two
    /// dimensionalities that are each supported on their own.
    #[error("{0}-dimensional grids are not supported, use 2 or 3 axes")]
    UnsupportedDimensions(usize),

    /// A grid axis has length zero.
    #[error("grid axis {axis} has length zero")]
    EmptyDimension { axis: usize },

    /// An equality tolerance is negative or not a finite number.
    #[error("equality tolerance {0} must be a finite, non-negative number")]
    InvalidTolerance(f64),
}

/// The ways a rule configuration can be malformed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleConfigError {
    #[error("window axis {axis} has even length {size}, it must be odd")]
    EvenWindow { axis: usize, size: usize },

    #[error("window axis {axis} has length zero")]
    EmptyWindow { axis: usize },

    #[error("no live threshold given and sentinel liveness not requested")]
    MissingThreshold,

    #[error("live threshold {0} is not a finite number")]
    NonFiniteThreshold(f64),

    #[error("a live threshold cannot be combined with sentinel liveness")]
    ConflictingLiveness,
}

pub type Result<T> = std::result::Result<T, Error>;
