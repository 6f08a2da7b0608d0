//! Error types for clump extraction.

use thiserror::Error;

/// Errors raised by the extraction pipeline.
///
/// Every variant is fatal for the call that produced it: no partial output is
/// handed back alongside an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClumpError {
  /// More than three axes carry an extent greater than one.
  #[error("grid has {axes} significant pixel axes, only 1, 2 or 3 are supported")]
  Dimension { axes: usize },

  /// The label array holds no assigned voxel.
  #[error("no clumps identified by the label array")]
  NoClumps,

  /// A working buffer could not be reserved.
  #[error("failed to allocate {voxels} voxels for {what}")]
  Allocation { what: String, voxels: usize },

  /// Incompatible catalogue request, raised by a catalogue collaborator and
  /// forwarded untouched.
  #[error("configuration conflict: {0}")]
  ConfigurationConflict(String),

  /// An axis was declared with its upper bound below its lower bound.
  #[error("axis {axis} has invalid bounds {lower}..={upper}")]
  InvalidBounds { axis: usize, lower: i64, upper: i64 },

  /// Grid extents do not fit the addressable voxel range.
  #[error("{what} exceeds the addressable voxel range")]
  Overflow { what: &'static str },

  /// An input or intermediate array does not cover the grid.
  #[error("{what} holds {actual} values but the grid has {expected} voxels")]
  SizeMismatch {
    what: &'static str,
    expected: usize,
    actual: usize,
  },
}

/// Result type for extraction operations.
pub type ClumpResult<T> = std::result::Result<T, ClumpError>;
