//! clump_core - Label-indexed clump extraction and mask synthesis
//!
//! Takes a data grid and a label grid of the same shape (1 to 3 significant
//! axes) and produces one sub-volume per labelled clump, a reconciled
//! full-grid assignment array, and INTERIOR / BACKGROUND / BOUNDARY quality
//! planes. Catalogue production is delegated to a [`CatalogWriter`].
//!
//! # Stages
//!
//! 1. **Bounding boxes**: label range scan and one box per label
//! 2. **Extraction**: per-clump sub-volumes, off-label voxels as "no data"
//! 3. **Aggregation**: sub-volumes written back to a full-grid assignment
//! 4. **Edges**: present voxels with an absent face neighbor
//! 5. **Quality**: three mutually exclusive planes
//!
//! # Example
//!
//! ```ignore
//! use clump_core::{extract, DataArray, Grid, LabelArray};
//!
//! let grid = Grid::from_extents(&[64, 64, 32])?;
//! let output = extract(&grid, &DataArray::new(&data), &LabelArray::new(&labels))?;
//!
//! println!("{} clumps, {} boundary voxels",
//!     output.clumps.len(), output.edges.count());
//! ```

pub mod aggregate;
pub mod bbox;
pub mod catalog;
pub mod edges;
pub mod error;
pub mod extract;
pub mod grid;
pub mod pipeline;
pub mod quality;
pub mod types;

// Re-export commonly used items
pub use aggregate::{AssignmentArray, PresenceMask};
pub use bbox::{BoundingBox, LabelRange};
pub use catalog::{
  BeamParams, CatalogRequest, CatalogWriter, ClumpRecord, CoordinateSystem, ShapeMode,
};
pub use edges::EdgeFlags;
pub use error::{ClumpError, ClumpResult};
pub use extract::{Clump, ClumpCollection, ClumpSummary};
pub use grid::Grid;
pub use pipeline::{extract, extract_timed, ExtractionOutput, PipelineStats};
pub use quality::{QualityPlane, QualityPlanes};
pub use types::{DataArray, LabelArray, Sample, UNASSIGNED};

#[cfg(test)]
pub mod test_utils;
