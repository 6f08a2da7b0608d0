//! Stage 3: Aggregation
//!
//! Rebuilds a full-grid label array and presence mask from the extracted
//! sub-volumes.
//!
//! # Conflict policy
//!
//! Clumps are written in collection order (ascending id). A voxel already
//! claimed by an earlier clump is left untouched, so when two clumps claim
//! the same voxel the lower id wins. Disjoint label sets never conflict; a
//! conflict means the input broke that invariant and is counted and logged,
//! not treated as an error.

use crate::error::ClumpResult;
use crate::extract::ClumpCollection;
use crate::grid::Grid;
use crate::types::{try_filled, Sample, UNASSIGNED};

/// Reconciled label per voxel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssignmentArray {
  labels: Vec<Option<i32>>,
}

impl AssignmentArray {
  #[inline]
  pub fn get(&self, offset: usize) -> Option<i32> {
    self.labels.get(offset).copied().flatten()
  }

  pub fn len(&self) -> usize {
    self.labels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }

  pub fn as_slice(&self) -> &[Option<i32>] {
    &self.labels
  }

  /// Labels with unassigned voxels written as [`UNASSIGNED`].
  pub fn to_raw(&self) -> Vec<i32> {
    self
      .labels
      .iter()
      .map(|id| id.unwrap_or(UNASSIGNED))
      .collect()
  }

  pub fn assigned_count(&self) -> usize {
    self.labels.iter().filter(|id| id.is_some()).count()
  }
}

/// Validity flag per voxel, set wherever the assignment array is assigned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PresenceMask {
  present: Vec<bool>,
}

impl PresenceMask {
  pub fn from_flags(present: Vec<bool>) -> Self {
    Self { present }
  }

  #[inline]
  pub fn get(&self, offset: usize) -> bool {
    self.present.get(offset).copied().unwrap_or(false)
  }

  pub fn len(&self) -> usize {
    self.present.len()
  }

  pub fn is_empty(&self) -> bool {
    self.present.is_empty()
  }

  pub fn as_slice(&self) -> &[bool] {
    &self.present
  }

  pub fn count(&self) -> usize {
    self.present.iter().filter(|&&p| p).count()
  }
}

/// Output of the aggregation stage.
#[derive(Clone, Debug)]
pub struct Aggregation {
  pub assignment: AssignmentArray,
  pub presence: PresenceMask,
  /// Voxels claimed by more than one clump; resolved to the lower id.
  pub conflicts: usize,
}

/// Write every clump's valid voxels back onto the full grid.
#[tracing::instrument(skip_all, name = "aggregate::aggregate_clumps")]
pub fn aggregate_clumps<T: Sample>(
  grid: &Grid,
  clumps: &ClumpCollection<T>,
) -> ClumpResult<Aggregation> {
  let len = grid.voxel_count();
  let mut labels = try_filled(len, None, || "assignment array".into())?;
  let mut present = try_filled(len, false, || "presence mask".into())?;
  let mut conflicts = 0usize;
  let mut outside = 0usize;

  for clump in clumps {
    for (coord, _) in clump.iter_voxels() {
      let Some(offset) = grid.offset(coord) else {
        outside += 1;
        continue;
      };
      if present[offset] {
        conflicts += 1;
        continue;
      }
      present[offset] = true;
      labels[offset] = Some(clump.id);
    }
  }

  if conflicts > 0 {
    tracing::warn!(
      conflicts,
      "voxels claimed by more than one clump, kept the lowest id"
    );
  }
  if outside > 0 {
    tracing::warn!(outside, "clump voxels outside the grid were dropped");
  }

  Ok(Aggregation {
    assignment: AssignmentArray { labels },
    presence: PresenceMask { present },
    conflicts,
  })
}

/// Pairs of clumps whose bounding boxes overlap, as (lower id, higher id).
///
/// Only overlapping boxes can ever conflict during aggregation; clumps absent
/// from every pair write disjoint voxel sets. Quadratic in clump count.
pub fn overlapping_pairs<T: Sample>(clumps: &ClumpCollection<T>) -> Vec<(i32, i32)> {
  let all: Vec<_> = clumps.iter().collect();
  let mut pairs = Vec::new();
  for (i, a) in all.iter().enumerate() {
    for b in &all[i + 1..] {
      if a.bbox().overlaps(b.bbox()) {
        pairs.push((a.id, b.id));
      }
    }
  }
  pairs
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod aggregate_test;
