//! Stage 2: Extraction
//!
//! Copies the data inside each non-empty bounding box into an owned
//! sub-volume. Voxels inside the box that carry another label (or none) are
//! stored as "no data".
//!
//! ```text
//!   label grid            box of label 1         sub-volume of 1
//! ┌───┬───┬───┬───┐      ┌───┬───┐              ┌─────┬─────┐
//! │ 1 │ 1 │ . │ . │      │ 1 │ 1 │              │ d00 │ d10 │
//! ├───┼───┼───┼───┤  ──► ├───┼───┤  ──────────► ├─────┼─────┤
//! │ 2 │ 1 │ . │ . │      │ 2 │ 1 │              │  -  │ d11 │
//! └───┴───┴───┴───┘      └───┴───┘              └─────┴─────┘
//! ```

use glam::IVec3;

use crate::bbox::{grid_pos, BoundingBox, BoundingBoxTable};
use crate::error::{ClumpError, ClumpResult};
use crate::grid::Grid;
use crate::types::{try_filled, DataArray, LabelArray, Sample};

/// One label's bounding box and the data extracted from it.
#[derive(Clone, Debug)]
pub struct Clump<T: Sample> {
  /// Label id.
  pub id: i32,
  /// Inclusive 1-based bounds on the full grid.
  bbox: BoundingBox,
  /// Box-sized buffer in (z, y, x) order; `None` where the voxel is not part
  /// of this clump or has no data.
  values: Vec<Option<T>>,
}

/// Raw statistics of a clump's valid voxels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClumpSummary {
  /// Number of voxels holding data.
  pub voxels: usize,
  /// Sum of all data values.
  pub sum: f64,
  /// Largest data value.
  pub peak: f64,
  /// 0-based grid coordinate of the first voxel holding the peak.
  pub peak_coord: [usize; 3],
  /// Smallest data value, the background floor.
  pub floor: f64,
}

impl<T: Sample> Clump<T> {
  /// Build a clump from a box and a pre-filled buffer.
  ///
  /// The box must be non-empty with a lower corner at grid position 1 or
  /// above, and the buffer must hold exactly one value per box voxel.
  pub fn from_values(id: i32, bbox: BoundingBox, values: Vec<Option<T>>) -> ClumpResult<Self> {
    bbox.check_addressable()?;
    if values.len() != bbox.voxel_count() {
      return Err(ClumpError::SizeMismatch {
        what: "clump sub-volume",
        expected: bbox.voxel_count(),
        actual: values.len(),
      });
    }
    Ok(Self { id, bbox, values })
  }

  /// Inclusive 1-based bounds on the full grid.
  pub fn bbox(&self) -> &BoundingBox {
    &self.bbox
  }

  /// Sub-volume extents.
  pub fn dims(&self) -> [usize; 3] {
    self.bbox.dims()
  }

  pub fn values(&self) -> &[Option<T>] {
    &self.values
  }

  /// Value at a 0-based full-grid coordinate, `None` outside the box.
  pub fn value_at(&self, coord: [usize; 3]) -> Option<T> {
    let pos = grid_pos(coord);
    if !self.bbox.contains(pos) {
      return None;
    }
    self.values[local_index(&self.bbox, pos)]
  }

  /// Valid voxels as (full-grid coordinate, value), in (z, y, x) order.
  pub fn iter_voxels(&self) -> impl Iterator<Item = ([usize; 3], T)> + '_ {
    self
      .bbox
      .iter_grid_coords()
      .zip(self.values.iter())
      .filter_map(|(coord, value)| value.map(|v| (coord, v)))
  }

  /// Sub-volume with "no data" written as the sentinel value.
  pub fn subvolume_raw(&self) -> Vec<T> {
    self.values.iter().map(|v| v.unwrap_or(T::BAD)).collect()
  }

  /// Statistics over valid voxels, `None` if the clump holds no data.
  pub fn summary(&self) -> Option<ClumpSummary> {
    let mut voxels = self.iter_voxels();
    let (first_coord, first) = voxels.next()?;
    let first = first.to_f64();

    let mut summary = ClumpSummary {
      voxels: 1,
      sum: first,
      peak: first,
      peak_coord: first_coord,
      floor: first,
    };
    for (coord, value) in voxels {
      let value = value.to_f64();
      summary.voxels += 1;
      summary.sum += value;
      summary.floor = summary.floor.min(value);
      if value > summary.peak {
        summary.peak = value;
        summary.peak_coord = coord;
      }
    }
    Some(summary)
  }
}

/// Clumps in ascending id order.
#[derive(Clone, Debug)]
pub struct ClumpCollection<T: Sample> {
  clumps: Vec<Clump<T>>,
}

impl<T: Sample> ClumpCollection<T> {
  /// Collect clumps, ordering them by ascending id.
  ///
  /// Clumps sharing an id keep their relative order.
  pub fn from_clumps(mut clumps: Vec<Clump<T>>) -> Self {
    clumps.sort_by_key(|clump| clump.id);
    Self { clumps }
  }

  pub fn len(&self) -> usize {
    self.clumps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.clumps.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Clump<T>> {
    self.clumps.iter()
  }

  pub fn get(&self, id: i32) -> Option<&Clump<T>> {
    self
      .clumps
      .binary_search_by_key(&id, |clump| clump.id)
      .ok()
      .map(|index| &self.clumps[index])
  }

  pub fn ids(&self) -> impl Iterator<Item = i32> + '_ {
    self.clumps.iter().map(|clump| clump.id)
  }
}

impl<'a, T: Sample> IntoIterator for &'a ClumpCollection<T> {
  type Item = &'a Clump<T>;
  type IntoIter = std::slice::Iter<'a, Clump<T>>;

  fn into_iter(self) -> Self::IntoIter {
    self.clumps.iter()
  }
}

/// Extract a single clump from its bounding box.
///
/// Empty boxes and boxes reaching below grid position 1 are rejected with
/// [`ClumpError::InvalidBounds`].
pub fn extract_clump<T: Sample>(
  grid: &Grid,
  data: &DataArray<T>,
  labels: &LabelArray,
  id: i32,
  bbox: BoundingBox,
) -> ClumpResult<Clump<T>> {
  bbox.check_addressable()?;
  let mut values = try_filled(bbox.voxel_count(), None, || format!("clump {id}"))?;

  for (slot, coord) in values.iter_mut().zip(bbox.iter_grid_coords()) {
    let Some(offset) = grid.offset(coord) else {
      continue;
    };
    if labels.get(offset) == Some(id) {
      *slot = data.get(offset);
    }
  }

  Ok(Clump { id, bbox, values })
}

/// Extract one clump per non-empty bounding box, in ascending id order.
///
/// On allocation failure the clumps built so far are dropped before the
/// error is returned.
#[tracing::instrument(skip_all, name = "extract::extract_clumps")]
pub fn extract_clumps<T: Sample>(
  grid: &Grid,
  data: &DataArray<T>,
  labels: &LabelArray,
  table: &BoundingBoxTable,
) -> ClumpResult<ClumpCollection<T>> {
  let count = table.non_empty_count();
  let mut clumps = Vec::new();
  clumps
    .try_reserve_exact(count)
    .map_err(|_| ClumpError::Allocation {
      what: "clump collection".into(),
      voxels: count,
    })?;

  for (id, bbox) in table.iter_non_empty() {
    let clump = extract_clump(grid, data, labels, id, *bbox)?;
    tracing::trace!(id, voxels = bbox.voxel_count(), "extracted clump");
    clumps.push(clump);
  }

  Ok(ClumpCollection { clumps })
}

/// Sub-volume offset of a 1-based position inside a box.
#[inline]
fn local_index(bbox: &BoundingBox, pos: IVec3) -> usize {
  let [nx, ny, _] = bbox.dims();
  let local = pos - bbox.lower;
  local.x as usize + nx * (local.y as usize + ny * local.z as usize)
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod extract_test;
