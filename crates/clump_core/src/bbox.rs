//! Stage 1: label range scan and per-label bounding boxes.
//!
//! ```text
//! LabelArray ──► label_range() ──► [id_min, id_max]
//!      │                                  │
//!      └──────────► index_bounding_boxes() ◄┘
//!                          │
//!                   BoundingBoxTable (id → box, ascending)
//! ```
//!
//! Boxes use inclusive 1-based grid positions on all three axes of the
//! uniform view; padding axes always span `1..=1`.

use std::collections::BTreeMap;

use glam::IVec3;

use crate::error::{ClumpError, ClumpResult};
use crate::grid::Grid;
use crate::types::LabelArray;

/// Axis-aligned inclusive box in 1-based grid positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
  pub lower: IVec3,
  pub upper: IVec3,
}

impl BoundingBox {
  /// Create a box with inverted extents (ready for encapsulation).
  pub fn empty() -> Self {
    Self {
      lower: IVec3::splat(i32::MAX),
      upper: IVec3::splat(i32::MIN),
    }
  }

  pub fn new(lower: IVec3, upper: IVec3) -> Self {
    Self { lower, upper }
  }

  /// Box covering the 0-based grid coordinate range `[min, max]`.
  pub fn from_grid_coords(min: [usize; 3], max: [usize; 3]) -> Self {
    Self::new(grid_pos(min), grid_pos(max))
  }

  /// Expand the box to include a 1-based position.
  #[inline]
  pub fn encapsulate(&mut self, pos: IVec3) {
    self.lower = self.lower.min(pos);
    self.upper = self.upper.max(pos);
  }

  /// True if no voxel ever contributed (lower > upper on some axis).
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.lower.cmpgt(self.upper).any()
  }

  /// Voxels along each axis, zero for an empty box.
  pub fn dims(&self) -> [usize; 3] {
    if self.is_empty() {
      return [0; 3];
    }
    let span = self.upper - self.lower + IVec3::ONE;
    [span.x as usize, span.y as usize, span.z as usize]
  }

  pub fn voxel_count(&self) -> usize {
    self.dims().iter().product()
  }

  /// Reject boxes that cover no voxel or start before grid position 1.
  ///
  /// Only boxes that pass can be turned into 0-based grid coordinates.
  pub fn check_addressable(&self) -> ClumpResult<()> {
    for axis in 0..3 {
      let (lower, upper) = (self.lower[axis], self.upper[axis]);
      if lower < 1 || upper < lower {
        return Err(ClumpError::InvalidBounds {
          axis,
          lower: lower as i64,
          upper: upper as i64,
        });
      }
    }
    Ok(())
  }

  /// 0-based grid coordinate of the lower corner, clamped at zero for boxes
  /// that fail [`Self::check_addressable`].
  pub fn origin(&self) -> [usize; 3] {
    let lower = (self.lower - IVec3::ONE).max(IVec3::ZERO);
    [lower.x as usize, lower.y as usize, lower.z as usize]
  }

  #[inline]
  pub fn contains(&self, pos: IVec3) -> bool {
    self.lower.cmple(pos).all() && pos.cmple(self.upper).all()
  }

  /// Two boxes overlap if they share any voxel.
  #[inline]
  pub fn overlaps(&self, other: &BoundingBox) -> bool {
    !self.is_empty()
      && !other.is_empty()
      && self.lower.cmple(other.upper).all()
      && other.lower.cmple(self.upper).all()
  }

  /// 0-based grid coordinates inside the box, in (z, y, x) nested order.
  pub fn iter_grid_coords(&self) -> impl Iterator<Item = [usize; 3]> {
    let [nx, ny, nz] = self.dims();
    let [ox, oy, oz] = self.origin();
    (0..nz).flat_map(move |z| {
      (0..ny).flat_map(move |y| (0..nx).map(move |x| [ox + x, oy + y, oz + z]))
    })
  }
}

impl Default for BoundingBox {
  fn default() -> Self {
    Self::empty()
  }
}

/// 1-based position of a 0-based grid coordinate.
#[inline]
pub fn grid_pos(coord: [usize; 3]) -> IVec3 {
  IVec3::new(coord[0] as i32 + 1, coord[1] as i32 + 1, coord[2] as i32 + 1)
}

/// Inclusive range of assigned label ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LabelRange {
  pub min: i32,
  pub max: i32,
}

impl LabelRange {
  /// Number of ids in the range, assigned or not.
  pub fn len(&self) -> usize {
    (self.max as i64 - self.min as i64 + 1) as usize
  }

  pub fn is_empty(&self) -> bool {
    self.max < self.min
  }

  #[inline]
  pub fn contains(&self, id: i32) -> bool {
    self.min <= id && id <= self.max
  }
}

/// Find the smallest and largest assigned label.
///
/// Fails with [`ClumpError::NoClumps`] if no voxel is assigned.
pub fn label_range(labels: &LabelArray) -> ClumpResult<LabelRange> {
  labels
    .iter()
    .flatten()
    .fold(None, |range: Option<LabelRange>, id| {
      Some(match range {
        None => LabelRange { min: id, max: id },
        Some(r) => LabelRange {
          min: r.min.min(id),
          max: r.max.max(id),
        },
      })
    })
    .ok_or(ClumpError::NoClumps)
}

/// Bounding boxes for every label in a range.
///
/// Ids in range that no voxel carries are absent and read back as empty.
#[derive(Clone, Debug)]
pub struct BoundingBoxTable {
  range: LabelRange,
  boxes: BTreeMap<i32, BoundingBox>,
}

impl BoundingBoxTable {
  pub fn range(&self) -> LabelRange {
    self.range
  }

  /// Box for `id`, empty if the label has no voxel.
  pub fn get(&self, id: i32) -> BoundingBox {
    self.boxes.get(&id).copied().unwrap_or_default()
  }

  /// Non-empty boxes in ascending id order.
  pub fn iter_non_empty(&self) -> impl Iterator<Item = (i32, &BoundingBox)> {
    self
      .boxes
      .iter()
      .filter(|(_, bbox)| !bbox.is_empty())
      .map(|(&id, bbox)| (id, bbox))
  }

  pub fn non_empty_count(&self) -> usize {
    self.iter_non_empty().count()
  }

  /// Ids in range that carry no voxel.
  pub fn missing_ids(&self) -> usize {
    self.range.len() - self.non_empty_count()
  }
}

/// Single pass over the label grid accumulating one box per label.
///
/// Voxels whose label falls outside `range` are ignored.
#[tracing::instrument(skip_all, name = "bbox::index_bounding_boxes")]
pub fn index_bounding_boxes(
  grid: &Grid,
  labels: &LabelArray,
  range: LabelRange,
) -> BoundingBoxTable {
  let mut boxes: BTreeMap<i32, BoundingBox> = BTreeMap::new();

  for (offset, coord) in grid.iter_coords().enumerate() {
    let Some(id) = labels.get(offset) else {
      continue;
    };
    if !range.contains(id) {
      continue;
    }
    boxes
      .entry(id)
      .or_insert_with(BoundingBox::empty)
      .encapsulate(grid_pos(coord));
  }

  let table = BoundingBoxTable { range, boxes };
  tracing::debug!(
    id_min = range.min,
    id_max = range.max,
    clumps = table.non_empty_count(),
    missing = table.missing_ids(),
    "indexed bounding boxes"
  );
  table
}

#[cfg(test)]
#[path = "bbox_test.rs"]
mod bbox_test;
