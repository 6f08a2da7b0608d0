//! Grid geometry: per-axis extents, linear strides and coordinate conversion.
//!
//! # Layout
//!
//! ```text
//! offset = x * stride[0] + y * stride[1] + z * stride[2]
//!
//! stride[0] = 1
//! stride[i] = stride[i - 1] * extent[i - 1]
//!
//! Axis 0 is the fastest varying. Traversal order is (z, y, x) nested, which
//! visits offsets 0, 1, 2, ... in sequence.
//! ```
//!
//! Grids with fewer than three significant axes are padded to a uniform
//! 3-axis view: unused trailing axes have extent 1 and stride 0, so every
//! stage can iterate three nested ranges.

use smallvec::SmallVec;

use crate::error::{ClumpError, ClumpResult};

/// Maximum number of significant axes.
pub const MAX_AXES: usize = 3;

/// Unit steps along one axis, used for face-neighbor lookups.
pub const AXIS_STEPS: [isize; 2] = [-1, 1];

/// Immutable shape descriptor shared by every array in the pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
  extents: SmallVec<[usize; MAX_AXES]>,
  strides: SmallVec<[usize; MAX_AXES]>,
  lower: SmallVec<[i64; MAX_AXES]>,
  dims3: [usize; 3],
  strides3: [usize; 3],
  voxel_count: usize,
}

impl Grid {
  /// Build a grid from inclusive pixel bounds, one `(lower, upper)` pair per
  /// axis.
  ///
  /// Axes with extent 1 are insignificant and dropped. A grid with no
  /// significant axis is a single voxel on one axis.
  pub fn from_bounds(bounds: &[(i64, i64)]) -> ClumpResult<Self> {
    let mut extents = SmallVec::<[usize; MAX_AXES]>::new();
    let mut lower = SmallVec::<[i64; MAX_AXES]>::new();
    let mut significant = 0;

    for (axis, &(lo, hi)) in bounds.iter().enumerate() {
      if hi < lo {
        return Err(ClumpError::InvalidBounds {
          axis,
          lower: lo,
          upper: hi,
        });
      }
      let extent = axis_extent(lo, hi).ok_or(ClumpError::Overflow {
        what: "axis extent",
      })?;
      if extent > 1 {
        significant += 1;
        if significant <= MAX_AXES {
          extents.push(extent);
          lower.push(lo);
        }
      }
    }

    if significant > MAX_AXES {
      return Err(ClumpError::Dimension { axes: significant });
    }

    if extents.is_empty() {
      extents.push(1);
      lower.push(bounds.first().map_or(1, |&(lo, _)| lo));
    }

    Self::with_axes(extents, lower)
  }

  /// Build a grid from per-axis extents with pixel bounds starting at 1.
  pub fn from_extents(extents: &[usize]) -> ClumpResult<Self> {
    let bounds = extents
      .iter()
      .map(|&n| {
        i64::try_from(n)
          .map(|upper| (1, upper))
          .map_err(|_| ClumpError::Overflow {
            what: "axis extent",
          })
      })
      .collect::<ClumpResult<Vec<_>>>()?;
    Self::from_bounds(&bounds)
  }

  fn with_axes(
    extents: SmallVec<[usize; MAX_AXES]>,
    lower: SmallVec<[i64; MAX_AXES]>,
  ) -> ClumpResult<Self> {
    let voxel_count = extents
      .iter()
      .try_fold(1usize, |acc, &extent| acc.checked_mul(extent))
      .ok_or(ClumpError::Overflow {
        what: "voxel count",
      })?;

    let mut strides = SmallVec::<[usize; MAX_AXES]>::new();
    let mut dims3 = [1usize; 3];
    let mut strides3 = [0usize; 3];

    for (axis, &extent) in extents.iter().enumerate() {
      let stride = if axis == 0 {
        1
      } else {
        strides[axis - 1] * extents[axis - 1]
      };
      strides.push(stride);
      dims3[axis] = extent;
      strides3[axis] = stride;
    }

    Ok(Self {
      extents,
      strides,
      lower,
      dims3,
      strides3,
      voxel_count,
    })
  }

  /// Number of significant axes (1-3).
  #[inline]
  pub fn ndim(&self) -> usize {
    self.extents.len()
  }

  pub fn extents(&self) -> &[usize] {
    &self.extents
  }

  pub fn strides(&self) -> &[usize] {
    &self.strides
  }

  /// Pixel index of the first voxel on each significant axis.
  pub fn lower_bounds(&self) -> &[i64] {
    &self.lower
  }

  /// Extents in the uniform 3-axis view.
  #[inline]
  pub fn dims3(&self) -> [usize; 3] {
    self.dims3
  }

  /// Strides in the uniform 3-axis view (0 on padding axes).
  #[inline]
  pub fn strides3(&self) -> [usize; 3] {
    self.strides3
  }

  /// Total number of voxels.
  #[inline]
  pub fn voxel_count(&self) -> usize {
    self.voxel_count
  }

  /// Linear offset of a 0-based coordinate, or `None` outside the grid.
  #[inline]
  pub fn offset(&self, coord: [usize; 3]) -> Option<usize> {
    if (0..3).any(|axis| coord[axis] >= self.dims3[axis]) {
      return None;
    }
    Some(
      coord[0] * self.strides3[0] + coord[1] * self.strides3[1] + coord[2] * self.strides3[2],
    )
  }

  /// 0-based coordinate of a linear offset, or `None` past the end.
  #[inline]
  pub fn coord(&self, offset: usize) -> Option<[usize; 3]> {
    if offset >= self.voxel_count {
      return None;
    }
    let [nx, ny, _] = self.dims3;
    Some([offset % nx, (offset / nx) % ny, offset / (nx * ny)])
  }

  /// Every coordinate in (z, y, x) nested order; the n-th item has offset n.
  pub fn iter_coords(&self) -> impl Iterator<Item = [usize; 3]> {
    let [nx, ny, nz] = self.dims3;
    (0..nz).flat_map(move |z| (0..ny).flat_map(move |y| (0..nx).map(move |x| [x, y, z])))
  }

  /// Coordinate one `step` away along `axis`.
  ///
  /// Returns `None` if the step leaves the grid or `axis` is a padding axis.
  #[inline]
  pub fn neighbor(&self, coord: [usize; 3], axis: usize, step: isize) -> Option<[usize; 3]> {
    if axis >= self.ndim() {
      return None;
    }
    let moved = coord[axis].checked_add_signed(step)?;
    if moved >= self.dims3[axis] {
      return None;
    }
    let mut next = coord;
    next[axis] = moved;
    Some(next)
  }

  /// Pixel index of a 1-based grid position along `axis`.
  ///
  /// Padding axes report the position unchanged.
  pub fn grid_to_pixel(&self, axis: usize, grid_pos: i32) -> i64 {
    match self.lower.get(axis) {
      Some(&lo) => lo.saturating_add(grid_pos as i64 - 1),
      None => grid_pos as i64,
    }
  }

  /// Check that an array of `actual` values covers the grid.
  pub fn expect_len(&self, what: &'static str, actual: usize) -> ClumpResult<()> {
    if actual != self.voxel_count {
      return Err(ClumpError::SizeMismatch {
        what,
        expected: self.voxel_count,
        actual,
      });
    }
    Ok(())
  }
}

/// Voxel count of an inclusive `[lo, hi]` range, if it fits a 1-based `i32`
/// grid position.
fn axis_extent(lo: i64, hi: i64) -> Option<usize> {
  let extent = hi.checked_sub(lo)?.checked_add(1)?;
  if extent > i32::MAX as i64 {
    return None;
  }
  usize::try_from(extent).ok()
}

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;
