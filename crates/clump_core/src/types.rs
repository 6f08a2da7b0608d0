//! Read-only views over the caller's data and label arrays.
//!
//! External arrays carry "no data" and "unassigned" as magic sentinel values.
//! Inside the crate every read goes through these views and comes back as an
//! `Option`, so sentinels only exist at the array boundary.

use crate::error::{ClumpError, ClumpResult};

/// Label sentinel written for voxels that belong to no clump.
///
/// Any negative label is read as unassigned; this is the value written back
/// out.
pub const UNASSIGNED: i32 = i32::MIN;

/// Scalar data sample with a designated bad value.
pub trait Sample: Copy + PartialOrd + std::fmt::Debug + Send + Sync + 'static {
  /// Sentinel marking a voxel with no data.
  const BAD: Self;

  /// True for the sentinel and for NaN.
  fn is_bad(self) -> bool;

  /// Widen to `f64` for statistics.
  fn to_f64(self) -> f64;
}

impl Sample for f32 {
  const BAD: f32 = f32::MIN;

  #[inline]
  fn is_bad(self) -> bool {
    self == Self::BAD || self.is_nan()
  }

  #[inline]
  fn to_f64(self) -> f64 {
    self as f64
  }
}

impl Sample for f64 {
  const BAD: f64 = f64::MIN;

  #[inline]
  fn is_bad(self) -> bool {
    self == Self::BAD || self.is_nan()
  }

  #[inline]
  fn to_f64(self) -> f64 {
    self
  }
}

/// Borrowed data grid, indexed by linear offset.
#[derive(Clone, Copy, Debug)]
pub struct DataArray<'a, T: Sample> {
  values: &'a [T],
}

impl<'a, T: Sample> DataArray<'a, T> {
  pub fn new(values: &'a [T]) -> Self {
    Self { values }
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// Value at `offset`, or `None` for bad values and offsets past the end.
  #[inline]
  pub fn get(&self, offset: usize) -> Option<T> {
    self.values.get(offset).copied().filter(|v| !v.is_bad())
  }
}

/// Borrowed label grid, indexed by linear offset.
#[derive(Clone, Copy, Debug)]
pub struct LabelArray<'a> {
  labels: &'a [i32],
}

impl<'a> LabelArray<'a> {
  pub fn new(labels: &'a [i32]) -> Self {
    Self { labels }
  }

  pub fn len(&self) -> usize {
    self.labels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }

  /// Label at `offset`, or `None` if the voxel is unassigned.
  #[inline]
  pub fn get(&self, offset: usize) -> Option<i32> {
    self.labels.get(offset).copied().filter(|&id| id >= 0)
  }

  /// Labels in linear offset order.
  pub fn iter(&self) -> impl Iterator<Item = Option<i32>> + '_ {
    self.labels.iter().map(|&id| (id >= 0).then_some(id))
  }
}

/// Allocate a buffer of `len` copies of `value`, reporting failure instead of
/// aborting.
pub(crate) fn try_filled<V: Clone>(
  len: usize,
  value: V,
  what: impl FnOnce() -> String,
) -> ClumpResult<Vec<V>> {
  let mut buffer = Vec::new();
  buffer
    .try_reserve_exact(len)
    .map_err(|_| ClumpError::Allocation {
      what: what(),
      voxels: len,
    })?;
  buffer.resize(len, value);
  Ok(buffer)
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
