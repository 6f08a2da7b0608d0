//! Stage 4: Edge detection
//!
//! A present voxel is an edge if any face neighbor along a significant axis
//! is absent. Neighbors past the grid border count as absent.
//!
//! ```text
//!   2-D neighborhood (4 faces)      3-D adds the two z faces
//!
//!          (x, y-1)
//!             │
//!  (x-1, y) ──●── (x+1, y)
//!             │
//!          (x, y+1)
//! ```

use crate::aggregate::PresenceMask;
use crate::error::ClumpResult;
use crate::grid::{Grid, AXIS_STEPS};

/// Edge flag per voxel; never set on an absent voxel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeFlags {
  edges: Vec<bool>,
}

impl EdgeFlags {
  #[inline]
  pub fn get(&self, offset: usize) -> bool {
    self.edges.get(offset).copied().unwrap_or(false)
  }

  pub fn len(&self) -> usize {
    self.edges.len()
  }

  pub fn is_empty(&self) -> bool {
    self.edges.is_empty()
  }

  pub fn as_slice(&self) -> &[bool] {
    &self.edges
  }

  pub fn count(&self) -> usize {
    self.edges.iter().filter(|&&e| e).count()
  }
}

/// Flag present voxels that touch an absent face neighbor.
#[tracing::instrument(skip_all, name = "edges::detect_edges")]
pub fn detect_edges(grid: &Grid, presence: &PresenceMask) -> ClumpResult<EdgeFlags> {
  grid.expect_len("presence mask", presence.len())?;

  let edges = grid
    .iter_coords()
    .enumerate()
    .map(|(offset, coord)| presence.get(offset) && touches_absent(grid, presence, coord))
    .collect();

  Ok(EdgeFlags { edges })
}

#[inline]
fn touches_absent(grid: &Grid, presence: &PresenceMask, coord: [usize; 3]) -> bool {
  (0..grid.ndim()).any(|axis| {
    AXIS_STEPS.iter().any(|&step| {
      grid
        .neighbor(coord, axis, step)
        .and_then(|next| grid.offset(next))
        .map_or(true, |offset| !presence.get(offset))
    })
  })
}

#[cfg(test)]
#[path = "edges_test.rs"]
mod edges_test;
