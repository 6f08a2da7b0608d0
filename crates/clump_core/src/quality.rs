//! Stage 5: Quality planes
//!
//! Three mutually exclusive boolean planes derived from presence and edge
//! flags. Exactly one plane is set per voxel.
//!
//! | present | edge | plane      |
//! |---------|------|------------|
//! | no      | -    | BACKGROUND |
//! | yes     | no   | INTERIOR   |
//! | yes     | yes  | BOUNDARY   |

use crate::aggregate::PresenceMask;
use crate::edges::EdgeFlags;
use crate::error::{ClumpError, ClumpResult};
use crate::types::try_filled;

/// Named quality plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QualityPlane {
  Interior,
  Background,
  Boundary,
}

impl QualityPlane {
  pub const ALL: [QualityPlane; 3] = [
    QualityPlane::Interior,
    QualityPlane::Background,
    QualityPlane::Boundary,
  ];

  /// Stable external name.
  pub fn name(self) -> &'static str {
    match self {
      QualityPlane::Interior => "INTERIOR",
      QualityPlane::Background => "BACKGROUND",
      QualityPlane::Boundary => "BOUNDARY",
    }
  }

  pub fn description(self) -> &'static str {
    match self {
      QualityPlane::Interior => "Pixels within a clump, away from its edge",
      QualityPlane::Background => "Pixels not within any clump",
      QualityPlane::Boundary => "Pixels on the edge of a clump",
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QualityPlanes {
  pub interior: Vec<bool>,
  pub background: Vec<bool>,
  pub boundary: Vec<bool>,
}

impl QualityPlanes {
  pub fn plane(&self, which: QualityPlane) -> &[bool] {
    match which {
      QualityPlane::Interior => &self.interior,
      QualityPlane::Background => &self.background,
      QualityPlane::Boundary => &self.boundary,
    }
  }

  /// Plane set at `offset`, `None` past the end.
  pub fn classify(&self, offset: usize) -> Option<QualityPlane> {
    QualityPlane::ALL
      .into_iter()
      .find(|&which| self.plane(which).get(offset).copied().unwrap_or(false))
  }
}

#[tracing::instrument(skip_all, name = "quality::build_quality_planes")]
pub fn build_quality_planes(presence: &PresenceMask, edges: &EdgeFlags) -> ClumpResult<QualityPlanes> {
  let len = presence.len();
  if edges.len() != len {
    return Err(ClumpError::SizeMismatch {
      what: "edge flags",
      expected: len,
      actual: edges.len(),
    });
  }

  let mut interior = try_filled(len, false, || "interior plane".into())?;
  let mut background = try_filled(len, false, || "background plane".into())?;
  let mut boundary = try_filled(len, false, || "boundary plane".into())?;

  for offset in 0..len {
    match (presence.get(offset), edges.get(offset)) {
      (false, _) => background[offset] = true,
      (true, false) => interior[offset] = true,
      (true, true) => boundary[offset] = true,
    }
  }

  Ok(QualityPlanes {
    interior,
    background,
    boundary,
  })
}

#[cfg(test)]
#[path = "quality_test.rs"]
mod quality_test;
