//! Catalogue interface.
//!
//! The catalogue itself (per-clump statistics tables, beam deconvolution,
//! shape outlines) is produced by a collaborator behind [`CatalogWriter`].
//! This module defines the request it receives and the per-clump records it
//! reads from.

use glam::{DAffine3, DVec3, IVec3};

use crate::error::ClumpResult;
use crate::extract::{Clump, ClumpSummary};
use crate::grid::Grid;
use crate::types::Sample;

/// Beam and spectral resolution, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeamParams {
  /// Beam full width at half maximum.
  pub fwhm_beam: f64,
  /// Velocity resolution along the spectral axis.
  pub velocity_resolution: f64,
}

impl Default for BeamParams {
  fn default() -> Self {
    Self {
      fwhm_beam: 2.0,
      velocity_resolution: 2.0,
    }
  }
}

/// Coordinate frame for reported positions.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum CoordinateSystem {
  #[default]
  Pixel,
  /// Pixel to world transform.
  World(DAffine3),
}

impl CoordinateSystem {
  /// Map a pixel position into this frame.
  pub fn apply(&self, pixel: [f64; 3]) -> [f64; 3] {
    match self {
      CoordinateSystem::Pixel => pixel,
      CoordinateSystem::World(transform) => transform.transform_point3(DVec3::from(pixel)).to_array(),
    }
  }

  pub fn is_world(&self) -> bool {
    matches!(self, CoordinateSystem::World(_))
  }
}

/// Outline drawn around each clump in the catalogue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ShapeMode {
  #[default]
  None,
  Polygon,
  Ellipse,
}

/// Options handed to the catalogue collaborator.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogRequest {
  /// Subtract each clump's floor value before weighting the centroid and
  /// sizes. Sum and peak always use the raw values.
  pub subtract_background: bool,
  /// Remove beam smoothing from reported sizes and peak.
  pub deconvolve: bool,
  pub beam: BeamParams,
  pub coordinates: CoordinateSystem,
  pub shape: ShapeMode,
}

impl Default for CatalogRequest {
  fn default() -> Self {
    Self {
      subtract_background: true,
      deconvolve: true,
      beam: BeamParams::default(),
      coordinates: CoordinateSystem::default(),
      shape: ShapeMode::default(),
    }
  }
}

impl CatalogRequest {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_background_subtraction(mut self, subtract: bool) -> Self {
    self.subtract_background = subtract;
    self
  }

  pub fn with_deconvolution(mut self, deconvolve: bool) -> Self {
    self.deconvolve = deconvolve;
    self
  }

  pub fn with_beam(mut self, beam: BeamParams) -> Self {
    self.beam = beam;
    self
  }

  pub fn with_coordinates(mut self, coordinates: CoordinateSystem) -> Self {
    self.coordinates = coordinates;
    self
  }

  pub fn with_shape(mut self, shape: ShapeMode) -> Self {
    self.shape = shape;
    self
  }
}

/// Read-only view of one clump for the catalogue.
#[derive(Clone, Copy, Debug)]
pub struct ClumpRecord<'a, T: Sample> {
  pub id: i32,
  /// Inclusive 1-based grid bounds.
  pub grid_bbox: crate::bbox::BoundingBox,
  /// Inclusive pixel-index bounds.
  pub pixel_lower: [i64; 3],
  pub pixel_upper: [i64; 3],
  /// `None` if the clump holds no valid data.
  pub summary: Option<ClumpSummary>,
  pub clump: &'a Clump<T>,
  pub grid: &'a Grid,
}

impl<'a, T: Sample> ClumpRecord<'a, T> {
  pub fn new(grid: &'a Grid, clump: &'a Clump<T>) -> Self {
    let to_pixel = |pos: IVec3| -> [i64; 3] {
      [
        grid.grid_to_pixel(0, pos.x),
        grid.grid_to_pixel(1, pos.y),
        grid.grid_to_pixel(2, pos.z),
      ]
    };
    Self {
      id: clump.id,
      grid_bbox: *clump.bbox(),
      pixel_lower: to_pixel(clump.bbox().lower),
      pixel_upper: to_pixel(clump.bbox().upper),
      summary: clump.summary(),
      clump,
      grid,
    }
  }

  /// Data-weighted mean pixel position.
  ///
  /// With `subtract_background` each weight is measured above the clump
  /// floor. Falls back to the unweighted mean when the weights sum to zero
  /// or less. `None` for a clump without data.
  pub fn centroid(&self, subtract_background: bool) -> Option<[f64; 3]> {
    let floor = self.weight_floor(subtract_background)?;

    let mut weighted = DVec3::ZERO;
    let mut total = 0.0;
    let mut plain = DVec3::ZERO;
    let mut count = 0usize;

    for (coord, value) in self.clump.iter_voxels() {
      let pixel = DVec3::from(self.pixel_position(coord));
      let weight = value.to_f64() - floor;
      weighted += pixel * weight;
      total += weight;
      plain += pixel;
      count += 1;
    }

    let centroid = if total > 0.0 {
      weighted / total
    } else {
      plain / count as f64
    };
    Some(centroid.to_array())
  }

  /// Data-weighted RMS spread about the centroid along each pixel axis.
  ///
  /// Weights and the zero-weight fallback match [`Self::centroid`]. Padding
  /// axes and single-voxel clumps have size zero.
  pub fn sizes(&self, subtract_background: bool) -> Option<[f64; 3]> {
    let floor = self.weight_floor(subtract_background)?;
    let centroid = DVec3::from(self.centroid(subtract_background)?);

    let mut weighted = DVec3::ZERO;
    let mut total = 0.0;
    let mut plain = DVec3::ZERO;
    let mut count = 0usize;

    for (coord, value) in self.clump.iter_voxels() {
      let offset = DVec3::from(self.pixel_position(coord)) - centroid;
      let spread = offset * offset;
      let weight = value.to_f64() - floor;
      weighted += spread * weight;
      total += weight;
      plain += spread;
      count += 1;
    }

    let variance = if total > 0.0 {
      weighted / total
    } else {
      plain / count as f64
    };
    // Negative raw weights can push a variance below zero.
    Some(variance.max(DVec3::ZERO).to_array().map(f64::sqrt))
  }

  fn weight_floor(&self, subtract_background: bool) -> Option<f64> {
    let summary = self.summary?;
    Some(if subtract_background { summary.floor } else { 0.0 })
  }

  /// Pixel position of a 0-based grid coordinate.
  pub fn pixel_position(&self, coord: [usize; 3]) -> [f64; 3] {
    let pos = crate::bbox::grid_pos(coord);
    [
      self.grid.grid_to_pixel(0, pos.x) as f64,
      self.grid.grid_to_pixel(1, pos.y) as f64,
      self.grid.grid_to_pixel(2, pos.z) as f64,
    ]
  }
}

/// Collaborator producing the clump catalogue.
///
/// Implementations reject incompatible requests with
/// [`ClumpError::ConfigurationConflict`](crate::ClumpError::ConfigurationConflict).
pub trait CatalogWriter<T: Sample> {
  fn write_catalog(&mut self, records: &[ClumpRecord<'_, T>], request: &CatalogRequest) -> ClumpResult<()>;
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod catalog_test;
