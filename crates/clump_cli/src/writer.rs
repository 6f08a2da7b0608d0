//! JSON clump catalogue.
//!
//! One entry per clump with data. Positions are reported in the request's
//! coordinate frame, sizes in pixels. Background subtraction only changes the
//! weights behind centroid and sizes; sum and peak are always taken from the
//! full clump values.
//!
//! Clumps no wider than the beam on some axis are left out whether or not
//! deconvolution is requested. With deconvolution the remaining sizes are
//! reduced in quadrature by the beam width and the peak is raised by the
//! same ratio.

use clump_core::{
	BeamParams, CatalogRequest, CatalogWriter, ClumpError, ClumpRecord, ClumpResult, Sample,
	ShapeMode,
};
use serde::Serialize;

/// Ratio of a Gaussian's FWHM to its standard deviation, `2 sqrt(2 ln 2)`.
const FWHM_TO_SIGMA: f64 = 2.354_820_045_030_949_3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Frame {
	Pixel,
	World,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogHeader {
	pub frame: Frame,
	/// Shape requested in the configuration. Outlines are not drawn, this
	/// only records what was asked for.
	pub requested_shape: &'static str,
	pub jsa_layout: bool,
	pub background_subtracted: bool,
	pub deconvolved: bool,
	pub fwhm_beam: f64,
	pub velocity_resolution: f64,
	/// Clumps left out for being no wider than the beam.
	pub below_beam: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
	pub id: i32,
	/// Inclusive pixel bounds.
	pub pixel_lower: [i64; 3],
	pub pixel_upper: [i64; 3],
	pub voxels: usize,
	/// Floor removed from the centroid and size weights, zero without
	/// background subtraction.
	pub background: f64,
	pub sum: f64,
	/// Largest value, raised by the beam correction when deconvolved.
	pub peak: f64,
	pub peak_position: [f64; 3],
	pub centroid: [f64; 3],
	/// RMS width along each pixel axis, zero on padding axes.
	pub size: [f64; 3],
}

/// Catalogue collaborator writing plain JSON records.
#[derive(Debug, Default)]
pub struct JsonCatalogWriter {
	jsa_catalog: bool,
	header: Option<CatalogHeader>,
	entries: Vec<CatalogEntry>,
}

impl JsonCatalogWriter {
	pub fn new(jsa_catalog: bool) -> Self {
		Self {
			jsa_catalog,
			..Self::default()
		}
	}

	pub fn entries(&self) -> &[CatalogEntry] {
		&self.entries
	}

	pub fn into_parts(self) -> (Option<CatalogHeader>, Vec<CatalogEntry>) {
		(self.header, self.entries)
	}

	fn check_request(&self, request: &CatalogRequest) -> ClumpResult<()> {
		if request.shape != ShapeMode::None && !request.coordinates.is_world() {
			return Err(ClumpError::ConfigurationConflict(
				"clump shapes need a world coordinate transform (set wcs or shape = \"none\")".into(),
			));
		}
		if self.jsa_catalog && request.shape != ShapeMode::Polygon {
			return Err(ClumpError::ConfigurationConflict(
				"jsa_catalog requires shape = \"polygon\"".into(),
			));
		}
		Ok(())
	}
}

impl<T: Sample> CatalogWriter<T> for JsonCatalogWriter {
	fn write_catalog(&mut self, records: &[ClumpRecord<'_, T>], request: &CatalogRequest) -> ClumpResult<()> {
		self.check_request(request)?;

		let mut entries = Vec::with_capacity(records.len());
		let mut below_beam = 0;
		for record in records {
			let (Some(summary), Some(centroid), Some(observed)) = (
				record.summary,
				record.centroid(request.subtract_background),
				record.sizes(request.subtract_background),
			) else {
				tracing::warn!(id = record.id, "clump holds no valid data, left out of catalogue");
				continue;
			};

			let beam = beam_sigmas(record.grid.ndim(), &request.beam);
			if let Some(axis) = (0..3).find(|&axis| beam[axis] > 0.0 && observed[axis] <= beam[axis]) {
				tracing::warn!(
					id = record.id,
					axis,
					size = observed[axis],
					beam = beam[axis],
					"clump no wider than the beam, left out of catalogue"
				);
				below_beam += 1;
				continue;
			}

			let (size, peak) = if request.deconvolve {
				deconvolve(observed, summary.peak, beam)
			} else {
				(observed, summary.peak)
			};
			let background = if request.subtract_background {
				summary.floor
			} else {
				0.0
			};
			let coordinates = &request.coordinates;
			entries.push(CatalogEntry {
				id: record.id,
				pixel_lower: record.pixel_lower,
				pixel_upper: record.pixel_upper,
				voxels: summary.voxels,
				background,
				sum: summary.sum,
				peak,
				peak_position: coordinates.apply(record.pixel_position(summary.peak_coord)),
				centroid: coordinates.apply(centroid),
				size,
			});
		}

		tracing::info!(entries = entries.len(), below_beam, "catalogue written");
		self.header = Some(CatalogHeader {
			frame: if request.coordinates.is_world() {
				Frame::World
			} else {
				Frame::Pixel
			},
			requested_shape: shape_name(request.shape),
			jsa_layout: self.jsa_catalog,
			background_subtracted: request.subtract_background,
			deconvolved: request.deconvolve,
			fwhm_beam: request.beam.fwhm_beam,
			velocity_resolution: request.beam.velocity_resolution,
			below_beam,
		});
		self.entries = entries;
		Ok(())
	}
}

/// Beam standard deviation per pixel axis. The first two significant axes
/// are spatial and the third is spectral; padding axes get zero.
fn beam_sigmas(ndim: usize, beam: &BeamParams) -> [f64; 3] {
	std::array::from_fn(|axis| match axis {
		_ if axis >= ndim => 0.0,
		2 => beam.velocity_resolution / FWHM_TO_SIGMA,
		_ => beam.fwhm_beam / FWHM_TO_SIGMA,
	})
}

/// Remove the beam from each size in quadrature and raise the peak by the
/// ratio of observed to intrinsic width. Sizes must exceed the beam.
fn deconvolve(observed: [f64; 3], peak: f64, beam: [f64; 3]) -> ([f64; 3], f64) {
	let mut size = observed;
	let mut peak = peak;
	for axis in 0..3 {
		if beam[axis] > 0.0 {
			size[axis] = (observed[axis].powi(2) - beam[axis].powi(2)).sqrt();
			peak *= observed[axis] / size[axis];
		}
	}
	(size, peak)
}

fn shape_name(shape: ShapeMode) -> &'static str {
	match shape {
		ShapeMode::None => "none",
		ShapeMode::Polygon => "polygon",
		ShapeMode::Ellipse => "ellipse",
	}
}

#[cfg(test)]
#[path = "writer_test.rs"]
mod writer_test;
