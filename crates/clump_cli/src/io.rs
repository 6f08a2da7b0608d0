//! JSON input and output documents.
//!
//! Input:
//!
//! ```json
//! { "bounds": [[1, 64], [1, 64], [1, 32]],
//!   "data":   [0.1, null, 0.3, ...],
//!   "labels": [-1, 4, 4, ...] }
//! ```
//!
//! `null` data values and negative labels mark voxels with no data and
//! voxels outside every clump.

use anyhow::{Context, Result};
use clump_core::{ExtractionOutput, QualityPlane, Sample, UNASSIGNED};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::writer::{CatalogEntry, CatalogHeader, JsonCatalogWriter};

#[derive(Debug, Deserialize)]
pub struct InputDocument {
	/// Inclusive pixel bounds per axis, fastest varying first.
	pub bounds: Vec<(i64, i64)>,
	pub data: Vec<Option<f64>>,
	pub labels: Vec<i32>,
}

impl InputDocument {
	pub fn load(path: &Path) -> Result<Self> {
		let file = File::open(path)
			.with_context(|| format!("Failed to open input file: {}", path.display()))?;
		serde_json::from_reader(BufReader::new(file))
			.with_context(|| format!("Failed to parse input JSON: {}", path.display()))
	}

	/// Data values with `null` replaced by the bad-value sentinel.
	pub fn raw_data(&self) -> Vec<f64> {
		self.data.iter().map(|v| v.unwrap_or(f64::BAD)).collect()
	}
}

#[derive(Debug, Serialize)]
pub struct PlaneDocument {
	pub name: &'static str,
	pub description: &'static str,
	pub mask: Vec<bool>,
}

#[derive(Debug, Serialize)]
pub struct OutputDocument {
	pub extents: Vec<usize>,
	pub lower_bounds: Vec<i64>,
	/// Clump id per voxel; unassigned voxels carry `unassigned`.
	pub assignment: Vec<i32>,
	pub unassigned: i32,
	pub quality: Vec<PlaneDocument>,
	pub conflicts: usize,
	pub catalog: Option<CatalogHeader>,
	pub clumps: Vec<CatalogEntry>,
}

impl OutputDocument {
	pub fn new<T: Sample>(output: &ExtractionOutput<T>, writer: JsonCatalogWriter) -> Self {
		let (catalog, clumps) = writer.into_parts();
		let quality = QualityPlane::ALL
			.into_iter()
			.map(|plane| PlaneDocument {
				name: plane.name(),
				description: plane.description(),
				mask: output.quality.plane(plane).to_vec(),
			})
			.collect();

		Self {
			extents: output.grid.extents().to_vec(),
			lower_bounds: output.grid.lower_bounds().to_vec(),
			assignment: output.assignment.to_raw(),
			unassigned: UNASSIGNED,
			quality,
			conflicts: output.conflicts,
			catalog,
			clumps,
		}
	}

	pub fn save(&self, path: &Path) -> Result<()> {
		let file = File::create(path)
			.with_context(|| format!("Failed to create output file: {}", path.display()))?;
		let mut writer = BufWriter::new(file);
		serde_json::to_writer_pretty(&mut writer, self)
			.with_context(|| format!("Failed to write output JSON: {}", path.display()))?;
		writer
			.flush()
			.with_context(|| format!("Failed to flush output file: {}", path.display()))
	}
}

#[cfg(test)]
#[path = "io_test.rs"]
mod io_test;
