//! Catalogue options read from a TOML file.

use anyhow::{Context, Result};
use clump_core::{BeamParams, CatalogRequest, CoordinateSystem, ShapeMode};
use glam::{DAffine3, DMat3, DVec3};
use serde::Deserialize;
use std::path::Path;

/// Root configuration.
///
/// Every key is optional; an empty file yields the library defaults.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
	/// Subtract each clump's minimum value before computing statistics.
	#[serde(default = "default_true")]
	pub backoff: bool,
	/// Remove beam smoothing from reported clump sizes.
	#[serde(default = "default_true")]
	pub deconv: bool,
	/// Beam FWHM in pixels.
	#[serde(default = "default_resolution")]
	pub fwhm_beam: f64,
	/// Velocity resolution in pixels.
	#[serde(default = "default_resolution")]
	pub velocity_resolution: f64,
	/// Pixel to world transform as three rows of `[a, b, c, offset]`.
	/// Positions are reported in pixel coordinates when absent.
	pub wcs: Option<[[f64; 4]; 3]>,
	/// Outline drawn around each clump.
	#[serde(default)]
	pub shape: ShapeConfig,
	/// Emit the catalogue in JSA layout (polygon outlines only).
	#[serde(default)]
	pub jsa_catalog: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeConfig {
	#[default]
	None,
	Polygon,
	Ellipse,
}

fn default_true() -> bool {
	true
}

fn default_resolution() -> f64 {
	BeamParams::default().fwhm_beam
}

impl Default for Config {
	fn default() -> Self {
		Self {
			backoff: true,
			deconv: true,
			fwhm_beam: default_resolution(),
			velocity_resolution: default_resolution(),
			wcs: None,
			shape: ShapeConfig::None,
			jsa_catalog: false,
		}
	}
}

impl Config {
	/// Load configuration from a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read config file: {}", path.display()))?;
		Self::parse(&content)
	}

	/// Parse and validate TOML text.
	pub fn parse(content: &str) -> Result<Self> {
		let config: Config =
			toml::from_str(content).with_context(|| "Failed to parse config TOML")?;

		if !(config.fwhm_beam > 0.0) {
			anyhow::bail!("fwhm_beam must be positive, got {}", config.fwhm_beam);
		}
		if !(config.velocity_resolution > 0.0) {
			anyhow::bail!(
				"velocity_resolution must be positive, got {}",
				config.velocity_resolution
			);
		}
		if let Some(rows) = &config.wcs {
			if rows.iter().flatten().any(|v| !v.is_finite()) {
				anyhow::bail!("wcs entries must be finite numbers");
			}
			if transform_from_rows(rows).matrix3.determinant() == 0.0 {
				anyhow::bail!("wcs transform is singular");
			}
		}

		Ok(config)
	}

	/// Request handed to the catalogue writer.
	pub fn request(&self) -> CatalogRequest {
		let coordinates = match &self.wcs {
			Some(rows) => CoordinateSystem::World(transform_from_rows(rows)),
			None => CoordinateSystem::Pixel,
		};
		CatalogRequest::new()
			.with_background_subtraction(self.backoff)
			.with_deconvolution(self.deconv)
			.with_beam(BeamParams {
				fwhm_beam: self.fwhm_beam,
				velocity_resolution: self.velocity_resolution,
			})
			.with_coordinates(coordinates)
			.with_shape(self.shape.into())
	}
}

impl From<ShapeConfig> for ShapeMode {
	fn from(shape: ShapeConfig) -> Self {
		match shape {
			ShapeConfig::None => ShapeMode::None,
			ShapeConfig::Polygon => ShapeMode::Polygon,
			ShapeConfig::Ellipse => ShapeMode::Ellipse,
		}
	}
}

fn transform_from_rows(rows: &[[f64; 4]; 3]) -> DAffine3 {
	let col = |j: usize| DVec3::new(rows[0][j], rows[1][j], rows[2][j]);
	DAffine3 {
		matrix3: DMat3::from_cols(col(0), col(1), col(2)),
		translation: col(3),
	}
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
