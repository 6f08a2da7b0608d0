//! Clump extraction tool.
//!
//! Reads a data grid and a label grid from JSON, extracts one sub-volume per
//! labelled clump, and writes the reconciled assignment, the INTERIOR /
//! BACKGROUND / BOUNDARY quality planes and a clump catalogue back as JSON.

mod config;
mod io;
mod writer;

use anyhow::{Context, Result};
use clap::Parser;
use clump_core::{extract_timed, DataArray, Grid, LabelArray};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::Config;
use io::{InputDocument, OutputDocument};
use writer::JsonCatalogWriter;

/// Label-indexed clump extraction.
#[derive(Parser, Debug)]
#[command(name = "extract_clumps")]
#[command(about = "Extracts labelled clumps and writes quality masks plus a clump catalogue")]
struct Args {
	/// Input JSON with `bounds`, `data` and `labels`.
	#[arg(short, long)]
	input: PathBuf,

	/// Output JSON path.
	#[arg(short, long)]
	output: PathBuf,

	/// Catalogue configuration TOML (defaults apply when omitted).
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Log per-stage detail.
	#[arg(short, long)]
	verbose: bool,
}

fn main() -> Result<()> {
	let args = Args::parse();
	init_tracing(args.verbose)?;

	let config = match &args.config {
		Some(path) => {
			tracing::info!(path = %path.display(), "loading config");
			Config::load(path)?
		}
		None => Config::default(),
	};

	let input = InputDocument::load(&args.input)?;
	let grid = Grid::from_bounds(&input.bounds).context("Invalid grid bounds")?;
	tracing::info!(
		extents = ?grid.extents(),
		voxels = grid.voxel_count(),
		"grid loaded"
	);

	let data = input.raw_data();
	let (output, stats) = extract_timed(
		&grid,
		&DataArray::new(&data),
		&LabelArray::new(&input.labels),
	)
	.context("Clump extraction failed")?;
	tracing::info!(
		clumps = stats.clump_count,
		skipped_ids = stats.missing_ids,
		conflicts = stats.conflicts,
		total_us = stats.total_us,
		"extraction finished"
	);
	tracing::debug!(?stats, "stage timings");

	let mut writer = JsonCatalogWriter::new(config.jsa_catalog);
	output
		.publish(&mut writer, &config.request())
		.context("Catalogue request rejected")?;
	tracing::info!(entries = writer.entries().len(), "catalogue built");

	OutputDocument::new(&output, writer).save(&args.output)?;
	tracing::info!(path = %args.output.display(), "output written");

	Ok(())
}

fn init_tracing(verbose: bool) -> Result<()> {
	let default_level = if verbose { "debug" } else { "info" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(false)
		.try_init()
		.map_err(|err| anyhow::anyhow!("Failed to install log subscriber: {err}"))
}
