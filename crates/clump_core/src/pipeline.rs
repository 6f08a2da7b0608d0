//! Extraction pipeline.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  DataArray + LabelArray (caller-owned, never mutated)                 │
//! └──────────────────────────────────────────────────────────────────────┘
//!                                  │
//!          label_range ──► index_bounding_boxes ──► extract_clumps
//!                                  │
//!          aggregate_clumps ──► detect_edges ──► build_quality_planes
//!                                  │
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  ExtractionOutput { clumps, assignment, presence, edges, quality }   │
//! └──────────────────────────────────────────────────────────────────────┘
//!                                  │ publish()
//!                                  ▼
//!                        CatalogWriter collaborator
//! ```
//!
//! Every stage fully consumes its predecessor's output. Any error aborts the
//! run and nothing is returned besides the error.

use web_time::Instant;

use crate::aggregate::{aggregate_clumps, overlapping_pairs, AssignmentArray, PresenceMask};
use crate::bbox::{index_bounding_boxes, label_range, LabelRange};
use crate::catalog::{CatalogRequest, CatalogWriter, ClumpRecord};
use crate::edges::{detect_edges, EdgeFlags};
use crate::error::ClumpResult;
use crate::extract::{extract_clumps, ClumpCollection};
use crate::grid::Grid;
use crate::quality::{build_quality_planes, QualityPlanes};
use crate::types::{DataArray, LabelArray, Sample};

/// Everything a successful run produces.
#[derive(Clone, Debug)]
pub struct ExtractionOutput<T: Sample> {
  pub grid: Grid,
  pub label_range: LabelRange,
  pub clumps: ClumpCollection<T>,
  pub assignment: AssignmentArray,
  pub presence: PresenceMask,
  pub edges: EdgeFlags,
  pub quality: QualityPlanes,
  /// Voxels claimed by more than one clump.
  pub conflicts: usize,
}

impl<T: Sample> ExtractionOutput<T> {
  /// One catalogue record per clump, ascending id.
  pub fn records(&self) -> Vec<ClumpRecord<'_, T>> {
    self
      .clumps
      .iter()
      .map(|clump| ClumpRecord::new(&self.grid, clump))
      .collect()
  }

  /// Hand the clumps to a catalogue collaborator.
  ///
  /// Errors from the writer are returned unchanged; the output stays valid.
  pub fn publish<W: CatalogWriter<T>>(&self, writer: &mut W, request: &CatalogRequest) -> ClumpResult<()> {
    let _span = tracing::info_span!("publish_catalog", clumps = self.clumps.len()).entered();
    writer.write_catalog(&self.records(), request)
  }
}

/// Per-stage timings and counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
  /// Number of clumps extracted.
  pub clump_count: usize,
  /// Ids inside the label range that no voxel carries.
  pub missing_ids: usize,
  pub conflicts: usize,
  pub range_us: u64,
  pub bbox_us: u64,
  pub extract_us: u64,
  pub aggregate_us: u64,
  pub edges_us: u64,
  pub quality_us: u64,
  /// Total processing time in microseconds.
  pub total_us: u64,
}

/// Run every stage on one data/label pair.
pub fn extract<T: Sample>(
  grid: &Grid,
  data: &DataArray<T>,
  labels: &LabelArray,
) -> ClumpResult<ExtractionOutput<T>> {
  let mut stats = PipelineStats::default();
  run(grid, data, labels, &mut stats)
}

/// Same as [`extract`] but also returns timing stats.
pub fn extract_timed<T: Sample>(
  grid: &Grid,
  data: &DataArray<T>,
  labels: &LabelArray,
) -> ClumpResult<(ExtractionOutput<T>, PipelineStats)> {
  let mut stats = PipelineStats::default();
  let start = Instant::now();
  let output = run(grid, data, labels, &mut stats)?;
  stats.total_us = start.elapsed().as_micros() as u64;
  Ok((output, stats))
}

fn run<T: Sample>(
  grid: &Grid,
  data: &DataArray<T>,
  labels: &LabelArray,
  stats: &mut PipelineStats,
) -> ClumpResult<ExtractionOutput<T>> {
  let _span = tracing::info_span!("extract_clumps_pipeline", voxels = grid.voxel_count()).entered();

  grid.expect_len("data array", data.len())?;
  grid.expect_len("label array", labels.len())?;

  // Stage 1: label range and bounding boxes
  let range = stage("label_range", &mut stats.range_us, || label_range(labels))?;
  let table = stage("bounding_boxes", &mut stats.bbox_us, || {
    index_bounding_boxes(grid, labels, range)
  });
  stats.missing_ids = table.missing_ids();
  if stats.missing_ids > 0 {
    tracing::debug!(missing = stats.missing_ids, "label ids without voxels skipped");
  }

  // Stage 2: extraction
  let clumps = stage("extract", &mut stats.extract_us, || {
    extract_clumps(grid, data, labels, &table)
  })?;
  drop(table);
  stats.clump_count = clumps.len();

  // Stage 3: aggregation
  let aggregation = stage("aggregate", &mut stats.aggregate_us, || {
    aggregate_clumps(grid, &clumps)
  })?;
  stats.conflicts = aggregation.conflicts;
  if aggregation.conflicts > 0 {
    tracing::debug!(pairs = ?overlapping_pairs(&clumps), "clumps with overlapping boxes");
  }

  // Stage 4: edges
  let edges = stage("edges", &mut stats.edges_us, || {
    detect_edges(grid, &aggregation.presence)
  })?;

  // Stage 5: quality planes
  let quality = stage("quality", &mut stats.quality_us, || {
    build_quality_planes(&aggregation.presence, &edges)
  })?;

  tracing::info!(
    clumps = stats.clump_count,
    assigned = aggregation.presence.count(),
    boundary = edges.count(),
    "extraction complete"
  );

  Ok(ExtractionOutput {
    grid: grid.clone(),
    label_range: range,
    clumps,
    assignment: aggregation.assignment,
    presence: aggregation.presence,
    edges,
    quality,
    conflicts: aggregation.conflicts,
  })
}

/// Run one stage inside its own span, recording elapsed microseconds.
fn stage<R>(name: &'static str, elapsed_us: &mut u64, f: impl FnOnce() -> R) -> R {
  let _span = tracing::info_span!("stage", name).entered();
  let start = Instant::now();
  let result = f();
  *elapsed_us = start.elapsed().as_micros() as u64;
  result
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;
