//! Extraction pipeline benchmarks.
//!
//! Label layouts:
//! - **blobs**: spheres scattered on a lattice (typical clump finder output)
//! - **checker**: 2x2x2 blocks alternating labels (many tiny clumps)
//! - **single**: one label covering the whole cube (one huge bounding box)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use clump_core::{
  aggregate::aggregate_clumps,
  bbox::{index_bounding_boxes, label_range},
  extract,
  extract::extract_clumps,
  DataArray, Grid, LabelArray, UNASSIGNED,
};

// =============================================================================
// Synthetic inputs
// =============================================================================

fn cube(side: usize) -> Grid {
  Grid::from_extents(&[side, side, side]).unwrap()
}

fn gaussian_data(side: usize) -> Vec<f32> {
  let c = side as f32 / 2.0;
  let mut data = Vec::with_capacity(side * side * side);
  for z in 0..side {
    for y in 0..side {
      for x in 0..side {
        let d2 = (x as f32 - c).powi(2) + (y as f32 - c).powi(2) + (z as f32 - c).powi(2);
        data.push((-d2 / (side * side) as f32).exp());
      }
    }
  }
  data
}

/// Spheres of radius `spacing / 3` centred on a lattice.
fn blob_labels(side: usize, spacing: usize) -> Vec<i32> {
  let per_axis = side.div_ceil(spacing);
  let r2 = ((spacing / 3) * (spacing / 3)) as isize;
  let half = (spacing / 2) as isize;
  let mut labels = Vec::with_capacity(side * side * side);
  for z in 0..side {
    for y in 0..side {
      for x in 0..side {
        let cell = [x / spacing, y / spacing, z / spacing];
        let d = [x, y, z].map(|v| (v % spacing) as isize - half);
        let inside = d[0] * d[0] + d[1] * d[1] + d[2] * d[2] <= r2;
        labels.push(if inside {
          (cell[0] + per_axis * (cell[1] + per_axis * cell[2])) as i32
        } else {
          UNASSIGNED
        });
      }
    }
  }
  labels
}

fn checker_labels(side: usize) -> Vec<i32> {
  let blocks = side / 2;
  let mut labels = Vec::with_capacity(side * side * side);
  for z in 0..side {
    for y in 0..side {
      for x in 0..side {
        labels.push((x / 2 + blocks * (y / 2 + blocks * (z / 2))) as i32);
      }
    }
  }
  labels
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_full_pipeline(c: &mut Criterion) {
  let mut group = c.benchmark_group("pipeline/full");

  for side in [32usize, 64] {
    let grid = cube(side);
    let data = gaussian_data(side);
    group.throughput(Throughput::Elements(grid.voxel_count() as u64));

    let layouts = [
      ("blobs", blob_labels(side, 8)),
      ("checker", checker_labels(side)),
      ("single", vec![1; grid.voxel_count()]),
    ];

    for (name, labels) in &layouts {
      group.bench_with_input(BenchmarkId::new(*name, side), labels, |b, labels| {
        b.iter(|| {
          extract(
            black_box(&grid),
            &DataArray::new(black_box(&data)),
            &LabelArray::new(black_box(labels)),
          )
        })
      });
    }
  }

  group.finish();
}

fn bench_stages(c: &mut Criterion) {
  let mut group = c.benchmark_group("isolated/stages");
  let side = 64;
  let grid = cube(side);
  let data = gaussian_data(side);
  let labels = blob_labels(side, 8);
  let data_view = DataArray::new(&data);
  let label_view = LabelArray::new(&labels);
  group.throughput(Throughput::Elements(grid.voxel_count() as u64));

  let range = label_range(&label_view).unwrap();
  group.bench_function("bounding_boxes", |b| {
    b.iter(|| index_bounding_boxes(black_box(&grid), black_box(&label_view), range))
  });

  let table = index_bounding_boxes(&grid, &label_view, range);
  group.bench_function("extract", |b| {
    b.iter(|| extract_clumps(black_box(&grid), &data_view, &label_view, &table))
  });

  let clumps = extract_clumps(&grid, &data_view, &label_view, &table).unwrap();
  group.bench_function("aggregate", |b| {
    b.iter(|| aggregate_clumps(black_box(&grid), black_box(&clumps)))
  });

  group.finish();
}

criterion_group!(pipeline, bench_full_pipeline);
criterion_group!(isolated, bench_stages);
criterion_main!(isolated, pipeline);
