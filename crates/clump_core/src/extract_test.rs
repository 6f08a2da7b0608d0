use glam::IVec3;

use super::*;
use crate::bbox::{index_bounding_boxes, label_range};
use crate::test_utils::*;

fn extract_all(grid: &Grid, data: &[f32], labels: &[i32]) -> ClumpCollection<f32> {
  let data = DataArray::new(data);
  let labels = LabelArray::new(labels);
  let table = index_bounding_boxes(grid, &labels, label_range(&labels).unwrap());
  extract_clumps(grid, &data, &labels, &table).unwrap()
}

// =============================================================================
// Batch 1: Sub-volume contents
// =============================================================================

#[test]
fn test_off_label_voxels_are_no_data() {
  let (grid, labels) = labels_2d(&[
    &[1, 1, U, U], //
    &[2, 1, U, U],
  ]);
  let data = ramp(grid.voxel_count());
  let clumps = extract_all(&grid, &data, &labels);

  let clump = clumps.get(1).unwrap();
  assert_eq!(clump.dims(), [2, 2, 1]);
  // Offsets 0, 1 and 5 carry label 1; offset 4 carries label 2.
  assert_eq!(clump.values(), &[Some(1.0), Some(2.0), None, Some(6.0)]);
}

#[test]
fn test_bad_data_inside_clump_stays_no_data() {
  let (grid, labels) = labels_2d(&[&[4, 4, 4]]);
  let data = [1.0, f32::BAD, 3.0];
  let clumps = extract_all(&grid, &data, &labels);

  assert_eq!(clumps.get(4).unwrap().values(), &[Some(1.0), None, Some(3.0)]);
}

#[test]
fn test_subvolume_raw_uses_sentinel() {
  let (grid, labels) = labels_2d(&[&[1, 2, 1]]);
  let data = ramp(3);
  let clumps = extract_all(&grid, &data, &labels);

  assert_eq!(clumps.get(1).unwrap().subvolume_raw(), vec![1.0, f32::BAD, 3.0]);
}

#[test]
fn test_value_at_full_grid_coordinate() {
  let (grid, labels) = labels_2d(&[
    &[U, U, U], //
    &[U, 5, 5],
    &[U, 5, U],
  ]);
  let data = ramp(grid.voxel_count());
  let clumps = extract_all(&grid, &data, &labels);
  let clump = clumps.get(5).unwrap();

  assert_eq!(clump.value_at([1, 1, 0]), Some(5.0));
  assert_eq!(clump.value_at([2, 1, 0]), Some(6.0));
  assert_eq!(clump.value_at([2, 2, 0]), None, "inside box, not in clump");
  assert_eq!(clump.value_at([0, 0, 0]), None, "outside box");
}

#[test]
fn test_iter_voxels_reports_grid_coordinates() {
  let (grid, labels) = labels_2d(&[
    &[U, 3], //
    &[3, U],
  ]);
  let data = ramp(grid.voxel_count());
  let clumps = extract_all(&grid, &data, &labels);

  let voxels: Vec<_> = clumps.get(3).unwrap().iter_voxels().collect();
  assert_eq!(voxels, vec![([1, 0, 0], 2.0), ([0, 1, 0], 3.0)]);
}

// =============================================================================
// Batch 2: Collection ordering
// =============================================================================

#[test]
fn test_empty_labels_are_skipped() {
  let (grid, labels) = labels_2d(&[&[1, 2, U, 4, 5]]);
  let data = ramp(grid.voxel_count());
  let clumps = extract_all(&grid, &data, &labels);

  assert_eq!(clumps.len(), 4);
  assert_eq!(clumps.ids().collect::<Vec<_>>(), vec![1, 2, 4, 5]);
  assert!(clumps.get(3).is_none());
}

#[test]
fn test_collection_is_ascending() {
  let (grid, labels) = labels_2d(&[&[9, 3, 7, 0]]);
  let data = ramp(grid.voxel_count());
  let clumps = extract_all(&grid, &data, &labels);

  assert_eq!(clumps.ids().collect::<Vec<_>>(), vec![0, 3, 7, 9]);
}

#[test]
fn test_from_clumps_sorts_by_id() {
  let bbox = BoundingBox::new(IVec3::ONE, IVec3::ONE);
  let clumps = ClumpCollection::from_clumps(vec![
    Clump::from_values(8, bbox, vec![Some(1.0f32)]).unwrap(),
    Clump::from_values(2, bbox, vec![Some(2.0f32)]).unwrap(),
  ]);

  assert_eq!(clumps.ids().collect::<Vec<_>>(), vec![2, 8]);
}

#[test]
fn test_from_values_checks_length() {
  let bbox = BoundingBox::new(IVec3::ONE, IVec3::new(2, 2, 1));
  let err = Clump::<f32>::from_values(1, bbox, vec![None; 3]).unwrap_err();

  assert_eq!(
    err,
    ClumpError::SizeMismatch {
      what: "clump sub-volume",
      expected: 4,
      actual: 3,
    }
  );
}

#[test]
fn test_from_values_rejects_unaddressable_boxes() {
  let below = BoundingBox::new(IVec3::new(1, -3, 1), IVec3::new(1, 1, 1));
  assert!(matches!(
    Clump::<f32>::from_values(1, below, vec![None; 5]),
    Err(ClumpError::InvalidBounds { axis: 1, lower: -3, upper: 1 })
  ));

  assert!(matches!(
    Clump::<f32>::from_values(1, BoundingBox::empty(), Vec::new()),
    Err(ClumpError::InvalidBounds { axis: 0, .. })
  ));
}

#[test]
fn test_extract_clump_rejects_empty_box() {
  let (grid, labels) = labels_2d(&[&[3, 3]]);
  let data = ramp(grid.voxel_count());

  let err = extract_clump(
    &grid,
    &DataArray::new(&data),
    &LabelArray::new(&labels),
    3,
    BoundingBox::empty(),
  )
  .unwrap_err();

  assert!(matches!(err, ClumpError::InvalidBounds { .. }));
}

#[test]
fn test_bbox_accessor_matches_table() {
  let (grid, labels) = labels_2d(&[&[U, 6, 6]]);
  let clumps = extract_all(&grid, &ramp(grid.voxel_count()), &labels);

  let bbox = clumps.get(6).unwrap().bbox();
  assert_eq!(bbox.lower, IVec3::new(2, 1, 1));
  assert_eq!(bbox.upper, IVec3::new(3, 1, 1));
}

// =============================================================================
// Batch 3: Summary
// =============================================================================

#[test]
fn test_summary() {
  let (grid, labels) = labels_2d(&[
    &[1, 1, U], //
    &[U, 1, 1],
  ]);
  let data = [2.0f32, 6.0, 0.0, 0.0, 5.0, 3.0];
  let clumps = extract_all(&grid, &data, &labels);
  let summary = clumps.get(1).unwrap().summary().unwrap();

  assert_eq!(summary.voxels, 4);
  assert_eq!(summary.sum, 16.0);
  assert_eq!(summary.peak, 6.0);
  assert_eq!(summary.peak_coord, [1, 0, 0]);
  assert_eq!(summary.floor, 2.0);
}

#[test]
fn test_summary_without_data() {
  let bbox = BoundingBox::new(IVec3::ONE, IVec3::new(2, 1, 1));
  let clump = Clump::<f64>::from_values(1, bbox, vec![None, None]).unwrap();

  assert!(clump.summary().is_none());
}
