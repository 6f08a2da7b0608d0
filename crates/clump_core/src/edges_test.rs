use super::*;
use crate::test_utils::*;

fn presence_of(labels: &[i32]) -> PresenceMask {
  PresenceMask::from_flags(labels.iter().map(|&id| id >= 0).collect())
}

fn edge_grid(grid: &Grid, labels: &[i32]) -> Vec<bool> {
  detect_edges(grid, &presence_of(labels))
    .unwrap()
    .as_slice()
    .to_vec()
}

// =============================================================================
// Batch 1: Small neighborhoods
// =============================================================================

#[test]
fn test_isolated_point_is_edge() {
  let (grid, labels) = labels_2d(&[
    &[U, U, U], //
    &[U, 1, U],
    &[U, U, U],
  ]);
  let edges = edge_grid(&grid, &labels);

  assert_eq!(edges.iter().filter(|&&e| e).count(), 1);
  assert!(edges[4]);
}

#[test]
fn test_single_voxel_grid() {
  let grid = Grid::from_extents(&[1, 1, 1]).unwrap();
  assert_eq!(edge_grid(&grid, &[3]), vec![true]);
}

#[test]
fn test_filled_square_has_one_interior_voxel() {
  let (grid, labels) = labels_2d(&[
    &[2, 2, 2], //
    &[2, 2, 2],
    &[2, 2, 2],
  ]);
  let edges = edge_grid(&grid, &labels);

  let expected: Vec<bool> = (0..9).map(|offset| offset != 4).collect();
  assert_eq!(edges, expected);
}

#[test]
fn test_one_dimensional_run() {
  let (grid, labels) = labels_2d(&[&[U, 1, 1, 1, 1, U]]);
  assert_eq!(
    edge_grid(&grid, &labels),
    vec![false, true, false, false, true, false]
  );
}

#[test]
fn test_absent_voxels_are_never_edges() {
  let (grid, labels) = labels_2d(&[
    &[1, U], //
    &[U, 1],
  ]);
  let edges = edge_grid(&grid, &labels);

  assert!(!edges[1]);
  assert!(!edges[2]);
}

// =============================================================================
// Batch 2: Three dimensions
// =============================================================================

#[test]
fn test_cube_has_single_interior_voxel() {
  let (grid, labels) = solid_cube(3, 0);
  let flags = detect_edges(&grid, &presence_of(&labels)).unwrap();

  assert_eq!(flags.count(), 26);
  assert!(!flags.get(13), "centre of the cube");
}

#[test]
fn test_z_neighbors_are_checked() {
  // Centre of the middle plane has full x/y neighbors but a hole above.
  let full: &[&[i32]] = &[&[5, 5, 5], &[5, 5, 5], &[5, 5, 5]];
  let holed: &[&[i32]] = &[&[5, 5, 5], &[5, U, 5], &[5, 5, 5]];
  let (grid, labels) = labels_3d(&[full, full, holed]);
  let flags = detect_edges(&grid, &presence_of(&labels)).unwrap();

  assert!(flags.get(13));
}

// =============================================================================
// Batch 3: Input checks
// =============================================================================

#[test]
fn test_presence_length_mismatch() {
  let grid = Grid::from_extents(&[4, 4]).unwrap();
  let err = detect_edges(&grid, &PresenceMask::from_flags(vec![true; 15])).unwrap_err();

  assert_eq!(
    err,
    crate::error::ClumpError::SizeMismatch {
      what: "presence mask",
      expected: 16,
      actual: 15,
    }
  );
}
