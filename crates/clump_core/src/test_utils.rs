//! Fixture builders shared by the stage tests.

use crate::grid::Grid;
use crate::types::UNASSIGNED;

/// Shorthand for an unassigned voxel in label fixtures.
pub const U: i32 = UNASSIGNED;

/// 2-D label grid from rows; `rows[y][x]`.
pub fn labels_2d(rows: &[&[i32]]) -> (Grid, Vec<i32>) {
  let width = rows[0].len();
  assert!(rows.iter().all(|row| row.len() == width), "ragged fixture");
  let grid = Grid::from_extents(&[width, rows.len()]).unwrap();
  let labels = rows.iter().flat_map(|row| row.iter().copied()).collect();
  (grid, labels)
}

/// 3-D label grid from planes; `planes[z][y][x]`.
pub fn labels_3d(planes: &[&[&[i32]]]) -> (Grid, Vec<i32>) {
  let height = planes[0].len();
  let width = planes[0][0].len();
  let grid = Grid::from_extents(&[width, height, planes.len()]).unwrap();
  let labels = planes
    .iter()
    .flat_map(|plane| plane.iter().flat_map(|row| row.iter().copied()))
    .collect();
  (grid, labels)
}

/// Data grid whose value at offset n is `n + 1`.
pub fn ramp(len: usize) -> Vec<f32> {
  (0..len).map(|n| n as f32 + 1.0).collect()
}

/// Cube of side `n` where every voxel carries `id`.
pub fn solid_cube(n: usize, id: i32) -> (Grid, Vec<i32>) {
  let grid = Grid::from_extents(&[n, n, n]).unwrap();
  let labels = vec![id; grid.voxel_count()];
  (grid, labels)
}
