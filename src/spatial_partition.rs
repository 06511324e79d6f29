//! Uniform hash grid for the collision broad phase.
//!
//! Each particle index is bucketed by the cell containing its centre.  A pair
//! query then only visits the surrounding block of cells instead of every other
//! particle, replacing the O(N²) scan with O(N·K) where K is the average number
//! of particles per neighbourhood.
//!
//! ## Cell Size Choice
//!
//! The neighbourhood reach is derived from the query distance, so any positive
//! cell size is correct.  With cells at least one maximum diameter wide
//! (`GRID_CELL_SIZE = 64` for radii up to 30) every query checks a 3×3 block;
//! halving the cell size would widen that to 5×5 and visit more empty buckets.

use bevy::math::Vec2;
use std::collections::HashMap;

/// Grid of particle indices, rebuilt from scratch every tick.
#[derive(Debug, Clone, Default)]
pub struct SpatialGrid {
    cell_size: f32,
    /// Map from cell coordinates to particle indices, in insertion order.
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Compute grid cell coordinates for a world position
    fn world_to_cell(&self, pos: Vec2) -> (i32, i32) {
        let x = (pos.x / self.cell_size).floor() as i32;
        let y = (pos.y / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Insert a particle index at a position. Call after clear() for bulk rebuild.
    pub fn insert(&mut self, index: usize, pos: Vec2) {
        let cell = self.world_to_cell(pos);
        self.cells.entry(cell).or_default().push(index);
    }

    /// Empty every bucket (call before each tick's rebuild).
    ///
    /// Buckets stay in the map with their capacity, so a disk that stays in
    /// the same cell is re-inserted without allocating.
    pub fn clear(&mut self) {
        for v in self.cells.values_mut() {
            v.clear();
        }
    }

    /// Rebuild from a sequence of centre positions; index `i` is the i-th position.
    pub fn rebuild<I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = Vec2>,
    {
        self.clear();
        for (index, pos) in positions.into_iter().enumerate() {
            self.insert(index, pos);
        }
    }

    /// Append every index in cells overlapping the square of half-width
    /// `max_distance` around `pos` to `out`.
    ///
    /// Results include particles outside the circle; callers must do the exact
    /// distance check themselves (the grid is a conservative over-approximation).
    pub fn collect_neighbors(&self, pos: Vec2, max_distance: f32, out: &mut Vec<usize>) {
        let cell = self.world_to_cell(pos);
        let reach = self.radius_in_cells(max_distance);

        for dx in -reach..=reach {
            for dy in -reach..=reach {
                if let Some(indices) = self.cells.get(&(cell.0 + dx, cell.1 + dy)) {
                    out.extend_from_slice(indices);
                }
            }
        }
    }

    /// Candidate pairs `(i, j)` with `i < j` whose centres may lie within
    /// `max_distance` of each other, sorted ascending and free of duplicates.
    pub fn candidate_pairs(&self, positions: &[Vec2], max_distance: f32) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        let mut scratch = Vec::new();
        for (i, &pos) in positions.iter().enumerate() {
            scratch.clear();
            self.collect_neighbors(pos, max_distance, &mut scratch);
            pairs.extend(scratch.iter().filter(|&&j| j > i).map(|&j| (i, j)));
        }
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }

    /// Compute how many cells in each direction we need to check for a given max distance
    fn radius_in_cells(&self, max_distance: f32) -> i32 {
        ((max_distance / self.cell_size).ceil() as i32).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_cell_particles_are_candidates() {
        let mut grid = SpatialGrid::new(10.0);
        let positions = [Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)];
        grid.rebuild(positions);
        assert_eq!(grid.candidate_pairs(&positions, 5.0), vec![(0, 1)]);
    }

    #[test]
    fn adjacent_cells_are_searched() {
        let mut grid = SpatialGrid::new(10.0);
        // Straddling the x = 10 cell boundary.
        let positions = [Vec2::new(9.5, 5.0), Vec2::new(10.5, 5.0)];
        grid.rebuild(positions);
        assert_eq!(grid.candidate_pairs(&positions, 2.0), vec![(0, 1)]);
    }

    #[test]
    fn far_particles_are_pruned() {
        let mut grid = SpatialGrid::new(10.0);
        let positions = [Vec2::new(0.0, 0.0), Vec2::new(500.0, 500.0)];
        grid.rebuild(positions);
        assert!(grid.candidate_pairs(&positions, 20.0).is_empty());
    }

    #[test]
    fn reach_grows_when_cells_are_smaller_than_query() {
        let mut grid = SpatialGrid::new(4.0);
        // 15 apart: three cells away, query distance 16 → reach 4.
        let positions = [Vec2::new(0.5, 0.5), Vec2::new(15.5, 0.5)];
        grid.rebuild(positions);
        assert_eq!(grid.candidate_pairs(&positions, 16.0), vec![(0, 1)]);
    }

    #[test]
    fn negative_coordinates_bucket_correctly() {
        let mut grid = SpatialGrid::new(10.0);
        let positions = [Vec2::new(-0.5, -0.5), Vec2::new(0.5, 0.5)];
        grid.rebuild(positions);
        assert_eq!(grid.candidate_pairs(&positions, 2.0), vec![(0, 1)]);
    }

    #[test]
    fn clear_empties_grid_for_rebuild() {
        let mut grid = SpatialGrid::new(10.0);
        grid.rebuild([Vec2::ZERO, Vec2::ONE]);
        grid.clear();
        let mut out = Vec::new();
        grid.collect_neighbors(Vec2::ZERO, 10.0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn clear_keeps_bucket_capacity() {
        let mut grid = SpatialGrid::new(10.0);
        grid.rebuild([Vec2::ZERO, Vec2::ONE, Vec2::new(2.0, 2.0)]);
        grid.clear();
        assert_eq!(grid.cells.len(), 1);
        let bucket = &grid.cells[&(0, 0)];
        assert!(bucket.is_empty());
        assert!(bucket.capacity() >= 3);

        grid.rebuild([Vec2::new(55.0, 5.0)]);
        let mut out = Vec::new();
        grid.collect_neighbors(Vec2::new(55.0, 5.0), 1.0, &mut out);
        assert_eq!(out, vec![0]);
    }
}
