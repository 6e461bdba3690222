// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Uniform grid broad phase
//!
//! Particles are bucketed by the 2D cell `(floor(x / cell), floor(y / cell))`
//! of their position. The grid is sparse: only occupied cells have an entry.
//! It is fully repopulated once per frame from post-integration positions and
//! is never updated incrementally, so it is only meaningful for the frame it
//! was built in.
//!
//! Queries are conservative. [`SpatialGrid::query_radius`] returns every
//! particle in the block of cells covering the query square, which may include
//! particles farther away than the radius; callers run the exact test.

use crate::error::{Result, SimError};
use crate::particle::Particle;
use glam::Vec3;
use std::collections::HashMap;
use std::ops::RangeInclusive;

/// Default edge length of a grid cell in world units
pub const DEFAULT_CELL_SIZE: f32 = 1.0;

/// Packed 2D cell coordinate
///
/// The x cell occupies the high 32 bits and the y cell the low 32 bits, both
/// as two's-complement words, so negative coordinates round-trip.
///
/// ```
/// use particle_sim::spatial::CellKey;
///
/// let key = CellKey::from_coords(-3, 7);
/// assert_eq!(key.coords(), (-3, 7));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey(u64);

impl CellKey {
    /// Pack a pair of cell coordinates
    pub fn from_coords(cx: i32, cy: i32) -> Self {
        CellKey(((cx as u32 as u64) << 32) | (cy as u32 as u64))
    }

    /// Unpack into `(cx, cy)`
    pub fn coords(&self) -> (i32, i32) {
        ((self.0 >> 32) as u32 as i32, self.0 as u32 as i32)
    }

    /// Raw 64-bit key
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Result of a broad-phase query
///
/// An owned, ascending sequence of particle indices. It is rebuilt for every
/// query and does not track later changes to the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Neighbors {
    indices: Vec<usize>,
}

impl Neighbors {
    /// Number of candidates
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True when the query found nothing
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Candidates as a slice
    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    /// Iterate over candidate indices in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    /// Check membership (binary search, the list is sorted)
    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }
}

impl IntoIterator for Neighbors {
    type Item = usize;
    type IntoIter = std::vec::IntoIter<usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.indices.into_iter()
    }
}

/// Counters reported by [`SpatialGrid::rebuild`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildStats {
    /// Particles placed into a cell
    pub indexed: usize,
    /// Particles left out because a coordinate was NaN or infinite
    pub skipped: usize,
}

/// Sparse uniform grid over particle indices
pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<CellKey, Vec<usize>>,
    indexed: usize,
    source_len: usize,
}

impl SpatialGrid {
    /// Create an empty grid with the given cell size
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` is not positive and finite
    pub fn new(cell_size: f32) -> Self {
        Self::with_capacity(cell_size, 0)
    }

    /// Create an empty grid with room for `cells` occupied cells
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` is not positive and finite
    pub fn with_capacity(cell_size: f32, cells: usize) -> Self {
        assert!(
            cell_size > 0.0 && cell_size.is_finite(),
            "Cell size must be positive and finite"
        );
        SpatialGrid {
            cell_size,
            cells: HashMap::with_capacity(cells),
            indexed: 0,
            source_len: 0,
        }
    }

    /// Build a grid directly from a particle buffer
    pub fn build(cell_size: f32, particles: &[Particle]) -> Self {
        let mut grid = Self::with_capacity(cell_size, particles.len());
        grid.rebuild(particles);
        grid
    }

    /// Edge length of one cell
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Cell containing `position`, or `None` for non-finite coordinates
    pub fn cell_key_for(&self, position: Vec3) -> Option<CellKey> {
        if !position.is_finite() {
            return None;
        }
        let cx = (position.x / self.cell_size).floor() as i32;
        let cy = (position.y / self.cell_size).floor() as i32;
        Some(CellKey::from_coords(cx, cy))
    }

    /// Clear the grid and index every particle by its current position
    ///
    /// Particles with a non-finite coordinate are left out for this frame and
    /// a warning is logged; this is not an error.
    pub fn rebuild(&mut self, particles: &[Particle]) -> RebuildStats {
        self.cells.clear();
        let mut stats = RebuildStats::default();

        for (index, particle) in particles.iter().enumerate() {
            match self.cell_key_for(particle.position) {
                Some(key) => {
                    self.cells.entry(key).or_default().push(index);
                    stats.indexed += 1;
                }
                None => {
                    log::warn!(
                        "Skipping particle {} with non-finite position {:?}",
                        index,
                        particle.position
                    );
                    stats.skipped += 1;
                }
            }
        }

        self.indexed = stats.indexed;
        self.source_len = particles.len();
        log::trace!(
            "Spatial grid rebuilt: {} particles in {} cells",
            stats.indexed,
            self.cells.len()
        );
        stats
    }

    /// Every particle in the cell block around `position`
    ///
    /// The block spans `ceil(radius / cell_size)` cells on each side of the
    /// position's cell, cut off at the edge of the `i32` cell range. The
    /// result is a superset of the particles within `radius`; it is empty for
    /// a non-finite position. Each index appears at most once.
    ///
    /// When the block holds more cells than are occupied, the occupied cells
    /// are scanned instead of probing every block cell.
    pub fn query_radius(&self, position: Vec3, radius: f32) -> Neighbors {
        let Some(center) = self.cell_key_for(position) else {
            return Neighbors::default();
        };
        let (base_x, base_y) = center.coords();
        let reach = i64::from(self.cell_reach(radius));
        let span = |base: i32| {
            let base = i64::from(base);
            let lo = (base - reach).max(i64::from(i32::MIN)) as i32;
            let hi = (base + reach).min(i64::from(i32::MAX)) as i32;
            lo..=hi
        };
        let (xs, ys) = (span(base_x), span(base_y));

        let width =
            |r: &RangeInclusive<i32>| (i64::from(*r.end()) - i64::from(*r.start()) + 1) as u64;
        let block_cells = width(&xs).saturating_mul(width(&ys));

        let mut indices = Vec::with_capacity(27);
        if block_cells > self.cells.len() as u64 {
            for (key, members) in &self.cells {
                let (cx, cy) = key.coords();
                if xs.contains(&cx) && ys.contains(&cy) {
                    indices.extend_from_slice(members);
                }
            }
        } else {
            for cx in xs {
                for cy in ys.clone() {
                    if let Some(members) = self.cells.get(&CellKey::from_coords(cx, cy)) {
                        indices.extend_from_slice(members);
                    }
                }
            }
        }
        indices.sort_unstable();
        Neighbors { indices }
    }

    /// Convenience wrapper querying around a particle's position
    pub fn query_particle(&self, particle: &Particle, radius: f32) -> Neighbors {
        self.query_radius(particle.position, radius)
    }

    /// Members of a single cell
    pub fn cell(&self, key: CellKey) -> Option<&[usize]> {
        self.cells.get(&key).map(Vec::as_slice)
    }

    /// Number of occupied cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of particles placed in the last rebuild
    pub fn indexed_count(&self) -> usize {
        self.indexed
    }

    /// Length of the buffer the grid was last built from
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    /// Fail unless the grid was last rebuilt from a buffer of `len` particles
    pub fn ensure_current(&self, len: usize) -> Result<()> {
        if self.source_len == len {
            Ok(())
        } else {
            Err(SimError::StaleIndex {
                indexed: self.source_len,
                len,
            })
        }
    }

    fn cell_reach(&self, radius: f32) -> i32 {
        let reach = (radius / self.cell_size).ceil();
        if reach.is_finite() && reach > 0.0 {
            reach.min(i32::MAX as f32) as i32
        } else {
            0
        }
    }
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, y: f32) -> Particle {
        Particle::at_rest(Vec3::new(x, y, 0.0))
    }

    #[test]
    fn test_cell_key_round_trip() {
        for &(x, y) in &[(0, 0), (-1, -1), (i32::MIN, i32::MAX), (5, -9), (-7, 3)] {
            assert_eq!(CellKey::from_coords(x, y).coords(), (x, y));
        }
        // Negative y must not bleed into the x word
        assert_ne!(CellKey::from_coords(0, -1), CellKey::from_coords(-1, -1));
    }

    #[test]
    fn test_cell_key_for_negative_positions() {
        let grid = SpatialGrid::default();
        let key = grid.cell_key_for(Vec3::new(-0.5, -1.5, 0.0)).unwrap();
        assert_eq!(key.coords(), (-1, -2));
        assert!(grid.cell_key_for(Vec3::new(f32::NAN, 0.0, 0.0)).is_none());
        assert!(grid.cell_key_for(Vec3::new(0.0, 0.0, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_rebuild_is_sparse_and_counts() {
        let particles = vec![at(0.1, 0.1), at(0.2, 0.9), at(5.5, -3.2)];
        let mut grid = SpatialGrid::default();
        let stats = grid.rebuild(&particles);

        assert_eq!(stats, RebuildStats { indexed: 3, skipped: 0 });
        assert_eq!(grid.cell_count(), 2);
        assert_eq!(grid.cell(CellKey::from_coords(0, 0)), Some(&[0, 1][..]));
        assert_eq!(grid.cell(CellKey::from_coords(5, -4)), Some(&[2][..]));
        assert_eq!(grid.cell(CellKey::from_coords(1, 1)), None);
    }

    #[test]
    fn test_rebuild_replaces_previous_contents() {
        let mut grid = SpatialGrid::default();
        grid.rebuild(&[at(0.5, 0.5), at(3.5, 3.5)]);
        grid.rebuild(&[at(-2.5, 0.5)]);

        assert_eq!(grid.cell_count(), 1);
        assert_eq!(grid.source_len(), 1);
        assert!(grid.cell(CellKey::from_coords(0, 0)).is_none());
    }

    #[test]
    fn test_rebuild_skips_non_finite() {
        let particles = vec![at(0.0, 0.0), at(f32::NAN, 1.0), at(1.0, f32::INFINITY)];
        let mut grid = SpatialGrid::default();
        let stats = grid.rebuild(&particles);

        assert_eq!(stats.indexed, 1);
        assert_eq!(stats.skipped, 2);
        assert_eq!(grid.indexed_count(), 1);
        assert_eq!(grid.source_len(), 3);
    }

    #[test]
    fn test_query_block_extent() {
        // One particle per cell center from -3..=3 on both axes
        let mut particles = Vec::new();
        for x in -3..=3 {
            for y in -3..=3 {
                particles.push(at(x as f32 + 0.5, y as f32 + 0.5));
            }
        }
        let grid = SpatialGrid::build(1.0, &particles);

        // radius 0.6 -> reach 1 -> 3x3 block
        let result = grid.query_radius(Vec3::new(0.5, 0.5, 0.0), 0.6);
        assert_eq!(result.len(), 9);

        // radius 1.5 -> reach 2 -> 5x5 block
        let result = grid.query_radius(Vec3::new(0.5, 0.5, 0.0), 1.5);
        assert_eq!(result.len(), 25);
    }

    #[test]
    fn test_query_is_sorted_and_includes_self() {
        let particles = vec![at(0.9, 0.9), at(0.1, 0.1), at(-0.1, 0.5)];
        let grid = SpatialGrid::build(1.0, &particles);
        let result = grid.query_particle(&particles[1], 0.6);

        assert_eq!(result.as_slice(), &[0, 1, 2]);
        assert!(result.contains(1));
    }

    #[test]
    fn test_query_non_finite_position_is_empty() {
        let grid = SpatialGrid::build(1.0, &[at(0.0, 0.0)]);
        assert!(grid.query_radius(Vec3::new(f32::NAN, 0.0, 0.0), 1.0).is_empty());
    }

    #[test]
    fn test_zero_radius_queries_own_cell() {
        let grid = SpatialGrid::build(1.0, &[at(0.2, 0.2), at(1.2, 0.2)]);
        let result = grid.query_radius(Vec3::new(0.5, 0.5, 0.0), 0.0);
        assert_eq!(result.as_slice(), &[0]);
    }

    #[test]
    #[should_panic(expected = "Cell size must be positive and finite")]
    fn test_zero_cell_size_rejected() {
        SpatialGrid::new(0.0);
    }

    #[test]
    fn test_query_at_cell_range_edge_has_no_duplicates() {
        let particles = vec![at(3e9, 0.0), at(-3e9, -3e9)];
        let grid = SpatialGrid::build(1.0, &particles);

        assert_eq!(grid.query_radius(Vec3::new(3e9, 0.0, 0.0), 2.0).as_slice(), &[0]);
        assert_eq!(grid.query_radius(Vec3::new(-3e9, -3e9, 0.0), 2.0).as_slice(), &[1]);
    }

    #[test]
    fn test_huge_radius_scans_occupied_cells() {
        let particles = vec![at(0.5, 0.5), at(-40.0, 12.0), at(900.0, -700.0), at(3.0, 3.0)];
        let grid = SpatialGrid::build(1.0, &particles);

        let all = grid.query_radius(Vec3::ZERO, 1e4);
        assert_eq!(all.as_slice(), &[0, 1, 2, 3]);

        // Same answer from the occupied-cell scan and the block walk
        let near = grid.query_radius(Vec3::ZERO, 3.5);
        assert_eq!(near.as_slice(), &[0, 3]);
        let mut dense = particles.clone();
        dense.extend((0..200).map(|i| at(100.0 + i as f32, 100.0)));
        let dense_grid = SpatialGrid::build(1.0, &dense);
        assert_eq!(dense_grid.query_radius(Vec3::ZERO, 3.5).as_slice(), &[0, 3]);
    }
}
