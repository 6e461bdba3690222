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
//! Integration tests checking the grid is a valid broad phase

use glam::Vec3;
use particle_sim::{Particle, SpatialGrid};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn scatter(count: usize, extent: f32, seed: u64) -> Vec<Particle> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            Particle::at_rest(Vec3::new(
                rng.random_range(-extent..=extent),
                rng.random_range(-extent..=extent),
                0.0,
            ))
        })
        .collect()
}

/// Cell distance between two positions along x and y
fn cell_offset(grid: &SpatialGrid, a: Vec3, b: Vec3) -> (i32, i32) {
    let (ax, ay) = grid.cell_key_for(a).unwrap().coords();
    let (bx, by) = grid.cell_key_for(b).unwrap().coords();
    ((ax - bx).abs(), (ay - by).abs())
}

#[test]
fn test_no_false_negatives() {
    let particles = scatter(2_000, 10.0, 17);
    let grid = SpatialGrid::build(1.0, &particles);

    for radius in [0.3, 0.6, 1.0, 2.5] {
        for (i, p) in particles.iter().enumerate().step_by(7) {
            let found = grid.query_particle(p, radius);
            assert!(found.contains(i));

            for (j, q) in particles.iter().enumerate() {
                if p.position.distance(q.position) <= radius {
                    assert!(found.contains(j), "missed {} near {} at radius {}", j, i, radius);
                }
            }
        }
    }
}

#[test]
fn test_results_within_cell_block() {
    let particles = scatter(1_000, 6.0, 23);

    for cell_size in [0.5, 1.0, 2.0] {
        let grid = SpatialGrid::build(cell_size, &particles);
        for radius in [0.3, 1.0, 3.0] {
            let reach = (radius / cell_size).ceil() as i32;
            for p in particles.iter().step_by(11) {
                for j in grid.query_particle(p, radius) {
                    let (dx, dy) = cell_offset(&grid, p.position, particles[j].position);
                    assert!(dx <= reach && dy <= reach);
                }
            }
        }
    }
}

#[test]
fn test_results_sorted_and_unique() {
    let particles = scatter(500, 3.0, 5);
    let grid = SpatialGrid::build(1.0, &particles);

    let found = grid.query_radius(Vec3::ZERO, 2.0);
    assert!(!found.is_empty());
    assert!(found.as_slice().windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_rebuild_replaces_previous_frame() {
    let mut particles = scatter(100, 4.0, 9);
    let mut grid = SpatialGrid::build(1.0, &particles);
    let before = grid.query_radius(Vec3::new(50.0, 50.0, 0.0), 1.0);
    assert!(before.is_empty());

    for p in particles.iter_mut() {
        p.position += Vec3::new(50.0, 50.0, 0.0);
    }
    let stats = grid.rebuild(&particles);

    assert_eq!(stats.indexed, 100);
    assert_eq!(grid.indexed_count(), 100);
    assert!(grid.query_radius(Vec3::ZERO, 1.0).is_empty());
    assert!(!grid.query_radius(Vec3::new(50.0, 50.0, 0.0), 5.0).is_empty());
}

#[test]
fn test_negative_cells_do_not_alias() {
    let particles = vec![
        Particle::at_rest(Vec3::new(-0.5, 0.5, 0.0)),
        Particle::at_rest(Vec3::new(0.5, -0.5, 0.0)),
        Particle::at_rest(Vec3::new(-0.5, -0.5, 0.0)),
        Particle::at_rest(Vec3::new(0.5, 0.5, 0.0)),
    ];
    let grid = SpatialGrid::build(1.0, &particles);

    assert_eq!(grid.cell_count(), 4);
    for (i, p) in particles.iter().enumerate() {
        assert_eq!(grid.query_particle(p, 0.0).as_slice(), &[i]);
    }
}
