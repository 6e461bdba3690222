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
//! Particle-particle and particle-mesh collision response
//!
//! # Particle pairs
//!
//! The grid is queried with radius `2r`. Each unordered pair `(i, j)` with
//! `i < j` is tested once, in ascending `i` then ascending `j`. Overlapping
//! pairs that are approaching along the contact normal receive equal and
//! opposite impulses:
//!
//! ```text
//! n̂   = normalize(x_j - x_i)
//! rel = (v_j - v_i) · n̂          resolve only if rel < 0
//! J   = -rel * (1 + e) / 2
//! v_i -= J n̂,  v_j += J n̂
//! ```
//!
//! Velocities are updated in place, so a particle touching several others
//! sees the result of earlier pairs. Ascending index order makes that
//! deterministic. Overlap is not corrected; particles may interpenetrate.
//!
//! # Static mesh
//!
//! A particle whose probe sphere touches the mesh has its velocity reversed
//! and scaled by the restitution.

use crate::error::{Result, SimError};
use crate::geometry::MeshOctree;
use crate::particle::Particle;
use crate::spatial::SpatialGrid;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Exact narrow-phase test: centers closer than two radii
#[inline]
pub fn particles_overlap(a: &Particle, b: &Particle, radius: f32) -> bool {
    let reach = 2.0 * radius;
    a.position.distance_squared(b.position) < reach * reach
}

/// Apply the restitution impulse to an overlapping pair
///
/// Returns `true` if an impulse was applied. Pairs that are separating or
/// at rest relative to each other are left alone, as are exactly coincident
/// pairs (no contact normal exists).
pub fn resolve_pair(a: &mut Particle, b: &mut Particle, restitution: f32) -> bool {
    let Some(normal) = (b.position - a.position).try_normalize() else {
        log::debug!("Skipping coincident particle pair at {:?}", a.position);
        return false;
    };

    let relative_speed = (b.velocity - a.velocity).dot(normal);
    if relative_speed >= 0.0 {
        return false;
    }

    let impulse = normal * (-relative_speed * (1.0 + restitution) * 0.5);
    a.velocity -= impulse;
    b.velocity += impulse;
    true
}

/// Mutable references to two distinct particles, `i < j`
fn pair_mut(particles: &mut [Particle], i: usize, j: usize) -> Result<(&mut Particle, &mut Particle)> {
    debug_assert!(i < j, "pair indices must be ascending");
    let len = particles.len();
    if j >= len {
        return Err(SimError::ParticleIndexOutOfRange { index: j, len });
    }
    let (head, tail) = particles.split_at_mut(j);
    Ok((&mut head[i], &mut tail[0]))
}

/// Resolve all particle-particle contacts for this frame
///
/// Runs on the calling thread: each pair writes two particles, so pairs
/// sharing a particle must not be processed concurrently.
///
/// # Errors
///
/// Returns [`SimError::StaleIndex`] before touching any particle if `grid`
/// was built from a buffer of a different length. An index outside
/// `particles` yields [`SimError::ParticleIndexOutOfRange`] instead of a
/// panic.
///
/// # Returns
///
/// Number of impulses applied
pub fn resolve_particle_collisions(
    particles: &mut [Particle],
    grid: &SpatialGrid,
    radius: f32,
    restitution: f32,
) -> Result<usize> {
    grid.ensure_current(particles.len())?;
    let mut resolved = 0;

    for i in 0..particles.len() {
        let neighbors = grid.query_particle(&particles[i], 2.0 * radius);
        for j in neighbors {
            if j <= i {
                continue;
            }
            let (a, b) = pair_mut(particles, i, j)?;
            if particles_overlap(a, b, radius) && resolve_pair(a, b, restitution) {
                resolved += 1;
            }
        }
    }

    Ok(resolved)
}

/// Bounce particles off static geometry
///
/// The octree is read-only, so with the `parallel` feature particles are
/// processed concurrently.
///
/// # Returns
///
/// Number of particles that hit the mesh
pub fn resolve_static_collisions(
    particles: &mut [Particle],
    octree: &MeshOctree,
    probe_radius: f32,
    restitution: f32,
) -> usize {
    let bounce = |p: &mut Particle| -> usize {
        if octree.check_collision(p.position, probe_radius) {
            p.velocity = -p.velocity * restitution;
            1
        } else {
            0
        }
    };

    #[cfg(feature = "parallel")]
    {
        particles.par_iter_mut().map(bounce).sum()
    }

    #[cfg(not(feature = "parallel"))]
    {
        particles.iter_mut().map(bounce).sum()
    }
}
