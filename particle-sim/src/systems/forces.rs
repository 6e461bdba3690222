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
//! Pairwise charge repulsion
//!
//! For every particle `i` and every grid neighbor `j != i` within the
//! interaction radius:
//!
//! ```text
//! Δv_i -= k * q_i * q_j / (d² + ε) * n̂      (n̂ points from i to j)
//! ```
//!
//! Like charges push apart, opposite charges pull together. The result is
//! added straight to the velocity: it is neither divided by mass nor scaled by
//! the timestep, unlike gravity and drag.
//!
//! The impulse depends only on positions and charges, so all deltas are
//! computed from a read-only view first and applied afterwards. That is
//! equivalent to applying them immediately and lets the first half run in
//! parallel.

use crate::config::CoulombSettings;
use crate::error::{Result, SimError};
use crate::particle::Particle;
use crate::spatial::SpatialGrid;
use glam::Vec3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Impulse on a particle at `position` with `charge` from one neighbor
///
/// Zero when the particles coincide, since the direction is undefined.
#[inline]
pub fn coulomb_impulse(
    position: Vec3,
    charge: f32,
    other_position: Vec3,
    other_charge: f32,
    settings: &CoulombSettings,
) -> Vec3 {
    let separation = other_position - position;
    let dist_sq = separation.length_squared();
    let magnitude = settings.constant * charge * other_charge / (dist_sq + settings.softening);
    -separation.normalize_or_zero() * magnitude
}

/// Apply charge impulses to every particle
///
/// # Errors
///
/// Returns [`SimError::StaleIndex`] if `grid` was built from a buffer of a
/// different length; no velocity is changed in that case.
///
/// # Returns
///
/// Number of interacting pairs visited (each unordered pair counts twice,
/// once from each side)
pub fn apply_coulomb_forces(
    particles: &mut [Particle],
    grid: &SpatialGrid,
    settings: &CoulombSettings,
) -> Result<usize> {
    grid.ensure_current(particles.len())?;
    let deltas = compute_deltas(particles, grid, settings)?;

    let mut interactions = 0;
    for (particle, (delta, count)) in particles.iter_mut().zip(deltas) {
        particle.velocity += delta;
        interactions += count;
    }
    Ok(interactions)
}

fn impulse_for(
    index: usize,
    particles: &[Particle],
    grid: &SpatialGrid,
    settings: &CoulombSettings,
) -> Result<(Vec3, usize)> {
    let particle = &particles[index];
    let radius_sq = settings.interaction_radius * settings.interaction_radius;
    let mut total = Vec3::ZERO;
    let mut count = 0;

    for j in grid.query_radius(particle.position, settings.interaction_radius) {
        if j == index {
            continue;
        }
        let other = particles.get(j).ok_or(SimError::ParticleIndexOutOfRange {
            index: j,
            len: particles.len(),
        })?;
        if particle.position.distance_squared(other.position) > radius_sq {
            continue;
        }
        total += coulomb_impulse(
            particle.position,
            particle.charge,
            other.position,
            other.charge,
            settings,
        );
        count += 1;
    }
    Ok((total, count))
}

#[cfg(feature = "parallel")]
fn compute_deltas(
    particles: &[Particle],
    grid: &SpatialGrid,
    settings: &CoulombSettings,
) -> Result<Vec<(Vec3, usize)>> {
    (0..particles.len())
        .into_par_iter()
        .map(|i| impulse_for(i, particles, grid, settings))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn compute_deltas(
    particles: &[Particle],
    grid: &SpatialGrid,
    settings: &CoulombSettings,
) -> Result<Vec<(Vec3, usize)>> {
    (0..particles.len())
        .map(|i| impulse_for(i, particles, grid, settings))
        .collect()
}
