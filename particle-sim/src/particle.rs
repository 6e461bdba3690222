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
//! Particle records
//!
//! A [`Particle`] is a plain value: position, velocity, mass and charge.
//! The simulation keeps them in a dense `Vec<Particle>` and the array index
//! is the particle's identity for the lifetime of the simulation; the
//! spatial grid stores those indices.
//!
//! # Layout
//!
//! The record is `#[repr(C, align(32))]` and exactly 32 bytes
//! (two `Vec3` of 12 bytes plus two `f32`), so a slice of particles is a
//! densely packed array with every record starting on a 32-byte boundary.
//! No padding lane is stored; 3-component vectors are used throughout.

use glam::Vec3;

/// A single charged point particle
///
/// # Examples
///
/// ```
/// use particle_sim::Particle;
/// use glam::Vec3;
///
/// let p = Particle::new(Vec3::new(1.0, 2.0, 0.0), Vec3::X, 2.0, -1.0);
/// assert_eq!(p.kinetic_energy(), 1.0);
/// assert!(p.is_finite());
/// ```
#[repr(C, align(32))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Position in world units
    pub position: Vec3,
    /// Velocity in world units per second
    pub velocity: Vec3,
    /// Mass; expected to be positive but not enforced
    pub mass: f32,
    /// Charge; may be zero or negative
    pub charge: f32,
}

impl Particle {
    /// Create a particle from its parts
    pub fn new(position: Vec3, velocity: Vec3, mass: f32, charge: f32) -> Self {
        Particle {
            position,
            velocity,
            mass,
            charge,
        }
    }

    /// Unit-mass, uncharged particle at rest at `position`
    pub fn at_rest(position: Vec3) -> Self {
        Particle::new(position, Vec3::ZERO, 1.0, 0.0)
    }

    /// Replace the velocity, builder style
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Replace the charge, builder style
    pub fn with_charge(mut self, charge: f32) -> Self {
        self.charge = charge;
        self
    }

    /// Replace the mass, builder style
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Check if position and velocity are free of NaN and infinity
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }

    /// KE = 0.5 * m * v²
    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.velocity.length_squared()
    }

    /// p = m * v
    pub fn momentum(&self) -> Vec3 {
        self.velocity * self.mass
    }
}

impl Default for Particle {
    fn default() -> Self {
        Particle::at_rest(Vec3::ZERO)
    }
}

/// Sum of kinetic energy over a particle buffer
pub fn total_kinetic_energy(particles: &[Particle]) -> f32 {
    particles.iter().map(Particle::kinetic_energy).sum()
}

/// Sum of momentum over a particle buffer
pub fn total_momentum(particles: &[Particle]) -> Vec3 {
    particles.iter().map(Particle::momentum).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_layout() {
        assert_eq!(std::mem::size_of::<Particle>(), 32);
        assert_eq!(std::mem::align_of::<Particle>(), 32);

        let buffer = vec![Particle::default(); 4];
        for p in &buffer {
            assert_eq!((p as *const Particle as usize) % 32, 0);
        }
    }

    #[test]
    fn test_particle_builders() {
        let p = Particle::at_rest(Vec3::new(1.0, 2.0, 3.0))
            .with_velocity(Vec3::new(0.0, -1.0, 0.0))
            .with_charge(-2.0)
            .with_mass(4.0);
        assert_eq!(p.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(p.velocity.y, -1.0);
        assert_eq!(p.charge, -2.0);
        assert_eq!(p.mass, 4.0);
    }

    #[test]
    fn test_particle_validity() {
        let mut p = Particle::default();
        assert!(p.is_finite());
        p.position.x = f32::NAN;
        assert!(!p.is_finite());

        let mut q = Particle::default();
        q.velocity.z = f32::INFINITY;
        assert!(!q.is_finite());
    }

    #[test]
    fn test_energy_and_momentum_totals() {
        let particles = vec![
            Particle::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), 2.0, 0.0),
            Particle::new(Vec3::ZERO, Vec3::new(-1.0, 0.0, 0.0), 2.0, 0.0),
        ];
        assert_eq!(total_kinetic_energy(&particles), 2.0);
        assert_eq!(total_momentum(&particles), Vec3::ZERO);
    }
}
