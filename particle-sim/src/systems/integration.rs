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
//! Explicit Euler integration
//!
//! One step per frame, per particle:
//!
//! ```text
//! v.y += g * dt
//! x   += v * dt
//! v   *= 1 - drag * dt
//! ```
//!
//! This is not symplectic and not sub-stepped. Later stages (grid rebuild,
//! collisions, walls) assume they see the positions produced by exactly one
//! such step. NaN and infinity are not checked here; the spatial grid skips
//! non-finite particles.

use crate::particle::Particle;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Per-frame kinematic constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    /// Acceleration on the y axis
    pub gravity: f32,
    /// Linear drag coefficient
    pub drag_coefficient: f32,
}

impl Kinematics {
    /// Bundle gravity and drag
    pub fn new(gravity: f32, drag_coefficient: f32) -> Self {
        Kinematics {
            gravity,
            drag_coefficient,
        }
    }

    /// Advance a single particle by `dt`
    #[inline]
    pub fn advance(&self, particle: &mut Particle, dt: f32) {
        particle.velocity.y += self.gravity * dt;
        particle.position += particle.velocity * dt;
        particle.velocity *= 1.0 - self.drag_coefficient * dt;
    }
}

/// Advance every particle by `dt`
///
/// With the `parallel` feature the buffer is split across rayon's pool; the
/// call returns only after every particle is done, so the caller can rebuild
/// the spatial grid immediately afterwards.
///
/// # Returns
///
/// Number of particles advanced
pub fn integrate_motion(particles: &mut [Particle], dt: f32, kinematics: Kinematics) -> usize {
    #[cfg(feature = "parallel")]
    {
        particles
            .par_iter_mut()
            .for_each(|p| kinematics.advance(p, dt));
    }

    #[cfg(not(feature = "parallel"))]
    {
        for p in particles.iter_mut() {
            kinematics.advance(p, dt);
        }
    }

    particles.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_gravity_only_touches_y() {
        let mut p = Particle::at_rest(Vec3::ZERO).with_velocity(Vec3::new(1.0, 0.0, 2.0));
        Kinematics::new(-10.0, 0.0).advance(&mut p, 0.1);

        assert_eq!(p.velocity.x, 1.0);
        assert_eq!(p.velocity.z, 2.0);
        assert!((p.velocity.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_position_uses_updated_velocity() {
        // v' = 0 + (-10)(0.1) = -1, x' = 0 + (-1)(0.1) = -0.1
        let mut p = Particle::at_rest(Vec3::ZERO);
        Kinematics::new(-10.0, 0.0).advance(&mut p, 0.1);
        assert!((p.position.y + 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_drag_applied_after_position() {
        let mut p = Particle::at_rest(Vec3::ZERO).with_velocity(Vec3::new(2.0, 0.0, 0.0));
        Kinematics::new(0.0, 0.5).advance(&mut p, 0.1);

        // Position advanced with the undamped velocity
        assert!((p.position.x - 0.2).abs() < 1e-6);
        // Velocity scaled by 1 - 0.5 * 0.1
        assert!((p.velocity.x - 1.9).abs() < 1e-6);
    }

    #[test]
    fn test_integrate_motion_counts() {
        let mut particles = vec![Particle::default(); 17];
        assert_eq!(integrate_motion(&mut particles, 0.01, Kinematics::new(-9.81, 0.47)), 17);
        assert!(particles.iter().all(|p| p.velocity.y < 0.0));
        assert_eq!(integrate_motion(&mut [], 0.01, Kinematics::new(-9.81, 0.47)), 0);
    }

    #[test]
    fn test_nan_propagates_silently() {
        let mut particles = vec![Particle::at_rest(Vec3::new(f32::NAN, 0.0, 0.0))];
        integrate_motion(&mut particles, 0.01, Kinematics::new(-9.81, 0.0));
        assert!(particles[0].position.x.is_nan());
        assert!(particles[0].velocity.y.is_finite());
    }
}
