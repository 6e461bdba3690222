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
//! World boundary clamping

use crate::config::WorldBounds;
use crate::particle::Particle;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Wall response coefficients
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallResponse {
    /// Fraction of the normal velocity kept after reflection
    pub bounce_factor: f32,
    /// Fraction of the x and z velocity kept while touching a wall
    pub friction: f32,
}

/// Clamp `value` into `[lo, hi]`, reflecting `velocity` on contact
///
/// Returns true if the value was clamped.
#[inline]
fn clamp_axis(value: &mut f32, velocity: &mut f32, lo: f32, hi: f32, bounce: f32) -> bool {
    if *value < lo {
        *value = lo;
    } else if *value > hi {
        *value = hi;
    } else {
        return false;
    }
    *velocity = -*velocity * bounce;
    true
}

/// Keep one particle inside the world box
///
/// Each axis is clamped independently; a clamped axis has its velocity
/// reflected and scaled by the bounce factor. If the particle then lies on
/// any wall, friction scales its x and z velocity, skipping an axis that was
/// just reflected so a wall hit leaves exactly `-v * bounce` on that axis.
///
/// Unlike a planar x/y box, the near/far (z) walls are clamped too, and
/// touching one also triggers the x and z friction.
///
/// Returns true if the particle touches a wall.
pub fn clamp_to_bounds(particle: &mut Particle, bounds: &WorldBounds, response: WallResponse) -> bool {
    let pos = &mut particle.position;
    let vel = &mut particle.velocity;
    let bounce = response.bounce_factor;

    let clamped_x = clamp_axis(&mut pos.x, &mut vel.x, bounds.left, bounds.right, bounce);
    clamp_axis(&mut pos.y, &mut vel.y, bounds.bottom, bounds.top, bounce);
    let clamped_z = clamp_axis(&mut pos.z, &mut vel.z, bounds.near, bounds.far, bounce);

    let touching = pos.x == bounds.left
        || pos.x == bounds.right
        || pos.y == bounds.bottom
        || pos.y == bounds.top
        || pos.z == bounds.near
        || pos.z == bounds.far;

    if touching {
        if !clamped_x {
            vel.x *= response.friction;
        }
        if !clamped_z {
            vel.z *= response.friction;
        }
    }
    touching
}

/// Clamp every particle, returning how many touch a wall
pub fn apply_boundaries(particles: &mut [Particle], bounds: &WorldBounds, response: WallResponse) -> usize {
    let contact = |p: &mut Particle| usize::from(clamp_to_bounds(p, bounds, response));

    #[cfg(feature = "parallel")]
    {
        particles.par_iter_mut().map(contact).sum()
    }

    #[cfg(not(feature = "parallel"))]
    {
        particles.iter_mut().map(contact).sum()
    }
}
