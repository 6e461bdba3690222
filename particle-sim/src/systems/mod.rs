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
//! Per-frame simulation stages
//!
//! Each stage is a free function over the particle buffer so it can be
//! exercised on its own. [`Simulation`](crate::Simulation) runs them in a
//! fixed order:
//!
//! 1. [`integrate_motion`] (parallel)
//! 2. spatial grid rebuild
//! 3. [`apply_coulomb_forces`] when enabled (deltas computed in parallel)
//! 4. [`resolve_particle_collisions`] (always single-threaded)
//! 5. [`apply_boundaries`] (parallel)
//! 6. [`resolve_static_collisions`] when a mesh is present (parallel)
//!
//! Parallel stages only run under the `parallel` feature and always join
//! before returning.

mod boundary;
mod collision;
mod forces;
mod integration;

pub use boundary::{apply_boundaries, clamp_to_bounds, WallResponse};
pub use collision::{
    particles_overlap, resolve_pair, resolve_particle_collisions, resolve_static_collisions,
};
pub use forces::{apply_coulomb_forces, coulomb_impulse};
pub use integration::{integrate_motion, Kinematics};
