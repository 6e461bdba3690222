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
//! # Particle Simulation
//!
//! A real-time particle simulation core: thousands of spheres under gravity
//! and drag, bouncing off each other, the walls of a world box and an
//! optional static triangle mesh.
//!
//! ## Features
//!
//! - **Uniform Grid Broad Phase**: Sparse 2D cell hashing rebuilt every frame
//! - **Restitution Collisions**: Pairwise impulses resolved in a fixed order
//! - **Static Geometry**: OBJ meshes indexed by an octree, shared via `Arc`
//! - **Charge Interaction**: Optional softened Coulomb repulsion
//! - **Parallelization**: Optional Rayon integration for the per-particle stages
//!
//! ## Example
//!
//! ```rust
//! use particle_sim::{Simulation, SimulationConfig};
//!
//! let config = SimulationConfig::new(1_000)
//!     .with_gravity(-9.81)
//!     .with_drag(0.47)
//!     .with_seed(42);
//! let mut sim = Simulation::new(config)?;
//!
//! for _ in 0..10 {
//!     sim.step(1.0 / 60.0, 1.0)?;
//! }
//! assert_eq!(sim.frame(), 10);
//! # Ok::<(), particle_sim::SimError>(())
//! ```

#![warn(missing_docs)]

/// Construction-time configuration
pub mod config;

/// Error types
pub mod error;

/// Triangle meshes and the octree over them
pub mod geometry;

/// Particle state
pub mod particle;

/// Simulation engine
pub mod simulation;

/// Uniform grid broad phase
pub mod spatial;

/// Per-frame simulation stages
pub mod systems;

pub use config::{CoulombSettings, SimulationConfig, WorldBounds};
pub use error::{MeshError, Result, SimError};
pub use geometry::{MeshOctree, TriangleMesh};
pub use particle::Particle;
pub use simulation::{Simulation, StepReport};
pub use spatial::{Neighbors, SpatialGrid};
