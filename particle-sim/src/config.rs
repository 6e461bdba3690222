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
//! Construction-time configuration
//!
//! Everything here is fixed once a [`Simulation`](crate::Simulation) is
//! built. The only per-frame knob is the speed multiplier passed to
//! [`Simulation::step`](crate::Simulation::step).
//!
//! Defaults describe the reference demo: 26.666 × 20 world box, particles of
//! radius 0.3 spawned in [-8, 8]², gravity -9.81, drag 0.47.

use crate::error::{Result, SimError};
use crate::geometry::{OctreeSettings, MAX_OCTREE_DEPTH};
use crate::spatial::DEFAULT_CELL_SIZE;
use std::path::PathBuf;

/// Default gravitational acceleration along y
pub const DEFAULT_GRAVITY: f32 = -9.81;
/// Default scale applied to the random initial velocities
pub const DEFAULT_INITIAL_SPEED: f32 = 1.0;
/// Default linear drag coefficient
pub const DEFAULT_DRAG: f32 = 0.47;
/// Default particle radius used by particle-particle collision
pub const DEFAULT_PARTICLE_RADIUS: f32 = 0.3;
/// Default velocity retention for particle-particle and mesh impacts
pub const DEFAULT_RESTITUTION: f32 = 0.8;
/// Default velocity retention for wall impacts
pub const DEFAULT_BOUNCE_FACTOR: f32 = 0.8;
/// Default tangential velocity retention while touching a wall
pub const DEFAULT_BOUNDARY_FRICTION: f32 = 0.98;
/// Default radius of the sphere tested against static geometry
pub const DEFAULT_MESH_PROBE_RADIUS: f32 = 0.1;

/// Axis-aligned world box particles are kept inside
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    /// Minimum x
    pub left: f32,
    /// Maximum x
    pub right: f32,
    /// Minimum y
    pub bottom: f32,
    /// Maximum y
    pub top: f32,
    /// Minimum z
    pub near: f32,
    /// Maximum z
    pub far: f32,
}

impl WorldBounds {
    /// Box matching the default 4:3 viewport
    pub const SCREEN: WorldBounds = WorldBounds {
        left: -13.333,
        right: 13.333,
        bottom: -10.0,
        top: 10.0,
        near: -1.0,
        far: 1.0,
    };

    /// Create a box from per-axis ranges
    pub fn new(x: (f32, f32), y: (f32, f32), z: (f32, f32)) -> Self {
        WorldBounds {
            left: x.0,
            right: x.1,
            bottom: y.0,
            top: y.1,
            near: z.0,
            far: z.1,
        }
    }

    /// Check that every axis is a finite, non-empty range
    pub fn validate(&self) -> Result<()> {
        let axes = [
            ("x", self.left, self.right),
            ("y", self.bottom, self.top),
            ("z", self.near, self.far),
        ];
        for (axis, lo, hi) in axes {
            if !lo.is_finite() || !hi.is_finite() || lo >= hi {
                return Err(SimError::InvalidConfig(format!(
                    "world bounds on {} must be finite with min < max, got [{}, {}]",
                    axis, lo, hi
                )));
            }
        }
        Ok(())
    }
}

impl Default for WorldBounds {
    fn default() -> Self {
        WorldBounds::SCREEN
    }
}

/// Pairwise Coulomb-like repulsion between nearby charges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoulombSettings {
    /// Whether the force pass runs at all
    pub enabled: bool,
    /// Scale of `q1 * q2 / d²`
    ///
    /// The default 8.99 is a demo-scale value chosen for unit charges at
    /// screen distances, not the physical Coulomb constant (8.99e9).
    pub constant: f32,
    /// Neighbors farther than this are ignored
    pub interaction_radius: f32,
    /// Added to `d²` to keep the force finite at zero separation
    pub softening: f32,
}

impl Default for CoulombSettings {
    fn default() -> Self {
        CoulombSettings {
            enabled: false,
            constant: 8.99,
            interaction_radius: 5.0,
            softening: 1e-6,
        }
    }
}

impl CoulombSettings {
    /// Enabled with default constants
    pub fn enabled() -> Self {
        CoulombSettings {
            enabled: true,
            ..Self::default()
        }
    }
}

/// Full simulation configuration
///
/// # Examples
///
/// ```
/// use particle_sim::SimulationConfig;
///
/// let config = SimulationConfig::new(500)
///     .with_gravity(-4.0)
///     .with_drag(0.1)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// assert!(SimulationConfig::new(10).with_drag(1.5).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Number of particles to spawn; zero is valid
    pub particle_count: usize,
    /// Acceleration applied to the y velocity component
    pub gravity: f32,
    /// Scale of the random initial velocities
    pub initial_speed: f32,
    /// Linear drag, velocity is scaled by `1 - drag * dt` each frame
    pub drag_coefficient: f32,
    /// OBJ file for static collision; optional
    pub mesh_path: Option<PathBuf>,
    /// RNG seed for spawning; OS entropy when `None`
    pub seed: Option<u64>,
    /// Collision radius of every particle
    pub particle_radius: f32,
    /// Mass given to spawned particles
    pub particle_mass: f32,
    /// Inclusive range spawned charges are drawn from
    pub charge_range: (f32, f32),
    /// Spawned x and y positions lie in `[-spawn_extent, spawn_extent]`
    pub spawn_extent: f32,
    /// Velocity retention for particle-particle and mesh impacts
    pub restitution: f32,
    /// Velocity retention for wall impacts
    pub bounce_factor: f32,
    /// Tangential velocity retention while touching a wall
    pub boundary_friction: f32,
    /// Edge length of a spatial grid cell
    pub cell_size: f32,
    /// Radius of the sphere tested against static geometry
    pub mesh_probe_radius: f32,
    /// World box
    pub bounds: WorldBounds,
    /// Charge interaction pass
    pub coulomb: CoulombSettings,
    /// Static geometry tree limits
    pub octree: OctreeSettings,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            particle_count: 0,
            gravity: DEFAULT_GRAVITY,
            initial_speed: DEFAULT_INITIAL_SPEED,
            drag_coefficient: DEFAULT_DRAG,
            mesh_path: None,
            seed: None,
            particle_radius: DEFAULT_PARTICLE_RADIUS,
            particle_mass: 1.0,
            charge_range: (0.0, 0.0),
            spawn_extent: 8.0,
            restitution: DEFAULT_RESTITUTION,
            bounce_factor: DEFAULT_BOUNCE_FACTOR,
            boundary_friction: DEFAULT_BOUNDARY_FRICTION,
            cell_size: DEFAULT_CELL_SIZE,
            mesh_probe_radius: DEFAULT_MESH_PROBE_RADIUS,
            bounds: WorldBounds::default(),
            coulomb: CoulombSettings::default(),
            octree: OctreeSettings::default(),
        }
    }
}

impl SimulationConfig {
    /// Defaults with the given particle count
    pub fn new(particle_count: usize) -> Self {
        SimulationConfig {
            particle_count,
            ..Self::default()
        }
    }

    /// Set gravity
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the initial speed scale
    pub fn with_initial_speed(mut self, speed: f32) -> Self {
        self.initial_speed = speed;
        self
    }

    /// Set the drag coefficient
    pub fn with_drag(mut self, drag: f32) -> Self {
        self.drag_coefficient = drag;
        self
    }

    /// Load static geometry from an OBJ file
    pub fn with_mesh_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.mesh_path = Some(path.into());
        self
    }

    /// Make spawning reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the particle radius
    pub fn with_particle_radius(mut self, radius: f32) -> Self {
        self.particle_radius = radius;
        self
    }

    /// Set the collision restitution
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    /// Set the wall bounce factor
    pub fn with_bounce_factor(mut self, bounce: f32) -> Self {
        self.bounce_factor = bounce;
        self
    }

    /// Set the inclusive range spawned charges are drawn from
    pub fn with_charge_range(mut self, min: f32, max: f32) -> Self {
        self.charge_range = (min, max);
        self
    }

    /// Replace the world box
    pub fn with_bounds(mut self, bounds: WorldBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Replace the Coulomb pass settings
    pub fn with_coulomb(mut self, coulomb: CoulombSettings) -> Self {
        self.coulomb = coulomb;
        self
    }

    /// Check every value against its domain
    ///
    /// Mass is not checked; non-positive masses only affect
    /// the energy diagnostics.
    pub fn validate(&self) -> Result<()> {
        fn finite(name: &str, value: f32) -> Result<()> {
            if value.is_finite() {
                Ok(())
            } else {
                Err(SimError::InvalidConfig(format!("{} must be finite, got {}", name, value)))
            }
        }
        fn unit(name: &str, value: f32) -> Result<()> {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(SimError::InvalidConfig(format!("{} must be in [0, 1], got {}", name, value)))
            }
        }
        fn positive(name: &str, value: f32) -> Result<()> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(SimError::InvalidConfig(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )))
            }
        }

        finite("gravity", self.gravity)?;
        finite("initial_speed", self.initial_speed)?;
        finite("particle_mass", self.particle_mass)?;
        unit("drag_coefficient", self.drag_coefficient)?;
        unit("restitution", self.restitution)?;
        unit("bounce_factor", self.bounce_factor)?;
        unit("boundary_friction", self.boundary_friction)?;
        positive("particle_radius", self.particle_radius)?;
        positive("cell_size", self.cell_size)?;
        positive("mesh_probe_radius", self.mesh_probe_radius)?;

        if !(self.spawn_extent >= 0.0 && self.spawn_extent.is_finite()) {
            return Err(SimError::InvalidConfig(format!(
                "spawn_extent must be non-negative and finite, got {}",
                self.spawn_extent
            )));
        }

        let (qmin, qmax) = self.charge_range;
        if !qmin.is_finite() || !qmax.is_finite() || qmin > qmax {
            return Err(SimError::InvalidConfig(format!(
                "charge_range must be finite with min <= max, got ({}, {})",
                qmin, qmax
            )));
        }

        if self.octree.max_depth > MAX_OCTREE_DEPTH || self.octree.max_triangles_per_leaf == 0 {
            return Err(SimError::InvalidConfig(format!(
                "octree needs max_depth <= {} and max_triangles_per_leaf >= 1, got {} and {}",
                MAX_OCTREE_DEPTH, self.octree.max_depth, self.octree.max_triangles_per_leaf
            )));
        }

        if self.coulomb.enabled {
            finite("coulomb.constant", self.coulomb.constant)?;
            positive("coulomb.interaction_radius", self.coulomb.interaction_radius)?;
            positive("coulomb.softening", self.coulomb.softening)?;
        }

        self.bounds.validate()
    }
}
