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
//! Simulation engine
//!
//! [`Simulation`] owns the particle buffer and the spatial grid and holds a
//! shared handle to the optional static geometry. Every call to
//! [`Simulation::step`] runs one frame to completion:
//!
//! ```text
//! integrate -> rebuild grid -> [coulomb] -> particle collisions
//!           -> world bounds -> [static mesh]
//! ```
//!
//! Nothing but the particle buffer carries over between frames; the grid is
//! repopulated from scratch every step.

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::geometry::{MeshOctree, TriangleMesh};
use crate::particle::Particle;
use crate::spatial::SpatialGrid;
use crate::systems::{
    apply_boundaries, apply_coulomb_forces, integrate_motion, resolve_particle_collisions,
    resolve_static_collisions, Kinematics, WallResponse,
};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// What happened during one [`Simulation::step`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepReport {
    /// Timestep actually used (`elapsed * speed_multiplier`)
    pub dt: f32,
    /// Particles placed in the spatial grid
    pub indexed: usize,
    /// Particles left out of the grid for non-finite coordinates
    pub skipped: usize,
    /// Charge interactions applied (zero when the pass is disabled)
    pub coulomb_interactions: usize,
    /// Particle-particle impulses applied
    pub collisions: usize,
    /// Particles touching a world wall after clamping
    pub boundary_contacts: usize,
    /// Particles that bounced off static geometry
    pub mesh_contacts: usize,
}

/// Particle simulation engine
///
/// # Examples
///
/// ```
/// use particle_sim::{Simulation, SimulationConfig};
///
/// let mut sim = Simulation::new(SimulationConfig::new(100).with_seed(42)).unwrap();
/// let report = sim.step(1.0 / 60.0, 1.0).unwrap();
///
/// assert_eq!(sim.particles().len(), 100);
/// assert_eq!(report.indexed, 100);
/// assert!(!sim.has_static_geometry());
/// ```
pub struct Simulation {
    config: SimulationConfig,
    particles: Vec<Particle>,
    grid: SpatialGrid,
    static_geometry: Option<Arc<MeshOctree>>,
    frame: u64,
}

impl Simulation {
    /// Validate `config`, spawn particles and load the optional mesh
    ///
    /// A mesh that cannot be loaded is logged and ignored; only invalid
    /// configuration values make construction fail.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        log::info!(
            "Initializing simulation: {} particles, gravity {}, speed {}, drag {}",
            config.particle_count,
            config.gravity,
            config.initial_speed,
            config.drag_coefficient
        );

        let particles = spawn_particles(&config);
        let static_geometry = config.mesh_path.as_ref().and_then(|path| {
            match TriangleMesh::load_obj(path) {
                Ok(mesh) => Some(Arc::new(MeshOctree::with_settings(mesh, config.octree))),
                Err(e) => {
                    log::warn!("Static collision disabled: {}", e);
                    None
                }
            }
        });

        Ok(Self::assemble(config, particles, static_geometry))
    }

    /// Build around an existing particle buffer
    ///
    /// `config.particle_count`, `seed`, spawn settings and `mesh_path` are
    /// ignored; use [`Simulation::with_static_geometry`] to attach a mesh.
    pub fn from_particles(config: SimulationConfig, particles: Vec<Particle>) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config, particles, None))
    }

    fn assemble(
        mut config: SimulationConfig,
        particles: Vec<Particle>,
        static_geometry: Option<Arc<MeshOctree>>,
    ) -> Self {
        config.particle_count = particles.len();
        let grid = SpatialGrid::with_capacity(config.cell_size, particles.len());
        Simulation {
            config,
            particles,
            grid,
            static_geometry,
            frame: 0,
        }
    }

    /// Attach shared static geometry, builder style
    pub fn with_static_geometry(mut self, octree: Arc<MeshOctree>) -> Self {
        self.static_geometry = Some(octree);
        self
    }

    /// Replace or remove the static geometry
    pub fn set_static_geometry(&mut self, octree: Option<Arc<MeshOctree>>) {
        self.static_geometry = octree;
    }

    /// Advance one frame
    ///
    /// The timestep is `elapsed * speed_multiplier`. Both are expected to be
    /// positive; rejecting other values is the caller's job.
    ///
    /// # Errors
    ///
    /// Fails only on broken internal invariants (a grid index outside the
    /// particle buffer). The particle buffer is unspecified after a failed
    /// step.
    pub fn step(&mut self, elapsed: f32, speed_multiplier: f32) -> Result<StepReport> {
        let dt = elapsed * speed_multiplier;
        let config = &self.config;
        let mut report = StepReport {
            dt,
            ..StepReport::default()
        };

        integrate_motion(
            &mut self.particles,
            dt,
            Kinematics::new(config.gravity, config.drag_coefficient),
        );

        let stats = self.grid.rebuild(&self.particles);
        report.indexed = stats.indexed;
        report.skipped = stats.skipped;

        if config.coulomb.enabled {
            report.coulomb_interactions =
                apply_coulomb_forces(&mut self.particles, &self.grid, &config.coulomb)?;
        }

        report.collisions = resolve_particle_collisions(
            &mut self.particles,
            &self.grid,
            config.particle_radius,
            config.restitution,
        )?;

        report.boundary_contacts = apply_boundaries(
            &mut self.particles,
            &config.bounds,
            WallResponse {
                bounce_factor: config.bounce_factor,
                friction: config.boundary_friction,
            },
        );

        if let Some(octree) = &self.static_geometry {
            report.mesh_contacts = resolve_static_collisions(
                &mut self.particles,
                octree,
                config.mesh_probe_radius,
                config.restitution,
            );
        }

        self.frame += 1;
        log::debug!(
            "Frame {}: dt {:.5}, {} collisions, {} wall contacts, {} mesh contacts, {} skipped",
            self.frame,
            dt,
            report.collisions,
            report.boundary_contacts,
            report.mesh_contacts,
            report.skipped
        );
        Ok(report)
    }

    /// Read-only view of the particle buffer
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of particles
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Configuration in effect
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Grid as built during the last step
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Shared static geometry, if any
    pub fn static_geometry(&self) -> Option<&Arc<MeshOctree>> {
        self.static_geometry.as_ref()
    }

    /// True if static collision is active
    pub fn has_static_geometry(&self) -> bool {
        self.static_geometry.is_some()
    }

    /// Completed steps since construction
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

fn spawn_particles(config: &SimulationConfig) -> Vec<Particle> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let extent = config.spawn_extent;
    let (qmin, qmax) = config.charge_range;

    let particles: Vec<Particle> = (0..config.particle_count)
        .map(|_| {
            let position = Vec3::new(
                rng.random_range(-extent..=extent),
                rng.random_range(-extent..=extent),
                0.0,
            );
            let velocity = Vec3::new(
                rng.random_range(-1.0f32..=1.0) * config.initial_speed,
                rng.random_range(-1.0f32..=1.0) * config.initial_speed,
                0.0,
            );
            let charge = rng.random_range(qmin..=qmax);
            Particle::new(position, velocity, config.particle_mass, charge)
        })
        .collect();

    for (i, p) in particles.iter().take(5).enumerate() {
        log::debug!("Particle {} spawned at ({:.3}, {:.3})", i, p.position.x, p.position.y);
    }
    particles
}
