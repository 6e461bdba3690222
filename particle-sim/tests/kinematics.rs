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
//! Integration tests for the per-frame motion update

use glam::Vec3;
use particle_sim::{Particle, Simulation, SimulationConfig};

fn still_config() -> SimulationConfig {
    SimulationConfig::new(0).with_gravity(0.0).with_drag(0.0)
}

#[test]
fn test_no_force_step_is_idempotent() {
    let _ = env_logger::builder().is_test(true).try_init();

    // Spread out so nothing overlaps or touches a wall
    let particles: Vec<Particle> = (0..25)
        .map(|i| {
            let x = (i % 5) as f32 * 2.0 - 4.0;
            let y = (i / 5) as f32 * 2.0 - 4.0;
            Particle::at_rest(Vec3::new(x, y, 0.0))
        })
        .collect();
    let before = particles.clone();

    let mut sim = Simulation::from_particles(still_config(), particles).unwrap();
    for _ in 0..50 {
        let report = sim.step(1.0 / 60.0, 1.0).unwrap();
        assert_eq!(report.collisions, 0);
        assert_eq!(report.boundary_contacts, 0);
    }

    assert_eq!(sim.particles(), &before[..]);
}

#[test]
fn test_uniform_gravity_matches_euler() {
    let v0 = 3.0;
    let g = -9.81;
    let dt = 0.001;
    let steps = 200;

    let config = SimulationConfig::new(0).with_gravity(g).with_drag(0.0);
    let particle = Particle::at_rest(Vec3::new(0.0, 0.0, 0.0)).with_velocity(Vec3::new(0.0, v0, 0.0));
    let mut sim = Simulation::from_particles(config, vec![particle]).unwrap();

    for _ in 0..steps {
        sim.step(dt, 1.0).unwrap();
    }

    let expected = v0 + g * steps as f32 * dt;
    let vy = sim.particles()[0].velocity.y;
    assert!((vy - expected).abs() < 1e-4, "vy = {}, expected {}", vy, expected);
}

#[test]
fn test_speed_multiplier_is_equivalent_to_longer_step() {
    let config = SimulationConfig::new(0).with_gravity(-9.81).with_drag(0.0);
    let particle = Particle::at_rest(Vec3::new(1.0, 2.0, 0.0)).with_velocity(Vec3::new(0.5, 0.0, 0.0));

    let mut fast = Simulation::from_particles(config.clone(), vec![particle]).unwrap();
    let mut slow = Simulation::from_particles(config, vec![particle]).unwrap();
    fast.step(0.01, 2.0).unwrap();
    slow.step(0.02, 1.0).unwrap();

    let a = fast.particles()[0];
    let b = slow.particles()[0];
    assert!((a.position - b.position).length() < 1e-6);
    assert!((a.velocity - b.velocity).length() < 1e-6);
}

#[test]
fn test_drag_scales_velocity() {
    let config = SimulationConfig::new(0).with_gravity(0.0).with_drag(0.5);
    let particle = Particle::at_rest(Vec3::ZERO).with_velocity(Vec3::new(2.0, 0.0, 0.0));
    let mut sim = Simulation::from_particles(config, vec![particle]).unwrap();

    sim.step(0.1, 1.0).unwrap();

    let p = sim.particles()[0];
    assert!((p.position.x - 0.2).abs() < 1e-6);
    assert!((p.velocity.x - 2.0 * 0.95).abs() < 1e-6);
}

#[test]
fn test_falling_particles_stay_in_bounds() {
    let config = SimulationConfig::new(300).with_seed(11).with_initial_speed(5.0);
    let mut sim = Simulation::new(config).unwrap();
    let bounds = sim.config().bounds;

    for _ in 0..240 {
        sim.step(1.0 / 60.0, 1.0).unwrap();
    }

    for p in sim.particles() {
        assert!(p.is_finite());
        assert!(p.position.x >= bounds.left && p.position.x <= bounds.right);
        assert!(p.position.y >= bounds.bottom && p.position.y <= bounds.top);
        assert!(p.position.z >= bounds.near && p.position.z <= bounds.far);
    }
}

#[test]
fn test_nan_particle_is_skipped_not_fatal() {
    let particles = vec![
        Particle::at_rest(Vec3::new(f32::NAN, 0.0, 0.0)),
        Particle::at_rest(Vec3::new(1.0, 1.0, 0.0)),
    ];
    let mut sim = Simulation::from_particles(still_config(), particles).unwrap();

    let report = sim.step(0.016, 1.0).unwrap();
    assert_eq!(report.indexed, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(sim.particles()[1].position, Vec3::new(1.0, 1.0, 0.0));
}
