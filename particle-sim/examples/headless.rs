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
//! Headless particle simulation
//!
//! Runs the simulation without a renderer and prints energy and contact
//! counts at regular intervals.
//!
//! # Running
//!
//! ```bash
//! # 2000 particles for 600 frames
//! cargo run --example headless --release
//!
//! # Custom parameters with log output
//! RUST_LOG=debug cargo run --example headless --release -- --particles 500 --frames 120
//!
//! # Static collision against an OBJ mesh, charges enabled
//! cargo run --example headless --release -- --mesh assets/bunny.obj --charges
//! ```

use particle_sim::particle::{total_kinetic_energy, total_momentum};
use particle_sim::{CoulombSettings, Simulation, SimulationConfig, StepReport};
use std::str::FromStr;
use std::time::Instant;

struct DemoConfig {
    particles: usize,
    frames: usize,
    timestep: f32,
    speed: f32,
    gravity: f32,
    drag: f32,
    seed: u64,
    mesh: Option<String>,
    charges: bool,
    report_every: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        DemoConfig {
            particles: 2000,
            frames: 600,
            timestep: 1.0 / 60.0,
            speed: 1.0,
            gravity: -9.81,
            drag: 0.47,
            seed: 12345,
            mesh: None,
            charges: false,
            report_every: 60,
        }
    }
}

/// Parse the value following `flag`, falling back to `default` on bad input
fn parse_value<T: FromStr + Copy + std::fmt::Display>(args: &[String], i: usize, flag: &str, default: T) -> T {
    match args.get(i + 1) {
        Some(raw) => raw.parse::<T>().unwrap_or_else(|_| {
            eprintln!("Warning: Invalid {} '{}', using default {}", flag, raw, default);
            default
        }),
        None => {
            eprintln!("Error: {} requires an argument", flag);
            std::process::exit(1);
        }
    }
}

fn parse_args() -> DemoConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = DemoConfig::default();
    let defaults = DemoConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--particles" => {
                config.particles = parse_value(&args, i, "--particles", defaults.particles);
                i += 2;
            }
            "--frames" => {
                config.frames = parse_value(&args, i, "--frames", defaults.frames);
                i += 2;
            }
            "--timestep" => {
                config.timestep = parse_value(&args, i, "--timestep", defaults.timestep);
                i += 2;
            }
            "--speed" => {
                config.speed = parse_value(&args, i, "--speed", defaults.speed);
                i += 2;
            }
            "--gravity" => {
                config.gravity = parse_value(&args, i, "--gravity", defaults.gravity);
                i += 2;
            }
            "--drag" => {
                config.drag = parse_value(&args, i, "--drag", defaults.drag);
                i += 2;
            }
            "--seed" => {
                config.seed = parse_value(&args, i, "--seed", defaults.seed);
                i += 2;
            }
            "--report-every" => {
                config.report_every = parse_value(&args, i, "--report-every", defaults.report_every).max(1);
                i += 2;
            }
            "--mesh" => {
                match args.get(i + 1) {
                    Some(path) => config.mesh = Some(path.clone()),
                    None => {
                        eprintln!("Error: --mesh requires an argument");
                        std::process::exit(1);
                    }
                }
                i += 2;
            }
            "--charges" => {
                config.charges = true;
                i += 1;
            }
            _ => {
                i += 1;
            }
        }
    }

    if config.timestep <= 0.0 || config.speed <= 0.0 {
        eprintln!("Error: --timestep and --speed must be positive");
        std::process::exit(1);
    }
    config
}

fn main() {
    env_logger::init();

    println!("==========================================================");
    println!("           Headless Particle Simulation");
    println!("==========================================================");
    println!();

    let demo = parse_args();

    let mut config = SimulationConfig::new(demo.particles)
        .with_gravity(demo.gravity)
        .with_drag(demo.drag)
        .with_seed(demo.seed);
    if let Some(mesh) = &demo.mesh {
        config = config.with_mesh_path(mesh);
    }
    if demo.charges {
        config = config
            .with_charge_range(-1.0, 1.0)
            .with_coulomb(CoulombSettings::enabled());
    }

    println!("Simulation Configuration:");
    println!("  Particles: {}", demo.particles);
    println!("  Frames: {}", demo.frames);
    println!("  Timestep: {:.4} s (x{:.2})", demo.timestep, demo.speed);
    println!("  Gravity: {:.2}", demo.gravity);
    println!("  Drag: {:.2}", demo.drag);
    println!("  Mesh: {}", demo.mesh.as_deref().unwrap_or("none"));
    println!("  Charges: {}", if demo.charges { "on" } else { "off" });
    println!("  Random seed: {}", demo.seed);
    println!();

    let mut sim = match Simulation::new(config) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if demo.mesh.is_some() && !sim.has_static_geometry() {
        println!("Mesh could not be loaded, continuing without static collision");
        println!();
    }

    let mut totals = StepReport::default();
    let start = Instant::now();

    println!("{:>8} {:>14} {:>12} {:>10} {:>8} {:>8}", "frame", "kinetic", "|momentum|", "collisions", "walls", "mesh");
    for frame in 1..=demo.frames {
        let report = match sim.step(demo.timestep, demo.speed) {
            Ok(report) => report,
            Err(e) => {
                eprintln!("Error: step {} failed: {}", frame, e);
                std::process::exit(1);
            }
        };
        totals.collisions += report.collisions;
        totals.boundary_contacts += report.boundary_contacts;
        totals.mesh_contacts += report.mesh_contacts;
        totals.skipped += report.skipped;

        if frame % demo.report_every == 0 || frame == demo.frames {
            println!(
                "{:>8} {:>14.4} {:>12.4} {:>10} {:>8} {:>8}",
                frame,
                total_kinetic_energy(sim.particles()),
                total_momentum(sim.particles()).length(),
                report.collisions,
                report.boundary_contacts,
                report.mesh_contacts
            );
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("Summary:");
    println!("  Frames: {}", sim.frame());
    println!("  Wall time: {:.3} s ({:.3} ms/frame)", elapsed.as_secs_f64(), elapsed.as_secs_f64() * 1e3 / demo.frames.max(1) as f64);
    println!("  Particle collisions: {}", totals.collisions);
    println!("  Wall contacts: {}", totals.boundary_contacts);
    println!("  Mesh contacts: {}", totals.mesh_contacts);
    println!("  Skipped (non-finite): {}", totals.skipped);
}
