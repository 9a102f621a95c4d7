use std::fs;

use approx::assert_relative_eq;
use gsim::kernel::{G, SOFTENING_SQUARED};
use gsim::{DegeneratePolicy, Particle, ParticleStore, Simulation, SimulationConfig};
use tempfile::TempDir;

fn test_config(dir: &TempDir, particles: usize, steps: usize) -> SimulationConfig {
    SimulationConfig {
        particles,
        steps,
        dt: 0.1,
        sample_freq: 1,
        output: dir.path().join("exec_info.txt"),
        threads: 4,
        ..Default::default()
    }
}

/// Particle 0 at the origin drifting along x, particle 1 at (1, 2, 2), distance 3.
fn fixed_pair() -> Vec<Particle> {
    vec![
        Particle::new([0.0, 0.0, 0.0], [0.01, 0.0, 0.0], 2.0),
        Particle::new([1.0, 2.0, 2.0], [0.0, 0.0, 0.0], 3.0),
    ]
}

fn kinetic_energy(particles: &[Particle]) -> f64 {
    particles.iter().fold(0.0, |ke, p| {
        let v2 = p.vel[0] * p.vel[0] + p.vel[1] * p.vel[1] + p.vel[2] * p.vel[2];
        ke + 0.5 * p.mass * v2
    })
}

fn all_finite(p: &Particle) -> bool {
    p.pos
        .iter()
        .chain(&p.vel)
        .chain(&p.acc)
        .all(|c| c.is_finite())
        && p.mass.is_finite()
}

fn inv_cubed(r2: f64) -> f64 {
    let inv = 1.0 / (r2 + SOFTENING_SQUARED).sqrt();
    inv * inv * inv
}

#[test]
fn identical_configs_seed_identically() {
    let dir = TempDir::new().unwrap();
    let a = Simulation::new(test_config(&dir, 200, 1)).unwrap();
    let b = Simulation::new(test_config(&dir, 200, 1)).unwrap();
    assert_eq!(a.particles(), b.particles());
}

#[test]
fn unreadable_seed_file_falls_back_to_random() {
    let dir = TempDir::new().unwrap();
    let plain = Simulation::new(test_config(&dir, 10, 1)).unwrap();
    let cfg = SimulationConfig {
        input: Some(dir.path().join("does_not_exist.txt")),
        ..test_config(&dir, 10, 1)
    };
    let fallback = Simulation::new(cfg).unwrap();
    assert_eq!(plain.particles(), fallback.particles());
}

#[test]
fn seed_file_overrides_leading_positions() {
    let dir = TempDir::new().unwrap();
    let seed = dir.path().join("positions.txt");
    fs::write(&seed, "0.5 0.25 0.125\n0.75\n").unwrap();
    let cfg = SimulationConfig {
        input: Some(seed),
        ..test_config(&dir, 3, 1)
    };
    let sim = Simulation::new(cfg).unwrap();
    let mut random = ParticleStore::new(3, 42);
    random.initialize(None);

    let p = sim.particles();
    assert_eq!(p[0].pos, [0.5, 0.25, 0.125]);
    assert_eq!(p[1].pos[0], 0.75);
    assert_eq!(p[1].pos[1..], random.particles()[1].pos[1..]);
    assert_eq!(p[2].pos, random.particles()[2].pos);
}

#[test]
fn lone_particle_drifts_at_constant_velocity() {
    let dir = TempDir::new().unwrap();
    let steps = 5;
    let mut sim = Simulation::new(test_config(&dir, 1, steps)).unwrap();
    let start = sim.particles()[0];
    let summary = sim.run().unwrap();

    let end = sim.particles()[0];
    let t = steps as f64 * 0.1;
    assert_eq!(end.acc, [0.0; 3]);
    assert_eq!(end.vel, start.vel);
    for k in 0..3 {
        assert_relative_eq!(end.pos[k], start.pos[k] + start.vel[k] * t, max_relative = 1e-12);
    }
    assert_eq!(summary.worst_acceleration, 0.0);
}

#[test]
fn kinetic_energy_never_negative() {
    let dir = TempDir::new().unwrap();
    let mut sim = Simulation::new(test_config(&dir, 128, 6)).unwrap();
    let summary = sim.run().unwrap();
    assert_eq!(summary.records.len(), 6);
    assert!(summary.records.iter().all(|r| r.kinetic_energy >= 0.0));
    assert!(sim.particles().iter().all(all_finite));
    // The parallel reduction agrees with a sequential sum over the final state.
    assert_relative_eq!(
        summary.kinetic_energy,
        kinetic_energy(sim.particles()),
        max_relative = 1e-9
    );
}

#[test]
fn warmup_excludes_first_two_samples() {
    let dir = TempDir::new().unwrap();
    for steps in [5, 8] {
        let mut sim = Simulation::new(test_config(&dir, 16, steps)).unwrap();
        let summary = sim.run().unwrap();
        let stats = summary.throughput.expect("samples past warm-up");
        assert_eq!(stats.samples, steps - 2);
        assert!(stats.mean > 0.0 && stats.stddev >= 0.0);
        assert_eq!(summary.records.iter().filter(|r| r.accepted).count(), steps - 2);
    }
}

#[test]
fn short_runs_have_no_statistics() {
    let dir = TempDir::new().unwrap();
    for steps in [1, 2] {
        let mut sim = Simulation::new(test_config(&dir, 16, steps)).unwrap();
        let summary = sim.run().unwrap();
        assert!(summary.throughput.is_none());
        assert_eq!(summary.records.len(), steps);
    }
}

#[test]
fn one_step_matches_closed_form_with_reset_policy() {
    let dir = TempDir::new().unwrap();
    let mut sim = Simulation::with_particles(test_config(&dir, 2, 1), fixed_pair()).unwrap();
    let summary = sim.run().unwrap();
    let p = sim.particles();

    let scale = G * 3.0 * inv_cubed(9.0);
    let acc0 = [scale, 2.0 * scale, 2.0 * scale];
    let vel0 = [0.01 + acc0[0] * 0.1, acc0[1] * 0.1, acc0[2] * 0.1];
    for k in 0..3 {
        assert_relative_eq!(p[0].acc[k], acc0[k], max_relative = 1e-5);
        assert_relative_eq!(p[0].vel[k], vel0[k], max_relative = 1e-5);
        assert_relative_eq!(p[0].pos[k], vel0[k] * 0.1, max_relative = 1e-5);
    }
    // Particle 1 meets itself last, which resets every axis.
    assert_eq!(p[1].acc, [0.0; 3]);
    assert_eq!(p[1].vel, [0.0; 3]);
    assert_eq!(p[1].pos, [1.0, 2.0, 2.0]);

    let v2 = vel0.iter().map(|v| v * v).sum::<f64>();
    assert_relative_eq!(summary.kinetic_energy, 0.5 * 2.0 * v2, max_relative = 1e-5);
    assert_relative_eq!(summary.worst_acceleration, 2.0 * scale, max_relative = 1e-5);
}

#[test]
fn one_step_matches_closed_form_when_skipping() {
    let dir = TempDir::new().unwrap();
    let cfg = SimulationConfig {
        policy: DegeneratePolicy::SkipPair,
        ..test_config(&dir, 2, 1)
    };
    let mut sim = Simulation::with_particles(cfg, fixed_pair()).unwrap();
    sim.run().unwrap();
    let p = sim.particles();

    let d = [1.0, 2.0, 2.0];
    let s0 = G * 3.0 * inv_cubed(9.0);
    let s1 = G * 2.0 * inv_cubed(9.0);
    for k in 0..3 {
        assert_relative_eq!(p[0].acc[k], d[k] * s0, max_relative = 1e-5);
        assert_relative_eq!(p[1].acc[k], -d[k] * s1, max_relative = 1e-5);
        assert_relative_eq!(p[1].vel[k], -d[k] * s1 * 0.1, max_relative = 1e-5);
        assert_relative_eq!(p[1].pos[k], d[k] - d[k] * s1 * 0.01, max_relative = 1e-5);
    }
    // Equal and opposite forces.
    for k in 0..3 {
        assert_relative_eq!(p[0].acc[k] * 2.0, -p[1].acc[k] * 3.0, max_relative = 1e-9);
    }
}

#[test]
fn repeated_runs_write_identical_telemetry() {
    let dir = TempDir::new().unwrap();
    let mut contents = Vec::new();
    for _ in 0..2 {
        let mut sim = Simulation::new(test_config(&dir, 48, 3)).unwrap();
        let summary = sim.run().unwrap();
        let text = fs::read_to_string(dir.path().join("exec_info.txt")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], lines[1]);
        assert_eq!(lines[0].parse::<f64>().unwrap(), summary.worst_acceleration);
        contents.push(text);
    }
    assert_eq!(contents[0], contents[1]);
}
