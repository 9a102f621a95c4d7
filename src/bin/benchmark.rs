use anyhow::Result;
use gsim::{Simulation, SimulationConfig};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    println!("Gravity Kernel Benchmark");
    println!("------------------------");

    let particle_counts = [1000, 2000, 4000, 8000, 16000];
    let steps = 10;
    let output = std::env::temp_dir().join("gsim_benchmark_telemetry.txt");

    println!("Running {} steps per size on {} threads", steps, num_cpus::get());
    println!("\nParticles | Total (s)  | Avg Step (s) | GFLOPS (mean +- sd)");
    println!("----------|------------|--------------|--------------------");

    for &n in &particle_counts {
        let config = SimulationConfig {
            particles: n,
            steps,
            output: output.clone(),
            ..Default::default()
        };
        let summary = Simulation::new(config)?.run()?;
        let perf = match summary.throughput {
            Some(s) => format!("{:.3} +- {:.3}", s.mean, s.stddev),
            None => "n/a".to_string(),
        };
        println!(
            "{:9} | {:10.4} | {:12.6} | {}",
            n,
            summary.total_seconds,
            summary.total_seconds / steps as f64,
            perf
        );
    }
    Ok(())
}
