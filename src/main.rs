use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use gsim::config::{self, DegeneratePolicy, SimulationConfig};
use gsim::{report, Simulation};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of particles to simulate.
    #[arg(short = 'n', long, default_value_t = config::DEFAULT_PARTICLES)]
    particles: usize,

    /// Number of integration steps.
    #[arg(short, long, default_value_t = config::DEFAULT_STEPS)]
    steps: usize,

    /// Time step.
    #[arg(short = 't', long, default_value_t = config::DEFAULT_DT)]
    dt: f64,

    /// Report and sample every this many steps.
    #[arg(short = 'f', long, default_value_t = config::DEFAULT_SAMPLE_FREQ)]
    sample_freq: usize,

    /// Whitespace-separated initial positions; missing values are drawn at random.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Where the final worst-case acceleration is written.
    #[arg(short, long, default_value = config::DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Worker threads, defaults to the number of logical CPUs.
    #[arg(long)]
    threads: Option<usize>,

    /// Skip zero-displacement pairs instead of resetting the axis accumulator.
    #[arg(long, default_value_t = false)]
    skip_degenerate_pairs: bool,

    #[arg(long, default_value_t = config::DEFAULT_SEED)]
    seed: u64,
}

impl Args {
    fn into_config(self) -> SimulationConfig {
        SimulationConfig {
            particles: self.particles,
            steps: self.steps,
            dt: self.dt,
            sample_freq: self.sample_freq,
            input: self.input,
            output: self.output,
            threads: self.threads.unwrap_or_else(num_cpus::get),
            policy: if self.skip_degenerate_pairs {
                DegeneratePolicy::SkipPair
            } else {
                DegeneratePolicy::ResetAccumulator
            },
            seed: self.seed,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Args::parse().into_config();
    let mut sim = Simulation::new(config)?;

    let cfg = sim.config();
    report::print_header(cfg.particles, cfg.steps, cfg.dt);
    let summary = sim.run_with(report::print_row)?;
    report::print_summary(&summary);

    Ok(())
}
