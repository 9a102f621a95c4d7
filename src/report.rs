//! Console report and the telemetry artifact left behind by a run.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::simulation::{RunSummary, StepRecord};

const RULE: &str = "------------------------------------------------";
const BANNER: &str = "===============================";

pub fn header(particles: usize, steps: usize, dt: f64) -> String {
    format!(
        " nPart = {}; nSteps = {}; dt = {}\n{}\n {:<8}{:<8}{:<12}{:<12}{:<12}\n{}",
        particles, steps, dt, RULE, "s", "dt", "kenergy", "time (s)", "GFLOPS", RULE
    )
}

pub fn row(r: &StepRecord) -> String {
    format!(
        " {:<8}{:<8.5}{:<12.5e}{:<12.5}{:<12.5}",
        r.step, r.time, r.kinetic_energy, r.seconds, r.gflops
    )
}

pub fn footer(summary: &RunSummary) -> String {
    let perf = match summary.throughput {
        Some(s) => format!("{:.5} +- {:.5}", s.mean, s.stddev),
        // Every reported sample fell inside the warm-up window.
        None => "n/a".to_string(),
    };
    format!(
        "\n# Total Time (s)     : {:.6}\n# Average Performance : {}\n{}",
        summary.total_seconds, perf, BANNER
    )
}

pub fn print_header(particles: usize, steps: usize, dt: f64) {
    println!("{}", BANNER);
    println!(" Initialize Gravity Simulation");
    println!("{}", header(particles, steps, dt));
}

pub fn print_row(r: &StepRecord) {
    println!("{}", row(r));
}

pub fn print_summary(summary: &RunSummary) {
    println!("{}", footer(summary));
}

/// Two lines, both holding `worst`, for tooling that validates the run.
pub fn write_telemetry_file(path: &Path, worst: f64) -> Result<()> {
    let mut file = File::create(path)?;
    writeln!(file, "{}", worst)?;
    writeln!(file, "{}", worst)?;
    Ok(())
}
