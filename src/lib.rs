//! Direct-summation gravity simulation for benchmarking data-parallel force kernels.

pub mod config;
pub mod error;
pub mod kernel;
pub mod particle;
pub mod quickstat;
pub mod report;
pub mod simulation;
pub mod telemetry;

pub use config::{DegeneratePolicy, SimulationConfig};
pub use error::{Result, SimError};
pub use particle::{Particle, ParticleStore};
pub use simulation::{RunSummary, Simulation, StepRecord};
