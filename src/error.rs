//! Error type shared by the simulation engine.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    /// Rejected before the run starts.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The kernel and the drain loop disagreed on how many samples a step produced.
    #[error("telemetry channel error at step {step}: {message}")]
    Telemetry { step: usize, message: String },

    #[error("numerical failure at step {step}: {message}")]
    Numerical { step: usize, message: String },
}

impl SimError {
    pub fn config(message: impl Into<String>) -> Self {
        SimError::Config(message.into())
    }

    pub fn telemetry(step: usize, message: impl Into<String>) -> Self {
        SimError::Telemetry {
            step,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
