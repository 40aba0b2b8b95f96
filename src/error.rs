//! Error types for the simulation and its platform glue

use thiserror::Error;

/// Errors surfaced by the Life engine
#[derive(Debug, Error)]
pub enum LifeError {
    /// No adapter, device or required capability on this machine. Fatal.
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// Grid dimensions that can never be allocated
    #[error("invalid grid size {width}x{height}: each side must be within 1..={max}")]
    InvalidGridSize { width: u32, height: u32, max: u32 },

    /// Grid fits the per-axis limit but not the device's storage binding limit
    #[error("grid of {cells} cells needs {bytes} bytes, device limit is {limit} bytes")]
    GridTooLarge { cells: u64, bytes: u64, limit: u64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

pub type LifeResult<T> = Result<T, LifeError>;
