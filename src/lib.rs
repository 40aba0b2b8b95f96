// src/lib.rs
//! lifegrid
//!
//! Conway's Game of Life on the GPU: a wgpu compute pass advances the grid and
//! an instanced render pass draws it, both driven from the winit frame loop.
//! [`simulation`] holds the backend-independent engine and a CPU reference
//! backend used by the tests.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod performance;
pub mod simulation;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::LifeApp;
pub use config::LifeConfig;
pub use error::{LifeError, LifeResult};
