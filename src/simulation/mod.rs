// src/simulation/mod.rs
//! Life engine
//!
//! Grid geometry, the generation rule, brush input and step scheduling are
//! independent of the device. [`manager::LifeSimulation`] drives any
//! [`traits::GridBackend`]: [`gpu`] records wgpu passes, [`cpu`] runs the same
//! rule on host vectors.

pub mod brush;
pub mod commands;
pub mod cpu;
pub mod gpu;
pub mod grid;
pub mod manager;
pub mod resize;
pub mod rules;
pub mod scheduler;
pub mod traits;

pub use manager::{LifeSimulation, TickReport};
pub use traits::GridBackend;
