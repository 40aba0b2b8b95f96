// src/gfx/rendering/mod.rs
//! Surface management and the cell draw pass

pub mod cell_renderer;
pub mod render_engine;

pub use cell_renderer::CellRenderer;
pub use render_engine::RenderEngine;
