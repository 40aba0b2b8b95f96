//! # Graphics Module
//!
//! Window surface, the instanced cell renderer, the WGSL programs and the
//! imgui control panel.
//!
//! - **Rendering** ([`rendering`]) - device and surface setup, per-frame
//!   submission, the cell-quad pipeline
//! - **UI** ([`ui`]) - imgui overlay and the control panel that turns widget
//!   edits into simulation commands
//!
//! The shaders live in `src/gfx/shaders/` and are embedded with `include_str!`.

pub mod rendering;
pub mod ui;
