//! Backend trait for the Life engine
//!
//! Defines the operations a compute backend must provide so that
//! [`LifeSimulation`](super::manager::LifeSimulation) can drive it. The wgpu
//! backend records compute and render passes; the CPU backend runs the same
//! rule on host vectors.

use super::brush::BrushState;
use super::grid::{GridDimensions, PingPong};
use crate::error::LifeResult;

/// Storage and execution for one grid's cell buffers
///
/// All methods are called from the single simulation thread. Within a tick the
/// call order is always `prepare`, then zero or more `step`s, then one
/// `render`. `allocate` and `release` only happen at the start of a tick,
/// before `prepare`.
pub trait GridBackend {
    /// Handle to one cell buffer plus anything bound to it
    type Cells;

    /// Create both buffers for `dims`
    ///
    /// The returned pair has `seed` in its active buffer and zeros in its
    /// standby buffer. Bindings that reference either buffer are rebuilt here.
    ///
    /// # Arguments
    /// * `dims` - Grid extent the buffers are sized for
    /// * `seed` - Initial cell values, exactly `dims.cell_count()` long
    ///
    /// # Errors
    /// Fails without side effects if the grid exceeds backend limits.
    fn allocate(&mut self, dims: GridDimensions, seed: &[u32]) -> LifeResult<PingPong<Self::Cells>>;

    /// Publish grid dimensions and brush state for this tick's steps and render
    fn prepare(&mut self, dims: GridDimensions, brush: &BrushState);

    /// Advance one generation: read the active buffer, write the standby one
    ///
    /// Does not swap roles; the caller advances the pair afterwards.
    fn step(&mut self, dims: GridDimensions, cells: &mut PingPong<Self::Cells>);

    /// Draw the buffer holding the latest completed generation
    fn render(&mut self, dims: GridDimensions, active: &Self::Cells);

    /// Free a pair that is no longer published
    fn release(&mut self, cells: PingPong<Self::Cells>) {
        drop(cells);
    }

    /// Backend name for logs and UI
    fn name(&self) -> &str;
}
