//! Grid ownership and the resize protocol
//!
//! [`ResizeController`] holds the only authoritative [`GridState`]. Steppers and
//! renderers borrow it for one tick at a time and never keep handles across
//! ticks, so replacing the grid between ticks cannot leave a stale reference.

use super::grid::{CellSeeder, GridDimensions, GridState};
use super::traits::GridBackend;
use crate::error::LifeResult;

pub struct ResizeController<C> {
    grid: GridState<C>,
    seeder: CellSeeder,
}

impl<C> ResizeController<C> {
    /// Allocate and seed the first grid
    pub fn new<B>(backend: &mut B, dims: GridDimensions, mut seeder: CellSeeder) -> LifeResult<Self>
    where
        B: GridBackend<Cells = C>,
    {
        let seed = seeder.fill(dims);
        let cells = backend.allocate(dims, &seed)?;
        log::info!(
            "Created {}x{} grid on {} backend",
            dims.width(),
            dims.height(),
            backend.name()
        );
        Ok(Self {
            grid: GridState::new(dims, cells),
            seeder,
        })
    }

    /// Replace the grid with a freshly seeded one of the requested size
    ///
    /// Dimensions are validated and the new buffers allocated before anything
    /// is published; on error the current grid is left exactly as it was. On
    /// success the old buffers are handed back to the backend for release.
    /// Resetting the step counter and the brush is the caller's job.
    pub fn resize<B>(&mut self, backend: &mut B, width: u32, height: u32) -> LifeResult<GridDimensions>
    where
        B: GridBackend<Cells = C>,
    {
        let dims = GridDimensions::new(width, height)?;
        let seed = self.seeder.fill(dims);
        let cells = backend.allocate(dims, &seed)?;

        let previous = std::mem::replace(&mut self.grid, GridState::new(dims, cells));
        let old_dims = previous.dims();
        backend.release(previous.into_cells());

        log::debug!(
            "Resized grid {}x{} -> {}x{}",
            old_dims.width(),
            old_dims.height(),
            width,
            height
        );
        Ok(dims)
    }

    pub fn grid(&self) -> &GridState<C> {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut GridState<C> {
        &mut self.grid
    }

    pub fn dims(&self) -> GridDimensions {
        self.grid.dims()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LifeError;
    use crate::simulation::cpu::CpuBackend;

    fn controller(backend: &mut CpuBackend, w: u32, h: u32) -> ResizeController<crate::simulation::cpu::CpuCells> {
        let dims = GridDimensions::new(w, h).unwrap();
        ResizeController::new(backend, dims, CellSeeder::new(0.5, Some(3))).unwrap()
    }

    #[test]
    fn test_resize_allocates_new_pair() {
        let mut backend = CpuBackend::new();
        let mut resize = controller(&mut backend, 8, 8);
        let old_ids = (resize.grid().cells().active().id(), resize.grid().cells().standby().id());

        let dims = resize.resize(&mut backend, 12, 5).unwrap();
        assert_eq!(dims.cell_count(), 60);

        let cells = resize.grid().cells();
        assert_eq!(cells.active().cells().len(), 60);
        assert_eq!(cells.standby().cells().len(), 60);
        assert!(cells.standby().cells().iter().all(|&c| c == 0));
        assert_ne!(cells.active().id(), cells.standby().id());
        assert!(backend.is_released(old_ids.0));
        assert!(backend.is_released(old_ids.1));
    }

    #[test]
    fn test_invalid_resize_keeps_previous_grid() {
        let mut backend = CpuBackend::new();
        let mut resize = controller(&mut backend, 8, 8);
        let before = resize.grid().cells().active().cells().to_vec();

        let result = resize.resize(&mut backend, 0, 8);
        assert!(matches!(result, Err(LifeError::InvalidGridSize { .. })));
        assert_eq!(resize.dims(), GridDimensions::new(8, 8).unwrap());
        assert_eq!(resize.grid().cells().active().cells(), &before[..]);
        assert_eq!(backend.released_count(), 0);
    }

    #[test]
    fn test_backend_limit_keeps_previous_grid() {
        let mut backend = CpuBackend::with_cell_limit(100);
        let mut resize = controller(&mut backend, 8, 8);

        let result = resize.resize(&mut backend, 20, 20);
        assert!(matches!(result, Err(LifeError::GridTooLarge { .. })));
        assert_eq!(resize.dims().cell_count(), 64);
        assert_eq!(backend.released_count(), 0);
    }
}
