//! CPU reference backend
//!
//! Runs the generation rule on host vectors and "renders" by computing the
//! quad every cell instance would get from the vertex shader. Used for
//! headless runs and to exercise the scheduling and resize logic without a GPU.

use std::collections::HashSet;

use super::brush::BrushState;
use super::grid::{GridDimensions, PingPong, CELL_SIZE};
use super::rules;
use super::traits::GridBackend;
use crate::error::{LifeError, LifeResult};
use crate::gfx::rendering::cell_renderer::{cell_quad, CellQuad};

/// One host-side cell buffer
#[derive(Debug, Clone)]
pub struct CpuCells {
    id: u64,
    cells: Vec<u32>,
}

impl CpuCells {
    /// Allocation id, unique for the lifetime of the backend
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cells(&self) -> &[u32] {
        &self.cells
    }
}

/// Output of the most recent render call
#[derive(Debug, Clone)]
pub struct RenderedFrame {
    /// Id of the buffer that was drawn
    pub source: u64,
    pub cells: Vec<u32>,
    /// One quad per cell, in instance order
    pub quads: Vec<CellQuad>,
}

impl RenderedFrame {
    /// Quads with non-zero area, i.e. live cells
    pub fn visible(&self) -> impl Iterator<Item = &CellQuad> {
        self.quads.iter().filter(|quad| quad.area() > 0.0)
    }
}

#[derive(Debug, Default)]
pub struct CpuBackend {
    next_id: u64,
    cell_limit: Option<usize>,
    released: HashSet<u64>,
    params: Option<(GridDimensions, BrushState)>,
    step_log: Vec<(u64, u64)>,
    last_frame: Option<RenderedFrame>,
    render_count: u64,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse allocations above `max_cells`, like a device storage limit
    pub fn with_cell_limit(max_cells: usize) -> Self {
        Self {
            cell_limit: Some(max_cells),
            ..Self::default()
        }
    }

    /// `(read, write)` buffer ids of every step so far
    pub fn step_log(&self) -> &[(u64, u64)] {
        &self.step_log
    }

    pub fn last_frame(&self) -> Option<&RenderedFrame> {
        self.last_frame.as_ref()
    }

    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    pub fn is_released(&self, id: u64) -> bool {
        self.released.contains(&id)
    }

    pub fn released_count(&self) -> usize {
        self.released.len()
    }

    fn assert_live(&self, cells: &CpuCells, dims: GridDimensions) {
        debug_assert!(
            !self.released.contains(&cells.id),
            "cell buffer {} used after release",
            cells.id
        );
        debug_assert_eq!(
            cells.cells.len(),
            dims.cell_count(),
            "cell buffer {} does not match grid dimensions",
            cells.id
        );
    }

    fn next_buffer(&mut self, cells: Vec<u32>) -> CpuCells {
        let id = self.next_id;
        self.next_id += 1;
        CpuCells { id, cells }
    }
}

impl GridBackend for CpuBackend {
    type Cells = CpuCells;

    fn allocate(&mut self, dims: GridDimensions, seed: &[u32]) -> LifeResult<PingPong<CpuCells>> {
        if let Some(limit) = self.cell_limit {
            if dims.cell_count() > limit {
                return Err(LifeError::GridTooLarge {
                    cells: dims.cell_count() as u64,
                    bytes: dims.byte_size(),
                    limit: limit as u64 * CELL_SIZE,
                });
            }
        }
        debug_assert_eq!(seed.len(), dims.cell_count(), "seed size mismatch");

        let active = self.next_buffer(seed.to_vec());
        let standby = self.next_buffer(vec![0; dims.cell_count()]);
        Ok(PingPong::new(active, standby))
    }

    fn prepare(&mut self, dims: GridDimensions, brush: &BrushState) {
        self.params = Some((dims, *brush));
    }

    fn step(&mut self, dims: GridDimensions, cells: &mut PingPong<CpuCells>) {
        self.assert_live(cells.active(), dims);
        self.assert_live(cells.standby(), dims);

        let brush = match self.params {
            Some((uniform_dims, brush)) => {
                debug_assert_eq!(uniform_dims, dims, "params uploaded for another grid");
                brush
            }
            None => BrushState::default(),
        };

        let (current, next) = cells.split_mut();
        rules::step_cells(&current.cells, &mut next.cells, dims, &brush);
        self.step_log.push((current.id, next.id));
    }

    fn render(&mut self, dims: GridDimensions, active: &CpuCells) {
        self.assert_live(active, dims);

        let quads = active
            .cells
            .iter()
            .enumerate()
            .map(|(index, &state)| cell_quad(index as u32, state, dims))
            .collect();

        self.render_count += 1;
        self.last_frame = Some(RenderedFrame {
            source: active.id,
            cells: active.cells.clone(),
            quads,
        });
    }

    fn release(&mut self, cells: PingPong<CpuCells>) {
        let (a, b) = cells.into_inner();
        self.released.insert(a.id);
        self.released.insert(b.id);
    }

    fn name(&self) -> &str {
        "cpu"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::grid::ALIVE;

    #[test]
    fn test_step_reads_active_writes_standby() {
        let dims = GridDimensions::new(5, 5).unwrap();
        let mut seed = vec![0; 25];
        for x in 1..4 {
            seed[dims.index(x, 2)] = ALIVE;
        }

        let mut backend = CpuBackend::new();
        let mut cells = backend.allocate(dims, &seed).unwrap();
        backend.prepare(dims, &BrushState::default());
        backend.step(dims, &mut cells);

        assert_eq!(cells.active().cells(), &seed[..], "active buffer untouched");
        let next = cells.standby().cells();
        assert_eq!(next[dims.index(2, 1)], ALIVE);
        assert_eq!(next[dims.index(2, 3)], ALIVE);
        assert_eq!(next[dims.index(1, 2)], 0);
        assert_eq!(backend.step_log(), &[(0, 1)]);
    }

    #[test]
    fn test_render_draws_one_quad_per_cell() {
        let dims = GridDimensions::new(4, 2).unwrap();
        let seed = vec![1, 0, 0, 0, 0, 0, 0, 1];
        let mut backend = CpuBackend::new();
        let cells = backend.allocate(dims, &seed).unwrap();
        backend.render(dims, cells.active());

        let frame = backend.last_frame().unwrap();
        assert_eq!(frame.quads.len(), 8);
        assert_eq!(frame.visible().count(), 2);
        assert_eq!(frame.source, cells.active().id());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "used after release")]
    fn test_released_buffers_cannot_step() {
        let dims = GridDimensions::new(2, 2).unwrap();
        let mut backend = CpuBackend::new();
        let cells = backend.allocate(dims, &[0; 4]).unwrap();
        let stale = cells.active().clone();
        backend.release(cells);
        backend.render(dims, &stale);
    }
}
