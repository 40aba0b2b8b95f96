//! Generation rule on host memory
//!
//! Mirrors `shaders/life_step.wgsl` cell for cell. The GPU path never calls
//! into this module; the CPU backend and the tests do.

use super::brush::BrushState;
use super::grid::{GridDimensions, ALIVE, DEAD};

const MOORE_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Live cells among the 8 wrapped neighbors of (x, y). Always in 0..=8.
pub fn live_neighbors(cells: &[u32], dims: GridDimensions, x: u32, y: u32) -> u32 {
    MOORE_OFFSETS
        .iter()
        .map(|&(dx, dy)| cells[dims.wrapped_index(x, y, dx, dy)])
        .sum()
}

/// Two neighbors keep the current state, three give birth, anything else dies
pub fn next_state(current: u32, neighbors: u32) -> u32 {
    match neighbors {
        2 => current,
        3 => ALIVE,
        _ => DEAD,
    }
}

/// Advance every cell of `current` into `next`, painting under the brush
pub fn step_cells(current: &[u32], next: &mut [u32], dims: GridDimensions, brush: &BrushState) {
    debug_assert_eq!(current.len(), dims.cell_count(), "current buffer size mismatch");
    debug_assert_eq!(next.len(), dims.cell_count(), "next buffer size mismatch");

    for y in 0..dims.height() {
        for x in 0..dims.width() {
            let index = dims.index(x, y);
            next[index] = if brush.covers(x, y) {
                ALIVE
            } else {
                next_state(current[index], live_neighbors(current, dims, x, y))
            };
        }
    }
}
