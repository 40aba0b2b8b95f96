//! Pointer-driven paint brush
//!
//! The brush is a disc in grid space. While active, every simulation step
//! forces the cells inside the disc alive. Its radius is stored squared so the
//! per-cell test never needs a square root.

use super::grid::GridDimensions;

/// Brush parameters read by every simulation step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BrushState {
    pub active: bool,
    pub center_x: i32,
    pub center_y: i32,
    pub radius_squared: i32,
}

impl BrushState {
    /// Whether an active brush forces cell (x, y) alive
    pub fn covers(&self, x: u32, y: u32) -> bool {
        if !self.active {
            return false;
        }
        let dx = x as i64 - self.center_x as i64;
        let dy = y as i64 - self.center_y as i64;
        dx * dx + dy * dy <= self.radius_squared as i64
    }
}

/// Size of the drawing surface in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Map a pointer position to a grid cell; row 0 is the bottom row
///
/// Positions outside the canvas clamp to the nearest edge cell.
pub fn pointer_to_cell(px: f64, py: f64, canvas: CanvasSize, dims: GridDimensions) -> (i32, i32) {
    let width = dims.width() as i64;
    let height = dims.height() as i64;

    let column = (px / canvas.width as f64 * width as f64).floor() as i64;
    let row = (py / canvas.height as f64 * height as f64).floor() as i64;

    let x = column.clamp(0, width - 1);
    let y = (height - 1 - row).clamp(0, height - 1);
    (x as i32, y as i32)
}

/// Turns pointer events into [`BrushState`]
#[derive(Debug, Clone)]
pub struct BrushInput {
    state: BrushState,
    size: u32,
    dragging: bool,
}

impl BrushInput {
    pub fn new(size: u32) -> Self {
        Self {
            state: BrushState {
                radius_squared: squared(size),
                ..Default::default()
            },
            size,
            dragging: false,
        }
    }

    pub fn state(&self) -> BrushState {
        self.state
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = size;
        self.state.radius_squared = squared(size);
    }

    pub fn pointer_down(&mut self, px: f64, py: f64, canvas: CanvasSize, dims: GridDimensions) {
        self.dragging = true;
        self.paint_at(px, py, canvas, dims);
    }

    /// Moves only paint while the pointer is held down
    pub fn pointer_moved(&mut self, px: f64, py: f64, canvas: CanvasSize, dims: GridDimensions) {
        if self.dragging {
            self.paint_at(px, py, canvas, dims);
        }
    }

    /// Pointer released or left the canvas
    pub fn pointer_up(&mut self) {
        self.dragging = false;
        self.state.active = false;
    }

    /// Drop any paint recorded against the previous grid. The pointer may still
    /// be held; the next move repaints in the new grid space.
    pub fn clear(&mut self) {
        self.state.active = false;
    }

    fn paint_at(&mut self, px: f64, py: f64, canvas: CanvasSize, dims: GridDimensions) {
        if canvas.is_empty() {
            return;
        }
        let (x, y) = pointer_to_cell(px, py, canvas, dims);
        self.state = BrushState {
            active: true,
            center_x: x,
            center_y: y,
            radius_squared: squared(self.size),
        };
    }
}

fn squared(size: u32) -> i32 {
    let size = size.min(i16::MAX as u32) as i32;
    size * size
}
