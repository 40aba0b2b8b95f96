//! Input and UI requests, queued until the next tick
//!
//! Window events and UI widgets never touch simulation state directly. They
//! push a [`SimCommand`]; the simulation drains the queue once at the start of
//! each tick, in arrival order.

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimCommand {
    ResizeRequested { width: u32, height: u32 },
    /// Rate becomes `2^exponent` steps per frame
    RateChanged { exponent: i32 },
    BrushSizeChanged { size: u32 },
    /// Cell size on screen becomes `2^exponent` pixels
    PixelScaleChanged { exponent: u32 },
    /// Drawing surface changed size (physical pixels)
    CanvasResized { width: u32, height: u32 },
    PointerPressed { x: f64, y: f64 },
    PointerMoved { x: f64, y: f64 },
    /// Button released or pointer left the canvas
    PointerReleased,
}

#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: VecDeque<SimCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: SimCommand) {
        self.pending.push_back(command);
    }

    /// Take everything queued so far, oldest first
    pub fn drain(&mut self) -> impl Iterator<Item = SimCommand> + '_ {
        self.pending.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_preserves_order_and_empties() {
        let mut queue = CommandQueue::new();
        queue.push(SimCommand::PointerPressed { x: 1.0, y: 2.0 });
        queue.push(SimCommand::ResizeRequested { width: 8, height: 8 });
        queue.push(SimCommand::PointerReleased);

        let drained: Vec<SimCommand> = queue.drain().collect();
        assert_eq!(drained.len(), 3);
        assert_eq!(drained[1], SimCommand::ResizeRequested { width: 8, height: 8 });
        assert!(queue.is_empty());
    }
}
