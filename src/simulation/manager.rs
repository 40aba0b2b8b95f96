//! Simulation context for the Life engine
//!
//! [`LifeSimulation`] owns the grid, the brush, step scheduling and the command
//! queue. The frame loop hands it a backend once per display frame via
//! [`LifeSimulation::tick`].

use super::brush::{BrushInput, BrushState, CanvasSize};
use super::commands::{CommandQueue, SimCommand};
use super::grid::{CellSeeder, GridDimensions, GridState};
use super::resize::ResizeController;
use super::scheduler::FrameScheduler;
use super::traits::GridBackend;
use crate::config::{self, LifeConfig, MAX_BRUSH_SIZE, MAX_PIXEL_SCALE_EXPONENT, RATE_EXPONENT_RANGE};
use crate::error::LifeResult;

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub steps: u32,
    pub resized: bool,
}

/// Simulation state driven by the display-refresh loop
pub struct LifeSimulation<C> {
    grid: ResizeController<C>,
    brush: BrushInput,
    scheduler: FrameScheduler,
    commands: CommandQueue,
    canvas: CanvasSize,
    pixel_scale_exponent: u32,
    rate_exponent: i32,
    canvas_request: Option<(u32, u32)>,
    /// Largest canvas side the surface can present
    canvas_limit: Option<u32>,
    last_rejection: Option<String>,
}

impl<C> LifeSimulation<C> {
    /// Create the simulation and its first grid on `backend`
    ///
    /// # Arguments
    /// * `config` - Validated startup configuration
    /// * `backend` - Backend that allocates the initial buffers
    pub fn new<B>(config: &LifeConfig, backend: &mut B) -> LifeResult<Self>
    where
        B: GridBackend<Cells = C>,
    {
        config.validate()?;

        let dims = GridDimensions::new(config.grid_width, config.grid_height)?;
        let seeder = CellSeeder::new(config.alive_probability, config.seed);
        let grid = ResizeController::new(backend, dims, seeder)?;
        let (canvas_width, canvas_height) = config.canvas_size();

        Ok(Self {
            grid,
            brush: BrushInput::new(config.brush_size),
            scheduler: FrameScheduler::with_rate_exponent(config.rate_exponent),
            commands: CommandQueue::new(),
            canvas: CanvasSize::new(canvas_width, canvas_height),
            pixel_scale_exponent: config.pixel_scale_exponent,
            rate_exponent: config.rate_exponent,
            canvas_request: None,
            canvas_limit: None,
            last_rejection: None,
        })
    }

    /// Cap requested canvas sides at `max_side` pixels
    pub fn set_canvas_limit(&mut self, max_side: u32) {
        self.canvas_limit = Some(max_side);
    }

    /// Queue a command for the next tick
    pub fn push(&mut self, command: SimCommand) {
        self.commands.push(command);
    }

    /// Run one display frame: apply queued commands, run the steps that are
    /// due, then render the latest generation exactly once
    pub fn tick<B>(&mut self, backend: &mut B, delta_ms: f64) -> TickReport
    where
        B: GridBackend<Cells = C>,
    {
        let resized = self.apply_commands(backend);

        let dims = self.grid.dims();
        backend.prepare(dims, &self.brush.state());

        let steps = self.scheduler.on_frame(delta_ms);
        let grid = self.grid.grid_mut();
        for _ in 0..steps {
            backend.step(dims, grid.cells_mut());
            grid.cells_mut().advance();
            self.scheduler.record_step();
        }

        backend.render(dims, grid.cells().active());

        TickReport { steps, resized }
    }

    fn apply_commands<B>(&mut self, backend: &mut B) -> bool
    where
        B: GridBackend<Cells = C>,
    {
        if self.commands.is_empty() {
            return false;
        }
        let pending: Vec<SimCommand> = self.commands.drain().collect();
        let mut resized = false;
        for command in pending {
            resized |= self.apply(command, backend);
        }
        resized
    }

    fn apply<B>(&mut self, command: SimCommand, backend: &mut B) -> bool
    where
        B: GridBackend<Cells = C>,
    {
        let dims = self.grid.dims();
        match command {
            SimCommand::ResizeRequested { width, height } => {
                if (width, height) == (dims.width(), dims.height()) {
                    return false;
                }
                match self.grid.resize(backend, width, height) {
                    Ok(_) => {
                        self.scheduler.reset_steps();
                        self.brush.clear();
                        self.request_canvas();
                        self.last_rejection = None;
                        log::info!("Grid resized to {width}x{height}");
                        return true;
                    }
                    Err(err) => {
                        log::warn!("Rejected resize to {width}x{height}: {err}");
                        self.last_rejection = Some(err.to_string());
                    }
                }
            }
            SimCommand::RateChanged { exponent } => {
                let (min, max) = RATE_EXPONENT_RANGE;
                self.rate_exponent = exponent.clamp(min, max);
                self.scheduler.set_rate_exponent(self.rate_exponent);
            }
            SimCommand::BrushSizeChanged { size } => {
                self.brush.set_size(size.min(MAX_BRUSH_SIZE));
            }
            SimCommand::PixelScaleChanged { exponent } => {
                self.pixel_scale_exponent = exponent.min(MAX_PIXEL_SCALE_EXPONENT);
                self.request_canvas();
            }
            SimCommand::CanvasResized { width, height } => {
                self.canvas = CanvasSize::new(width, height);
            }
            SimCommand::PointerPressed { x, y } => {
                self.brush.pointer_down(x, y, self.canvas, dims);
            }
            SimCommand::PointerMoved { x, y } => {
                self.brush.pointer_moved(x, y, self.canvas, dims);
            }
            SimCommand::PointerReleased => self.brush.pointer_up(),
        }
        false
    }

    fn request_canvas(&mut self) {
        let dims = self.grid.dims();
        let wanted = config::canvas_size(dims.width(), dims.height(), self.pixel_scale_exponent);
        let request = match self.canvas_limit {
            Some(max_side) => config::clamp_canvas(wanted, max_side),
            None => wanted,
        };
        if request != wanted {
            log::info!(
                "Canvas {}x{} exceeds the surface limit, using {}x{}",
                wanted.0,
                wanted.1,
                request.0,
                request.1
            );
        }
        self.canvas_request = Some(request);
    }

    /// Canvas size wanted after a grid or pixel-scale change, if any
    pub fn take_canvas_request(&mut self) -> Option<(u32, u32)> {
        self.canvas_request.take()
    }

    pub fn dims(&self) -> GridDimensions {
        self.grid.dims()
    }

    pub fn grid(&self) -> &GridState<C> {
        self.grid.grid()
    }

    pub fn brush(&self) -> BrushState {
        self.brush.state()
    }

    pub fn brush_size(&self) -> u32 {
        self.brush.size()
    }

    /// Generation shown by the active buffer
    pub fn generation(&self) -> u64 {
        self.scheduler.step_count()
    }

    pub fn rate_exponent(&self) -> i32 {
        self.rate_exponent
    }

    pub fn pixel_scale_exponent(&self) -> u32 {
        self.pixel_scale_exponent
    }

    /// Reason the most recent resize request was refused
    pub fn last_rejection(&self) -> Option<&str> {
        self.last_rejection.as_deref()
    }
}
