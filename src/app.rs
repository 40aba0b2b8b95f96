use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::LifeConfig;
use crate::error::{LifeError, LifeResult};
use crate::gfx::{
    rendering::RenderEngine,
    ui::{
        panel::{control_panel, PanelModel},
        UiManager,
    },
};
use crate::performance::FrameStats;
use crate::simulation::{
    commands::SimCommand,
    gpu::{FrameTarget, GpuCells, GpuFrame, GpuLife},
    manager::LifeSimulation,
};

/// Windowed Game of Life driven by the display refresh
pub struct LifeApp {
    event_loop: EventLoop<()>,
    state: AppState,
}

/// Everything that exists only once the GPU is up
struct GpuContext {
    engine: RenderEngine,
    life: GpuLife,
    sim: LifeSimulation<GpuCells>,
}

struct AppState {
    config: LifeConfig,
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    ui_manager: Option<UiManager>,
    stats: FrameStats,
    last_frame: Option<Instant>,
    /// Commands gathered between redraws
    pending: Vec<SimCommand>,
    cursor: (f64, f64),
    fatal: Option<LifeError>,
}

impl LifeApp {
    /// Validate `config` and create the event loop
    pub fn new(config: LifeConfig) -> LifeResult<Self> {
        config.validate()?;
        let event_loop = EventLoop::new()?;

        Ok(Self {
            event_loop,
            state: AppState {
                config,
                window: None,
                gpu: None,
                ui_manager: None,
                stats: FrameStats::new(),
                last_frame: None,
                pending: Vec::new(),
                cursor: (0.0, 0.0),
                fatal: None,
            },
        })
    }

    /// Run until the window closes
    ///
    /// # Errors
    /// Returns the startup failure that stopped the loop, if any.
    pub fn run(self) -> LifeResult<()> {
        let LifeApp {
            event_loop,
            mut state,
        } = self;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut state)?;

        match state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn start(&mut self, event_loop: &ActiveEventLoop) -> LifeResult<()> {
        let (width, height) = self.config.canvas_size();
        let attributes = WindowAttributes::default()
            .with_title(self.config.window_title.clone())
            .with_inner_size(PhysicalSize::new(width, height));
        let window = event_loop
            .create_window(attributes)
            .map_err(|err| LifeError::UnsupportedPlatform(format!("cannot create window: {err}")))?;
        let window = Arc::new(window);

        let size = window.inner_size();
        let engine = pollster::block_on(RenderEngine::new(window.clone(), size.width, size.height))?;

        let mut life = GpuLife::new(engine.device(), engine.surface_format());
        let mut setup = GpuFrame::setup(&mut life, engine.device(), engine.queue());
        let mut sim = LifeSimulation::new(&self.config, &mut setup)?;
        sim.set_canvas_limit(engine.max_surface_side());
        sim.push(SimCommand::CanvasResized {
            width: size.width,
            height: size.height,
        });

        let ui_manager = UiManager::new(engine.device(), engine.queue(), engine.surface_format(), &window);

        self.ui_manager = Some(ui_manager);
        self.gpu = Some(GpuContext { engine, life, sim });
        self.window = Some(window);
        Ok(())
    }

    fn redraw(&mut self) {
        let (Some(gpu), Some(window)) = (self.gpu.as_mut(), self.window.as_ref()) else {
            return;
        };
        let GpuContext { engine, life, sim } = gpu;

        let now = Instant::now();
        let interval = self.last_frame.map(|t| now - t).unwrap_or_default();
        self.last_frame = Some(now);

        for command in self.pending.drain(..) {
            sim.push(command);
        }

        let model = PanelModel::from_simulation(sim, self.stats.metrics(), engine.adapter_name());
        let stats = &self.stats;
        let ui_manager = &mut self.ui_manager;
        let mut ui_commands = Vec::new();
        let mut report = None;

        engine.render_frame(|device, queue, encoder, view| {
            {
                let mut frame = GpuFrame::new(
                    life,
                    device,
                    queue,
                    FrameTarget {
                        encoder: &mut *encoder,
                        view,
                    },
                );
                report = Some(sim.tick(&mut frame, interval.as_secs_f64() * 1000.0));
            }

            if let Some(ui_manager) = ui_manager.as_mut() {
                ui_manager.draw(device, queue, encoder, window, view, |ui| {
                    control_panel(ui, &model, &mut ui_commands);
                    stats.render_overlay(ui);
                });
            }
        });

        self.pending.extend(ui_commands);
        if let Some(report) = report {
            // throughput restarts with the new grid
            if report.resized {
                self.stats.reset();
            }
            self.stats.record_frame(interval, report.steps);
        }

        if let Some((width, height)) = sim.take_canvas_request() {
            log::debug!("Requesting {width}x{height} canvas");
            if let Some(applied) = window.request_inner_size(PhysicalSize::new(width, height)) {
                engine.resize(applied.width, applied.height);
                self.pending.push(SimCommand::CanvasResized {
                    width: applied.width,
                    height: applied.height,
                });
            }
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.fatal.is_some() {
            return;
        }

        if let Err(err) = self.start(event_loop) {
            log::error!("Startup failed: {err}");
            self.fatal = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        let ui_captured = match self.ui_manager.as_mut() {
            Some(ui_manager) => {
                let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                    window_id,
                    event: event.clone(),
                };
                ui_manager.handle_input(&window, &ui_event)
            }
            None => false,
        };

        match event {
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } if !ui_captured => {
                event_loop.exit();
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.engine.resize(width, height);
                }
                self.pending.push(SimCommand::CanvasResized { width, height });
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x, position.y);
                if !ui_captured {
                    self.pending.push(SimCommand::PointerMoved {
                        x: position.x,
                        y: position.y,
                    });
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed if !ui_captured => {
                    let (x, y) = self.cursor;
                    self.pending.push(SimCommand::PointerPressed { x, y });
                }
                // releases always reach the brush so a drag never sticks
                ElementState::Released => self.pending.push(SimCommand::PointerReleased),
                _ => {}
            },
            WindowEvent::CursorLeft { .. } => {
                self.pending.push(SimCommand::PointerReleased);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
