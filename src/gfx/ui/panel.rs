use imgui::Ui;

use crate::config::{MAX_BRUSH_SIZE, MAX_PIXEL_SCALE_EXPONENT, RATE_EXPONENT_RANGE};
use crate::performance::FrameMetrics;
use crate::simulation::commands::SimCommand;
use crate::simulation::manager::LifeSimulation;

/// Largest grid side offered by the sliders
pub const UI_MAX_GRID_SIDE: u32 = 1024;

/// What the panel shows for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct PanelModel {
    pub grid_width: u32,
    pub grid_height: u32,
    pub pixel_scale_exponent: u32,
    pub rate_exponent: i32,
    pub brush_size: u32,
    pub generation: u64,
    pub metrics: FrameMetrics,
    pub rejection: Option<String>,
    pub backend: String,
}

impl PanelModel {
    pub fn from_simulation<C>(sim: &LifeSimulation<C>, metrics: FrameMetrics, backend: &str) -> Self {
        let dims = sim.dims();
        Self {
            grid_width: dims.width(),
            grid_height: dims.height(),
            pixel_scale_exponent: sim.pixel_scale_exponent(),
            rate_exponent: sim.rate_exponent(),
            brush_size: sim.brush_size(),
            generation: sim.generation(),
            metrics,
            rejection: sim.last_rejection().map(str::to_owned),
            backend: backend.to_owned(),
        }
    }

    /// Steps per frame as shown next to the rate slider
    pub fn rate_label(&self) -> String {
        let rate = 2f64.powi(self.rate_exponent);
        if rate >= 1.0 {
            format!("{rate:.0} steps/frame")
        } else {
            format!("1 step every {:.0} frames", 1.0 / rate)
        }
    }
}

/// Control panel; widget edits become [`SimCommand`]s pushed onto `commands`
pub fn control_panel(ui: &Ui, model: &PanelModel, commands: &mut Vec<SimCommand>) {
    ui.window("Life")
        .size([320.0, 260.0], imgui::Condition::FirstUseEver)
        .position([10.0, 10.0], imgui::Condition::FirstUseEver)
        .bg_alpha(0.8)
        .build(|| {
            ui.text(format!("Generation: {}", model.generation));
            ui.text(format!(
                "Grid: {}x{} on {}",
                model.grid_width, model.grid_height, model.backend
            ));
            ui.text(format!(
                "FPS: {:.0}   Steps/s: {:.1}",
                model.metrics.fps, model.metrics.steps_per_second
            ));
            ui.separator();

            let mut width = model.grid_width.min(UI_MAX_GRID_SIDE);
            let mut height = model.grid_height.min(UI_MAX_GRID_SIDE);
            let width_changed = ui.slider("Width", 1, UI_MAX_GRID_SIDE, &mut width);
            let height_changed = ui.slider("Height", 1, UI_MAX_GRID_SIDE, &mut height);
            if width_changed || height_changed {
                commands.push(SimCommand::ResizeRequested { width, height });
            }

            let mut pixel_exponent = model.pixel_scale_exponent;
            if ui.slider("Cell px (2^n)", 0, MAX_PIXEL_SCALE_EXPONENT, &mut pixel_exponent) {
                commands.push(SimCommand::PixelScaleChanged {
                    exponent: pixel_exponent,
                });
            }

            let mut rate_exponent = model.rate_exponent;
            let (min_rate, max_rate) = RATE_EXPONENT_RANGE;
            if ui.slider("Rate (2^n)", min_rate, max_rate, &mut rate_exponent) {
                commands.push(SimCommand::RateChanged {
                    exponent: rate_exponent,
                });
            }
            ui.text_disabled(model.rate_label());

            let mut brush_size = model.brush_size;
            if ui.slider("Brush", 0, MAX_BRUSH_SIZE, &mut brush_size) {
                commands.push(SimCommand::BrushSizeChanged { size: brush_size });
            }

            if let Some(reason) = &model.rejection {
                ui.separator();
                ui.text_colored([1.0, 0.4, 0.4, 1.0], format!("Resize rejected: {reason}"));
            }
        });
}
