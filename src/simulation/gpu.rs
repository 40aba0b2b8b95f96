//! wgpu compute backend
//!
//! Each cell buffer carries two bind groups: one that steps from it into its
//! sibling and one that draws it. Steps and the render pass are recorded into
//! the caller's frame encoder, so queue order alone orders every step before
//! the frame's draw.

use wgpu::util::DeviceExt;
use wgpu::{BindGroup, BindGroupLayout, Buffer, CommandEncoder, ComputePipeline, Device, Queue, TextureView};

use super::brush::BrushState;
use super::grid::{GridDimensions, PingPong};
use super::traits::GridBackend;
use crate::error::{LifeError, LifeResult};
use crate::gfx::rendering::CellRenderer;
use crate::wgpu_utils::{layout_entry, storage_buffer_read_only, storage_buffer_read_write, uniform, UniformBuffer};

/// Threads per workgroup along each axis of `step_main`
pub const WORKGROUP_SIZE: u32 = 8;

/// Uniform block shared by the step and draw shaders
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SimParams {
    pub size: [u32; 2],
    pub brush_center: [i32; 2],
    pub brush_radius_sq: i32,
    pub brush_active: u32,
    pub _padding: [u32; 2],
}

impl SimParams {
    pub fn new(dims: GridDimensions, brush: &BrushState) -> Self {
        Self {
            size: [dims.width(), dims.height()],
            brush_center: [brush.center_x, brush.center_y],
            brush_radius_sq: brush.radius_squared,
            brush_active: brush.active as u32,
            _padding: [0; 2],
        }
    }
}

/// Workgroups needed to cover every cell, rounding up
pub fn workgroup_count(dims: GridDimensions) -> (u32, u32) {
    (
        dims.width().div_ceil(WORKGROUP_SIZE),
        dims.height().div_ceil(WORKGROUP_SIZE),
    )
}

/// One GPU cell buffer and the bind groups that reference it
pub struct GpuCells {
    buffer: Buffer,
    step_bind_group: BindGroup,
    draw_bind_group: BindGroup,
}

impl GpuCells {
    /// Storage buffer holding one `u32` state per cell
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }
}

/// Long-lived pipelines and the parameter uniform
pub struct GpuLife {
    step_pipeline: ComputePipeline,
    step_layout: BindGroupLayout,
    params: UniformBuffer<SimParams>,
    renderer: CellRenderer,
    max_buffer_bytes: u64,
}

impl GpuLife {
    /// Build the compute and render pipelines for surfaces of `format`
    pub fn new(device: &Device, format: wgpu::TextureFormat) -> Self {
        let step_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Life Step Bind Group Layout"),
            entries: &[
                layout_entry(0, wgpu::ShaderStages::COMPUTE, uniform()),
                layout_entry(1, wgpu::ShaderStages::COMPUTE, storage_buffer_read_only()),
                layout_entry(2, wgpu::ShaderStages::COMPUTE, storage_buffer_read_write()),
            ],
        });

        let step_pipeline = create_compute_pipeline(
            device,
            include_str!("../gfx/shaders/life_step.wgsl"),
            "step_main",
            &step_layout,
        );

        let limits = device.limits();
        let max_buffer_bytes =
            (limits.max_storage_buffer_binding_size as u64).min(limits.max_buffer_size);

        Self {
            step_pipeline,
            step_layout,
            params: UniformBuffer::new(device),
            renderer: CellRenderer::new(device, format),
            max_buffer_bytes,
        }
    }

    fn step_bind_group(&self, device: &Device, read: &Buffer, write: &Buffer, label: &str) -> BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.step_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.params.binding_resource(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: read.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: write.as_entire_binding(),
                },
            ],
        })
    }
}

fn create_compute_pipeline(
    device: &Device,
    shader_source: &str,
    entry_point: &str,
    bind_group_layout: &BindGroupLayout,
) -> ComputePipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Life Step Shader"),
        source: wgpu::ShaderSource::Wgsl(shader_source.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Life Step Pipeline Layout"),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some("Life Step Pipeline"),
        layout: Some(&pipeline_layout),
        module: &shader,
        entry_point: Some(entry_point),
        compilation_options: Default::default(),
        cache: None,
    })
}

/// Encoder and surface view for the frame being recorded
pub struct FrameTarget<'a> {
    pub encoder: &'a mut CommandEncoder,
    pub view: &'a TextureView,
}

/// [`GpuLife`] borrowed together with the device for one frame
///
/// Built with a [`FrameTarget`] inside the surface frame so steps and the draw
/// are recorded into that frame's encoder, or with [`GpuFrame::setup`] for the
/// initial allocation, which never records passes.
pub struct GpuFrame<'a> {
    life: &'a mut GpuLife,
    device: &'a Device,
    queue: &'a Queue,
    target: Option<FrameTarget<'a>>,
}

impl<'a> GpuFrame<'a> {
    pub fn new(life: &'a mut GpuLife, device: &'a Device, queue: &'a Queue, target: FrameTarget<'a>) -> Self {
        Self {
            life,
            device,
            queue,
            target: Some(target),
        }
    }

    pub fn setup(life: &'a mut GpuLife, device: &'a Device, queue: &'a Queue) -> Self {
        Self {
            life,
            device,
            queue,
            target: None,
        }
    }

    fn storage_buffer(&self, dims: GridDimensions, contents: Option<&[u32]>, label: &str) -> Buffer {
        let usage = wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC;
        match contents {
            Some(cells) => self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(cells),
                usage,
            }),
            // wgpu zero-initializes buffers created without contents
            None => self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: dims.byte_size(),
                usage,
                mapped_at_creation: false,
            }),
        }
    }
}

impl GridBackend for GpuFrame<'_> {
    type Cells = GpuCells;

    fn allocate(&mut self, dims: GridDimensions, seed: &[u32]) -> LifeResult<PingPong<GpuCells>> {
        let limit = self.life.max_buffer_bytes;
        if dims.byte_size() > limit {
            return Err(LifeError::GridTooLarge {
                cells: dims.cell_count() as u64,
                bytes: dims.byte_size(),
                limit,
            });
        }

        let a = self.storage_buffer(dims, Some(seed), "Cell State A");
        let b = self.storage_buffer(dims, None, "Cell State B");

        let life = &*self.life;
        let step_a = life.step_bind_group(self.device, &a, &b, "Life Step A->B");
        let step_b = life.step_bind_group(self.device, &b, &a, "Life Step B->A");
        let draw_a = life
            .renderer
            .create_bind_group(self.device, life.params.binding_resource(), &a, "Cell Draw A");
        let draw_b = life
            .renderer
            .create_bind_group(self.device, life.params.binding_resource(), &b, "Cell Draw B");

        let cells_a = GpuCells {
            buffer: a,
            step_bind_group: step_a,
            draw_bind_group: draw_a,
        };
        let cells_b = GpuCells {
            buffer: b,
            step_bind_group: step_b,
            draw_bind_group: draw_b,
        };

        log::debug!(
            "Allocated two {} byte cell buffers for {}x{}",
            dims.byte_size(),
            dims.width(),
            dims.height()
        );
        Ok(PingPong::new(cells_a, cells_b))
    }

    fn prepare(&mut self, dims: GridDimensions, brush: &BrushState) {
        self.life.params.update_content(self.queue, SimParams::new(dims, brush));
    }

    fn step(&mut self, dims: GridDimensions, cells: &mut PingPong<GpuCells>) {
        let Some(target) = self.target.as_mut() else {
            log::error!("Step requested outside of a frame");
            return;
        };

        let (groups_x, groups_y) = workgroup_count(dims);
        let mut pass = target.encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Life Step Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.life.step_pipeline);
        pass.set_bind_group(0, &cells.active().step_bind_group, &[]);
        pass.dispatch_workgroups(groups_x, groups_y, 1);
    }

    fn render(&mut self, dims: GridDimensions, active: &GpuCells) {
        let Some(target) = self.target.as_mut() else {
            log::error!("Render requested outside of a frame");
            return;
        };
        self.life
            .renderer
            .draw(target.encoder, target.view, &active.draw_bind_group, dims);
    }

    fn release(&mut self, cells: PingPong<GpuCells>) {
        let (a, b) = cells.into_inner();
        a.buffer.destroy();
        b.buffer.destroy();
    }

    fn name(&self) -> &str {
        "wgpu"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_layout_matches_shader() {
        assert_eq!(std::mem::size_of::<SimParams>(), 32);
        assert_eq!(std::mem::size_of::<SimParams>() % 16, 0);
    }

    #[test]
    fn test_params_from_brush() {
        let dims = GridDimensions::new(40, 30).unwrap();
        let brush = BrushState {
            active: true,
            center_x: 7,
            center_y: 29,
            radius_squared: 9,
        };
        let params = SimParams::new(dims, &brush);
        assert_eq!(params.size, [40, 30]);
        assert_eq!(params.brush_center, [7, 29]);
        assert_eq!(params.brush_radius_sq, 9);
        assert_eq!(params.brush_active, 1);

        let idle = SimParams::new(dims, &BrushState::default());
        assert_eq!(idle.brush_active, 0);
    }

    #[test]
    fn test_workgroups_cover_partial_tiles() {
        assert_eq!(workgroup_count(GridDimensions::new(64, 64).unwrap()), (8, 8));
        assert_eq!(workgroup_count(GridDimensions::new(65, 1).unwrap()), (9, 1));
        assert_eq!(workgroup_count(GridDimensions::new(1, 9).unwrap()), (1, 2));
    }
}
