//! Instanced cell-quad renderer
//!
//! Draws one unit quad per cell. The vertex shader reads the cell state from a
//! storage buffer and scales the quad by it, so dead cells collapse to a point
//! and are never rasterized. Row 0 sits at the bottom of the canvas.

use wgpu::util::DeviceExt;
use wgpu::{BindGroup, BindGroupLayout, Buffer, CommandEncoder, Device, RenderPipeline, TextureView};

use crate::simulation::grid::GridDimensions;
use crate::wgpu_utils::{layout_entry, storage_buffer_read_only, uniform};

/// Corners of the two triangles making up one cell, in quad space
pub const QUAD_VERTICES: [[f32; 2]; 6] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [1.0, 1.0],
    [-1.0, -1.0],
    [1.0, 1.0],
    [-1.0, 1.0],
];

/// Clip-space rectangle and color the vertex shader produces for one instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellQuad {
    pub min: [f32; 2],
    pub max: [f32; 2],
    pub color: [f32; 4],
}

impl CellQuad {
    pub fn area(&self) -> f32 {
        (self.max[0] - self.min[0]) * (self.max[1] - self.min[1])
    }
}

/// Host-side evaluation of `vs_main`/`fs_main` for instance `instance`
pub fn cell_quad(instance: u32, state: u32, dims: GridDimensions) -> CellQuad {
    let (w, h) = (dims.width() as f32, dims.height() as f32);
    let cx = (instance % dims.width()) as f32;
    let cy = (instance / dims.width()) as f32;
    let s = state as f32;

    let corner = |p: f32, cell: f32, grid: f32| (p * s + 1.0) / grid - 1.0 + cell / grid * 2.0;

    let u = cx / w;
    let v = cy / h;
    CellQuad {
        min: [corner(-1.0, cx, w), corner(-1.0, cy, h)],
        max: [corner(1.0, cx, w), corner(1.0, cy, h)],
        color: [u, v, 1.0 - u, 1.0],
    }
}

/// Render pipeline and shared geometry for the cell grid
pub struct CellRenderer {
    pipeline: RenderPipeline,
    bind_group_layout: BindGroupLayout,
    vertex_buffer: Buffer,
}

impl CellRenderer {
    /// Build the pipeline for surfaces of `format`
    pub fn new(device: &Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Cell Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/cells.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Cell Render Bind Group Layout"),
            entries: &[
                layout_entry(0, wgpu::ShaderStages::VERTEX, uniform()),
                layout_entry(1, wgpu::ShaderStages::VERTEX, storage_buffer_read_only()),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Cell Render Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Cell Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x2,
                    }],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cell Quad Vertices"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            pipeline,
            bind_group_layout,
            vertex_buffer,
        }
    }

    /// Bind group drawing `cells` with the shared `params` uniform
    pub fn create_bind_group(
        &self,
        device: &Device,
        params: wgpu::BindingResource,
        cells: &Buffer,
        label: &str,
    ) -> BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params,
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: cells.as_entire_binding(),
                },
            ],
        })
    }

    /// Clear `view` to black and draw every cell instance
    pub fn draw(
        &self,
        encoder: &mut CommandEncoder,
        view: &TextureView,
        bind_group: &BindGroup,
        dims: GridDimensions,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Cell Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..QUAD_VERTICES.len() as u32, 0..dims.cell_count() as u32);
    }
}
