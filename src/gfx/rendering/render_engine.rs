//! Surface, device and per-frame submission
//!
//! Owns the wgpu device and the window surface. Everything drawn in a frame is
//! recorded into a single command encoder and submitted once, so the order in
//! which passes are recorded is the order the GPU runs them.

use std::sync::Arc;
use wgpu::{Device, Queue, TextureFormat};

use crate::config::clamp_canvas;
use crate::error::{LifeError, LifeResult};

/// Capabilities the compute step and the storage-reading vertex shader need
const REQUIRED_DOWNLEVEL: wgpu::DownlevelFlags =
    wgpu::DownlevelFlags::COMPUTE_SHADERS.union(wgpu::DownlevelFlags::VERTEX_STORAGE);

/// Core rendering engine managing the surface and submitting frames
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<Device>,
    queue: Arc<Queue>,
    config: wgpu::SurfaceConfiguration,
    format: TextureFormat,
    adapter_name: String,
    /// Largest surface side the device accepts
    max_surface_side: u32,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// # Arguments
    /// * `window` - Window surface target for rendering
    /// * `width` - Initial surface width in pixels
    /// * `height` - Initial surface height in pixels
    ///
    /// # Errors
    /// Returns [`LifeError::UnsupportedPlatform`] when no adapter is available or
    /// the adapter cannot run compute shaders.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> LifeResult<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .map_err(|err| LifeError::UnsupportedPlatform(format!("cannot create surface: {err}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|err| LifeError::UnsupportedPlatform(format!("no GPU adapter: {err}")))?;

        let info = adapter.get_info();
        let downlevel = adapter.get_downlevel_capabilities();
        if !downlevel.flags.contains(REQUIRED_DOWNLEVEL) {
            return Err(LifeError::UnsupportedPlatform(format!(
                "{} ({:?}) lacks compute shader support",
                info.name, info.backend
            )));
        }

        let adapter_limits = adapter.limits();
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Life Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits {
                    max_storage_buffer_binding_size: adapter_limits.max_storage_buffer_binding_size,
                    max_buffer_size: adapter_limits.max_buffer_size,
                    max_texture_dimension_2d: adapter_limits.max_texture_dimension_2d,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|err| LifeError::UnsupportedPlatform(format!("cannot open device: {err}")))?;

        device.on_uncaptured_error(Box::new(|err| {
            log::error!("Uncaptured wgpu error: {err}");
        }));

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| LifeError::UnsupportedPlatform("surface has no formats".into()))?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let max_surface_side = device.limits().max_texture_dimension_2d;
        let (width, height) = clamp_canvas((width.max(1), height.max(1)), max_surface_side);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        log::info!("Using {} ({:?}), surface format {:?}", info.name, info.backend, format);

        Ok(RenderEngine {
            surface,
            device: Arc::new(device),
            queue: Arc::new(queue),
            config,
            format,
            adapter_name: info.name,
            max_surface_side,
        })
    }

    /// Records and presents one frame
    ///
    /// `record` receives a fresh encoder and the surface view; whatever it
    /// records is submitted in a single batch. Returns `false` when the frame
    /// was skipped because the surface had to be reconfigured.
    pub fn render_frame<F>(&mut self, record: F) -> bool
    where
        F: FnOnce(&Device, &Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return false;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface texture timed out, skipping frame");
                return false;
            }
            Err(err) => {
                log::error!("Cannot acquire surface texture: {err}");
                return false;
            }
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        record(&self.device, &self.queue, &mut encoder, &surface_texture_view);

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        true
    }

    /// Reconfigures the surface; zero sizes (minimized windows) are ignored
    ///
    /// Sizes above the device texture limit are scaled down to fit, keeping the
    /// aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let (width, height) = clamp_canvas((width, height), self.max_surface_side);
        if (width, height) != (self.config.width, self.config.height) {
            log::debug!("Surface resized to {width}x{height}");
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> TextureFormat {
        self.format
    }

    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    pub fn max_surface_side(&self) -> u32 {
        self.max_surface_side
    }
}
