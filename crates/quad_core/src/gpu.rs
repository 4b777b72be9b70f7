use anyhow::{Context, Result};
use std::sync::Arc;
use winit::window::Window;

use crate::app::{Frame, Scene};
use crate::event::SizeEvent;
use crate::overlay::FpsOverlay;
use crate::renderer::{begin_clear_pass, QuadRenderer};

/// Window surface plus the device that draws into it.
pub struct GpuContext {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    // Linear view of the surface; uniform colors are stored unencoded.
    view_format: wgpu::TextureFormat,
}

impl GpuContext {
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("Failed to find suitable GPU adapter"))?;
        tracing::info!("Using adapter: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("touchquad_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("Surface reports no supported formats"))?;
        let view_format = format.remove_srgb_suffix();
        let present_mode = if vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: if view_format != format { vec![view_format] } else { vec![] },
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        tracing::debug!("Surface format {:?}, view format {:?}", format, view_format);

        Ok(Self { surface, device, queue, config, view_format })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Format the pipelines render into. Never an sRGB format.
    pub fn format(&self) -> wgpu::TextureFormat {
        self.view_format
    }

    /// Reconfigures the surface when `size` differs from the current one.
    /// Zero-sized viewports (minimized windows) are ignored.
    pub fn resize(&mut self, size: SizeEvent) {
        if size.is_empty() {
            return;
        }
        if size.width_px != self.config.width || size.height_px != self.config.height {
            self.config.width = size.width_px;
            self.config.height = size.height_px;
            self.surface.configure(&self.device, &self.config);
            tracing::debug!("Surface reconfigured to {}x{}", size.width_px, size.height_px);
        }
    }

    fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }
}

/// The real draw context: one window surface and the quad program drawn
/// into it.
pub struct GpuScene {
    gpu: GpuContext,
    show_fps: bool,
    renderer: Option<QuadRenderer>,
    overlay: Option<FpsOverlay>,
    pending: Option<wgpu::SurfaceTexture>,
}

impl GpuScene {
    pub fn new(gpu: GpuContext, show_fps: bool) -> Self {
        Self {
            gpu,
            show_fps,
            renderer: None,
            overlay: None,
            pending: None,
        }
    }
}

impl Scene for GpuScene {
    fn on_start(&mut self, viewport: SizeEvent) -> Result<()> {
        self.gpu.resize(viewport);
        let format = self.gpu.format();
        self.renderer = Some(QuadRenderer::new(self.gpu.device(), format)?);
        if self.show_fps {
            match FpsOverlay::new(self.gpu.device(), format) {
                Ok(overlay) => self.overlay = Some(overlay),
                Err(e) => tracing::warn!("FPS overlay disabled: {:#}", e),
            }
        }
        Ok(())
    }

    fn on_paint(&mut self, frame: &Frame) -> Result<()> {
        self.gpu.resize(frame.viewport);

        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("Surface lost or outdated, skipping frame");
                self.gpu.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::debug!("Surface acquire timed out, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e).context("Failed to acquire surface texture"),
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(self.gpu.view_format),
            ..Default::default()
        });

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("touchquad_encoder") });

        match &self.renderer {
            Some(renderer) => {
                if let Some(overlay) = self.overlay.as_mut() {
                    overlay.update(&self.gpu.device, &self.gpu.queue, frame.fps, frame.viewport);
                }
                renderer.draw(&self.gpu.queue, &mut encoder, &view, &frame.uniforms, self.overlay.as_ref());
            }
            None => {
                drop(begin_clear_pass(&mut encoder, &view, "clear_only_pass"));
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        self.pending = Some(output);
        Ok(())
    }

    fn publish(&mut self) -> Result<()> {
        if let Some(output) = self.pending.take() {
            output.present();
        }
        Ok(())
    }

    fn on_stop(&mut self) {
        self.pending = None;
        if let Some(renderer) = self.renderer.take() {
            renderer.release();
        }
        if let Some(overlay) = self.overlay.take() {
            overlay.release();
        }
        tracing::debug!("GPU resources released");
    }
}
