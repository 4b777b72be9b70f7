use anyhow::Result;

use crate::event::SizeEvent;
use crate::fps::{rasterize_fps, FpsRaster};

/// Distance from the window edges, in points.
const INSET_PT: f32 = 8.0;
/// Raster pixels per point; the 4x6 font is unreadable at 1:1.
const RASTER_SCALE: f32 = 2.0;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct OverlayUniforms {
    rect: [f32; 4],
}

/// Clip-space rectangle `[x, y, w, h]` (bottom-left origin) for a raster of
/// `raster_w` x `raster_h` pixels anchored to the bottom-left of `viewport`.
pub fn overlay_rect(raster_w: u32, raster_h: u32, viewport: SizeEvent) -> [f32; 4] {
    if viewport.is_empty() {
        return [0.0; 4];
    }
    let ppt = viewport.pixels_per_pt.max(1.0);
    let vw = viewport.width_px as f32;
    let vh = viewport.height_px as f32;
    let w_px = raster_w as f32 * RASTER_SCALE * ppt;
    let h_px = raster_h as f32 * RASTER_SCALE * ppt;
    let inset = INSET_PT * ppt;
    [
        -1.0 + 2.0 * inset / vw,
        -1.0 + 2.0 * inset / vh,
        2.0 * w_px / vw,
        2.0 * h_px / vh,
    ]
}

struct RasterTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

/// GPU side of the frame-rate readout: a texture holding the latest raster
/// and a pipeline that blends it over the frame.
pub struct FpsOverlay {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
    raster: Option<RasterTexture>,
    shown_fps: Option<u32>,
}

impl FpsOverlay {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Result<Self> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let overlay = Self::build(device, format);
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(anyhow::anyhow!("error creating FPS overlay: {}", err));
        }
        Ok(overlay)
    }

    fn build(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("fps_overlay_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/overlay.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("fps_overlay_bind_group_layout"),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("fps_overlay_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("fps_overlay_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("fps_overlay_uniform_buffer"),
            size: std::mem::size_of::<OverlayUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Nearest keeps the bitmap font crisp when scaled up.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            pipeline,
            bind_group_layout,
            uniform_buffer,
            sampler,
            raster: None,
            shown_fps: None,
        }
    }

    /// Re-rasterizes when the reading changed and repositions for `viewport`.
    pub fn update(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, fps: u32, viewport: SizeEvent) {
        if self.shown_fps != Some(fps) {
            let raster = rasterize_fps(fps);
            self.upload(device, queue, &raster);
            self.shown_fps = Some(fps);
        }
        if let Some(r) = &self.raster {
            let uniforms = OverlayUniforms { rect: overlay_rect(r.width, r.height, viewport) };
            queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        }
    }

    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, raster: &FpsRaster) {
        let reuse = matches!(&self.raster, Some(r) if r.width == raster.width && r.height == raster.height);
        if !reuse {
            if let Some(old) = self.raster.take() {
                old.texture.destroy();
            }
            self.raster = Some(self.create_texture(device, raster.width, raster.height));
        }
        if let Some(r) = &self.raster {
            queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture: &r.texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &raster.rgba,
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(raster.width * 4),
                    rows_per_image: Some(raster.height),
                },
                wgpu::Extent3d { width: raster.width, height: raster.height, depth_or_array_layers: 1 },
            );
        }
    }

    fn create_texture(&self, device: &wgpu::Device, width: u32, height: u32) -> RasterTexture {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("fps_overlay_texture"),
            size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: self.uniform_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(&view) },
                wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::Sampler(&self.sampler) },
            ],
            label: Some("fps_overlay_bind_group"),
        });
        RasterTexture { texture, bind_group, width, height }
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if let Some(r) = &self.raster {
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &r.bind_group, &[]);
            pass.draw(0..4, 0..1);
        }
    }

    pub fn release(mut self) {
        if let Some(r) = self.raster.take() {
            r.texture.destroy();
        }
        self.uniform_buffer.destroy();
    }
}
