use anyhow::Result;
use glam::{Vec2, Vec4};
use wgpu::util::DeviceExt;

use crate::overlay::FpsOverlay;

pub const COORDS_PER_VERTEX: usize = 3;
pub const VERTEX_COUNT: u32 = 4;

/// Fixed quad in clip space, laid out for a triangle strip.
pub const QUAD_VERTICES: [QuadVertex; VERTEX_COUNT as usize] = [
    QuadVertex { position: [0.0, 0.4, 0.0] }, // top left
    QuadVertex { position: [0.4, 0.4, 0.0] }, // top right
    QuadVertex { position: [0.0, 0.0, 0.0] }, // bottom left
    QuadVertex { position: [0.4, 0.0, 0.0] }, // bottom right
];

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color::WHITE;

const VERTEX_SHADER: &str = include_str!("shaders/quad.vert.wgsl");
const FRAGMENT_SHADER: &str = include_str!("shaders/quad.frag.wgsl");

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; COORDS_PER_VERTEX],
}

impl QuadVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            }],
        }
    }
}

/// Per-draw shader constants. Layout matches `struct Quad` in both shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadUniforms {
    pub color: [f32; 4],
    /// Pointer position as a fraction of the viewport, origin top-left.
    pub offset: [f32; 2],
    pub _pad: [f32; 2],
}

impl QuadUniforms {
    pub fn new(color: Vec4, offset: Vec2) -> Self {
        Self {
            color: color.to_array(),
            offset: offset.to_array(),
            _pad: [0.0; 2],
        }
    }
}

/// The GPU program plus the static vertex strip it draws.
pub struct QuadRenderer {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
}

impl QuadRenderer {
    /// Builds the program from the two fixed shader sources and uploads the
    /// vertex strip. Shader or pipeline validation failures come back as
    /// errors instead of reaching the device's uncaptured-error handler.
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Result<Self> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let renderer = Self::build(device, format);
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(anyhow::anyhow!("error creating GPU program: {}", err));
        }
        tracing::debug!("Quad program created for {:?}", format);
        Ok(renderer)
    }

    fn build(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let vertex_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("quad_vertex_shader"),
            source: wgpu::ShaderSource::Wgsl(VERTEX_SHADER.into()),
        });
        let fragment_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("quad_fragment_shader"),
            source: wgpu::ShaderSource::Wgsl(FRAGMENT_SHADER.into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("quad_uniform_buffer"),
            size: std::mem::size_of::<QuadUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("quad_uniform_bind_group_layout"),
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("quad_uniform_bind_group"),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("quad_pipeline_layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("quad_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_shader,
                entry_point: Some("vs_main"),
                buffers: &[QuadVertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vertex_buffer"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            pipeline,
            vertex_buffer,
            uniform_buffer,
            uniform_bind_group,
        }
    }

    /// Records one frame into `view`: white clear, the quad, then the FPS
    /// overlay when one is supplied.
    pub fn draw(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        uniforms: &QuadUniforms,
        overlay: Option<&FpsOverlay>,
    ) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));

        let mut pass = begin_clear_pass(encoder, view, "quad_render_pass");
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..VERTEX_COUNT, 0..1);

        if let Some(overlay) = overlay {
            overlay.draw(&mut pass);
        }
    }

    pub fn release(self) {
        self.vertex_buffer.destroy();
        self.uniform_buffer.destroy();
    }
}

/// Starts a render pass that clears `view` to the background color.
pub fn begin_clear_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    label: &str,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        occlusion_query_set: None,
        timestamp_writes: None,
    })
}
