use std::{cell::RefCell, sync::Arc};

use glam::{Mat4, Vec3};
use tracing::{info, warn};
use wgpu::{util::DeviceExt, vertex_attr_array};

use crate::viewer::{
    session::Frame,
    skeleton::{BoneIndex, MAX_BONES},
};

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.5,
    g: 0.5,
    b: 0.5,
    a: 1.0,
};

#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("Could not create surface ({0})")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("No compatible graphics adapter found")]
    NoAdapter,
    #[error("Could not request device ({0})")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("The surface is not supported by the adapter")]
    UnsupportedSurface,
}

#[derive(Clone, Copy, Default, bytemuck::NoUninit)]
#[repr(C)]
struct CameraUniform {
    projection: Mat4,
    view: Mat4,
}

/// A bind pose point of a bone line, moved on the GPU by the matrix of `bone`.
#[derive(Clone, Copy, bytemuck::NoUninit)]
#[repr(C)]
pub struct BoneVertex {
    position: Vec3,
    bone: BoneIndex,
}

impl BoneVertex {
    pub fn new(position: Vec3, bone: BoneIndex) -> Self {
        Self { position, bone }
    }

    const VERTEX_ATTR_ARRAY: &'static [wgpu::VertexAttribute] = &vertex_attr_array![
        0 => Float32x3, // position
        1 => Uint32, // bone
    ];

    const VERTEX_BUFFERS: &'static [wgpu::VertexBufferLayout<'static>] =
        &[wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: Self::VERTEX_ATTR_ARRAY,
        }];
}

struct BoneLines {
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
}

/// Owns the window surface and draws the skeleton as skinned lines.
pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: RefCell<wgpu::SurfaceConfiguration>,

    camera_buffer: wgpu::Buffer,
    bones_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,

    /// Nothing is drawn until a skeleton is uploaded.
    bone_lines: Option<BoneLines>,
}

impl Renderer {
    pub fn new(window: Arc<winit::window::Window>) -> Result<Self, RendererError> {
        let winit::dpi::PhysicalSize { width, height } = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        }))
        .ok_or(RendererError::NoAdapter)?;

        info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) =
            pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default(), None))?;

        let surface_caps = surface.get_capabilities(&adapter);

        // Find a sRGB surface format or use the first.
        let format = surface_caps
            .formats
            .iter()
            .find(|cap| cap.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(RendererError::UnsupportedSurface)?;

        let mut surface_config = surface
            .get_default_config(&adapter, width.max(1), height.max(1))
            .ok_or(RendererError::UnsupportedSurface)?;
        surface_config.format = format;
        surface_config.present_mode = wgpu::PresentMode::AutoVsync;

        surface.configure(&device, &surface_config);

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera_uniform"),
            contents: bytemuck::bytes_of(&CameraUniform::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bones_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("bone_transforms"),
            contents: bytemuck::cast_slice(&[Mat4::IDENTITY; MAX_BONES]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bones_bind_group_layout"),
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
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bones_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: bones_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline = {
            let module = device.create_shader_module(wgpu::include_wgsl!("bones.wgsl"));

            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("bones_pipeline_layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("bones_render_pipeline"),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: None,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    buffers: BoneVertex::VERTEX_BUFFERS,
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::LineList,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: None,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                multiview: None,
                cache: None,
            })
        };

        Ok(Self {
            device,
            queue,
            surface,
            surface_config: RefCell::new(surface_config),
            camera_buffer,
            bones_buffer,
            bind_group,
            pipeline,
            bone_lines: None,
        })
    }

    /// Replace the lines drawn for the skeleton. Every pair of vertices is one line.
    pub fn set_bone_lines(&mut self, vertices: &[BoneVertex]) {
        if vertices.is_empty() {
            self.bone_lines = None;
            return;
        }

        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("bone_lines_vertex_buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        self.bone_lines = Some(BoneLines {
            vertex_buffer,
            vertex_count: vertices.len() as u32,
        });
    }

    pub fn resize(&self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        let mut surface_config = self.surface_config.borrow_mut();
        surface_config.width = width;
        surface_config.height = height;

        self.surface.configure(&self.device, &surface_config);
    }

    /// Upload the frame's matrices and draw the skinned bone lines over a cleared surface.
    pub fn render(&self, frame: &Frame) {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(err) => {
                warn!("Skipping frame, could not get surface texture ({err})");
                self.surface
                    .configure(&self.device, &self.surface_config.borrow());
                return;
            }
        };

        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&CameraUniform {
                projection: frame.projection,
                view: frame.view,
            }),
        );

        // Nothing to skin, leave the bone uniform as it is.
        if !frame.bones.is_empty() {
            let count = frame.bones.len().min(MAX_BONES);
            self.queue.write_buffer(
                &self.bones_buffer,
                0,
                bytemuck::cast_slice(&frame.bones[..count]),
            );
        }

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("main command encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("bones_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(bone_lines) = &self.bone_lines {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_bind_group(0, &self.bind_group, &[]);
                render_pass.set_vertex_buffer(0, bone_lines.vertex_buffer.slice(..));
                render_pass.draw(0..bone_lines.vertex_count, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));

        output.present();
    }
}
