//! wgpu render adapter: every particle is one instanced, camera-facing disc.
//!
//! Particles that hold a [`RenderHandle`] keep a fixed slot in the instance
//! buffer; particles without one are appended after the slots each frame.
//! The whole buffer is rewritten once per frame in `end_frame`.

mod shader;

use std::sync::Arc;

use glam::Mat4;
use winit::window::Window;

use crate::camera::Camera;
use crate::config::Fog;
use crate::error::GpuError;
use crate::particle::VisualState;
use crate::render::{RenderAdapter, RenderHandle, SlotPool};
use crate::space::Space;

pub use shader::{Instance, Uniforms, PARTICLE_SHADER};

const INITIAL_CAPACITY: usize = 1024;

/// How particle coordinates map to the screen.
#[derive(Debug, Clone)]
pub enum Projection {
    /// Window pixels, origin top-left, y down.
    Canvas,
    /// Perspective camera with a slowly spinning scene and distance fog.
    Scene { camera: Camera, fog: Fog },
}

impl Projection {
    /// `(model_view, projection)` for a `width` x `height` target after `frame` ticks.
    pub fn matrices(&self, width: f32, height: f32, frame: u64) -> (Mat4, Mat4) {
        match self {
            Projection::Canvas => (
                Mat4::IDENTITY,
                Mat4::orthographic_rh(0.0, width.max(1.0), height.max(1.0), 0.0, -1.0, 1.0),
            ),
            Projection::Scene { camera, .. } => (
                camera.view_matrix() * camera.scene_rotation(frame),
                camera.projection_matrix(width / height.max(1.0)),
            ),
        }
    }

    fn uniforms(&self, width: f32, height: f32, frame: u64, radius: f32) -> Uniforms {
        let (model_view, proj) = self.matrices(width, height, frame);
        let uniforms = Uniforms::new(model_view, proj, radius);
        match self {
            Projection::Canvas => uniforms,
            Projection::Scene { fog, .. } => uniforms.with_fog(fog.near, fog.far),
        }
    }
}

pub struct GpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    slots: SlotPool,
    /// Slot-indexed instances for this frame.
    staged: Vec<Instance>,
    /// Instances drawn without a handle this frame.
    transient: Vec<Instance>,
    projection: Projection,
    radius: f32,
    frame: u64,
}

impl GpuRenderer {
    pub async fn new(
        window: Arc<Window>,
        projection: Projection,
        radius: f32,
        vsync: bool,
    ) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("using GPU adapter {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        // Palette colors are already sRGB encoded, so prefer a non-sRGB target
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniform Buffer"),
            size: std::mem::size_of::<Uniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Uniform Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(PARTICLE_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Instance::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
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

        let instance_buffer = create_instance_buffer(&device, INITIAL_CAPACITY);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            instance_buffer,
            instance_capacity: INITIAL_CAPACITY,
            slots: SlotPool::new(),
            staged: Vec::new(),
            transient: Vec::new(),
            projection,
            radius,
            frame: 0,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Handles currently handed out.
    pub fn live_handles(&self) -> usize {
        self.slots.live()
    }

    fn ensure_capacity(&mut self, needed: usize) {
        if needed <= self.instance_capacity {
            return;
        }
        let capacity = needed.next_power_of_two();
        log::debug!("growing instance buffer {} -> {}", self.instance_capacity, capacity);
        self.instance_buffer = create_instance_buffer(&self.device, capacity);
        self.instance_capacity = capacity;
    }

    fn present(&mut self) -> Result<(), wgpu::SurfaceError> {
        let (width, height) = (self.config.width as f32, self.config.height as f32);
        let uniforms = self.projection.uniforms(width, height, self.frame, self.radius);
        self.queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let mut instances = std::mem::take(&mut self.staged);
        instances.append(&mut self.transient);
        self.ensure_capacity(instances.len());
        if !instances.is_empty() {
            self.queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }
        let count = instances.len() as u32;
        self.staged = instances;

        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if count > 0 {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
                render_pass.draw(0..6, 0..count);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

impl<V: Space> RenderAdapter<V> for GpuRenderer {
    fn acquire(&mut self, _state: &VisualState<V>) -> Option<RenderHandle> {
        Some(self.slots.acquire())
    }

    fn release(&mut self, handle: RenderHandle) {
        let slot = handle.slot();
        if !self.slots.release(handle) {
            log::warn!("render slot {slot} released but not in use");
        }
    }

    fn begin_frame(&mut self) {
        self.staged.clear();
        self.staged.resize(self.slots.high_water(), Instance::default());
        self.transient.clear();
    }

    fn draw(&mut self, handle: Option<&RenderHandle>, state: &VisualState<V>) {
        let instance = Instance::from(state);
        match handle.and_then(|h| self.staged.get_mut(h.slot() as usize)) {
            Some(slot) => *slot = instance,
            None => self.transient.push(instance),
        }
    }

    fn end_frame(&mut self) {
        match self.present() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost; reconfiguring");
                self.surface.configure(&self.device, &self.config);
            }
            Err(wgpu::SurfaceError::Timeout) => log::warn!("surface timeout; frame dropped"),
            Err(e) => log::error!("render error: {e}"),
        }
        self.frame += 1;
    }
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Instance Buffer"),
        size: (capacity * std::mem::size_of::<Instance>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
