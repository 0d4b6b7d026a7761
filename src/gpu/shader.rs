//! GPU-side layouts for the particle pipeline.

use crate::particle::VisualState;
use crate::space::Space;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;

pub const PARTICLE_SHADER: &str = include_str!("particle.wgsl");

/// One instanced quad. Zeroed instances have scale 0 and draw nothing.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Instance {
    pub position: [f32; 3],
    pub scale: f32,
    pub color: [f32; 3],
    pub opacity: f32,
}

impl Instance {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32,
        2 => Float32x3,
        3 => Float32,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Instance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

impl<V: Space> From<&VisualState<V>> for Instance {
    fn from(state: &VisualState<V>) -> Self {
        Self {
            position: state.position.to_vec3().to_array(),
            scale: state.scale,
            color: state.color.to_vec3().to_array(),
            opacity: state.opacity,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    pub model_view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub radius: f32,
    pub fog_near: f32,
    pub fog_far: f32,
    /// 1.0 to apply fog, 0.0 to skip it.
    pub fog_enabled: f32,
}

impl Uniforms {
    pub fn new(model_view: Mat4, proj: Mat4, radius: f32) -> Self {
        Self {
            model_view: model_view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            radius,
            fog_near: 0.0,
            fog_far: 0.0,
            fog_enabled: 0.0,
        }
    }

    pub fn with_fog(mut self, near: f32, far: f32) -> Self {
        self.fog_near = near;
        self.fog_far = far;
        self.fog_enabled = 1.0;
        self
    }
}
