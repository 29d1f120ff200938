//! GPU buffer management for particle systems.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// Per-system render parameters uniform.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SpriteParams {
    /// x = point-sprite diameter in pixels, yzw = padding.
    pub point_size: [f32; 4],
}

impl Default for SpriteParams {
    fn default() -> Self {
        Self {
            point_size: [1.0, 0.0, 0.0, 0.0],
        }
    }
}

/// GPU-resident mirror of a particle system's flat CPU buffers.
///
/// Both vertex buffers are allocated once, sized for the system's fixed
/// pool, and overwritten in full every frame.
pub struct ParticleGpuResources {
    /// Instance-stepped position buffer (3 floats per particle).
    pub position_buffer: wgpu::Buffer,
    /// Instance-stepped color buffer (4 floats per particle).
    pub color_buffer: wgpu::Buffer,
    /// Per-system sprite params uniform.
    pub params_buffer: wgpu::Buffer,
    /// Bind group exposing the sprite params to the render pipeline.
    pub params_bind_group: wgpu::BindGroup,
    /// Number of particles the buffers were sized for.
    pub capacity: u32,
}

impl ParticleGpuResources {
    /// Allocate GPU buffers seeded with the current CPU-side contents.
    pub fn new(
        device: &wgpu::Device,
        params_layout: &wgpu::BindGroupLayout,
        positions: &[f32],
        colors: &[f32],
    ) -> Self {
        let position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Position Buffer"),
            contents: bytemuck::cast_slice(positions),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let color_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Color Buffer"),
            contents: bytemuck::cast_slice(colors),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Sprite Params Buffer"),
            contents: bytemuck::cast_slice(&[SpriteParams::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let params_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Sprite Params Bind Group"),
            layout: params_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: params_buffer.as_entire_binding(),
            }],
        });

        Self {
            position_buffer,
            color_buffer,
            params_buffer,
            params_bind_group,
            capacity: (positions.len() / 3) as u32,
        }
    }

    /// Overwrite both vertex buffers in full.
    ///
    /// `write_buffer` stages the data through the queue's upload belt, the
    /// streaming equivalent of GL buffer orphaning: the previous contents
    /// are never read back or partially patched.
    pub fn upload(&self, queue: &wgpu::Queue, positions: &[f32], colors: &[f32]) {
        queue.write_buffer(&self.position_buffer, 0, bytemuck::cast_slice(positions));
        queue.write_buffer(&self.color_buffer, 0, bytemuck::cast_slice(colors));
    }

    /// Rewrite the per-system sprite params.
    pub fn write_params(&self, queue: &wgpu::Queue, params: SpriteParams) {
        queue.write_buffer(&self.params_buffer, 0, bytemuck::cast_slice(&[params]));
    }
}
