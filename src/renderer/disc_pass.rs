//! The single instanced draw that renders every item card.

use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::geometry::{Geometry, GpuVertex};
use crate::gpu::atlas_texture::AtlasTexture;
use crate::gpu::pipeline_helpers::{
    atlas_sampler, create_depth_view, depth_stencil_state, filtering_sampler,
    texture_2d, uniform_buffer,
};
use crate::gpu::render_context::RenderContext;

/// WGSL source of the card pipeline.
pub const DISC_SHADER: &str = include_str!("../../assets/shaders/disc.wgsl");

/// Per-frame uniforms, laid out to match `MenuUniforms` in the shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MenuUniform {
    /// Whole-sphere transform (identity for the menu).
    pub world: [[f32; 4]; 4],
    /// Camera view matrix.
    pub view: [[f32; 4]; 4],
    /// Camera projection matrix.
    pub projection: [[f32; 4]; 4],
    /// Eye position.
    pub camera_position: [f32; 3],
    /// Nominal frames elapsed since start.
    pub frames: f32,
    /// Spin axis in xyz, spin velocity in w.
    pub rotation_axis_velocity: [f32; 4],
    /// Number of distinct items.
    pub item_count: u32,
    /// Atlas cells per side.
    pub atlas_size: u32,
    /// The `scale` option, the camera distance multiplier.
    pub scale_factor: f32,
    pub(crate) _pad: f32,
}

impl Default for MenuUniform {
    fn default() -> Self {
        Self {
            world: Mat4::IDENTITY.to_cols_array_2d(),
            view: Mat4::IDENTITY.to_cols_array_2d(),
            projection: Mat4::IDENTITY.to_cols_array_2d(),
            camera_position: [0.0, 0.0, 3.0],
            frames: 0.0,
            rotation_axis_velocity: [1.0, 0.0, 0.0, 0.0],
            item_count: 1,
            atlas_size: 1,
            scale_factor: 1.0,
            _pad: 0.0,
        }
    }
}

impl MenuUniform {
    /// Set the camera-derived fields.
    pub fn set_camera(&mut self, view: Mat4, projection: Mat4, eye: Vec3) {
        self.view = view.to_cols_array_2d();
        self.projection = projection.to_cols_array_2d();
        self.camera_position = eye.to_array();
    }

    /// Set the spin axis and (already amplified) velocity.
    pub fn set_rotation(&mut self, axis: Vec3, velocity: f32) {
        self.rotation_axis_velocity = axis.extend(velocity).to_array();
    }
}

/// Pipeline, buffers and bindings for the card pass.
pub struct DiscPass {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instance_buffer: wgpu::Buffer,
    instance_count: u32,
    depth_view: wgpu::TextureView,
}

impl DiscPass {
    /// Build the pipeline for `disc` cards, with room for `instance_count`
    /// instance matrices, sampling `atlas`.
    #[must_use]
    pub fn new(
        context: &RenderContext,
        disc: &Geometry,
        instance_count: u32,
        atlas: &AtlasTexture,
    ) -> Self {
        let device = &context.device;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Disc Shader"),
            source: wgpu::ShaderSource::Wgsl(DISC_SHADER.into()),
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Disc Bind Group Layout"),
                entries: &[
                    uniform_buffer(0),
                    texture_2d(1),
                    filtering_sampler(2),
                ],
            });
        let pipeline =
            Self::create_pipeline(context, &shader, &bind_group_layout);

        let uniform_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Menu Uniform Buffer"),
                contents: bytemuck::bytes_of(&MenuUniform::default()),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });
        let vertex_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Disc Vertex Buffer"),
                contents: bytemuck::cast_slice(&disc.gpu_vertices()),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let indices = disc.indices();
        let index_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Disc Index Buffer"),
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let identities =
            vec![Mat4::IDENTITY.to_cols_array(); instance_count as usize];
        let instance_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Disc Instance Buffer"),
                contents: bytemuck::cast_slice(&identities),
                usage: wgpu::BufferUsages::VERTEX
                    | wgpu::BufferUsages::COPY_DST,
            });

        let sampler = atlas_sampler(device);
        let bind_group = Self::create_bind_group(
            device,
            &bind_group_layout,
            &uniform_buffer,
            atlas,
            &sampler,
        );
        let (width, height) = context.size();

        Self {
            pipeline,
            bind_group_layout,
            bind_group,
            sampler,
            uniform_buffer,
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            instance_buffer,
            instance_count,
            depth_view: create_depth_view(device, width, height),
        }
    }

    fn create_pipeline(
        context: &RenderContext,
        shader: &wgpu::ShaderModule,
        bind_group_layout: &wgpu::BindGroupLayout,
    ) -> wgpu::RenderPipeline {
        let device = &context.device;
        let layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Disc Pipeline Layout"),
                bind_group_layouts: &[bind_group_layout],
                push_constant_ranges: &[],
            });

        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: size_of::<GpuVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![
                0 => Float32x3,
                1 => Float32x2
            ],
        };
        let instance_layout = wgpu::VertexBufferLayout {
            array_stride: size_of::<[f32; 16]>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &wgpu::vertex_attr_array![
                2 => Float32x4,
                3 => Float32x4,
                4 => Float32x4,
                5 => Float32x4
            ],
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Disc Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[vertex_layout, instance_layout],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: context.format(),
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            // Cards are seen from both sides while they swing around.
            primitive: wgpu::PrimitiveState {
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil_state()),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniform_buffer: &wgpu::Buffer,
        atlas: &AtlasTexture,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Disc Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&atlas.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// Rebind after a new atlas texture has been uploaded.
    pub fn set_atlas(&mut self, device: &wgpu::Device, atlas: &AtlasTexture) {
        self.bind_group = Self::create_bind_group(
            device,
            &self.bind_group_layout,
            &self.uniform_buffer,
            atlas,
            &self.sampler,
        );
    }

    /// Recreate the depth attachment for a new target size.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_view = create_depth_view(device, width, height);
    }

    /// Upload uniforms and the full instance buffer in one write each.
    pub fn upload(
        &self,
        queue: &wgpu::Queue,
        uniform: &MenuUniform,
        instances: &[Mat4],
    ) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniform));
        let count = instances.len().min(self.instance_count as usize);
        let matrices: Vec<[f32; 16]> = instances[..count]
            .iter()
            .map(Mat4::to_cols_array)
            .collect();
        queue.write_buffer(
            &self.instance_buffer,
            0,
            bytemuck::cast_slice(&matrices),
        );
    }

    /// Clear `view` to transparent and draw every card.
    pub fn draw(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Disc Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(
                wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                },
            ),
            ..Default::default()
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        pass.set_index_buffer(
            self.index_buffer.slice(..),
            wgpu::IndexFormat::Uint16,
        );
        pass.draw_indexed(0..self.index_count, 0, 0..self.instance_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_matches_shader_layout() {
        // 3 mat4 + vec3/f32 + vec4 + 4 scalars
        assert_eq!(size_of::<MenuUniform>(), 240);
        assert_eq!(size_of::<MenuUniform>() % 16, 0);
    }

    #[test]
    fn disc_shader_validates() {
        let module = naga::front::wgsl::parse_str(DISC_SHADER)
            .unwrap_or_else(|e| panic!("{}", e.emit_to_string(DISC_SHADER)));
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        let _ = validator.validate(&module).unwrap();
        let entry_points: Vec<_> =
            module.entry_points.iter().map(|e| e.name.as_str()).collect();
        assert!(entry_points.contains(&"vs_main"));
        assert!(entry_points.contains(&"fs_main"));
    }
}
