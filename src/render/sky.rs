//! Sky pass.
//!
//! Draws a cube centered on the camera so the sky never translates relative
//! to it. The pipeline declares the pass's required GPU state directly:
//! culling off and depth compare `Always` with writes disabled, so the sky
//! renders behind everything without touching the depth buffer. The next
//! pass's pipeline re-declares its own depth/cull state, which is how the
//! restore contract is expressed in wgpu.

use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::error::{Error, Result};

use super::gpu::GpuContext;
use super::mesh::{self, GpuMesh, MeshVertex};
use super::targets::{DEPTH_FORMAT, HDR_FORMAT};
use super::uniforms::ModelUniform;

pub struct SkyPass {
    pipeline: wgpu::RenderPipeline,
    cube: GpuMesh,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
}

impl SkyPass {
    pub fn new(gpu: &GpuContext, frame_layout: &wgpu::BindGroupLayout) -> Result<Self> {
        let device = &gpu.device;
        gpu.push_validation_scope();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sky shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sky.wgsl").into()),
        });

        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sky model layout"),
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sky pipeline layout"),
            bind_group_layouts: &[frame_layout, &model_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sky pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[MeshVertex::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[
                    Some(wgpu::ColorTargetState {
                        format: HDR_FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    }),
                    Some(wgpu::ColorTargetState {
                        format: HDR_FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    }),
                ],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Sky state: no culling, depth test effectively off.
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(message) = gpu.pop_validation_scope() {
            return Err(Error::Shader {
                label: "sky",
                message,
            });
        }

        let (vertices, indices) = mesh::cube();
        let cube = GpuMesh::upload(gpu, "sky cube", &vertices, &indices);

        let model_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sky model buffer"),
            contents: bytemuck::cast_slice(&[ModelUniform {
                world: Mat4::IDENTITY.to_cols_array_2d(),
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sky model bind group"),
            layout: &model_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: model_buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            pipeline,
            cube,
            model_buffer,
            model_bind_group,
        })
    }

    /// Re-center the sky cube on the camera for this frame.
    pub fn update(&self, gpu: &GpuContext, camera_position: Vec3) {
        let world = Mat4::from_translation(camera_position) * Mat4::from_scale(Vec3::splat(10.0));
        gpu.queue.write_buffer(
            &self.model_buffer,
            0,
            bytemuck::cast_slice(&[ModelUniform {
                world: world.to_cols_array_2d(),
            }]),
        );
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, frame_bind_group: &wgpu::BindGroup) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, frame_bind_group, &[]);
        pass.set_bind_group(1, &self.model_bind_group, &[]);
        pass.set_vertex_buffer(0, self.cube.vertex_buffer.slice(..));
        pass.set_index_buffer(self.cube.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.cube.index_count, 0, 0..1);
    }
}
