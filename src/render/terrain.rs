//! Terrain pass.
//!
//! Owns the synthesized heightfield mesh and the seven sampled textures the
//! terrain shader reads: the heightmap itself, the height-derived normal
//! map, and five elevation-blended layer albedos. Depth test and back-face
//! culling are baked into the pipeline state.

use crate::error::{Error, Result};
use crate::scene::TerrainDesc;

use super::gpu::GpuContext;
use super::heightfield::{self, HeightRaster};
use super::mesh::{GpuMesh, MeshVertex};
use super::targets::{DEPTH_FORMAT, HDR_FORMAT};
use super::texture;

pub struct TerrainPass {
    pipeline: wgpu::RenderPipeline,
    mesh: GpuMesh,
    bind_group: wgpu::BindGroup,
}

impl TerrainPass {
    /// Load the heightmap and layer textures, synthesize the grid mesh, and
    /// build the terrain pipeline.
    pub fn load(
        gpu: &GpuContext,
        frame_layout: &wgpu::BindGroupLayout,
        desc: &TerrainDesc,
    ) -> Result<Self> {
        let raster = HeightRaster::load(&desc.heightmap)?;
        let mesh_data = heightfield::build_grid(&raster, desc.height_scale, desc.cell_size);
        log::info!(
            "terrain: {}x{} raster -> {} vertices, {} indices",
            raster.width,
            raster.height,
            mesh_data.vertices.len(),
            mesh_data.indices.len()
        );
        let mesh = GpuMesh::upload(gpu, "terrain mesh", &mesh_data.vertices, &mesh_data.indices);

        // Texture uploads are separate operations from mesh synthesis.
        let height_map = heightfield::upload_height_texture(gpu, &raster);
        let height_normal = texture::load_texture(gpu, &desc.height_normal, false)?;
        let dirt = texture::load_texture(gpu, &desc.layers.dirt, false)?;
        let sand = texture::load_texture(gpu, &desc.layers.sand, false)?;
        let grass = texture::load_texture(gpu, &desc.layers.grass, false)?;
        let rock = texture::load_texture(gpu, &desc.layers.rock, false)?;
        let snow = texture::load_texture(gpu, &desc.layers.snow, false)?;

        let sampler = texture::scene_sampler(gpu);

        let device = &gpu.device;
        gpu.push_validation_scope();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("terrain shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/terrain.wgsl").into()),
        });

        // Fixed binding slots: sampler, height map, height normal, then the
        // five layers low to high.
        let mut entries = vec![wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        }];
        for binding in 1..=7 {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            });
        }
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("terrain texture layout"),
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("terrain pipeline layout"),
            bind_group_layouts: &[frame_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("terrain pipeline"),
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
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(message) = gpu.pop_validation_scope() {
            return Err(Error::Shader {
                label: "terrain",
                message,
            });
        }

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("terrain bind group"),
            layout: &texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&height_map),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&height_normal),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&dirt),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&sand),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::TextureView(&grass),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: wgpu::BindingResource::TextureView(&rock),
                },
                wgpu::BindGroupEntry {
                    binding: 7,
                    resource: wgpu::BindingResource::TextureView(&snow),
                },
            ],
        });

        Ok(Self {
            pipeline,
            mesh,
            bind_group,
        })
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, frame_bind_group: &wgpu::BindGroup) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, frame_bind_group, &[]);
        pass.set_bind_group(1, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.mesh.vertex_buffer.slice(..));
        pass.set_index_buffer(self.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.mesh.index_count, 0, 0..1);
    }
}
