//! Model pass — externally authored glTF models.
//!
//! The model loader extracts positions, normals, UVs, indices, and the base
//! color texture from each mesh primitive. A loaded [`Model`] exposes one
//! operation, [`draw`](Model::draw), which binds its own per-primitive
//! textures and issues the indexed draws; the renderer owns the models and
//! only depends on that entry point.
//!
//! Animations, skins, scene hierarchy, and the remaining PBR texture slots
//! are not extracted.

use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::error::{AssetError, Error, Result};
use crate::scene::ModelEntity;

use super::gpu::GpuContext;
use super::mesh::{GpuMesh, MeshVertex};
use super::targets::{DEPTH_FORMAT, HDR_FORMAT};
use super::texture;

/// Pipeline and bind group layouts shared by every model.
pub struct ModelPass {
    pipeline: wgpu::RenderPipeline,
    model_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    /// 1x1 white fallback when a primitive has no base color texture.
    white: wgpu::TextureView,
}

/// A drawable model: world transform bind group plus per-primitive geometry
/// and material bind groups, drawn in file order.
pub struct Model {
    model_bind_group: wgpu::BindGroup,
    primitives: Vec<Primitive>,
}

struct Primitive {
    mesh: GpuMesh,
    material_bind_group: wgpu::BindGroup,
}

impl ModelPass {
    pub fn new(gpu: &GpuContext, frame_layout: &wgpu::BindGroupLayout) -> Result<Self> {
        let device = &gpu.device;
        gpu.push_validation_scope();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("model shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/model.wgsl").into()),
        });

        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("model transform layout"),
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

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("model material layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("model pipeline layout"),
            bind_group_layouts: &[frame_layout, &model_layout, &material_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("model pipeline"),
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
                label: "model",
                message,
            });
        }

        let sampler = texture::scene_sampler(gpu);
        let white = texture::upload_rgba8(gpu, "white 1x1", 1, 1, &[255, 255, 255, 255], true);

        Ok(Self {
            pipeline,
            model_layout,
            material_layout,
            sampler,
            white,
        })
    }

    /// Bind the model pipeline for this frame's model draws.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>, frame_bind_group: &wgpu::BindGroup) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, frame_bind_group, &[]);
    }
}

impl Model {
    /// Load a glTF/GLB file and place it with the entity's world transform.
    ///
    /// Entity transforms are static, so the world matrix is uploaded once
    /// here rather than rewritten per frame.
    pub fn load(gpu: &GpuContext, pass: &ModelPass, entity: &ModelEntity) -> Result<Self> {
        let path = &entity.path;
        let (document, buffers, images) =
            gltf::import(path).map_err(|source| AssetError::Gltf {
                path: path.clone(),
                source,
            })?;

        let world: Mat4 = entity.world_matrix();
        let model_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("model transform buffer"),
                contents: bytemuck::cast_slice(&[super::uniforms::ModelUniform {
                    world: world.to_cols_array_2d(),
                }]),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let model_bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("model transform bind group"),
            layout: &pass.model_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: model_buffer.as_entire_binding(),
            }],
        });

        let mut primitives = Vec::new();
        for gltf_mesh in document.meshes() {
            for primitive in gltf_mesh.primitives() {
                let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

                let positions: Vec<[f32; 3]> = reader
                    .read_positions()
                    .ok_or(AssetError::ModelData {
                        path: path.clone(),
                        what: "POSITION attribute",
                    })?
                    .collect();

                let normals: Vec<[f32; 3]> = reader
                    .read_normals()
                    .map(|iter| iter.collect())
                    .unwrap_or_else(|| vec![[0.0, 1.0, 0.0]; positions.len()]);

                let uvs: Vec<[f32; 2]> = reader
                    .read_tex_coords(0)
                    .map(|iter| iter.into_f32().collect())
                    .unwrap_or_else(|| vec![[0.0, 0.0]; positions.len()]);

                let vertices: Vec<MeshVertex> = positions
                    .iter()
                    .enumerate()
                    .map(|(i, pos)| MeshVertex {
                        position: *pos,
                        normal: normals[i],
                        uv: uvs[i],
                    })
                    .collect();

                let indices: Vec<u32> = reader
                    .read_indices()
                    .ok_or(AssetError::ModelData {
                        path: path.clone(),
                        what: "index buffer",
                    })?
                    .into_u32()
                    .collect();

                let mesh = GpuMesh::upload(gpu, "model mesh", &vertices, &indices);

                let base_color = primitive
                    .material()
                    .pbr_metallic_roughness()
                    .base_color_texture()
                    .and_then(|info| {
                        let source = info.texture().source();
                        let image = &images[source.index()];
                        upload_gltf_image(gpu, path, image, entity.flip_v)
                    });

                let material_bind_group =
                    gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some("model material bind group"),
                        layout: &pass.material_layout,
                        entries: &[
                            wgpu::BindGroupEntry {
                                binding: 0,
                                resource: wgpu::BindingResource::TextureView(
                                    base_color.as_ref().unwrap_or(&pass.white),
                                ),
                            },
                            wgpu::BindGroupEntry {
                                binding: 1,
                                resource: wgpu::BindingResource::Sampler(&pass.sampler),
                            },
                        ],
                    });

                primitives.push(Primitive {
                    mesh,
                    material_bind_group,
                });
            }
        }

        log::info!(
            "model {}: {} primitives",
            path.display(),
            primitives.len()
        );

        Ok(Self {
            model_bind_group,
            primitives,
        })
    }

    /// Draw every primitive. [`ModelPass::bind`] must have run first.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(1, &self.model_bind_group, &[]);
        for primitive in &self.primitives {
            pass.set_bind_group(2, &primitive.material_bind_group, &[]);
            pass.set_vertex_buffer(0, primitive.mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(
                primitive.mesh.index_buffer.slice(..),
                wgpu::IndexFormat::Uint32,
            );
            pass.draw_indexed(0..primitive.mesh.index_count, 0, 0..1);
        }
    }
}

/// Convert a decoded glTF image to RGBA8 and upload it, flipping rows when
/// the entity's UV convention calls for it. Unsupported pixel formats fall
/// back to the white texture.
fn upload_gltf_image(
    gpu: &GpuContext,
    path: &std::path::Path,
    image: &gltf::image::Data,
    flip_v: bool,
) -> Option<wgpu::TextureView> {
    let Some(mut rgba) = pixels_to_rgba8(image.format, &image.pixels) else {
        log::warn!(
            "model {}: unsupported texture format {:?}, using white fallback",
            path.display(),
            image.format
        );
        return None;
    };

    if flip_v {
        flip_rows(&mut rgba, image.width as usize, image.height as usize);
    }

    Some(texture::upload_rgba8(
        gpu,
        &format!("{}:texture", path.display()),
        image.width,
        image.height,
        &rgba,
        true,
    ))
}

/// Convert decoded glTF pixels to RGBA8. Returns `None` for formats the
/// material path does not handle (16-bit and float variants).
fn pixels_to_rgba8(format: gltf::image::Format, pixels: &[u8]) -> Option<Vec<u8>> {
    match format {
        gltf::image::Format::R8G8B8A8 => Some(pixels.to_vec()),
        gltf::image::Format::R8G8B8 => {
            let mut out = Vec::with_capacity(pixels.len() / 3 * 4);
            for chunk in pixels.chunks(3) {
                out.extend_from_slice(chunk);
                out.push(255);
            }
            Some(out)
        }
        _ => None,
    }
}

/// Reverse the row order of an RGBA8 pixel buffer in place.
fn flip_rows(pixels: &mut [u8], width: usize, height: usize) {
    let row_len = width * 4;
    for y in 0..height / 2 {
        let (top, rest) = pixels.split_at_mut((height - 1 - y) * row_len);
        let top_row = &mut top[y * row_len..y * row_len + row_len];
        let bottom_row = &mut rest[..row_len];
        top_row.swap_with_slice(bottom_row);
    }
}

#[cfg(test)]
mod tests {
    use super::{flip_rows, pixels_to_rgba8};

    #[test]
    fn rgb_pixels_gain_opaque_alpha() {
        let rgba = pixels_to_rgba8(gltf::image::Format::R8G8B8, &[10, 20, 30, 40, 50, 60]);
        assert_eq!(rgba, Some(vec![10, 20, 30, 255, 40, 50, 60, 255]));
    }

    #[test]
    fn rgba_pixels_pass_through() {
        let rgba = pixels_to_rgba8(gltf::image::Format::R8G8B8A8, &[1, 2, 3, 4]);
        assert_eq!(rgba, Some(vec![1, 2, 3, 4]));
    }

    #[test]
    fn unhandled_format_yields_none() {
        // 16-bit formats are not converted; the caller falls back to the
        // white texture and logs which model was affected.
        assert_eq!(pixels_to_rgba8(gltf::image::Format::R16G16B16A16, &[0; 8]), None);
        assert_eq!(pixels_to_rgba8(gltf::image::Format::R8, &[0; 4]), None);
    }

    #[test]
    fn flip_rows_reverses_row_order() {
        // 1x3 image: rows A, B, C.
        let mut pixels = vec![
            1, 1, 1, 1, // row 0
            2, 2, 2, 2, // row 1
            3, 3, 3, 3, // row 2
        ];
        flip_rows(&mut pixels, 1, 3);
        assert_eq!(pixels, vec![3, 3, 3, 3, 2, 2, 2, 2, 1, 1, 1, 1]);
    }

    #[test]
    fn flip_rows_even_height() {
        let mut pixels = vec![
            1, 0, 0, 0, 2, 0, 0, 0, // row 0: two pixels
            3, 0, 0, 0, 4, 0, 0, 0, // row 1
        ];
        flip_rows(&mut pixels, 2, 2);
        assert_eq!(
            pixels,
            vec![3, 0, 0, 0, 4, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0]
        );
    }
}
