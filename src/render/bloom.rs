//! Bloom chain: bright extraction, ping-pong Gaussian blur, and the final
//! composite to the surface.
//!
//! Every stage draws the same fullscreen quad. The extract pass thresholds
//! the bright-pass source into ping-pong 0; the blur then bounces between
//! the two ping-pong targets, alternating axes, following the fixed
//! schedule produced by [`blur_schedule`]. The composite reads the scene
//! color and the final blur (always ping-pong 0 for an even pass count),
//! adds them, and tonemaps to the swapchain.

use wgpu::util::DeviceExt;

use crate::error::{Error, Result};

use super::gpu::GpuContext;
use super::mesh::{self, QuadVertex};
use super::targets::{FrameBufferSet, HDR_FORMAT};
use super::uniforms::BlurUniform;

/// Number of alternating blur passes. Even, so the final result lands in
/// ping-pong 0.
pub const BLUR_PASSES: usize = 10;

/// One step of the ping-pong blur: which target to read, which to write,
/// and along which axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlurStep {
    pub read: usize,
    pub write: usize,
    pub horizontal: bool,
}

/// Build the read/write/axis sequence for `amount` blur passes.
///
/// The first pass reads ping-pong 0 (filled by the extract pass) and writes
/// ping-pong 1; every later pass reads what the previous one wrote. The
/// axis alternates starting horizontal.
pub fn blur_schedule(amount: usize) -> Vec<BlurStep> {
    let mut steps = Vec::with_capacity(amount);
    let mut horizontal = true;
    for i in 0..amount {
        let write = horizontal as usize;
        let read = if i == 0 { 0 } else { !horizontal as usize };
        steps.push(BlurStep {
            read,
            write,
            horizontal,
        });
        horizontal = !horizontal;
    }
    steps
}

pub struct BloomPasses {
    extract_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    quad: wgpu::Buffer,
    extract_bind_group: wgpu::BindGroup,
    /// Blur input bind groups, one per ping-pong target.
    ping_reads: [wgpu::BindGroup; 2],
    /// Direction bind groups: index 1 horizontal, index 0 vertical.
    blur_directions: [wgpu::BindGroup; 2],
    composite_bind_group: wgpu::BindGroup,
}

impl BloomPasses {
    /// Build all three post pipelines and pre-wire their bind groups against
    /// the offscreen targets. The targets never resize, so nothing here is
    /// recreated after startup.
    pub fn new(
        gpu: &GpuContext,
        frames: &FrameBufferSet,
        surface_format: wgpu::TextureFormat,
    ) -> Result<Self> {
        let device = &gpu.device;
        gpu.push_validation_scope();

        // group 0 of extract and blur: one sampled texture plus sampler.
        let sampled_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("post sampled layout"),
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

        let blur_uniform_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("blur uniform layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        // Composite reads two textures through one sampler.
        let composite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("composite layout"),
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
        });

        let extract_pipeline = post_pipeline(
            device,
            "extract",
            include_str!("shaders/extract.wgsl"),
            &[&sampled_layout],
            HDR_FORMAT,
        );
        let blur_pipeline = post_pipeline(
            device,
            "blur",
            include_str!("shaders/blur.wgsl"),
            &[&sampled_layout, &blur_uniform_layout],
            HDR_FORMAT,
        );
        let composite_pipeline = post_pipeline(
            device,
            "composite",
            include_str!("shaders/composite.wgsl"),
            &[&composite_layout],
            surface_format,
        );

        if let Some(message) = gpu.pop_validation_scope() {
            return Err(Error::Shader {
                label: "bloom",
                message,
            });
        }

        let quad = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("fullscreen quad"),
            contents: bytemuck::cast_slice(&mesh::fullscreen_quad()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let extract_bind_group = sampled_bind_group(
            device,
            "extract bind group",
            &sampled_layout,
            &frames.bright_color,
            &frames.post_sampler,
        );
        let ping_reads = [
            sampled_bind_group(
                device,
                "blur read ping-pong 0",
                &sampled_layout,
                &frames.ping_pong[0],
                &frames.post_sampler,
            ),
            sampled_bind_group(
                device,
                "blur read ping-pong 1",
                &sampled_layout,
                &frames.ping_pong[1],
                &frames.post_sampler,
            ),
        ];

        let blur_directions = [
            blur_direction_bind_group(device, &blur_uniform_layout, 0),
            blur_direction_bind_group(device, &blur_uniform_layout, 1),
        ];

        let composite_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("composite bind group"),
            layout: &composite_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&frames.scene_color),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&frames.ping_pong[0]),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&frames.post_sampler),
                },
            ],
        });

        Ok(Self {
            extract_pipeline,
            blur_pipeline,
            composite_pipeline,
            quad,
            extract_bind_group,
            ping_reads,
            blur_directions,
            composite_bind_group,
        })
    }

    /// Record the whole post chain: extract, [`BLUR_PASSES`] blur passes,
    /// then composite into `surface_view`.
    pub fn run(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        frames: &FrameBufferSet,
        surface_view: &wgpu::TextureView,
    ) {
        {
            let mut pass = quad_pass(encoder, "extract pass", &frames.ping_pong[0]);
            pass.set_pipeline(&self.extract_pipeline);
            pass.set_bind_group(0, &self.extract_bind_group, &[]);
            pass.set_vertex_buffer(0, self.quad.slice(..));
            pass.draw(0..6, 0..1);
        }

        for step in blur_schedule(BLUR_PASSES) {
            let mut pass = quad_pass(encoder, "blur pass", &frames.ping_pong[step.write]);
            pass.set_pipeline(&self.blur_pipeline);
            pass.set_bind_group(0, &self.ping_reads[step.read], &[]);
            pass.set_bind_group(1, &self.blur_directions[step.horizontal as usize], &[]);
            pass.set_vertex_buffer(0, self.quad.slice(..));
            pass.draw(0..6, 0..1);
        }

        {
            let mut pass = quad_pass(encoder, "composite pass", surface_view);
            pass.set_pipeline(&self.composite_pipeline);
            pass.set_bind_group(0, &self.composite_bind_group, &[]);
            pass.set_vertex_buffer(0, self.quad.slice(..));
            pass.draw(0..6, 0..1);
        }
    }
}

/// Depth-less fullscreen pipeline shared by the three post stages.
fn post_pipeline(
    device: &wgpu::Device,
    label: &str,
    source: &str,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    target_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts,
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[QuadVertex::LAYOUT],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn sampled_bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn blur_direction_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    horizontal: u32,
) -> wgpu::BindGroup {
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("blur direction buffer"),
        contents: bytemuck::cast_slice(&[BlurUniform {
            horizontal,
            _pad: [0; 3],
        }]),
        usage: wgpu::BufferUsages::UNIFORM,
    });
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("blur direction bind group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

fn quad_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            depth_slice: None,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_alternates_axes_starting_horizontal() {
        let steps = blur_schedule(BLUR_PASSES);
        assert_eq!(steps.len(), 10);
        for (i, step) in steps.iter().enumerate() {
            assert_eq!(step.horizontal, i % 2 == 0);
        }
    }

    #[test]
    fn schedule_ping_pongs_between_targets() {
        let steps = blur_schedule(BLUR_PASSES);
        let reads: Vec<usize> = steps.iter().map(|s| s.read).collect();
        let writes: Vec<usize> = steps.iter().map(|s| s.write).collect();
        assert_eq!(reads, [0, 1, 0, 1, 0, 1, 0, 1, 0, 1]);
        assert_eq!(writes, [1, 0, 1, 0, 1, 0, 1, 0, 1, 0]);
    }

    #[test]
    fn schedule_never_reads_its_own_write() {
        for step in blur_schedule(BLUR_PASSES) {
            assert_ne!(step.read, step.write);
        }
    }

    #[test]
    fn even_pass_count_ends_in_ping_pong_zero() {
        let steps = blur_schedule(BLUR_PASSES);
        assert_eq!(steps.last().unwrap().write, 0);
    }

    #[test]
    fn each_step_reads_previous_write() {
        let steps = blur_schedule(BLUR_PASSES);
        for pair in steps.windows(2) {
            assert_eq!(pair[1].read, pair[0].write);
        }
    }
}
