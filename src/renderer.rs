//! Frame sequencing.
//!
//! [`Renderer`] owns the GPU context, the offscreen targets, and every pass,
//! and records one frame per [`render`](Renderer::render) call in a fixed
//! order: scene (sky, terrain, models) into the dual HDR attachments, then
//! the bloom chain down to the swapchain. Everything is created once at
//! startup; per-frame work is uniform writes and command recording only.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use winit::window::Window;

use crate::camera::CameraController;
use crate::error::Result;
use crate::input::{Input, KeyCode};
use crate::render::bloom::BloomPasses;
use crate::render::gpu::GpuContext;
use crate::render::model::{Model, ModelPass};
use crate::render::sky::SkyPass;
use crate::render::targets::FrameBufferSet;
use crate::render::terrain::TerrainPass;
use crate::render::uniforms::FrameUniform;
use crate::scene::SceneManifest;

/// Vertical field of view in degrees.
const FOV_DEG: f32 = 45.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 5000.0;

/// Where the camera starts, above the terrain near its center.
const CAMERA_START: Vec3 = Vec3::new(100.0, 125.5, 100.0);

pub struct Renderer {
    gpu: GpuContext,
    frames: FrameBufferSet,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    projection: Mat4,
    light_dir: Vec3,
    sky: SkyPass,
    terrain: TerrainPass,
    model_pass: ModelPass,
    models: Vec<Model>,
    bloom: BloomPasses,
    pub camera: CameraController,
    pub keys: Input<KeyCode>,
}

impl Renderer {
    /// Initialize the GPU, load every asset the manifest names, and build
    /// all pipelines. Any failure aborts startup.
    pub fn new(window: Arc<Window>, manifest: &SceneManifest) -> Result<Self> {
        let gpu = GpuContext::new(window)?;
        let (width, height) = gpu.surface_size();
        let frames = FrameBufferSet::new(&gpu, width, height)?;

        let frame_layout =
            gpu.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("frame uniform layout"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    }],
                });
        let frame_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame uniform buffer"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame uniform bind group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let sky = SkyPass::new(&gpu, &frame_layout)?;
        let terrain = TerrainPass::load(&gpu, &frame_layout, &manifest.terrain)?;

        let model_pass = ModelPass::new(&gpu, &frame_layout)?;
        let mut models = Vec::with_capacity(manifest.models.len());
        for entity in &manifest.models {
            models.push(Model::load(&gpu, &model_pass, entity)?);
        }

        let bloom = BloomPasses::new(&gpu, &frames, gpu.surface_format())?;

        let projection = Mat4::perspective_rh(
            FOV_DEG.to_radians(),
            width as f32 / height as f32,
            Z_NEAR,
            Z_FAR,
        );

        log::info!("renderer ready: {} models, {}x{}", models.len(), width, height);

        Ok(Self {
            gpu,
            frames,
            frame_buffer,
            frame_bind_group,
            projection,
            light_dir: Vec3::new(-0.5, -0.5, -0.5).normalize(),
            sky,
            terrain,
            model_pass,
            models,
            bloom,
            camera: CameraController::new(CAMERA_START),
            keys: Input::new(),
        })
    }

    /// Record and present one frame.
    ///
    /// Held movement keys are polled here, after the frame's window events
    /// have been delivered. Surface errors are returned to the event handler,
    /// which decides between reconfigure and shutdown.
    pub fn render(&mut self) -> std::result::Result<(), wgpu::SurfaceError> {
        self.camera.process_movement(&self.keys);

        let frame = FrameUniform {
            view: self.camera.view().to_cols_array_2d(),
            projection: self.projection.to_cols_array_2d(),
            camera_pos: self.camera.position().to_array(),
            _pad0: 0.0,
            light_dir: self.light_dir.to_array(),
            _pad1: 0.0,
        };
        self.gpu
            .queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::cast_slice(&[frame]));
        self.sky.update(&self.gpu, self.camera.position());

        let surface_texture = self.gpu.surface.get_current_texture()?;
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene pass"),
                color_attachments: &[
                    Some(wgpu::RenderPassColorAttachment {
                        view: &self.frames.scene_color,
                        depth_slice: None,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                            store: wgpu::StoreOp::Store,
                        },
                    }),
                    Some(wgpu::RenderPassColorAttachment {
                        view: &self.frames.bright_color,
                        depth_slice: None,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                            store: wgpu::StoreOp::Store,
                        },
                    }),
                ],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.frames.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // Sky first (depth test off), then terrain, then the manifest's
            // models in order.
            self.sky.draw(&mut pass, &self.frame_bind_group);
            self.terrain.draw(&mut pass, &self.frame_bind_group);
            self.model_pass.bind(&mut pass, &self.frame_bind_group);
            for model in &self.models {
                model.draw(&mut pass);
            }
        }

        self.bloom.run(&mut encoder, &self.frames, &surface_view);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Reconfigure the surface after a lost or outdated swapchain.
    pub fn reconfigure_surface(&self) {
        self.gpu
            .surface
            .configure(&self.gpu.device, &self.gpu.surface_config);
    }
}
