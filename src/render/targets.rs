//! # Targets — Offscreen Render Targets
//!
//! The frame is composed through a fixed set of offscreen targets, all
//! created once at startup and never resized (the window resolution is
//! fixed):
//!
//! - **HDR target**: two `Rgba16Float` color attachments — attachment 0
//!   carries the full scene color, attachment 1 the bright-pass source —
//!   plus a `Depth32Float` depth attachment. Floating-point color keeps
//!   values above 1.0 intact until the composite pass.
//! - **Ping-pong pair**: two single-attachment `Rgba16Float` targets with no
//!   depth, used alternately as blur read source and write destination.
//!
//! Creation runs inside a device validation scope; a rejected target is a
//! fatal startup error, never a silent diagnostic.

use crate::error::{Error, Result};

use super::gpu::GpuContext;

/// Color format for every offscreen target. 16-bit float avoids clipping
/// bright values before tonemapping, and is filterable in core WebGPU.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Depth format for the scene pass.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// All offscreen render targets, plus the sampler post passes read through.
pub struct FrameBufferSet {
    /// HDR attachment 0: full scene color.
    pub scene_color: wgpu::TextureView,
    /// HDR attachment 1: bright-pass source.
    pub bright_color: wgpu::TextureView,
    pub depth: wgpu::TextureView,
    /// Blur ping-pong targets, indexed 0 and 1.
    pub ping_pong: [wgpu::TextureView; 2],
    /// Clamp-to-edge linear sampler shared by all post passes.
    pub post_sampler: wgpu::Sampler,
}

impl FrameBufferSet {
    /// Create every offscreen target at the given fixed resolution.
    pub fn new(gpu: &GpuContext, width: u32, height: u32) -> Result<Self> {
        gpu.push_validation_scope();

        let scene_color = color_target(gpu, "hdr color 0", width, height);
        let bright_color = color_target(gpu, "hdr color 1", width, height);
        let depth = depth_target(gpu, width, height);
        let ping_pong = [
            color_target(gpu, "ping-pong 0", width, height),
            color_target(gpu, "ping-pong 1", width, height),
        ];

        let post_sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("post sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        // The completeness check: any validation error during attachment
        // creation is fatal, not a log line.
        if let Some(message) = gpu.pop_validation_scope() {
            return Err(Error::Target {
                label: "framebuffer set",
                message,
            });
        }

        Ok(Self {
            scene_color,
            bright_color,
            depth,
            ping_pong,
            post_sampler,
        })
    }
}

fn color_target(gpu: &GpuContext, label: &str, width: u32, height: u32) -> wgpu::TextureView {
    let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: HDR_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn depth_target(gpu: &GpuContext, width: u32, height: u32) -> wgpu::TextureView {
    let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("scene depth"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
