//! Texture loading and upload.
//!
//! Thin wrapper over the `image` decoder: decode a file to RGBA8, optionally
//! flip rows, and upload to a sampled GPU texture. The flip is a per-call
//! parameter rather than process-global state — the terrain and box assets
//! use the opposite UV row convention from some externally authored models,
//! so each load site states its own convention.

use std::path::Path;

use wgpu::util::DeviceExt;

use crate::error::AssetError;

use super::gpu::GpuContext;

/// Decode an image file and upload it as an sRGB sampled texture.
///
/// `flip_v` flips the pixel rows before upload.
pub fn load_texture(
    gpu: &GpuContext,
    path: &Path,
    flip_v: bool,
) -> Result<wgpu::TextureView, AssetError> {
    let img = image::open(path).map_err(|source| AssetError::Image {
        path: path.to_owned(),
        source,
    })?;

    let img = if flip_v { img.flipv() } else { img };
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(upload_rgba8(
        gpu,
        &path.display().to_string(),
        width,
        height,
        &rgba.into_raw(),
        true,
    ))
}

/// Upload raw RGBA8 pixels as a sampled texture.
pub fn upload_rgba8(
    gpu: &GpuContext,
    label: &str,
    width: u32,
    height: u32,
    data: &[u8],
    srgb: bool,
) -> wgpu::TextureView {
    let format = if srgb {
        wgpu::TextureFormat::Rgba8UnormSrgb
    } else {
        wgpu::TextureFormat::Rgba8Unorm
    };

    let texture = gpu.device.create_texture_with_data(
        &gpu.queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        data,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Shared sampler for scene textures: repeat addressing, linear filtering.
pub fn scene_sampler(gpu: &GpuContext) -> wgpu::Sampler {
    gpu.device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("scene sampler"),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}
