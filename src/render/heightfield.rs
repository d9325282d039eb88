//! # Heightfield — Terrain Mesh Synthesis
//!
//! Converts a grayscale heightmap raster into a regular triangulated grid:
//! one vertex per pixel, two triangles per cell. The raster's pixel intensity
//! (channel 0) encodes elevation.
//!
//! ## Layout
//!
//! Vertices are row-major: `index = z * width + x`, exactly `width × height`
//! of them. Each cell `(x, z)` with `v = z * width + x` emits two triangles:
//!
//! ```text
//!   v ──────── v+1          triangle A: (v, v+W, v+W+1)
//!   │  B    ╱  │            triangle B: (v, v+W+1, v+1)
//!   │    ╱   A │
//!   v+W ────── v+W+1
//! ```
//!
//! The winding matches the fixed up-normal `(0, 1, 0)` so backface culling
//! keeps the top side visible. Per-vertex slope normals are deliberately NOT
//! computed — lighting detail comes from a precomputed normal-map texture
//! sampled in the terrain shader, not from mesh normals.
//!
//! The last row and column are never used as cell origins: a `W × H` raster
//! produces `(W-1) × (H-1)` cells with no wraparound and no degenerate
//! boundary triangles.

use std::path::Path;

use crate::error::AssetError;

use super::gpu::GpuContext;
use super::mesh::MeshVertex;

/// A decoded height raster: `width × height` pixels, `comp` bytes per pixel.
/// Elevation is read from channel 0 of each pixel.
pub struct HeightRaster {
    pub width: u32,
    pub height: u32,
    pub comp: usize,
    pub data: Vec<u8>,
}

impl HeightRaster {
    /// Decode a heightmap image from disk, forced to 4 channels.
    ///
    /// Fails with an [`AssetError`] rather than handing invalid data to the
    /// mesh builder.
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let img = image::open(path)
            .map_err(|source| AssetError::Image {
                path: path.to_owned(),
                source,
            })?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            comp: 4,
            data: img.into_raw(),
        })
    }
}

/// CPU-side mesh data: the structured result of grid synthesis.
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

/// Build a regular grid mesh from a height raster.
///
/// `height_scale` maps a full-intensity pixel to world height; `cell_size`
/// is the horizontal spacing between adjacent vertices.
pub fn build_grid(raster: &HeightRaster, height_scale: f32, cell_size: f32) -> MeshData {
    let w = raster.width as usize;
    let h = raster.height as usize;

    let mut vertices = Vec::with_capacity(w * h);
    for i in 0..w * h {
        let x = (i % w) as f32;
        let z = (i / w) as f32;

        let sample = raster.data[i * raster.comp] as f32;

        vertices.push(MeshVertex {
            position: [
                x * cell_size,
                (sample / 255.0) * height_scale,
                z * cell_size,
            ],
            normal: [0.0, 1.0, 0.0],
            uv: [x / w as f32, z / h as f32],
        });
    }

    let stride = w as u32;
    let mut indices = Vec::with_capacity((w - 1) * (h - 1) * 6);
    for z in 0..h - 1 {
        for x in 0..w - 1 {
            let v = z as u32 * stride + x as u32;

            indices.extend_from_slice(&[v, v + stride, v + stride + 1]);
            indices.extend_from_slice(&[v, v + stride + 1, v + 1]);
        }
    }

    MeshData { vertices, indices }
}

/// Upload the raster as a sampled texture for height/normal lookups in the
/// terrain shader. Separate from mesh synthesis: building geometry and
/// creating GPU resources are distinct operations.
pub fn upload_height_texture(gpu: &GpuContext, raster: &HeightRaster) -> wgpu::TextureView {
    use wgpu::util::DeviceExt;

    let texture = gpu.device.create_texture_with_data(
        &gpu.queue,
        &wgpu::TextureDescriptor {
            label: Some("heightmap texture"),
            size: wgpu::Extent3d {
                width: raster.width,
                height: raster.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &raster.data,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Raster with every pixel at the given intensity, comp = 4.
    fn flat_raster(width: u32, height: u32, value: u8) -> HeightRaster {
        HeightRaster {
            width,
            height,
            comp: 4,
            data: vec![value; (width * height * 4) as usize],
        }
    }

    #[test]
    fn vertex_and_index_counts_match_raster_size() {
        for (w, h) in [(2u32, 2u32), (3, 3), (5, 4), (16, 9)] {
            let mesh = build_grid(&flat_raster(w, h, 0), 1.0, 1.0);
            assert_eq!(mesh.vertices.len(), (w * h) as usize);
            assert_eq!(mesh.indices.len(), ((w - 1) * (h - 1) * 6) as usize);
            assert!(
                mesh.indices.iter().all(|&i| i < w * h),
                "index out of range for {w}x{h}"
            );
        }
    }

    #[test]
    fn three_by_three_triangulation_matches_hand_computed_list() {
        let mesh = build_grid(&flat_raster(3, 3, 0), 1.0, 1.0);

        // Cell (x, z), v = z*3+x: triangles (v, v+3, v+4) and (v, v+4, v+1).
        #[rustfmt::skip]
        let expected: Vec<u32> = vec![
            0, 3, 4,  0, 4, 1,
            1, 4, 5,  1, 5, 2,
            3, 6, 7,  3, 7, 4,
            4, 7, 8,  4, 8, 5,
        ];
        assert_eq!(mesh.indices, expected);
    }

    #[test]
    fn flat_heightmap_produces_uniform_elevation() {
        // All pixels 128, scale 100: every Y is 100 * 128/255.
        let mesh = build_grid(&flat_raster(3, 3, 128), 100.0, 5.0);
        let expected_y = 100.0 * 128.0 / 255.0;

        for v in &mesh.vertices {
            assert!((v.position[1] - expected_y).abs() < 1e-4);
            assert!([0.0, 5.0, 10.0].contains(&v.position[0]));
            assert!([0.0, 5.0, 10.0].contains(&v.position[2]));
            assert_eq!(v.normal, [0.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn elevation_reads_channel_zero_only() {
        let mut raster = flat_raster(2, 2, 0);
        // Pixel (1, 1): red channel 255, others noise that must be ignored.
        raster.data[3 * 4] = 255;
        raster.data[3 * 4 + 1] = 7;
        raster.data[3 * 4 + 2] = 9;

        let mesh = build_grid(&raster, 50.0, 1.0);
        assert_eq!(mesh.vertices[3].position[1], 50.0);
        assert_eq!(mesh.vertices[0].position[1], 0.0);
    }

    #[test]
    fn uv_spans_grid_coordinates_over_full_dimension() {
        let mesh = build_grid(&flat_raster(4, 2, 0), 1.0, 1.0);
        // Divisor is the raster dimension, not dimension - 1.
        assert_eq!(mesh.vertices[0].uv, [0.0, 0.0]);
        assert_eq!(mesh.vertices[3].uv, [0.75, 0.0]);
        assert_eq!(mesh.vertices[4].uv, [0.0, 0.5]);
    }
}
