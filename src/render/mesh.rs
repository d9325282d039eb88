//! GPU mesh storage and built-in geometry.
//!
//! [`GpuMesh`] is a vertex buffer, an index buffer, and an index count —
//! everything a draw call needs. The two built-in shapes are the sky cube
//! (drawn with culling off, so winding is irrelevant) and the fullscreen
//! quad used by every post-processing pass.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::gpu::GpuContext;

/// Per-vertex data for 3D meshes: position, surface normal, and texture UV.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position: vec3<f32>
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal: vec3<f32>
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            // uv: vec2<f32>
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };
}

/// Per-vertex data for fullscreen passes: clip-space position and UV.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

impl QuadVertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            },
            wgpu::VertexAttribute {
                offset: 8,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };
}

/// A mesh that has been uploaded to GPU buffers.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    /// Upload vertex and index data to the GPU.
    pub fn upload(gpu: &GpuContext, label: &str, vertices: &[MeshVertex], indices: &[u32]) -> Self {
        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }
}

/// Generate a unit cube centered at the origin (side length 1.0).
///
/// Returns 24 vertices (4 per face for per-face normals) and 36 indices.
pub fn cube() -> (Vec<MeshVertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    // (normal, tangent_u, tangent_v) for each face
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        // +X (right)
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        // -X (left)
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        // +Y (top)
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        // -Y (bottom)
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        // +Z (front)
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        // -Z (back)
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];

    for (normal, u_dir, v_dir) in &faces {
        let base = vertices.len() as u32;
        let h = 0.5_f32;

        let center = [normal[0] * h, normal[1] * h, normal[2] * h];

        let corners = [
            [-1.0, -1.0], // bottom-left  (uv 0,1)
            [1.0, -1.0],  // bottom-right (uv 1,1)
            [1.0, 1.0],   // top-right    (uv 1,0)
            [-1.0, 1.0],  // top-left     (uv 0,0)
        ];
        let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

        for (i, corner) in corners.iter().enumerate() {
            let pos = [
                center[0] + u_dir[0] * corner[0] * h + v_dir[0] * corner[1] * h,
                center[1] + u_dir[1] * corner[0] * h + v_dir[1] * corner[1] * h,
                center[2] + u_dir[2] * corner[0] * h + v_dir[2] * corner[1] * h,
            ];
            vertices.push(MeshVertex {
                position: pos,
                normal: *normal,
                uv: uvs[i],
            });
        }

        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    (vertices, indices)
}

/// Two triangles covering the full clip-space viewport.
pub fn fullscreen_quad() -> Vec<QuadVertex> {
    vec![
        QuadVertex { position: [-1.0, 1.0], uv: [0.0, 1.0] },
        QuadVertex { position: [-1.0, -1.0], uv: [0.0, 0.0] },
        QuadVertex { position: [1.0, -1.0], uv: [1.0, 0.0] },
        QuadVertex { position: [-1.0, 1.0], uv: [0.0, 1.0] },
        QuadVertex { position: [1.0, -1.0], uv: [1.0, 0.0] },
        QuadVertex { position: [1.0, 1.0], uv: [1.0, 1.0] },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_four_vertices_per_face() {
        let (vertices, indices) = cube();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn fullscreen_quad_covers_clip_space() {
        let quad = fullscreen_quad();
        assert_eq!(quad.len(), 6);
        for v in &quad {
            assert!(v.position[0].abs() == 1.0 && v.position[1].abs() == 1.0);
        }
    }
}
