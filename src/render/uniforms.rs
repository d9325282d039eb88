//! Uniform buffer layouts.
//!
//! Plain `#[repr(C)]` Pod structs uploaded with `queue.write_buffer`. Fields
//! are padded to WGSL's 16-byte alignment rules; the comments track byte
//! offsets so the WGSL declarations stay in sync.

use bytemuck::{Pod, Zeroable};

/// Per-frame data shared by every scene pipeline (group 0).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct FrameUniform {
    pub view: [[f32; 4]; 4],       // 64 bytes
    pub projection: [[f32; 4]; 4], // 64 bytes
    pub camera_pos: [f32; 3],      // 12 bytes
    pub _pad0: f32,                // 4 bytes
    pub light_dir: [f32; 3],       // 12 bytes
    pub _pad1: f32,                // 4 bytes → total 160
}

/// Per-object world matrix.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct ModelUniform {
    pub world: [[f32; 4]; 4], // 64 bytes
}

/// Blur pass direction flag: 1 = horizontal, 0 = vertical.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct BlurUniform {
    pub horizontal: u32,
    pub _pad: [u32; 3], // 16-byte minimum uniform size
}
