//! Rendering: GPU context, offscreen targets, and the fixed pass chain.

pub mod bloom;
pub mod gpu;
pub mod heightfield;
pub mod mesh;
pub mod model;
pub mod sky;
pub mod targets;
pub mod terrain;
pub mod texture;
pub mod uniforms;
