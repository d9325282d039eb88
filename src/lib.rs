//! vista — a small real-time terrain and model viewer.
//!
//! The scene is described by a JSON manifest: a heightfield terrain plus a
//! list of positioned glTF models. Each frame renders sky, terrain, and
//! models into HDR targets, then runs a bright-pass bloom and tonemaps to
//! the window surface. Startup is fail-fast: any missing asset, rejected
//! pipeline, or incomplete render target aborts with a distinct exit code.

pub mod camera;
pub mod error;
pub mod input;
pub mod render;
pub mod renderer;
pub mod scene;
pub mod window;
