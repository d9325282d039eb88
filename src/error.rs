//! Error taxonomy for the single-shot initialization sequence.
//!
//! Everything here is fatal at startup: the renderer never continues with a
//! missing asset, an unusable pipeline, or an incomplete render target. Each
//! top-level variant maps to a distinct process exit code so a wrapper script
//! can tell failure points apart.

use std::path::PathBuf;

use thiserror::Error;

/// Window, event loop, or GPU context initialization failure.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to create event loop: {0}")]
    EventLoop(String),

    #[error("failed to create window: {0}")]
    Window(String),

    #[error("failed to create rendering surface: {0}")]
    Surface(String),

    #[error("no suitable GPU adapter found: {0}")]
    Adapter(String),

    #[error("failed to create GPU device: {0}")]
    Device(String),
}

/// A texture, heightmap, scene manifest, or model file was missing or
/// undecodable. Surfaced at load time, before any GPU state depends on it.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("failed to load model {path}: {source}")]
    Gltf {
        path: PathBuf,
        source: gltf::Error,
    },

    #[error("model {path} is missing required vertex data: {what}")]
    ModelData { path: PathBuf, what: &'static str },

    #[error("invalid scene manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Top-level application error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Init(#[from] InitError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    /// WGSL validation or pipeline creation was rejected by the device.
    /// Carries the device's diagnostic text.
    #[error("shader pipeline '{label}' failed validation: {message}")]
    Shader { label: &'static str, message: String },

    /// An offscreen render target was rejected by the device.
    #[error("render target '{label}' incomplete: {message}")]
    Target { label: &'static str, message: String },
}

impl Error {
    /// Distinct exit code per failure point.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Init(InitError::EventLoop(_)) => 2,
            Error::Init(InitError::Window(_)) => 3,
            Error::Init(InitError::Surface(_)) => 4,
            Error::Init(InitError::Adapter(_)) => 5,
            Error::Init(InitError::Device(_)) => 6,
            Error::Asset(_) => 7,
            Error::Shader { .. } => 8,
            Error::Target { .. } => 9,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
