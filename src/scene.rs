//! Scene description.
//!
//! The drawable set — terrain parameters and positioned model entities — is
//! data-driven: a JSON manifest loaded once at startup instead of transforms
//! hardcoded into the pass sequencer. Entities are drawn in manifest order
//! every frame; there is no depth sorting or culling beyond the GPU's own
//! backface and depth tests.

use std::fs;
use std::path::{Path, PathBuf};

use glam::{Mat4, Vec3};
use serde::Deserialize;

use crate::error::AssetError;

/// Root of the scene manifest.
#[derive(Debug, Deserialize)]
pub struct SceneManifest {
    pub terrain: TerrainDesc,
    pub models: Vec<ModelEntity>,
}

/// Terrain synthesis parameters.
#[derive(Debug, Deserialize)]
pub struct TerrainDesc {
    /// Grayscale heightmap raster; pixel intensity encodes elevation.
    pub heightmap: PathBuf,
    /// Precomputed normal map derived from the heightmap.
    pub height_normal: PathBuf,
    /// Vertical scale: a full-intensity pixel maps to this height.
    pub height_scale: f32,
    /// Horizontal size of one grid cell in world units.
    pub cell_size: f32,
    /// Layer albedo textures, blended by elevation: dirt, sand, grass,
    /// rock, snow.
    pub layers: TerrainLayers,
}

#[derive(Debug, Deserialize)]
pub struct TerrainLayers {
    pub dirt: PathBuf,
    pub sand: PathBuf,
    pub grass: PathBuf,
    pub rock: PathBuf,
    pub snow: PathBuf,
}

/// One positioned model in the scene.
#[derive(Debug, Deserialize)]
pub struct ModelEntity {
    pub path: PathBuf,
    pub position: [f32; 3],
    /// Euler rotation in degrees, applied in X, Y, Z order.
    #[serde(default)]
    pub rotation_deg: [f32; 3],
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
    /// Flip texture rows vertically on load. Asset-dependent: some models
    /// are authored with the opposite UV row convention.
    #[serde(default)]
    pub flip_v: bool,
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

impl SceneManifest {
    /// Load and parse a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let text = fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| AssetError::Manifest {
            path: path.to_owned(),
            source,
        })
    }
}

impl ModelEntity {
    /// World matrix: translation, then scale, then rotation about X, Y, Z.
    ///
    /// The composition order is `T * S * Rx * Ry * Rz` and must not be
    /// rearranged — rotation is not commutative and the placed assets depend
    /// on this exact order.
    pub fn world_matrix(&self) -> Mat4 {
        world_matrix(
            Vec3::from(self.position),
            Vec3::from(self.rotation_deg),
            Vec3::from(self.scale),
        )
    }
}

/// Compose `T * S * Rx * Ry * Rz` from position, Euler degrees, and scale.
pub fn world_matrix(position: Vec3, rotation_deg: Vec3, scale: Vec3) -> Mat4 {
    Mat4::from_translation(position)
        * Mat4::from_scale(scale)
        * Mat4::from_rotation_x(rotation_deg.x.to_radians())
        * Mat4::from_rotation_y(rotation_deg.y.to_radians())
        * Mat4::from_rotation_z(rotation_deg.z.to_radians())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_parses_with_defaults() {
        let json = r#"{
            "terrain": {
                "heightmap": "assets/textures/heightmap.png",
                "height_normal": "assets/textures/heightnormal.png",
                "height_scale": 100.0,
                "cell_size": 5.0,
                "layers": {
                    "dirt": "assets/textures/dirt.jpg",
                    "sand": "assets/textures/sand.jpg",
                    "grass": "assets/textures/grass.jpg",
                    "rock": "assets/textures/rock.jpg",
                    "snow": "assets/textures/snow.jpg"
                }
            },
            "models": [
                { "path": "assets/models/backpack.glb",
                  "position": [1334.5, 208.0, 1384.5],
                  "rotation_deg": [0.0, 50.0, 0.0],
                  "scale": [1.2, 1.2, 1.2],
                  "flip_v": true },
                { "path": "assets/models/apple.glb",
                  "position": [1337.0, 210.35, 1382.2] }
            ]
        }"#;

        let manifest: SceneManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.models.len(), 2);
        assert_eq!(manifest.terrain.cell_size, 5.0);

        // Omitted fields fall back to identity transform, no flip.
        let apple = &manifest.models[1];
        assert_eq!(apple.rotation_deg, [0.0, 0.0, 0.0]);
        assert_eq!(apple.scale, [1.0, 1.0, 1.0]);
        assert!(!apple.flip_v);
    }

    #[test]
    fn world_matrix_translates_then_scales_then_rotates() {
        let m = world_matrix(
            Vec3::new(10.0, 20.0, 30.0),
            Vec3::ZERO,
            Vec3::new(2.0, 2.0, 2.0),
        );
        // A point at local origin lands at the translation; scale applies to
        // the local offset, not the translation.
        let p = m.transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(p, Vec3::new(12.0, 20.0, 30.0));
    }

    #[test]
    fn rotation_axis_order_is_not_commutative() {
        let rot = Vec3::new(30.0, 45.0, 60.0);
        let xyz = world_matrix(Vec3::ZERO, rot, Vec3::ONE);

        // Same angles applied Z-then-Y-then-X produce a different transform.
        let zyx = Mat4::from_rotation_z(rot.z.to_radians())
            * Mat4::from_rotation_y(rot.y.to_radians())
            * Mat4::from_rotation_x(rot.x.to_radians());

        let probe = Vec3::new(1.0, 2.0, 3.0);
        let a = xyz.transform_point3(probe);
        let b = zyx.transform_point3(probe);
        assert!((a - b).length() > 1e-3, "a = {a:?}, b = {b:?}");
    }
}
