use std::path::{Path, PathBuf};

use glam::Vec3;

use crate::texture::CubeFace;

pub const ASSETS_DIR_VAR: &str = "SKYBOX_ASSETS_DIR";
pub const MSAA_SAMPLES_VAR: &str = "SKYBOX_MSAA_SAMPLES";

/// Startup settings. Everything has a fixed default; only the asset directory and
/// the MSAA request can be overridden, through the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub title: String,
    pub window_size: (u32, u32),
    /// Requested sample count, degraded to whatever the driver offers
    pub msaa_samples: u8,
    pub assets_dir: PathBuf,

    pub fov_y: f32,
    pub near: f32,
    pub far: f32,

    /// radians per second about the vertical axis
    pub rotation_rate: f32,
    pub object_position: Vec3,

    pub move_speed: f32,
    pub mouse_sensitivity: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "I can see my house from here.".to_owned(),
            window_size: (800, 600),
            msaa_samples: 99,
            assets_dir: PathBuf::from("assets"),
            fov_y: 0.7,
            near: 1.0,
            far: 100.0,
            rotation_rate: 1.0,
            object_position: Vec3::new(0.0, 0.0, -5.0),
            move_speed: 4.0,
            mouse_sensitivity: 0.002,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Overlays the overridable settings found through `lookup` onto the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup(ASSETS_DIR_VAR) {
            config.assets_dir = PathBuf::from(dir);
        }

        if let Some(samples) = lookup(MSAA_SAMPLES_VAR) {
            match samples.trim().parse::<u8>() {
                Ok(samples) => config.msaa_samples = samples,
                Err(err) => log::warn!("ignoring {MSAA_SAMPLES_VAR}={samples:?}: {err}"),
            }
        }

        config
    }

    pub fn asset_paths(&self) -> AssetPaths {
        AssetPaths::in_dir(&self.assets_dir)
    }
}

/// Every file the demo needs before it can draw its first frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetPaths {
    pub texture: PathBuf,
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    pub skybox_vertex_shader: PathBuf,
    pub skybox_fragment_shader: PathBuf,
    /// indexed by `CubeFace::ORDER`
    pub skybox_faces: [PathBuf; 6],
}

impl AssetPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            texture: dir.join("texture.png"),
            vertex_shader: dir.join("vertex.glsl"),
            fragment_shader: dir.join("fragment.glsl"),
            skybox_vertex_shader: dir.join("skyboxVertex.glsl"),
            skybox_fragment_shader: dir.join("skyboxFragment.glsl"),
            skybox_faces: CubeFace::ORDER.map(|face| dir.join(face.file_name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_demo() {
        let config = Config::default();
        assert_eq!(config.window_size, (800, 600));
        assert_eq!(config.near, 1.0);
        assert_eq!(config.far, 100.0);
        assert_eq!(config.rotation_rate, 1.0);
    }

    #[test]
    fn env_overrides_assets_and_samples() {
        let config = Config::from_lookup(|key| match key {
            ASSETS_DIR_VAR => Some("/opt/skybox".to_owned()),
            MSAA_SAMPLES_VAR => Some(" 4 ".to_owned()),
            _ => None,
        });
        assert_eq!(config.assets_dir, PathBuf::from("/opt/skybox"));
        assert_eq!(config.msaa_samples, 4);
    }

    #[test]
    fn bad_sample_count_keeps_default() {
        let config = Config::from_lookup(|key| (key == MSAA_SAMPLES_VAR).then(|| "lots".to_owned()));
        assert_eq!(config.msaa_samples, Config::default().msaa_samples);
    }

    #[test]
    fn skybox_faces_follow_file_order() {
        let paths = AssetPaths::in_dir(Path::new("assets"));
        let names: Vec<_> = paths
            .skybox_faces
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_owned())
            .collect();
        assert_eq!(
            names,
            [
                "skyboxLeft.png",
                "skyboxRight.png",
                "skyboxBottom.png",
                "skyboxTop.png",
                "skyboxBack.png",
                "skyboxFront.png",
            ]
        );
        assert_eq!(paths.texture, Path::new("assets").join("texture.png"));
    }
}
