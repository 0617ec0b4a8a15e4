use std::path::PathBuf;

use crate::texture::CubeFace;

/// Everything that can stop the demo. Only `Draw` and `Present` can happen once the
/// render loop is running; the rest are startup failures.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to load asset `{}`: {reason}", path.display())]
    AssetLoad { path: PathBuf, reason: String },

    #[error("{stage} shader failed to compile:\n{log}")]
    ShaderCompile { stage: String, log: String },

    #[error("shader program failed to link:\n{0}")]
    ShaderLink(String),

    #[error("index {index} is out of range for {vertex_count} vertices")]
    InvalidGeometry { index: u32, vertex_count: usize },

    #[error("cube map face {face:?} is {found:?}, expected a square {expected}x{expected} image")]
    CubeFaceMismatch {
        face: CubeFace,
        expected: u32,
        found: (u32, u32),
    },

    #[error("GPU resource creation failed: {0}")]
    ResourceCreation(String),

    #[error("draw call failed: {0}")]
    Draw(#[from] glium::DrawError),

    #[error("failed to present frame: {0}")]
    Present(#[from] glium::SwapBuffersError),
}

impl RenderError {
    pub fn asset(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::AssetLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_error_names_the_path() {
        let err = RenderError::asset("assets/skyboxTop.png", "No such file or directory");
        let message = err.to_string();
        assert!(message.contains("assets/skyboxTop.png"));
        assert!(message.contains("No such file"));
    }

    #[test]
    fn invalid_geometry_reports_index_and_count() {
        let err = RenderError::InvalidGeometry {
            index: 24,
            vertex_count: 24,
        };
        assert_eq!(err.to_string(), "index 24 is out of range for 24 vertices");
    }
}
