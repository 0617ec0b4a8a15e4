use std::path::{Path, PathBuf};

use glium::{
    backend::Facade,
    framebuffer::SimpleFrameBuffer,
    texture::{CubeLayer, Cubemap, MipmapsOption, Texture2d, UncompressedFloatFormat},
    uniforms::{
        MagnifySamplerFilter, MinifySamplerFilter, SamplerBehavior, SamplerWrapFunction,
    },
    BlitTarget, Surface,
};

use crate::{
    error::RenderError,
    load::{self, DecodedImage, BYTES_PER_PIXEL},
};

/// Cube map faces in the order their files are listed. Each face lands in GL face slot
/// `+X + index`, so the file order decides the mapping and must not be "tidied up".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CubeFace {
    Left,
    Right,
    Bottom,
    Top,
    Back,
    Front,
}

impl CubeFace {
    pub const ORDER: [CubeFace; 6] = [
        CubeFace::Left,
        CubeFace::Right,
        CubeFace::Bottom,
        CubeFace::Top,
        CubeFace::Back,
        CubeFace::Front,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            CubeFace::Left => "skyboxLeft.png",
            CubeFace::Right => "skyboxRight.png",
            CubeFace::Bottom => "skyboxBottom.png",
            CubeFace::Top => "skyboxTop.png",
            CubeFace::Back => "skyboxBack.png",
            CubeFace::Front => "skyboxFront.png",
        }
    }

    pub fn layer(self) -> CubeLayer {
        match self {
            CubeFace::Left => CubeLayer::PositiveX,
            CubeFace::Right => CubeLayer::NegativeX,
            CubeFace::Bottom => CubeLayer::PositiveY,
            CubeFace::Top => CubeLayer::NegativeY,
            CubeFace::Back => CubeLayer::PositiveZ,
            CubeFace::Front => CubeLayer::NegativeZ,
        }
    }
}

/// Checks that all six faces are RGBA8, square and the same size, returning that size.
pub fn validate_cube_faces(faces: &[DecodedImage; 6]) -> Result<u32, RenderError> {
    let expected = faces[0].width;
    for (face, image) in CubeFace::ORDER.into_iter().zip(faces) {
        if image.width != expected
            || image.height != expected
            || image.bytes_per_pixel() != BYTES_PER_PIXEL
        {
            return Err(RenderError::CubeFaceMismatch {
                face,
                expected,
                found: image.dimensions(),
            });
        }
    }
    Ok(expected)
}

/// Surface texture for the cube. Nearest filtering keeps the pixel art sharp.
pub struct Texture2D {
    texture: Texture2d,
    sampler: SamplerBehavior,
}

impl Texture2D {
    pub fn load<F: Facade + ?Sized>(facade: &F, path: &Path) -> Result<Self, RenderError> {
        let image = load::decode_image(path)?;
        Self::from_image(facade, &image)
    }

    pub fn from_image<F: Facade + ?Sized>(
        facade: &F,
        image: &DecodedImage,
    ) -> Result<Self, RenderError> {
        let texture =
            Texture2d::with_mipmaps(facade, image.to_raw_image(), MipmapsOption::NoMipmap)
                .map_err(|err| RenderError::ResourceCreation(format!("2D texture: {err:?}")))?;

        Ok(Self {
            texture,
            sampler: SamplerBehavior {
                minify_filter: MinifySamplerFilter::Nearest,
                magnify_filter: MagnifySamplerFilter::Nearest,
                wrap_function: (
                    SamplerWrapFunction::Clamp,
                    SamplerWrapFunction::Clamp,
                    SamplerWrapFunction::Clamp,
                ),
                ..Default::default()
            },
        })
    }

    pub fn texture(&self) -> &Texture2d {
        &self.texture
    }

    pub fn sampler(&self) -> SamplerBehavior {
        self.sampler
    }
}

/// The skybox: six faces sampled by direction.
pub struct CubeMapTexture {
    texture: Cubemap,
    sampler: SamplerBehavior,
}

impl CubeMapTexture {
    /// `paths` are in `CubeFace::ORDER`.
    pub fn load<F: Facade + ?Sized>(
        facade: &F,
        paths: &[PathBuf; 6],
    ) -> Result<Self, RenderError> {
        let mut faces = Vec::with_capacity(paths.len());
        for path in paths {
            faces.push(load::decode_image(path)?);
        }
        let faces: [DecodedImage; 6] = faces
            .try_into()
            .map_err(|_| RenderError::ResourceCreation("cube map needs six faces".to_owned()))?;
        Self::from_faces(facade, &faces)
    }

    pub fn from_faces<F: Facade + ?Sized>(
        facade: &F,
        faces: &[DecodedImage; 6],
    ) -> Result<Self, RenderError> {
        let dimension = validate_cube_faces(faces)?;
        let texture = Cubemap::empty_with_format(
            facade,
            UncompressedFloatFormat::U8U8U8U8,
            MipmapsOption::NoMipmap,
            dimension,
        )
        .map_err(|err| RenderError::ResourceCreation(format!("cube map: {err:?}")))?;

        // there is no direct upload into a cube face, so each image goes through a
        // staging texture that is blitted onto a framebuffer bound to that face
        let target = BlitTarget {
            left: 0,
            bottom: 0,
            width: dimension as i32,
            height: dimension as i32,
        };
        for (face, image) in CubeFace::ORDER.into_iter().zip(faces) {
            let staging =
                Texture2d::with_mipmaps(facade, image.to_raw_image(), MipmapsOption::NoMipmap)
                    .map_err(|err| {
                        RenderError::ResourceCreation(format!("{face:?} face: {err:?}"))
                    })?;
            let framebuffer =
                SimpleFrameBuffer::new(facade, texture.main_level().image(face.layer())).map_err(
                    |err| RenderError::ResourceCreation(format!("{face:?} face: {err:?}")),
                )?;
            staging
                .as_surface()
                .blit_whole_color_to(&framebuffer, &target, MagnifySamplerFilter::Linear);
        }
        log::debug!("uploaded cube map, {dimension}x{dimension} per face");

        Ok(Self {
            texture,
            sampler: SamplerBehavior {
                minify_filter: MinifySamplerFilter::Linear,
                magnify_filter: MagnifySamplerFilter::Linear,
                wrap_function: (
                    SamplerWrapFunction::Clamp,
                    SamplerWrapFunction::Clamp,
                    SamplerWrapFunction::Clamp,
                ),
                ..Default::default()
            },
        })
    }

    pub fn texture(&self) -> &Cubemap {
        &self.texture
    }

    pub fn sampler(&self) -> SamplerBehavior {
        self.sampler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::tests::write_png;

    fn solid(size: (u32, u32)) -> DecodedImage {
        DecodedImage {
            width: size.0,
            height: size.1,
            pixels: vec![0; size.0 as usize * size.1 as usize * BYTES_PER_PIXEL],
        }
    }

    #[test]
    fn face_order_maps_onto_consecutive_gl_slots() {
        let [left, right, bottom, top, back, front] = CubeFace::ORDER.map(CubeFace::layer);
        assert!(matches!(left, CubeLayer::PositiveX));
        assert!(matches!(right, CubeLayer::NegativeX));
        assert!(matches!(bottom, CubeLayer::PositiveY));
        assert!(matches!(top, CubeLayer::NegativeY));
        assert!(matches!(back, CubeLayer::PositiveZ));
        assert!(matches!(front, CubeLayer::NegativeZ));
    }

    #[test]
    fn matching_faces_pass() {
        let faces = std::array::from_fn(|_| solid((16, 16)));
        assert_eq!(validate_cube_faces(&faces).unwrap(), 16);
    }

    #[test]
    fn mismatched_face_is_reported_by_name() {
        let mut faces: [DecodedImage; 6] = std::array::from_fn(|_| solid((16, 16)));
        faces[3] = solid((16, 8));
        match validate_cube_faces(&faces) {
            Err(RenderError::CubeFaceMismatch { face, expected, found }) => {
                assert_eq!(face, CubeFace::Top);
                assert_eq!(expected, 16);
                assert_eq!(found, (16, 8));
            }
            other => panic!("expected a mismatch, got {other:?}"),
        }
    }

    #[test]
    fn non_square_faces_are_rejected() {
        let faces = std::array::from_fn(|_| solid((32, 16)));
        assert!(validate_cube_faces(&faces).is_err());
    }

    #[test]
    fn decoded_skybox_faces_share_a_format() {
        let dir = tempfile::tempdir().unwrap();
        let faces: [DecodedImage; 6] = std::array::from_fn(|i| {
            let face = CubeFace::ORDER[i];
            let path = write_png(dir.path(), face.file_name(), (8, 8), [i as u8 * 40, 0, 0, 255]);
            load::decode_image(&path).unwrap()
        });

        for face in &faces {
            assert!(face.width > 0 && face.height > 0);
            assert_eq!(face.bytes_per_pixel(), BYTES_PER_PIXEL);
        }
        assert_eq!(validate_cube_faces(&faces).unwrap(), 8);
    }

    #[test]
    fn shipped_skybox_is_a_valid_cube_map() {
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
        let paths = crate::config::AssetPaths::in_dir(&dir);
        let faces = paths
            .skybox_faces
            .each_ref()
            .map(|path| load::decode_image(path).unwrap());
        assert!(validate_cube_faces(&faces).unwrap() > 0);

        let atlas = load::decode_image(&paths.texture).unwrap();
        assert_eq!(atlas.bytes_per_pixel(), BYTES_PER_PIXEL);
    }
}
