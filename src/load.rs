use std::path::Path;

use crate::error::RenderError;

pub const BYTES_PER_PIXEL: usize = 4;

/// An image decoded to tightly packed 8-bit RGBA, rows top to bottom.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Every decoded image is converted to 32-bit color, whatever the file held.
    pub fn bytes_per_pixel(&self) -> usize {
        self.pixels.len() / (self.width as usize * self.height as usize).max(1)
    }

    /// glium wants rows bottom to top.
    pub fn to_raw_image(&self) -> glium::texture::RawImage2d<'static, u8> {
        glium::texture::RawImage2d::from_raw_rgba_reversed(&self.pixels, self.dimensions())
    }
}

/// Decode the file at `path`, converting to RGBA8.
pub fn decode_image(path: &Path) -> Result<DecodedImage, RenderError> {
    let image = image::open(path)
        .map_err(|err| RenderError::asset(path, err))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(RenderError::asset(path, "image has no pixels"));
    }

    log::debug!("decoded {} ({width}x{height})", path.display());
    Ok(DecodedImage {
        width,
        height,
        pixels: image.into_raw(),
    })
}

pub fn read_shader_source(path: &Path) -> Result<String, RenderError> {
    std::fs::read_to_string(path).map_err(|err| RenderError::asset(path, err))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Writes a solid-color PNG and returns its path.
    pub(crate) fn write_png(
        dir: &Path,
        name: &str,
        size: (u32, u32),
        color: [u8; 4],
    ) -> std::path::PathBuf {
        let path = dir.join(name);
        image::RgbaImage::from_pixel(size.0, size.1, image::Rgba(color))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn decodes_to_rgba8() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "red.png", (4, 2), [255, 0, 0, 255]);

        let image = decode_image(&path).unwrap();
        assert_eq!(image.dimensions(), (4, 2));
        assert_eq!(image.bytes_per_pixel(), BYTES_PER_PIXEL);
        assert_eq!(&image.pixels[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn rgb_files_are_widened() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb.png");
        image::RgbImage::from_pixel(3, 3, image::Rgb([1, 2, 3]))
            .save(&path)
            .unwrap();

        let image = decode_image(&path).unwrap();
        assert_eq!(image.bytes_per_pixel(), BYTES_PER_PIXEL);
        assert_eq!(&image.pixels[..4], &[1, 2, 3, 255]);
    }

    #[test]
    fn decoding_twice_gives_equal_independent_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "atlas.png", (8, 8), [10, 20, 30, 255]);

        let first = decode_image(&path).unwrap();
        let second = decode_image(&path).unwrap();
        assert_eq!(first, second);

        drop(first);
        assert_eq!(second.pixels.len(), 8 * 8 * BYTES_PER_PIXEL);
    }

    #[test]
    fn missing_image_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.png");
        match decode_image(&path) {
            Err(RenderError::AssetLoad { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected AssetLoad, got {other:?}"),
        }
    }

    #[test]
    fn garbage_image_is_an_asset_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        assert!(matches!(
            decode_image(&path),
            Err(RenderError::AssetLoad { .. })
        ));
    }

    #[test]
    fn reads_shader_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vertex.glsl");
        std::fs::write(&path, "#version 330 core\nvoid main() {}\n").unwrap();
        assert!(read_shader_source(&path).unwrap().starts_with("#version 330"));
        assert!(read_shader_source(&dir.path().join("missing.glsl")).is_err());
    }
}
