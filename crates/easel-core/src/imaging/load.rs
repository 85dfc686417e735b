use super::{ImageError, ImageOrigin, ImageResult};
use crate::config::EaselConfig;
use crate::surface::Surface;
use std::path::Path;
use tiny_skia::{ColorU8, Pixmap};

/// A decoded image ready to be drawn, tagged with where it came from.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub pixmap: Pixmap,
    pub origin: ImageOrigin,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }
}

/// Decode PNG, JPEG, GIF, BMP or WebP bytes.
pub fn decode_image(bytes: &[u8], origin: ImageOrigin) -> ImageResult<DecodedImage> {
    let decoded = image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| ImageError::Decode(format!("unusable image size {width}x{height}")))?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }

    log::debug!("Decoded {}x{} image ({:?})", width, height, origin);
    Ok(DecodedImage { pixmap, origin })
}

/// Read and decode an image file.
pub fn read_image_file(path: &Path) -> ImageResult<DecodedImage> {
    let bytes = std::fs::read(path).map_err(|source| ImageError::Io {
        path: path.display().to_string(),
        source,
    })?;
    decode_image(&bytes, ImageOrigin::Local)
}

/// Replace the surface content with `image`.
///
/// The surface is resized to the image, which resets the drawing state, so
/// the color and line width in effect before the load are put back
/// afterwards. Line cap and composite stay at their defaults. Images from
/// untrusted remote hosts taint the surface.
pub fn load_image(
    surface: &mut Surface,
    image: &DecodedImage,
    config: &EaselConfig,
) -> ImageResult<()> {
    let color = surface.state.fill;
    let line_width = surface.state.line_width;

    surface.resize(image.width(), image.height())?;
    surface.draw_image(&image.pixmap, 0, 0);

    surface.state.fill = color;
    surface.state.stroke = color;
    surface.state.line_width = line_width;

    if !image.origin.is_clean(config) {
        surface.taint();
    }
    log::info!(
        "Loaded {}x{} image into surface",
        image.width(),
        image.height()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::imaging::encode_png;
    use crate::surface::{CompositeOp, LineCap};

    fn red_square_png(width: u32, height: u32) -> Vec<u8> {
        let rgba: Vec<u8> = (0..width * height).flat_map(|_| [200, 10, 10, 255]).collect();
        encode_png(&rgba, width, height).unwrap()
    }

    #[test]
    fn test_decode_png() {
        let image = decode_image(&red_square_png(4, 3), ImageOrigin::Inline).unwrap();
        assert_eq!((image.width(), image.height()), (4, 3));
        let px = image.pixmap.pixel(2, 1).unwrap().demultiply();
        assert_eq!((px.red(), px.green(), px.blue(), px.alpha()), (200, 10, 10, 255));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(
            decode_image(b"definitely not an image", ImageOrigin::Local),
            Err(ImageError::Decode(_))
        ));
    }

    #[test]
    fn test_load_resizes_and_restores_style() {
        let mut surface = Surface::new(500, 300).unwrap();
        surface.state.fill = Rgba::rgb(0, 0, 255);
        surface.state.stroke = Rgba::rgb(0, 0, 255);
        surface.state.line_width = 25.0;
        surface.state.line_cap = LineCap::Round;
        surface.state.composite = CompositeOp::DestinationOut;

        let image = decode_image(&red_square_png(8, 6), ImageOrigin::Local).unwrap();
        load_image(&mut surface, &image, &EaselConfig::default()).unwrap();

        assert_eq!((surface.width(), surface.height()), (8, 6));
        assert_eq!(surface.pixel(7, 5), Some(Rgba::rgb(200, 10, 10)));
        assert_eq!(surface.state.fill, Rgba::rgb(0, 0, 255));
        assert_eq!(surface.state.stroke, Rgba::rgb(0, 0, 255));
        assert_eq!(surface.state.line_width, 25.0);
        assert_eq!(surface.state.line_cap, LineCap::Butt);
        assert_eq!(surface.state.composite, CompositeOp::SourceOver);
        assert!(surface.is_origin_clean());
    }

    #[test]
    fn test_untrusted_remote_taints() {
        let bytes = red_square_png(2, 2);
        let config = EaselConfig {
            trusted_origins: vec!["cdn.example.com".to_string()],
            ..EaselConfig::default()
        };
        let mut surface = Surface::new(10, 10).unwrap();

        let trusted = decode_image(
            &bytes,
            ImageOrigin::Remote {
                host: "cdn.example.com".to_string(),
            },
        )
        .unwrap();
        load_image(&mut surface, &trusted, &config).unwrap();
        assert!(surface.is_origin_clean());

        let foreign = decode_image(
            &bytes,
            ImageOrigin::Remote {
                host: "elsewhere.example.org".to_string(),
            },
        )
        .unwrap();
        load_image(&mut surface, &foreign, &config).unwrap();
        assert!(!surface.is_origin_clean());

        // Loading a clean image afterwards resets the taint with the resize.
        let local = decode_image(&bytes, ImageOrigin::Local).unwrap();
        load_image(&mut surface, &local, &config).unwrap();
        assert!(surface.is_origin_clean());
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_image_file(&dir.path().join("nope.png")),
            Err(ImageError::Io { .. })
        ));
    }

    #[test]
    fn test_read_image_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        std::fs::write(&path, red_square_png(3, 3)).unwrap();
        let image = read_image_file(&path).unwrap();
        assert_eq!(image.origin, ImageOrigin::Local);
        assert_eq!(image.width(), 3);
    }
}
