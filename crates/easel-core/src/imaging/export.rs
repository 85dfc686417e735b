use crate::surface::Surface;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// File name offered by the save link.
pub const SAVE_FILE_NAME: &str = "image.png";

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The surface holds pixels from an untrusted origin.
    #[error("SecurityError: {0}")]
    Security(String),
    #[error("Failed to encode PNG: {0}")]
    Encode(String),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Encode straight-alpha RGBA pixel data to PNG bytes.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> ExportResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| ExportError::Encode(e.to_string()))?;
        writer
            .write_image_data(rgba_data)
            .map_err(|e| ExportError::Encode(e.to_string()))?;
    }
    Ok(png_data)
}

/// Encode the surface as a `data:image/png;base64,...` URL.
pub fn to_data_url(surface: &Surface) -> ExportResult<String> {
    if !surface.is_origin_clean() {
        return Err(ExportError::Security(
            "The surface has been tainted by cross-origin data.".to_string(),
        ));
    }
    let png = encode_png(&surface.to_rgba(), surface.width(), surface.height())?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

/// State of the save control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveLink {
    /// A download link for the current picture.
    Ready { href: String, download: String },
    /// Saving is not possible; `message` is shown instead.
    Blocked { message: String },
}

impl SaveLink {
    /// Recompute the link from the current surface content.
    ///
    /// A tainted surface yields [`SaveLink::Blocked`]. Encoding failures are
    /// returned as errors.
    pub fn refresh(surface: &Surface) -> ExportResult<Self> {
        match to_data_url(surface) {
            Ok(href) => Ok(SaveLink::Ready {
                href,
                download: SAVE_FILE_NAME.to_string(),
            }),
            Err(e @ ExportError::Security(_)) => {
                log::warn!("Save blocked: {}", e);
                Ok(SaveLink::Blocked {
                    message: format!("Can't save: {e}"),
                })
            }
            Err(e) => Err(e),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SaveLink::Ready { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::imaging::{ImageOrigin, decode_data_url, decode_image};

    #[test]
    fn test_encode_png_signature() {
        let png = encode_png(&[0, 0, 0, 255], 1, 1).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_encode_rejects_short_buffer() {
        assert!(matches!(
            encode_png(&[0, 0, 0], 2, 2),
            Err(ExportError::Encode(_))
        ));
    }

    #[test]
    fn test_data_url_round_trips_pixels() {
        let mut surface = Surface::new(6, 4).unwrap();
        surface.state.fill = Rgba::rgb(10, 200, 30);
        surface.fill_rect(0.0, 0.0, 3.0, 4.0);

        let url = to_data_url(&surface).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        let decoded = decode_image(&decode_data_url(&url).unwrap(), ImageOrigin::Inline).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (6, 4));
        let left = decoded.pixmap.pixel(1, 1).unwrap().demultiply();
        let right = decoded.pixmap.pixel(5, 1).unwrap();
        assert_eq!((left.red(), left.green(), left.blue()), (10, 200, 30));
        assert_eq!(right.alpha(), 0);
    }

    #[test]
    fn test_save_link_ready() {
        let surface = Surface::new(2, 2).unwrap();
        match SaveLink::refresh(&surface).unwrap() {
            SaveLink::Ready { href, download } => {
                assert!(href.starts_with("data:image/png;base64,"));
                assert_eq!(download, "image.png");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_tainted_surface_blocks_save() {
        let mut surface = Surface::new(2, 2).unwrap();
        surface.taint();

        assert!(matches!(to_data_url(&surface), Err(ExportError::Security(_))));
        let link = SaveLink::refresh(&surface).unwrap();
        assert!(!link.is_ready());
        match link {
            SaveLink::Blocked { message } => {
                assert!(message.starts_with("Can't save: SecurityError: "), "{message}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
