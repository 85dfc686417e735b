//! Loading images into the surface and exporting it again.

mod export;
mod load;
mod location;

pub use export::{ExportError, ExportResult, SAVE_FILE_NAME, SaveLink, encode_png, to_data_url};
pub use load::{DecodedImage, decode_image, load_image, read_image_file};
pub use location::{ImageLocation, decode_data_url};

use crate::config::EaselConfig;
use thiserror::Error;

/// Image loading errors.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Malformed data URL: {0}")]
    DataUrl(String),
    #[error("Unsupported image location: {0}")]
    UnsupportedLocation(String),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error(transparent)]
    Surface(#[from] crate::surface::SurfaceError),
}

/// Result type for image operations.
pub type ImageResult<T> = Result<T, ImageError>;

/// Where loaded pixels came from, for taint tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOrigin {
    /// A file picked by the user or given on disk.
    Local,
    /// Inline `data:` URL.
    Inline,
    /// A remote host.
    Remote { host: String },
}

impl ImageOrigin {
    /// Whether drawing this image keeps the surface exportable.
    pub fn is_clean(&self, config: &EaselConfig) -> bool {
        match self {
            ImageOrigin::Local | ImageOrigin::Inline => true,
            ImageOrigin::Remote { host } => config.is_trusted_origin(host),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_cleanliness() {
        let empty = EaselConfig::default();
        let trusted = EaselConfig {
            trusted_origins: vec!["cdn.example.com".to_string()],
            ..EaselConfig::default()
        };
        assert!(ImageOrigin::Local.is_clean(&empty));
        assert!(ImageOrigin::Inline.is_clean(&empty));
        assert!(
            ImageOrigin::Remote {
                host: "CDN.example.com".to_string()
            }
            .is_clean(&trusted)
        );
        assert!(
            !ImageOrigin::Remote {
                host: "other.example.com".to_string()
            }
            .is_clean(&trusted)
        );
    }
}
