//! Delivery of images loaded outside the UI thread.
//!
//! Fetches, file reads and file pickers finish at some later point (on a
//! worker thread natively, in a promise callback on the web). Each one sends
//! its decoded image back through a channel that the app drains once per
//! frame.

use crate::file_ops;
use easel_core::LoadRequest;
use easel_core::imaging::{DecodedImage, ImageResult};
use std::sync::mpsc::{Receiver, Sender, channel};

/// Outcome of one load.
pub type LoadResult = ImageResult<DecodedImage>;

pub(crate) type LoadSender = Sender<LoadResult>;

/// Send a finished load back to the UI.
pub(crate) fn deliver(tx: &LoadSender, result: LoadResult) {
    if tx.send(result).is_err() {
        log::warn!("Image loader closed, dropping result");
    }
}

/// Starts loads and hands back their results.
pub struct ImageLoader {
    tx: LoadSender,
    rx: Receiver<LoadResult>,
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageLoader {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }

    /// Start the work described by `request`.
    pub fn request(&self, request: LoadRequest) {
        match request {
            LoadRequest::Fetch(url) => {
                log::info!("Fetching image from {}", url);
                file_ops::fetch_image(url, self.tx.clone());
            }
            LoadRequest::ReadFile(path) => {
                log::info!("Reading image from {}", path.display());
                file_ops::read_image(path, self.tx.clone());
            }
        }
    }

    /// Ask the user for a local image file. Cancelling does nothing.
    pub fn open_file(&self) {
        file_ops::pick_image_file(self.tx.clone());
    }

    /// Next finished load, if any.
    pub fn try_next(&self) -> Option<LoadResult> {
        self.rx.try_recv().ok()
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use easel_core::imaging::{ImageError, ImageOrigin, encode_png};

    #[test]
    fn test_read_file_is_delivered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        let png = encode_png(&[255, 0, 0, 255, 0, 0, 255, 255], 2, 1).unwrap();
        std::fs::write(&path, png).unwrap();

        let loader = ImageLoader::new();
        loader.request(LoadRequest::ReadFile(path));

        let image = loader.try_next().unwrap().unwrap();
        assert_eq!((image.width(), image.height()), (2, 1));
        assert_eq!(image.origin, ImageOrigin::Local);
        assert!(loader.try_next().is_none());
    }

    #[test]
    fn test_missing_file_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ImageLoader::new();
        loader.request(LoadRequest::ReadFile(dir.path().join("missing.png")));

        assert!(matches!(loader.try_next(), Some(Err(ImageError::Io { .. }))));
    }

    #[test]
    fn test_empty_loader() {
        assert!(ImageLoader::new().try_next().is_none());
    }
}
