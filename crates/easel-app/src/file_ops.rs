//! Platform file operations: saving the picture and loading images.

use easel_core::ImageError;
use thiserror::Error;

/// Errors from saving the picture.
#[derive(Debug, Error)]
pub enum FileOpsError {
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Browser error: {0}")]
    Browser(String),
}

/// Result type for file operations.
pub type FileOpsResult<T> = Result<T, FileOpsError>;

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
mod native {
    use super::{FileOpsError, FileOpsResult};
    use crate::loader::{LoadSender, deliver};
    use easel_core::imaging::{
        ImageError, ImageLocation, ImageResult, decode_data_url, decode_image, read_image_file,
    };
    use std::path::PathBuf;
    use url::Url;

    const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

    /// Write the PNG behind a save link to a file chosen with a save dialog.
    /// Returns false if the dialog was cancelled.
    pub fn save_image(href: &str, file_name: &str) -> FileOpsResult<bool> {
        let png = decode_data_url(href)?;
        let dialog = rfd::FileDialog::new()
            .set_title("Save image")
            .set_file_name(file_name)
            .add_filter("PNG Image", &["png"]);

        let Some(path) = dialog.save_file() else {
            return Ok(false);
        };
        std::fs::write(&path, png).map_err(|source| FileOpsError::Write {
            path: path.display().to_string(),
            source,
        })?;
        log::info!("Saved image to: {:?}", path);
        Ok(true)
    }

    /// Pick an image with a file dialog and read it.
    pub fn pick_image_file(tx: LoadSender) {
        let dialog = rfd::FileDialog::new()
            .set_title("Open image")
            .add_filter("Images", IMAGE_EXTENSIONS);

        match dialog.pick_file() {
            Some(path) => read_image(path, tx),
            None => log::debug!("Open file cancelled"),
        }
    }

    pub fn read_image(path: PathBuf, tx: LoadSender) {
        deliver(&tx, read_image_file(&path));
    }

    /// Fetch and decode a remote image on a worker thread.
    pub fn fetch_image(url: Url, tx: LoadSender) {
        let origin = ImageLocation::Remote(url.clone()).origin();
        let spawned = std::thread::Builder::new()
            .name("easel-fetch".to_string())
            .spawn(move || {
                let result = fetch_bytes(&url).and_then(|bytes| decode_image(&bytes, origin));
                deliver(&tx, result);
            });
        if let Err(e) = spawned {
            log::error!("Failed to start fetch thread: {}", e);
        }
    }

    fn fetch_bytes(url: &Url) -> ImageResult<Vec<u8>> {
        let fetch_error = |reason: String| ImageError::Fetch {
            url: url.to_string(),
            reason,
        };
        let response = reqwest::blocking::get(url.clone())
            .and_then(|response| response.error_for_status())
            .map_err(|e| fetch_error(e.to_string()))?;
        let bytes = response.bytes().map_err(|e| fetch_error(e.to_string()))?;
        log::info!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
pub use native::*;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::{FileOpsError, FileOpsResult};
    use crate::loader::{LoadSender, deliver};
    use crate::web::{Child, document, elt};
    use easel_core::imaging::{
        ImageError, ImageLocation, ImageOrigin, decode_data_url, decode_image,
    };
    use std::path::PathBuf;
    use url::Url;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;

    fn js_reason(value: &JsValue) -> String {
        value.as_string().unwrap_or_else(|| format!("{:?}", value))
    }

    /// Download the picture through a generated `<a download>` link.
    pub fn save_image(href: &str, file_name: &str) -> FileOpsResult<bool> {
        let anchor = elt(
            "a",
            &[("href", href), ("download", file_name)],
            std::iter::empty::<Child>(),
        )
        .and_then(|a| a.dyn_into::<web_sys::HtmlElement>().map_err(JsValue::from))
        .map_err(|e| FileOpsError::Browser(js_reason(&e)))?;
        anchor.click();
        log::info!("Downloaded {}", file_name);
        Ok(true)
    }

    /// Open a hidden file input. The chosen file is read as a data URL and
    /// decoded when the browser hands it over.
    pub fn pick_image_file(tx: LoadSender) {
        if let Err(e) = trigger_file_input(tx) {
            log::error!("Failed to open file picker: {}", js_reason(&e));
        }
    }

    fn trigger_file_input(tx: LoadSender) -> Result<(), JsValue> {
        let input = elt(
            "input",
            &[("type", "file"), ("accept", "image/*"), ("style", "display: none")],
            std::iter::empty::<Child>(),
        )?
        .dyn_into::<web_sys::HtmlInputElement>()
        .map_err(JsValue::from)?;

        let input_clone = input.clone();
        let onchange = Closure::once(Box::new(move |_event: web_sys::Event| {
            // An empty selection does nothing.
            if let Some(file) = input_clone.files().and_then(|files| files.get(0)) {
                if let Err(e) = read_as_data_url(file, tx) {
                    log::error!("Failed to read file: {}", js_reason(&e));
                }
            }
            input_clone.remove();
        }) as Box<dyn FnOnce(_)>);

        input.set_onchange(Some(onchange.as_ref().unchecked_ref()));
        onchange.forget();

        document()?
            .body()
            .ok_or_else(|| JsValue::from_str("No body"))?
            .append_child(&input)?;
        input.click();
        Ok(())
    }

    fn read_as_data_url(file: web_sys::File, tx: LoadSender) -> Result<(), JsValue> {
        let reader = web_sys::FileReader::new()?;
        let reader_clone = reader.clone();
        let name = file.name();

        let onload = Closure::once(Box::new(move |_event: web_sys::Event| {
            let result = match reader_clone.result().ok().and_then(|r| r.as_string()) {
                Some(data_url) => decode_data_url(&data_url)
                    .and_then(|bytes| decode_image(&bytes, ImageOrigin::Local)),
                None => Err(ImageError::DataUrl(format!("{name}: no data"))),
            };
            deliver(&tx, result);
        }) as Box<dyn FnOnce(_)>);

        reader.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();
        reader.read_as_data_url(&file)
    }

    /// Local paths are not readable from a page.
    pub fn read_image(path: PathBuf, tx: LoadSender) {
        deliver(
            &tx,
            Err(ImageError::UnsupportedLocation(format!(
                "{} (local paths can't be opened in the browser)",
                path.display()
            ))),
        );
    }

    /// Fetch and decode a remote image.
    pub fn fetch_image(url: Url, tx: LoadSender) {
        wasm_bindgen_futures::spawn_local(async move {
            let origin = ImageLocation::Remote(url.clone()).origin();
            let result = fetch_bytes(&url)
                .await
                .map_err(|e| ImageError::Fetch {
                    url: url.to_string(),
                    reason: js_reason(&e),
                })
                .and_then(|bytes| decode_image(&bytes, origin));
            deliver(&tx, result);
        });
    }

    async fn fetch_bytes(url: &Url) -> Result<Vec<u8>, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let response: web_sys::Response = JsFuture::from(window.fetch_with_str(url.as_str()))
            .await?
            .dyn_into()?;
        if !response.ok() {
            return Err(JsValue::from_str(&format!("HTTP {}", response.status())));
        }
        let buffer = JsFuture::from(response.array_buffer()?).await?;
        Ok(js_sys::Uint8Array::new(&buffer).to_vec())
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::*;
