use super::{ImageError, ImageOrigin, ImageResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::PathBuf;
use url::Url;

/// A parsed image address from the open-URL control.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageLocation {
    /// Bytes carried inline by a `data:` URL.
    Inline(Vec<u8>),
    /// An `http`/`https` URL to fetch.
    Remote(Url),
    /// A local file (`file://` URL or plain path).
    File(PathBuf),
}

impl ImageLocation {
    /// Parse user input.
    ///
    /// Supported forms:
    /// - `data:[<mime>][;base64],<payload>`
    /// - `http://...` and `https://...`
    /// - `file:///path/to/image.png`
    /// - `/path/to/image.png`
    pub fn parse(input: &str) -> ImageResult<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ImageError::UnsupportedLocation("empty location".to_string()));
        }
        if input.get(..5).is_some_and(|s| s.eq_ignore_ascii_case("data:")) {
            return decode_data_url(input).map(Self::Inline);
        }

        match Url::parse(input) {
            Ok(url) => match url.scheme() {
                "http" | "https" => Ok(Self::Remote(url)),
                "file" => file_url_path(&url).map(Self::File),
                // Windows drive letters parse as one-letter schemes.
                scheme if scheme.len() == 1 => Ok(Self::File(PathBuf::from(input))),
                scheme => Err(ImageError::UnsupportedLocation(format!(
                    "unsupported scheme '{scheme}'"
                ))),
            },
            Err(e) if input.contains("://") => Err(ImageError::UnsupportedLocation(format!(
                "{input}: {e}"
            ))),
            Err(_) => Ok(Self::File(PathBuf::from(input))),
        }
    }

    /// Origin used for taint tracking.
    pub fn origin(&self) -> ImageOrigin {
        match self {
            ImageLocation::Inline(_) => ImageOrigin::Inline,
            ImageLocation::File(_) => ImageOrigin::Local,
            ImageLocation::Remote(url) => ImageOrigin::Remote {
                host: url.host_str().unwrap_or_default().to_string(),
            },
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn file_url_path(url: &Url) -> ImageResult<PathBuf> {
    url.to_file_path()
        .map_err(|_| ImageError::UnsupportedLocation(url.to_string()))
}

#[cfg(target_arch = "wasm32")]
fn file_url_path(url: &Url) -> ImageResult<PathBuf> {
    Err(ImageError::UnsupportedLocation(url.to_string()))
}

/// Decode the payload of a `data:` URL.
pub fn decode_data_url(input: &str) -> ImageResult<Vec<u8>> {
    let rest = input
        .get(..5)
        .filter(|scheme| scheme.eq_ignore_ascii_case("data:"))
        .map(|_| &input[5..])
        .ok_or_else(|| ImageError::DataUrl("missing data: scheme".to_string()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| ImageError::DataUrl("missing ',' separator".to_string()))?;

    let is_base64 = meta
        .rsplit(';')
        .next()
        .is_some_and(|param| param.trim().eq_ignore_ascii_case("base64"));

    if is_base64 {
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| ImageError::DataUrl(e.to_string()))
    } else {
        percent_decode(payload)
    }
}

fn percent_decode(payload: &str) -> ImageResult<Vec<u8>> {
    let bytes = payload.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| ImageError::DataUrl(format!("bad escape at byte {i}")))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_data_url() {
        let bytes = decode_data_url("data:image/png;base64,aGVs\nbG8=").unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_percent_encoded_data_url() {
        let bytes = decode_data_url("data:text/plain,a%20b%2Cc").unwrap();
        assert_eq!(bytes, b"a b,c");
    }

    #[test]
    fn test_malformed_data_urls() {
        assert!(matches!(decode_data_url("data:image/png;base64"), Err(ImageError::DataUrl(_))));
        assert!(matches!(decode_data_url("data:,%zz"), Err(ImageError::DataUrl(_))));
        assert!(matches!(decode_data_url("http://x"), Err(ImageError::DataUrl(_))));
    }

    #[test]
    fn test_parse_locations() {
        match ImageLocation::parse("  https://images.example.com/cat.png ").unwrap() {
            ImageLocation::Remote(url) => assert_eq!(url.host_str(), Some("images.example.com")),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            ImageLocation::parse("DATA:,abc").unwrap(),
            ImageLocation::Inline(b"abc".to_vec())
        );
        assert_eq!(
            ImageLocation::parse("pictures/cat.png").unwrap(),
            ImageLocation::File(PathBuf::from("pictures/cat.png"))
        );
    }

    #[test]
    fn test_non_ascii_input_is_a_path() {
        // Byte 5 falls inside 'é'.
        assert_eq!(
            ImageLocation::parse("abcdé.png").unwrap(),
            ImageLocation::File(PathBuf::from("abcdé.png"))
        );
        assert_eq!(
            ImageLocation::parse("é").unwrap(),
            ImageLocation::File(PathBuf::from("é"))
        );
    }

    #[test]
    fn test_unfinished_url_rejected() {
        // The open-URL field starts out as "http://".
        assert!(matches!(
            ImageLocation::parse("http://"),
            Err(ImageError::UnsupportedLocation(_))
        ));
        assert!(matches!(
            ImageLocation::parse("ftp://example.com/a.png"),
            Err(ImageError::UnsupportedLocation(_))
        ));
        assert!(matches!(ImageLocation::parse("   "), Err(ImageError::UnsupportedLocation(_))));
    }

    #[test]
    fn test_origins() {
        let remote = ImageLocation::parse("http://a.example.com/x.png").unwrap();
        assert_eq!(
            remote.origin(),
            ImageOrigin::Remote {
                host: "a.example.com".to_string()
            }
        );
        assert_eq!(ImageLocation::parse("/tmp/x.png").unwrap().origin(), ImageOrigin::Local);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_url() {
        assert_eq!(
            ImageLocation::parse("file:///tmp/cat.png").unwrap(),
            ImageLocation::File(PathBuf::from("/tmp/cat.png"))
        );
    }
}
