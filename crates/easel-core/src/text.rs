//! Font loading and single-line glyph layout for the text stamp.

use fontdb::{Database, Family, Query};
use fontdue::{Font, FontSettings};
use std::path::Path;
use thiserror::Error;

/// Text errors.
#[derive(Debug, Error)]
pub enum TextError {
    #[error("No sans-serif font available")]
    FontNotFound,
    #[error("Invalid font data: {0}")]
    InvalidFont(String),
    #[error("Failed to read font file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for text operations.
pub type TextResult<T> = Result<T, TextError>;

/// A coverage bitmap for one glyph, positioned relative to the pen origin.
///
/// `left` is relative to the start of the line and `top` is relative to the
/// alphabetic baseline (negative is above it).
#[derive(Debug, Clone)]
pub struct GlyphBitmap {
    pub left: i32,
    pub top: i32,
    pub width: usize,
    pub height: usize,
    pub coverage: Vec<u8>,
}

/// Turns a line of text into positioned coverage bitmaps.
pub trait TextRasterizer {
    /// Rasterize a single line of text at `size_px`.
    fn layout_line(&self, text: &str, size_px: f32) -> Vec<GlyphBitmap>;
}

/// A rasterizable font face.
pub struct FontFace {
    font: Font,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace").finish_non_exhaustive()
    }
}

impl FontFace {
    /// Parse a font from raw TrueType/OpenType data.
    pub fn from_bytes(data: &[u8], collection_index: u32) -> TextResult<Self> {
        let settings = FontSettings {
            collection_index,
            ..FontSettings::default()
        };
        let font = Font::from_bytes(data, settings)
            .map_err(|e| TextError::InvalidFont(e.to_string()))?;
        Ok(Self { font })
    }

    /// Load a font file from disk.
    pub fn from_file(path: &Path) -> TextResult<Self> {
        let data = std::fs::read(path).map_err(|source| TextError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_bytes(&data, 0)
    }

    /// Find the system's generic sans-serif face.
    pub fn system_sans_serif() -> TextResult<Self> {
        let mut db = Database::new();
        db.load_system_fonts();
        let query = Query {
            families: &[Family::SansSerif],
            ..Query::default()
        };
        let id = db.query(&query).ok_or(TextError::FontNotFound)?;
        db.with_face_data(id, |data, index| Self::from_bytes(data, index))
            .ok_or(TextError::FontNotFound)?
    }
}

impl TextRasterizer for FontFace {
    fn layout_line(&self, text: &str, size_px: f32) -> Vec<GlyphBitmap> {
        let mut glyphs = Vec::new();
        let mut pen_x = 0.0f32;
        let mut previous: Option<char> = None;

        for ch in text.chars() {
            if ch.is_control() {
                continue;
            }
            if let Some(prev) = previous {
                pen_x += self.font.horizontal_kern(prev, ch, size_px).unwrap_or(0.0);
            }

            let (metrics, coverage) = self.font.rasterize(ch, size_px);
            if metrics.width > 0 && metrics.height > 0 {
                glyphs.push(GlyphBitmap {
                    left: (pen_x + metrics.xmin as f32).round() as i32,
                    top: -(metrics.ymin + metrics.height as i32),
                    width: metrics.width,
                    height: metrics.height,
                    coverage,
                });
            }
            pen_x += metrics.advance_width;
            previous = Some(ch);
        }

        glyphs
    }
}

/// Font size used by the text stamp for a given brush width.
pub fn stamp_font_px(line_width: f64, min_px: f64) -> f32 {
    line_width.max(min_px) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_font_has_floor() {
        assert_eq!(stamp_font_px(1.0, 7.0), 7.0);
        assert_eq!(stamp_font_px(7.0, 7.0), 7.0);
        assert_eq!(stamp_font_px(25.0, 7.0), 25.0);
    }

    #[test]
    fn test_invalid_font_data() {
        let result = FontFace::from_bytes(b"definitely not a font", 0);
        assert!(matches!(result, Err(TextError::InvalidFont(_))));
    }

    #[test]
    fn test_missing_font_file() {
        let result = FontFace::from_file(Path::new("/nonexistent/easel/font.ttf"));
        assert!(matches!(result, Err(TextError::Io { .. })));
    }
}
