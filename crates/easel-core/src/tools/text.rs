//! Text stamp tool.

use crate::surface::Surface;
use crate::text::{TextRasterizer, stamp_font_px};
use kurbo::Point;

/// Prompt shown when the text tool is used.
pub const TEXT_PROMPT: &str = "Text:";

/// Draw `text` with its baseline at `pos`, sized from the current brush.
///
/// Returns false (drawing nothing) for empty text.
pub fn stamp_text(
    surface: &mut Surface,
    font: &dyn TextRasterizer,
    pos: Point,
    text: &str,
    min_font_px: f64,
) -> bool {
    if text.is_empty() {
        return false;
    }
    let size = stamp_font_px(surface.state.line_width, min_font_px);
    surface.fill_text(text, pos, font, size);
    log::debug!("Stamped {:?} at {}px", text, size);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::text::GlyphBitmap;
    use std::cell::Cell;

    /// One solid block per character, `size` pixels tall, sitting on the baseline.
    struct Blocks {
        last_size: Cell<f32>,
    }

    impl TextRasterizer for Blocks {
        fn layout_line(&self, text: &str, size_px: f32) -> Vec<GlyphBitmap> {
            self.last_size.set(size_px);
            let side = size_px as usize;
            text.chars()
                .enumerate()
                .map(|(i, _)| GlyphBitmap {
                    left: (i * (side + 1)) as i32,
                    top: -(side as i32),
                    width: side,
                    height: side,
                    coverage: vec![255; side * side],
                })
                .collect()
        }
    }

    fn blocks() -> Blocks {
        Blocks {
            last_size: Cell::new(0.0),
        }
    }

    #[test]
    fn test_empty_text_draws_nothing() {
        let mut surface = Surface::new(20, 20).unwrap();
        let font = blocks();
        assert!(!stamp_text(&mut surface, &font, Point::new(5.0, 15.0), "", 7.0));
        assert_eq!(surface.revision(), 0);
        assert_eq!(font.last_size.get(), 0.0);
    }

    #[test]
    fn test_text_sits_on_baseline_in_fill_color() {
        let mut surface = Surface::new(40, 20).unwrap();
        surface.state.fill = Rgba::rgb(255, 0, 0);
        surface.state.stroke = Rgba::rgb(0, 0, 255);
        let font = blocks();

        assert!(stamp_text(&mut surface, &font, Point::new(2.0, 10.0), "ab", 7.0));

        // Size floors at 7px for a 1px brush.
        assert_eq!(font.last_size.get(), 7.0);
        assert_eq!(surface.pixel(2, 3), Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(surface.pixel(8, 9), Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(surface.pixel(2, 10).map(|p| p.a), Some(0));
        assert_eq!(surface.pixel(2, 2).map(|p| p.a), Some(0));
        // Second glyph starts one pixel after the first.
        assert_eq!(surface.pixel(9, 5).map(|p| p.a), Some(0));
        assert_eq!(surface.pixel(10, 5), Some(Rgba::rgb(255, 0, 0)));
    }

    #[test]
    fn test_font_size_follows_brush() {
        let mut surface = Surface::new(40, 40).unwrap();
        surface.state.line_width = 12.0;
        let font = blocks();
        stamp_text(&mut surface, &font, Point::new(0.0, 30.0), "x", 7.0);
        assert_eq!(font.last_size.get(), 12.0);
    }
}
