//! The raster paint surface and its drawing context state.
//!
//! A [`Surface`] behaves like a 2D canvas context: drawing calls read the
//! current [`ContextState`] (colors, line width, cap, composite operation)
//! and paint into a premultiplied RGBA raster.

use crate::color::Rgba;
use crate::text::{GlyphBitmap, TextRasterizer};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tiny_skia::{
    BlendMode, FillRule, Paint, PathBuilder, Pixmap, PixmapPaint, PremultipliedColorU8, Rect,
    Stroke, Transform,
};

/// Surface errors.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
}

/// Result type for surface operations.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// How stroke ends are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
}

impl From<LineCap> for tiny_skia::LineCap {
    fn from(cap: LineCap) -> Self {
        match cap {
            LineCap::Butt => tiny_skia::LineCap::Butt,
            LineCap::Round => tiny_skia::LineCap::Round,
        }
    }
}

/// How new paint combines with existing pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompositeOp {
    /// Paint over existing pixels.
    #[default]
    SourceOver,
    /// Remove existing pixels where paint lands.
    DestinationOut,
}

impl From<CompositeOp> for BlendMode {
    fn from(op: CompositeOp) -> Self {
        match op {
            CompositeOp::SourceOver => BlendMode::SourceOver,
            CompositeOp::DestinationOut => BlendMode::DestinationOut,
        }
    }
}

/// Drawing state consulted by every paint call.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextState {
    pub fill: Rgba,
    pub stroke: Rgba,
    pub line_width: f64,
    pub line_cap: LineCap,
    pub composite: CompositeOp,
}

impl Default for ContextState {
    fn default() -> Self {
        Self {
            fill: Rgba::black(),
            stroke: Rgba::black(),
            line_width: 1.0,
            line_cap: LineCap::Butt,
            composite: CompositeOp::SourceOver,
        }
    }
}

/// A raster surface with a 2D-context-like drawing state.
#[derive(Clone)]
pub struct Surface {
    pixmap: Pixmap,
    /// Current drawing state.
    pub state: ContextState,
    /// False once foreign pixels have been drawn onto the surface.
    origin_clean: bool,
    /// Incremented on every raster change.
    revision: u64,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("state", &self.state)
            .field("origin_clean", &self.origin_clean)
            .field("revision", &self.revision)
            .finish()
    }
}

impl Surface {
    /// Create a fully transparent surface.
    pub fn new(width: u32, height: u32) -> SurfaceResult<Self> {
        Ok(Self {
            pixmap: new_pixmap(width, height)?,
            state: ContextState::default(),
            origin_clean: true,
            revision: 0,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Revision counter, bumped whenever pixels change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether the surface can still be exported.
    pub fn is_origin_clean(&self) -> bool {
        self.origin_clean
    }

    /// Mark the surface as holding foreign pixels.
    pub fn taint(&mut self) {
        if self.origin_clean {
            log::debug!("Surface tainted by cross-origin content");
        }
        self.origin_clean = false;
    }

    /// Replace the raster with a transparent one of the new size.
    ///
    /// Like resizing a canvas element, this also resets the drawing state
    /// and clears any taint.
    pub fn resize(&mut self, width: u32, height: u32) -> SurfaceResult<()> {
        self.pixmap = new_pixmap(width, height)?;
        self.state = ContextState::default();
        self.origin_clean = true;
        self.touch();
        Ok(())
    }

    /// Stroke a straight segment with the current stroke style.
    pub fn stroke_segment(&mut self, from: Point, to: Point) {
        let width = self.state.line_width as f32;
        if !(width.is_finite() && width > 0.0) {
            return;
        }
        let paint = self.paint(self.state.stroke);

        if from == to {
            // A zero-length stroke only leaves a mark when the cap is round.
            if self.state.line_cap != LineCap::Round {
                return;
            }
            let Some(dot) = PathBuilder::from_circle(from.x as f32, from.y as f32, width / 2.0)
            else {
                return;
            };
            self.pixmap
                .fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
        } else {
            let mut pb = PathBuilder::new();
            pb.move_to(from.x as f32, from.y as f32);
            pb.line_to(to.x as f32, to.y as f32);
            let Some(path) = pb.finish() else {
                return;
            };
            let stroke = Stroke {
                width,
                line_cap: self.state.line_cap.into(),
                ..Stroke::default()
            };
            self.pixmap
                .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
        self.touch();
    }

    /// Fill a rectangle with the current fill style.
    pub fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let Some(rect) = Rect::from_xywh(x as f32, y as f32, width as f32, height as f32) else {
            return;
        };
        let paint = self.paint(self.state.fill);
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), None);
        self.touch();
    }

    /// Composite glyph coverage with the fill color, baseline at `origin.y`.
    pub fn fill_glyphs(&mut self, glyphs: &[GlyphBitmap], origin: Point) {
        let base_x = origin.x.floor() as i32;
        let base_y = origin.y.floor() as i32;
        for glyph in glyphs {
            self.blend_coverage(
                base_x + glyph.left,
                base_y + glyph.top,
                glyph.width,
                &glyph.coverage,
            );
        }
        if !glyphs.is_empty() {
            self.touch();
        }
    }

    /// Fill a line of text with its alphabetic baseline at `origin`.
    pub fn fill_text(
        &mut self,
        text: &str,
        origin: Point,
        font: &dyn TextRasterizer,
        size_px: f32,
    ) {
        let glyphs = font.layout_line(text, size_px);
        self.fill_glyphs(&glyphs, origin);
    }

    /// Draw another raster source-over at an integer offset.
    pub fn draw_image(&mut self, image: &Pixmap, x: i32, y: i32) {
        self.pixmap.draw_pixmap(
            x,
            y,
            image.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
        self.touch();
    }

    /// Straight-alpha color at a pixel, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        // Pixmap::pixel only bounds-checks the flat index.
        if x >= self.width() || y >= self.height() {
            return None;
        }
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            Rgba::new(c.red(), c.green(), c.blue(), c.alpha())
        })
    }

    /// Premultiplied RGBA bytes, row-major.
    pub fn premultiplied_data(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Straight-alpha RGBA bytes, row-major.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixmap.data().len());
        for p in self.pixmap.pixels() {
            let c = p.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    fn paint(&self, color: Rgba) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(color.to_skia());
        paint.blend_mode = self.state.composite.into();
        paint.anti_alias = true;
        paint
    }

    fn blend_coverage(&mut self, left: i32, top: i32, width: usize, coverage: &[u8]) {
        let surface_w = self.pixmap.width() as i32;
        let surface_h = self.pixmap.height() as i32;
        let color = self.state.fill;
        let composite = self.state.composite;
        let pixels = self.pixmap.pixels_mut();

        for (row, line) in coverage.chunks(width.max(1)).enumerate() {
            let y = top + row as i32;
            if y < 0 || y >= surface_h {
                continue;
            }
            for (col, &cov) in line.iter().enumerate() {
                let x = left + col as i32;
                if cov == 0 || x < 0 || x >= surface_w {
                    continue;
                }
                let idx = (y * surface_w + x) as usize;
                pixels[idx] = blend_pixel(pixels[idx], color, cov, composite);
            }
        }
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

fn new_pixmap(width: u32, height: u32) -> SurfaceResult<Pixmap> {
    Pixmap::new(width, height).ok_or(SurfaceError::InvalidSize { width, height })
}

fn mul_div255(a: u8, b: u8) -> u8 {
    ((a as u16 * b as u16 + 127) / 255) as u8
}

fn blend_pixel(
    dst: PremultipliedColorU8,
    color: Rgba,
    coverage: u8,
    composite: CompositeOp,
) -> PremultipliedColorU8 {
    let sa = mul_div255(color.a, coverage);
    let inv = 255 - sa;
    let (r, g, b, a) = match composite {
        CompositeOp::SourceOver => (
            mul_div255(color.r, sa).saturating_add(mul_div255(dst.red(), inv)),
            mul_div255(color.g, sa).saturating_add(mul_div255(dst.green(), inv)),
            mul_div255(color.b, sa).saturating_add(mul_div255(dst.blue(), inv)),
            sa.saturating_add(mul_div255(dst.alpha(), inv)),
        ),
        CompositeOp::DestinationOut => (
            mul_div255(dst.red(), inv),
            mul_div255(dst.green(), inv),
            mul_div255(dst.blue(), inv),
            mul_div255(dst.alpha(), inv),
        ),
    };
    PremultipliedColorU8::from_rgba(r.min(a), g.min(a), b.min(a), a).unwrap_or(dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opaque(surface: &Surface, x: u32, y: u32) -> bool {
        surface.pixel(x, y).is_some_and(|p| p.a == 255)
    }

    #[test]
    fn test_new_surface_is_transparent() {
        let surface = Surface::new(500, 300).unwrap();
        assert_eq!((surface.width(), surface.height()), (500, 300));
        assert_eq!(surface.pixel(0, 0), Some(Rgba::transparent()));
        assert_eq!(surface.pixel(499, 299), Some(Rgba::transparent()));
        assert_eq!(surface.pixel(500, 0), None);
        assert_eq!(surface.pixel(0, 300), None);
        assert!(surface.is_origin_clean());
    }

    #[test]
    fn test_pixel_past_row_end_does_not_wrap() {
        let mut surface = Surface::new(4, 2).unwrap();
        surface.fill_rect(0.0, 1.0, 1.0, 1.0);
        assert_eq!(surface.pixel(0, 1), Some(Rgba::rgb(0, 0, 0)));
        assert_eq!(surface.pixel(4, 0), None);
        assert_eq!(surface.pixel(u32::MAX, 0), None);
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            Surface::new(0, 10),
            Err(SurfaceError::InvalidSize { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_stroke_segment_paints_along_line() {
        let mut surface = Surface::new(40, 40).unwrap();
        surface.state.line_width = 4.0;
        surface.stroke_segment(Point::new(5.0, 20.0), Point::new(35.0, 20.0));

        assert!(opaque(&surface, 20, 20));
        assert!(opaque(&surface, 10, 19));
        assert_eq!(surface.pixel(20, 5), Some(Rgba::transparent()));
    }

    #[test]
    fn test_degenerate_segment_depends_on_cap() {
        let mut surface = Surface::new(20, 20).unwrap();
        surface.state.line_width = 6.0;
        let revision = surface.revision();

        surface.stroke_segment(Point::new(10.0, 10.0), Point::new(10.0, 10.0));
        assert_eq!(surface.pixel(10, 10), Some(Rgba::transparent()));
        assert_eq!(surface.revision(), revision);

        surface.state.line_cap = LineCap::Round;
        surface.stroke_segment(Point::new(10.0, 10.0), Point::new(10.0, 10.0));
        assert!(opaque(&surface, 10, 10));
        assert!(surface.revision() > revision);
    }

    #[test]
    fn test_destination_out_erases() {
        let mut surface = Surface::new(20, 20).unwrap();
        surface.fill_rect(0.0, 0.0, 20.0, 20.0);
        assert!(opaque(&surface, 10, 10));

        surface.state.composite = CompositeOp::DestinationOut;
        surface.state.line_width = 4.0;
        surface.stroke_segment(Point::new(0.0, 10.0), Point::new(20.0, 10.0));

        assert_eq!(surface.pixel(10, 10).map(|p| p.a), Some(0));
        assert!(opaque(&surface, 10, 2));
    }

    #[test]
    fn test_fill_rect_uses_fill_color() {
        let mut surface = Surface::new(10, 10).unwrap();
        surface.state.fill = Rgba::rgb(255, 0, 0);
        surface.fill_rect(2.0, 3.0, 1.0, 1.0);

        assert_eq!(surface.pixel(2, 3), Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(surface.pixel(3, 3), Some(Rgba::transparent()));
    }

    #[test]
    fn test_resize_resets_state_and_taint() {
        let mut surface = Surface::new(10, 10).unwrap();
        surface.state.line_width = 12.0;
        surface.state.fill = Rgba::rgb(0, 255, 0);
        surface.fill_rect(0.0, 0.0, 10.0, 10.0);
        surface.taint();

        surface.resize(30, 20).unwrap();

        assert_eq!((surface.width(), surface.height()), (30, 20));
        assert_eq!(surface.state, ContextState::default());
        assert_eq!(surface.pixel(5, 5), Some(Rgba::transparent()));
        assert!(surface.is_origin_clean());
    }

    #[test]
    fn test_fill_glyphs_blends_coverage() {
        let mut surface = Surface::new(10, 10).unwrap();
        surface.state.fill = Rgba::rgb(0, 0, 255);
        let glyph = GlyphBitmap {
            left: 1,
            top: -2,
            width: 2,
            height: 2,
            coverage: vec![255, 0, 0, 255],
        };
        surface.fill_glyphs(&[glyph], Point::new(3.0, 5.0));

        assert_eq!(surface.pixel(4, 3), Some(Rgba::rgb(0, 0, 255)));
        assert_eq!(surface.pixel(5, 3), Some(Rgba::transparent()));
        assert_eq!(surface.pixel(5, 4), Some(Rgba::rgb(0, 0, 255)));
    }

    #[test]
    fn test_glyphs_clip_at_edges() {
        let mut surface = Surface::new(4, 4).unwrap();
        let glyph = GlyphBitmap {
            left: -1,
            top: -1,
            width: 3,
            height: 1,
            coverage: vec![255, 255, 255],
        };
        surface.fill_glyphs(&[glyph], Point::new(0.0, 0.0));
        assert_eq!(surface.pixel(0, 0), Some(Rgba::transparent()));
    }

    #[test]
    fn test_to_rgba_is_straight_alpha() {
        let mut surface = Surface::new(2, 1).unwrap();
        surface.state.fill = Rgba::new(200, 100, 50, 255);
        surface.fill_rect(0.0, 0.0, 1.0, 1.0);
        let rgba = surface.to_rgba();
        assert_eq!(&rgba[0..4], &[200, 100, 50, 255]);
        assert_eq!(&rgba[4..8], &[0, 0, 0, 0]);
    }
}
