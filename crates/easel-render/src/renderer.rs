//! The renderer seam: what a frame needs to present the picture, and the
//! trait a backend implements to turn that into a scene.

use easel_core::geometry::Viewport;
use easel_core::surface::Surface;
use kurbo::{Point, Size};
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Outline of the brush under the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushPreview {
    /// Center in surface pixels.
    pub center: Point,
    /// Brush width in surface pixels.
    pub width: f64,
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The picture to present.
    pub surface: &'a Surface,
    /// Where the picture sits in the window.
    pub viewport: Viewport,
    /// Window size in physical pixels.
    pub viewport_size: Size,
    /// Window background color.
    pub background_color: Color,
    /// Color under transparent picture pixels.
    pub page_color: Color,
    /// Border drawn around the picture panel.
    pub border_color: Color,
    /// Brush outline, when the pointer is over the picture.
    pub brush_preview: Option<BrushPreview>,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(surface: &'a Surface, viewport_size: Size) -> Self {
        Self {
            surface,
            viewport: Viewport::default(),
            viewport_size,
            background_color: Color::from_rgba8(244, 244, 245, 255),
            page_color: Color::WHITE,
            border_color: Color::from_rgba8(160, 160, 170, 255),
            brush_preview: None,
        }
    }

    /// Set where the picture is placed.
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Set the brush outline.
    pub fn with_brush_preview(mut self, preview: Option<BrushPreview>) -> Self {
        self.brush_preview = preview;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Build the scene for a frame.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let surface = Surface::new(10, 10).unwrap();
        let viewport = Viewport::new(Point::new(12.0, 8.0), 2.0);
        let ctx = RenderContext::new(&surface, Size::new(100.0, 80.0))
            .with_viewport(viewport)
            .with_background(Color::BLACK)
            .with_brush_preview(Some(BrushPreview {
                center: Point::new(5.0, 5.0),
                width: 3.0,
            }));

        assert_eq!(ctx.viewport, viewport);
        assert_eq!(ctx.background_color.to_rgba8(), Color::BLACK.to_rgba8());
        assert!(ctx.brush_preview.is_some());
    }
}
