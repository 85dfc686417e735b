//! Vello-based renderer implementation.

use crate::renderer::{BrushPreview, RenderContext, Renderer};
use kurbo::{Affine, Circle, Rect, Stroke};
use peniko::{Blob, Color, Fill, ImageAlphaType, ImageData, ImageFormat};
use std::sync::Arc;
use vello::Scene;

/// Presents a paint surface as an image inside a bordered panel.
pub struct SurfaceRenderer {
    /// The Vello scene being built.
    scene: Scene,
    /// Uploaded picture, keyed by surface revision and size.
    image_cache: Option<CachedImage>,
}

struct CachedImage {
    revision: u64,
    width: u32,
    height: u32,
    image: ImageData,
}

impl Default for SurfaceRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceRenderer {
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            image_cache: None,
        }
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Revision of the picture currently uploaded, if any.
    pub fn cached_revision(&self) -> Option<u64> {
        self.image_cache.as_ref().map(|c| c.revision)
    }

    fn surface_image(&mut self, ctx: &RenderContext) -> ImageData {
        let surface = ctx.surface;
        let fresh = self.image_cache.as_ref().is_some_and(|c| {
            c.revision == surface.revision()
                && c.width == surface.width()
                && c.height == surface.height()
        });
        if !fresh {
            let resized = self
                .image_cache
                .as_ref()
                .is_none_or(|c| c.width != surface.width() || c.height != surface.height());
            if resized {
                log::debug!(
                    "Uploading {}x{} picture",
                    surface.width(),
                    surface.height()
                );
            } else {
                log::trace!("Re-uploading picture at revision {}", surface.revision());
            }
            self.image_cache = None;
        }
        let cached = self.image_cache.get_or_insert_with(|| CachedImage {
            revision: surface.revision(),
            width: surface.width(),
            height: surface.height(),
            image: ImageData {
                data: Blob::new(Arc::new(surface.premultiplied_data().to_vec())),
                format: ImageFormat::Rgba8,
                width: surface.width(),
                height: surface.height(),
                alpha_type: ImageAlphaType::AlphaPremultiplied,
            },
        });
        cached.image.clone()
    }

    fn render_brush_preview(&mut self, preview: BrushPreview, transform: Affine, scale: f64) {
        let radius = (preview.width / 2.0).max(0.5);
        let circle = Circle::new(preview.center, radius);
        let stroke = Stroke::new(1.0 / scale);
        self.scene.stroke(
            &stroke,
            transform,
            Color::from_rgba8(0, 0, 0, 110),
            None,
            &circle,
        );
    }
}

impl Renderer for SurfaceRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.scene.reset();

        let scale = ctx.viewport.scale.max(1e-6);
        let transform = Affine::translate(ctx.viewport.origin.to_vec2()) * Affine::scale(scale);
        let page = Rect::new(
            0.0,
            0.0,
            ctx.surface.width() as f64,
            ctx.surface.height() as f64,
        );

        // Transparent pixels show the page color.
        self.scene
            .fill(Fill::NonZero, transform, ctx.page_color, None, &page);

        let image = self.surface_image(ctx);
        self.scene.draw_image(&peniko::ImageBrush::from(image), transform);

        let border = Stroke::new(1.0 / scale);
        self.scene.stroke(
            &border,
            transform,
            ctx.border_color,
            None,
            &page.inflate(0.5 / scale, 0.5 / scale),
        );

        if let Some(preview) = ctx.brush_preview {
            self.render_brush_preview(preview, transform, scale);
        }
    }
}
