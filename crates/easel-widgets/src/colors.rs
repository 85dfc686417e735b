//! Color swatches and the quick palette.

use egui::{Color32, CursorIcon, Rect, Sense, Stroke, Ui, vec2};

use crate::theme;

/// Quick palette shown next to the color picker.
pub const QUICK_COLORS: &[(&str, Color32)] = &[
    ("Black", Color32::from_rgb(0, 0, 0)),
    ("Gray", Color32::from_rgb(115, 115, 115)),
    ("White", Color32::from_rgb(255, 255, 255)),
    ("Red", Color32::from_rgb(239, 68, 68)),
    ("Orange", Color32::from_rgb(249, 115, 22)),
    ("Yellow", Color32::from_rgb(234, 179, 8)),
    ("Green", Color32::from_rgb(34, 197, 94)),
    ("Blue", Color32::from_rgb(59, 130, 246)),
    ("Purple", Color32::from_rgb(168, 85, 247)),
];

/// A clickable circular color swatch.
pub struct ColorSwatch<'a> {
    color: Color32,
    tooltip: &'a str,
    selected: bool,
}

impl<'a> ColorSwatch<'a> {
    pub fn new(color: Color32, tooltip: &'a str) -> Self {
        Self {
            color,
            tooltip,
            selected: false,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Show the swatch and return (clicked, rect).
    pub fn show(self, ui: &mut Ui) -> (bool, Rect) {
        let size = vec2(theme::SWATCH_SIZE, theme::SWATCH_SIZE);
        let (rect, response) = ui.allocate_exact_size(size, Sense::click());

        if ui.is_rect_visible(rect) {
            let center = rect.center();
            let radius = rect.width().min(rect.height()) / 2.0;
            ui.painter().circle_filled(center, radius, self.color);
            // Light colors need an outline against the panel.
            ui.painter()
                .circle_stroke(center, radius, Stroke::new(1.0, theme::BORDER));
            if self.selected {
                ui.painter().circle_stroke(
                    center,
                    radius - 3.0,
                    Stroke::new(2.0, contrast_ring(self.color)),
                );
            }
        }

        let clicked = response.clicked();
        response
            .on_hover_text(self.tooltip)
            .on_hover_cursor(CursorIcon::PointingHand);
        (clicked, rect)
    }
}

fn contrast_ring(color: Color32) -> Color32 {
    let luma = 0.299 * color.r() as f32 + 0.587 * color.g() as f32 + 0.114 * color.b() as f32;
    if luma > 140.0 {
        Color32::from_gray(30)
    } else {
        Color32::WHITE
    }
}

/// Check if two colors match (ignoring alpha).
pub fn colors_match(a: Color32, b: Color32) -> bool {
    a.r() == b.r() && a.g() == b.g() && a.b() == b.b()
}

/// Format a color as `#rrggbb`.
pub fn hex_color(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors_match_ignores_alpha() {
        let a = Color32::from_rgba_unmultiplied(10, 20, 30, 255);
        let b = Color32::from_rgb(10, 20, 30);
        assert!(colors_match(a, b));
        assert!(!colors_match(a, Color32::from_rgb(10, 20, 31)));
    }

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color(Color32::from_rgb(255, 0, 16)), "#ff0010");
    }

    #[test]
    fn test_ring_contrasts_with_swatch() {
        assert_eq!(contrast_ring(Color32::WHITE), Color32::from_gray(30));
        assert_eq!(contrast_ring(Color32::BLACK), Color32::WHITE);
    }
}
