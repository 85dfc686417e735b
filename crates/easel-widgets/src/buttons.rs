//! Toolbar buttons. Each `show` allocates its own rect and paints it with
//! the shared button look.

use egui::{
    Align2, Color32, CornerRadius, CursorIcon, FontId, Image, ImageSource, Rect, Response,
    RichText, Sense, Stroke, StrokeKind, Ui, Vec2, vec2,
};

use crate::theme;

/// Background for a button in the given interaction state.
fn button_fill(response: &Response, selected: bool) -> Color32 {
    if selected {
        theme::ACCENT
    } else if response.is_pointer_button_down_on() {
        theme::BUTTON_PRESSED
    } else if response.hovered() {
        theme::BUTTON_HOVER
    } else {
        theme::BUTTON_IDLE
    }
}

/// Foreground (icon, dot or label) drawn on top of [`button_fill`].
fn button_ink(selected: bool) -> Color32 {
    if selected { Color32::WHITE } else { theme::TEXT }
}

fn paint_button(ui: &Ui, rect: Rect, response: &Response, selected: bool) {
    let radius = CornerRadius::same(theme::BUTTON_RADIUS);
    ui.painter()
        .rect_filled(rect, radius, button_fill(response, selected));
    if !selected {
        ui.painter()
            .rect_stroke(rect, radius, Stroke::new(1.0, theme::BORDER), StrokeKind::Inside);
    }
}

/// A square button showing an SVG icon, used for tool selection.
pub struct IconButton<'a> {
    icon: ImageSource<'a>,
    name: &'a str,
    shortcut: Option<&'a str>,
    selected: bool,
}

impl<'a> IconButton<'a> {
    pub fn new(icon: ImageSource<'a>, name: &'a str) -> Self {
        Self {
            icon,
            name,
            shortcut: None,
            selected: false,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Keyboard shortcut listed in the tooltip.
    pub fn shortcut(mut self, shortcut: &'a str) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    /// Show the button and return true if clicked.
    pub fn show(self, ui: &mut Ui) -> bool {
        let size = Vec2::splat(theme::TOOL_BUTTON_SIZE);
        let (rect, response) = ui.allocate_exact_size(size, Sense::click());

        if ui.is_rect_visible(rect) {
            paint_button(ui, rect, &response, self.selected);
            let icon_size = size * 0.6;
            Image::new(self.icon)
                .fit_to_exact_size(icon_size)
                .tint(button_ink(self.selected))
                .paint_at(ui, Rect::from_center_size(rect.center(), icon_size));
        }

        let tooltip = match self.shortcut {
            Some(shortcut) => RichText::new(format!("{} ({})", self.name, shortcut)),
            None => RichText::new(self.name),
        };
        let response = response
            .on_hover_text(tooltip)
            .on_hover_cursor(CursorIcon::PointingHand);
        response.clicked()
    }
}

/// A brush size choice, drawn as a dot scaled to the width.
pub struct BrushSizeButton {
    width: f32,
    selected: bool,
}

impl BrushSizeButton {
    pub fn new(width: f32, selected: bool) -> Self {
        Self { width, selected }
    }

    /// Radius of the preview dot inside a button of `height`.
    pub fn dot_radius(width: f32, height: f32) -> f32 {
        (width / 2.0).clamp(1.0, height / 2.0 - 3.0)
    }

    pub fn show(self, ui: &mut Ui) -> bool {
        let size = Vec2::splat(theme::BUTTON_HEIGHT);
        let (rect, response) = ui.allocate_exact_size(size, Sense::click());

        if ui.is_rect_visible(rect) {
            paint_button(ui, rect, &response, self.selected);
            ui.painter().circle_filled(
                rect.center(),
                Self::dot_radius(self.width, size.y),
                button_ink(self.selected),
            );
        }

        let response = response
            .on_hover_text(format!("{} px", self.width))
            .on_hover_cursor(CursorIcon::PointingHand);
        response.clicked()
    }
}

/// A button with a text label. Returns the whole [`Response`] so callers
/// can react to hover and focus as well as clicks.
pub struct TextButton<'a> {
    label: &'a str,
    tooltip: Option<&'a str>,
}

impl<'a> TextButton<'a> {
    pub fn new(label: &'a str) -> Self {
        Self {
            label,
            tooltip: None,
        }
    }

    pub fn tooltip(mut self, tooltip: &'a str) -> Self {
        self.tooltip = Some(tooltip);
        self
    }

    pub fn show(self, ui: &mut Ui) -> Response {
        let font = FontId::proportional(12.0);
        let text_width = ui
            .painter()
            .layout_no_wrap(self.label.to_string(), font.clone(), theme::TEXT)
            .size()
            .x;
        let (rect, response) = ui.allocate_exact_size(
            vec2(text_width + 18.0, theme::BUTTON_HEIGHT),
            Sense::click(),
        );

        if ui.is_rect_visible(rect) {
            paint_button(ui, rect, &response, false);
            ui.painter().text(
                rect.center(),
                Align2::CENTER_CENTER,
                self.label,
                font,
                button_ink(false),
            );
        }

        let response = response.on_hover_cursor(CursorIcon::PointingHand);
        match self.tooltip {
            Some(tooltip) => response.on_hover_text(tooltip),
            None => response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_radius_is_clamped() {
        assert_eq!(BrushSizeButton::dot_radius(1.0, 26.0), 1.0);
        assert_eq!(BrushSizeButton::dot_radius(8.0, 26.0), 4.0);
        assert_eq!(BrushSizeButton::dot_radius(100.0, 26.0), 10.0);
    }

    #[test]
    fn test_selected_ink_contrasts_with_accent() {
        assert_eq!(button_ink(true), Color32::WHITE);
        assert_ne!(button_ink(false), theme::ACCENT);
    }
}
