//! Frames and small layout pieces for the toolbar row.

use egui::epaint::Shadow;
use egui::{Color32, CornerRadius, Frame, Margin, Pos2, RichText, Stroke, Ui};

use crate::theme;

/// Thin vertical rule between two toolbar controls.
pub fn vertical_separator(ui: &mut Ui) {
    const HEIGHT: f32 = 16.0;
    let left = ui.available_rect_before_wrap().left() + 1.0;
    let mid = ui.min_rect().center().y;
    ui.painter().line_segment(
        [Pos2::new(left, mid - HEIGHT / 2.0), Pos2::new(left, mid + HEIGHT / 2.0)],
        Stroke::new(1.0, theme::BORDER),
    );
    ui.add_space(3.0);
}

/// Caption in front of a control, e.g. "Tool" or "Brush size".
pub fn section_label(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).size(10.5).color(theme::TEXT_MUTED));
}

fn floating_frame(blur: u8, alpha: u8) -> Frame {
    Frame::new()
        .fill(theme::PANEL_BG)
        .corner_radius(CornerRadius::same(theme::PANEL_RADIUS))
        .stroke(Stroke::new(1.0, theme::BORDER))
        .shadow(Shadow {
            offset: [0, 2],
            blur,
            spread: 0,
            color: Color32::from_black_alpha(alpha),
        })
}

/// Frame of the text prompt.
pub fn panel_frame() -> Frame {
    floating_frame(10, 20).inner_margin(Margin::same(12))
}

/// Frame of the toolbar above the picture.
pub fn toolbar_frame() -> Frame {
    floating_frame(4, 10).inner_margin(Margin::symmetric(8, 6))
}
