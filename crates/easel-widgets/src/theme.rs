//! Palette and metrics shared by the toolbar widgets.

use egui::Color32;

pub const TEXT: Color32 = Color32::from_rgb(48, 48, 52);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(128, 128, 136);
/// Status line color for failed loads and blocked saves.
pub const TEXT_ERROR: Color32 = Color32::from_rgb(185, 28, 28);
pub const BORDER: Color32 = Color32::from_rgb(214, 214, 220);
/// Fill of the selected tool and brush size.
pub const ACCENT: Color32 = Color32::from_rgb(37, 99, 235);
pub const PANEL_BG: Color32 = Color32::from_rgba_premultiplied(251, 251, 252, 248);

/// Button fill when idle, hovered and pressed.
pub const BUTTON_IDLE: Color32 = Color32::from_rgb(246, 246, 248);
pub const BUTTON_HOVER: Color32 = Color32::from_rgb(232, 232, 236);
pub const BUTTON_PRESSED: Color32 = Color32::from_rgb(218, 218, 224);

pub const SWATCH_SIZE: f32 = 18.0;
pub const BUTTON_HEIGHT: f32 = 26.0;
pub const TOOL_BUTTON_SIZE: f32 = 30.0;
pub const BUTTON_RADIUS: u8 = 5;
pub const PANEL_RADIUS: u8 = 8;
