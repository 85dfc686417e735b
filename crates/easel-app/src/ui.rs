//! The egui toolbar and the text prompt.

use easel_core::controls::URL_SUBMIT_LABEL;
use easel_core::tools::TEXT_PROMPT;
use easel_core::{ControlAction, ControlKind, Paint, Rgba, SaveLink, ToolKind};
use easel_widgets::{
    BrushSizeButton, ColorSwatch, IconButton, QUICK_COLORS, TextButton, colors_match, hex_color,
    panel_frame, section_label, theme, toolbar_frame, vertical_separator,
};
use egui::{Align2, Color32, Context, ImageSource, Pos2, Vec2, include_image};

/// Gap between the window edge, the toolbar and the picture, in points.
pub const MARGIN: f32 = 12.0;

/// UI-only state that persists between frames.
#[derive(Debug, Default)]
pub struct UiState {
    /// Text typed into the text prompt.
    pub text_input: String,
    /// Bottom edge of the toolbar in points, from the last frame.
    pub toolbar_bottom: f32,
}

/// Actions triggered by the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    /// Forward a toolbar action to the paint widget.
    Control(ControlAction),
    /// The save control was hovered or focused.
    RefreshSaveLink,
    /// The save control was clicked.
    Save,
    OpenFile,
    /// Submit the open-URL field.
    LoadUrl,
    /// The text prompt closed; `None` if it was cancelled.
    FinishText(Option<String>),
}

struct Tool {
    kind: ToolKind,
    icon: ImageSource<'static>,
}

fn get_tools() -> [Tool; 4] {
    [
        Tool {
            kind: ToolKind::Line,
            icon: include_image!("../assets/line.svg"),
        },
        Tool {
            kind: ToolKind::Erase,
            icon: include_image!("../assets/erase.svg"),
        },
        Tool {
            kind: ToolKind::Text,
            icon: include_image!("../assets/text.svg"),
        },
        Tool {
            kind: ToolKind::Spray,
            icon: include_image!("../assets/spray.svg"),
        },
    ]
}

fn to_color32(color: Rgba) -> Color32 {
    Color32::from_rgb(color.r, color.g, color.b)
}

fn from_color32(color: Color32) -> Rgba {
    Rgba::rgb(color.r(), color.g(), color.b())
}

/// Whether a brush size button shows the current line width.
fn is_current_size(size: f64, line_width: f64) -> bool {
    (size - line_width).abs() < 1e-6
}

/// Render all UI and return the triggered actions.
pub fn render_ui(ctx: &Context, ui_state: &mut UiState, paint: &Paint) -> Vec<UiAction> {
    egui_extras::install_image_loaders(ctx);

    let mut actions = Vec::new();
    render_toolbar(ctx, ui_state, paint, &mut actions);
    if paint.pending_text().is_some() {
        render_text_prompt(ctx, ui_state, &mut actions);
    }
    actions
}

fn render_toolbar(ctx: &Context, ui_state: &mut UiState, paint: &Paint, actions: &mut Vec<UiAction>) {
    let response = egui::Area::new(egui::Id::new("toolbar"))
        .fixed_pos(Pos2::new(MARGIN, MARGIN))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            toolbar_frame().show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.spacing_mut().item_spacing = Vec2::new(4.0, 4.0);
                        for (i, control) in paint.toolbar().controls.iter().enumerate() {
                            if i > 0 {
                                ui.add_space(4.0);
                                vertical_separator(ui);
                                ui.add_space(4.0);
                            }
                            render_control(ui, *control, paint, actions);
                        }
                    });
                    if let Some(status) = &paint.toolbar().status {
                        ui.add_space(4.0);
                        ui.label(egui::RichText::new(status).size(11.0).color(theme::TEXT_ERROR));
                    }
                });
            });
        });
    ui_state.toolbar_bottom = response.response.rect.bottom();
}

fn render_control(ui: &mut egui::Ui, control: ControlKind, paint: &Paint, actions: &mut Vec<UiAction>) {
    section_label(ui, control.label());
    match control {
        ControlKind::Tool => {
            for tool in get_tools() {
                if IconButton::new(tool.icon, tool.kind.name())
                    .shortcut(tool.kind.shortcut())
                    .selected(paint.tool() == tool.kind)
                    .show(ui)
                {
                    actions.push(UiAction::Control(ControlAction::SelectTool(tool.kind)));
                }
            }
        }
        ControlKind::Color => {
            let current = to_color32(paint.color());
            let mut picked = current;
            if ui
                .color_edit_button_srgba(&mut picked)
                .on_hover_text(hex_color(current))
                .changed()
            {
                actions.push(UiAction::Control(ControlAction::SetColor(from_color32(picked))));
            }
            for (name, color) in QUICK_COLORS {
                let (clicked, _) = ColorSwatch::new(*color, name)
                    .selected(colors_match(current, *color))
                    .show(ui);
                if clicked {
                    actions.push(UiAction::Control(ControlAction::SetColor(from_color32(*color))));
                }
            }
        }
        ControlKind::BrushSize => {
            for &size in paint.config().brush_sizes() {
                if BrushSizeButton::new(size as f32, is_current_size(size, paint.line_width())).show(ui) {
                    actions.push(UiAction::Control(ControlAction::SetBrushSize(size)));
                }
            }
        }
        ControlKind::Save => {
            let tooltip = match &paint.toolbar().save_link {
                Some(SaveLink::Blocked { message }) => message.as_str(),
                _ => "Save the picture as PNG",
            };
            let response = TextButton::new("Save").tooltip(tooltip).show(ui);
            if response.hovered() || response.has_focus() {
                actions.push(UiAction::RefreshSaveLink);
            }
            if response.clicked() {
                actions.push(UiAction::Save);
            }
        }
        ControlKind::OpenFile => {
            if TextButton::new("Choose…").tooltip("Open a local image").show(ui).clicked() {
                actions.push(UiAction::OpenFile);
            }
        }
        ControlKind::OpenUrl => {
            let mut url = paint.toolbar().url_input.clone();
            let response = ui.add(
                egui::TextEdit::singleline(&mut url)
                    .desired_width(180.0)
                    .font(egui::TextStyle::Small),
            );
            if response.changed() {
                actions.push(UiAction::Control(ControlAction::EditUrl(url)));
            }
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if TextButton::new(URL_SUBMIT_LABEL).show(ui).clicked() || submitted {
                actions.push(UiAction::LoadUrl);
            }
        }
    }
}

/// Modal asking for the text to stamp.
fn render_text_prompt(ctx: &Context, ui_state: &mut UiState, actions: &mut Vec<UiAction>) {
    let mut finished: Option<Option<String>> = None;

    // Backdrop
    egui::Area::new(egui::Id::new("text_prompt_backdrop"))
        .fixed_pos(Pos2::ZERO)
        .order(egui::Order::Background)
        .show(ctx, |ui| {
            let screen_rect = ctx.input(|i| i.content_rect());
            let response = ui.allocate_rect(screen_rect, egui::Sense::click());
            ui.painter()
                .rect_filled(screen_rect, 0.0, Color32::from_black_alpha(40));
            if response.clicked() {
                finished = Some(None);
            }
        });

    egui::Area::new(egui::Id::new("text_prompt"))
        .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            panel_frame().show(ui, |ui| {
                ui.set_width(260.0);
                ui.label(egui::RichText::new(TEXT_PROMPT).size(13.0).color(theme::TEXT));
                ui.add_space(6.0);

                let response = ui.add(
                    egui::TextEdit::singleline(&mut ui_state.text_input)
                        .desired_width(f32::INFINITY),
                );
                response.request_focus();
                if ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    finished = Some(Some(ui_state.text_input.clone()));
                }
                if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                    finished = Some(None);
                }

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if TextButton::new("Cancel").show(ui).clicked() {
                        finished = Some(None);
                    }
                    if TextButton::new("OK").show(ui).clicked() {
                        finished = Some(Some(ui_state.text_input.clone()));
                    }
                });
            });
        });

    if let Some(text) = finished {
        ui_state.text_input.clear();
        actions.push(UiAction::FinishText(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::input::MouseButton;
    use easel_core::{EaselConfig, Instant};
    use kurbo::Point;

    fn run(ui_state: &mut UiState, paint: &Paint, input: egui::RawInput) -> Vec<UiAction> {
        let ctx = Context::default();
        let mut actions = Vec::new();
        // Input events only reach the first pass.
        let _ = ctx.run(input, |ctx| {
            actions.extend(render_ui(ctx, ui_state, paint));
        });
        actions
    }

    #[test]
    fn test_color_conversion_drops_alpha() {
        let color = Rgba::new(10, 20, 30, 128);
        assert_eq!(from_color32(to_color32(color)), Rgba::rgb(10, 20, 30));
    }

    #[test]
    fn test_current_size() {
        assert!(is_current_size(5.0, 5.0));
        assert!(!is_current_size(5.0, 8.0));
    }

    #[test]
    fn test_idle_frame_has_no_actions() {
        let paint = Paint::new(EaselConfig::default()).unwrap();
        let mut ui_state = UiState::default();
        let actions = run(&mut ui_state, &paint, egui::RawInput::default());

        assert!(actions.is_empty());
        assert!(ui_state.toolbar_bottom > MARGIN);
    }

    #[test]
    fn test_escape_cancels_text_prompt() {
        let mut paint = Paint::new(EaselConfig::default()).unwrap();
        paint.apply(ControlAction::SelectTool(ToolKind::Text));
        paint.pointer_down(Point::new(10.0, 10.0), MouseButton::Left, Instant::now());
        assert!(paint.pending_text().is_some());

        let mut ui_state = UiState {
            text_input: "draft".to_string(),
            ..UiState::default()
        };
        let input = egui::RawInput {
            events: vec![egui::Event::Key {
                key: egui::Key::Escape,
                physical_key: None,
                pressed: true,
                repeat: false,
                modifiers: egui::Modifiers::NONE,
            }],
            ..egui::RawInput::default()
        };
        let actions = run(&mut ui_state, &paint, input);

        assert_eq!(actions, vec![UiAction::FinishText(None)]);
        assert!(ui_state.text_input.is_empty());
    }
}
