//! egui widgets for the Easel toolbar: tool and brush size buttons, color
//! swatches, and the frames the toolbar and text prompt sit in.

pub mod buttons;
pub mod colors;
pub mod layout;
pub mod theme;

pub use buttons::{BrushSizeButton, IconButton, TextButton};
pub use colors::{ColorSwatch, QUICK_COLORS, colors_match, hex_color};
pub use layout::{panel_frame, section_label, toolbar_frame, vertical_separator};
