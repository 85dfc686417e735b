//! Toolbar controls and the actions they produce.

use crate::color::Rgba;
use crate::imaging::SaveLink;
use crate::tools::ToolKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Initial content of the open-URL field.
pub const DEFAULT_URL_INPUT: &str = "http://";

/// Label of the open-URL submit button.
pub const URL_SUBMIT_LABEL: &str = "load";

/// The toolbar controls, in registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlKind {
    Tool,
    Color,
    BrushSize,
    Save,
    OpenFile,
    OpenUrl,
}

impl ControlKind {
    pub const ALL: [ControlKind; 6] = [
        ControlKind::Tool,
        ControlKind::Color,
        ControlKind::BrushSize,
        ControlKind::Save,
        ControlKind::OpenFile,
        ControlKind::OpenUrl,
    ];

    /// Registry key.
    pub fn key(self) -> &'static str {
        match self {
            ControlKind::Tool => "tool",
            ControlKind::Color => "color",
            ControlKind::BrushSize => "brush_size",
            ControlKind::Save => "save",
            ControlKind::OpenFile => "open_file",
            ControlKind::OpenUrl => "open_url",
        }
    }

    /// Label shown next to the control.
    pub fn label(self) -> &'static str {
        match self {
            ControlKind::Tool => "Tool",
            ControlKind::Color => "Color",
            ControlKind::BrushSize => "Brush size",
            ControlKind::Save => "Save",
            ControlKind::OpenFile => "Open file",
            ControlKind::OpenUrl => "Open URL",
        }
    }
}

/// State changes requested by the toolbar.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlAction {
    SelectTool(ToolKind),
    /// Sets both fill and stroke color.
    SetColor(Rgba),
    SetBrushSize(f64),
    /// The open-URL field was edited.
    EditUrl(String),
}

/// Work the host has to do before an image can be loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadRequest {
    /// Fetch a remote image, then pass the bytes back with a remote origin.
    Fetch(Url),
    /// Read a local file, then pass the bytes back with a local origin.
    ReadFile(PathBuf),
}

/// Toolbar state shared between the controls.
#[derive(Debug, Clone, PartialEq)]
pub struct Toolbar {
    /// Controls in display order.
    pub controls: Vec<ControlKind>,
    /// Current content of the open-URL field.
    pub url_input: String,
    /// Last computed save link.
    pub save_link: Option<SaveLink>,
    /// Last error or notice shown in the status line.
    pub status: Option<String>,
}

impl Default for Toolbar {
    fn default() -> Self {
        Self {
            controls: ControlKind::ALL.to_vec(),
            url_input: DEFAULT_URL_INPUT.to_string(),
            save_link: None,
            status: None,
        }
    }
}

impl Toolbar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }
}
