//! Easel Application
//!
//! The application shell: windowing, input routing, the egui toolbar and
//! platform file access around the paint widget.

mod app;
mod file_ops;
mod loader;
mod shortcuts;
mod ui;

pub use app::{App, AppError};
pub use file_ops::{FileOpsError, FileOpsResult};
pub use loader::{ImageLoader, LoadResult};
pub use shortcuts::{Shortcut, ShortcutRegistry};
pub use ui::{UiAction, UiState, render_ui};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{CanvasTextRasterizer, Child, elt, run_wasm};
