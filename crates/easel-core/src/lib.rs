//! Easel Core Library
//!
//! Platform-agnostic paint model: the raster surface, drawing tools, drag
//! tracking, toolbar controls, image loading and export.

pub mod color;
pub mod config;
pub mod controls;
pub mod drag;
pub mod geometry;
pub mod imaging;
pub mod input;
pub mod paint;
pub mod surface;
pub mod text;
pub mod tools;

pub use color::Rgba;
pub use config::{ConfigError, EaselConfig};
pub use controls::{ControlAction, ControlKind, LoadRequest, Toolbar};
pub use drag::{DragHandler, DragTracker, Instant};
pub use geometry::{Viewport, relative_pos};
pub use imaging::{ImageError, ImageLocation, ImageOrigin, SaveLink};
pub use input::{MouseButton, PointerEvent};
pub use paint::{Paint, PointerOutcome};
pub use surface::{CompositeOp, ContextState, LineCap, Surface, SurfaceError};
pub use text::{FontFace, GlyphBitmap, TextError, TextRasterizer};
pub use tools::ToolKind;
