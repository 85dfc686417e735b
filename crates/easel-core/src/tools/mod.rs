//! Drawing tools.

mod spray;
mod stroke;
mod text;

pub use spray::{RandomSource, SprayJob, SprayRng, dots_per_tick, random_point_in_radius};
pub use stroke::StrokeSession;
pub use text::{TEXT_PROMPT, stamp_text};

use crate::config::SprayConfig;
use crate::drag::{DragHandler, Instant};
use crate::surface::Surface;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools, in toolbar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Line,
    Erase,
    Text,
    Spray,
}

impl ToolKind {
    /// All tools in toolbar order.
    pub const ALL: [ToolKind; 4] = [ToolKind::Line, ToolKind::Erase, ToolKind::Text, ToolKind::Spray];

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Line => "Line",
            ToolKind::Erase => "Erase",
            ToolKind::Text => "Text",
            ToolKind::Spray => "Spray",
        }
    }

    /// Single-key shortcut.
    pub fn shortcut(self) -> &'static str {
        match self {
            ToolKind::Line => "L",
            ToolKind::Erase => "E",
            ToolKind::Text => "T",
            ToolKind::Spray => "S",
        }
    }

    /// Tool bound to a shortcut key.
    pub fn from_shortcut(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.shortcut().eq_ignore_ascii_case(key))
    }
}

/// What a tool wants after pointer-down.
pub enum ToolStart {
    /// Track the drag with this session.
    Drag(Box<dyn DragHandler>),
    /// Ask the user for text to stamp at this position.
    PromptText(Point),
}

impl std::fmt::Debug for ToolStart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolStart::Drag(session) => f.debug_tuple("Drag").field(&session.name()).finish(),
            ToolStart::PromptText(pos) => f.debug_tuple("PromptText").field(pos).finish(),
        }
    }
}

/// Run a tool's pointer-down behaviour.
pub fn start_tool(
    kind: ToolKind,
    surface: &mut Surface,
    pos: Point,
    now: Instant,
    spray: &SprayConfig,
) -> ToolStart {
    match kind {
        ToolKind::Line => ToolStart::Drag(Box::new(StrokeSession::line(surface, pos))),
        ToolKind::Erase => ToolStart::Drag(Box::new(StrokeSession::erase(surface, pos))),
        ToolKind::Spray => ToolStart::Drag(Box::new(SprayJob::new(
            surface,
            pos,
            now,
            spray,
            SprayRng::from_counter(),
        ))),
        ToolKind::Text => ToolStart::PromptText(pos),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_order_and_default() {
        assert_eq!(ToolKind::default(), ToolKind::Line);
        let names: Vec<_> = ToolKind::ALL.iter().map(|t| t.name()).collect();
        assert_eq!(names, ["Line", "Erase", "Text", "Spray"]);
    }

    #[test]
    fn test_lookup_by_shortcut() {
        assert_eq!(ToolKind::from_shortcut("e"), Some(ToolKind::Erase));
        assert_eq!(ToolKind::from_shortcut("x"), None);
    }

    #[test]
    fn test_start_tool_kinds() {
        let mut surface = Surface::new(10, 10).unwrap();
        let now = Instant::now();
        let spray = SprayConfig::default();

        match start_tool(ToolKind::Text, &mut surface, Point::new(3.0, 4.0), now, &spray) {
            ToolStart::PromptText(pos) => assert_eq!(pos, Point::new(3.0, 4.0)),
            other => panic!("unexpected {other:?}"),
        }
        match start_tool(ToolKind::Spray, &mut surface, Point::ZERO, now, &spray) {
            ToolStart::Drag(session) => assert_eq!(session.name(), "spray"),
            other => panic!("unexpected {other:?}"),
        }
        match start_tool(ToolKind::Erase, &mut surface, Point::ZERO, now, &spray) {
            ToolStart::Drag(session) => assert_eq!(session.name(), "erase"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
