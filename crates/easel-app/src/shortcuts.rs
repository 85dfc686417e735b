//! Keyboard shortcuts for tool selection.

use easel_core::ToolKind;

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, ctrl: bool, description: &'static str) -> Self {
        Self {
            key,
            ctrl,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+S").
    pub fn format(&self) -> String {
        if self.ctrl {
            format!("Ctrl+{}", self.key)
        } else {
            self.key.to_string()
        }
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        let mut shortcuts: Vec<Shortcut> = ToolKind::ALL
            .iter()
            .map(|tool| Shortcut::new(tool.shortcut(), false, tool_description(*tool)))
            .collect();
        shortcuts.push(Shortcut::new("Enter", false, "Stamp the typed text"));
        shortcuts.push(Shortcut::new("Escape", false, "Cancel the text prompt"));
        shortcuts
    }

    /// Tool selected by a key press, if any. Modified keys never select tools.
    pub fn tool_for_key(key: &str, ctrl: bool) -> Option<ToolKind> {
        if ctrl {
            return None;
        }
        ToolKind::from_shortcut(key)
    }

    /// Log all shortcuts at info level.
    pub fn log_all() {
        for shortcut in Self::all() {
            log::info!("  {:8} {}", shortcut.format(), shortcut.description);
        }
    }
}

fn tool_description(tool: ToolKind) -> &'static str {
    match tool {
        ToolKind::Line => "Line tool",
        ToolKind::Erase => "Erase tool",
        ToolKind::Text => "Text tool",
        ToolKind::Spray => "Spray tool",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tool_has_a_shortcut() {
        let all = ShortcutRegistry::all();
        for tool in ToolKind::ALL {
            assert!(all.iter().any(|s| s.key == tool.shortcut()));
        }
    }

    #[test]
    fn test_tool_for_key() {
        assert_eq!(ShortcutRegistry::tool_for_key("l", false), Some(ToolKind::Line));
        assert_eq!(ShortcutRegistry::tool_for_key("S", false), Some(ToolKind::Spray));
        assert_eq!(ShortcutRegistry::tool_for_key("s", true), None);
        assert_eq!(ShortcutRegistry::tool_for_key("q", false), None);
    }

    #[test]
    fn test_format() {
        assert_eq!(Shortcut::new("S", true, "").format(), "Ctrl+S");
        assert_eq!(Shortcut::new("E", false, "").format(), "E");
    }
}
