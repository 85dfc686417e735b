//! Widget configuration.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes. Native builds look for `$EASEL_CONFIG` and then
//! `<config dir>/easel/config.json`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "EASEL_CONFIG";

/// Brush sizes offered by the toolbar.
pub const DEFAULT_BRUSH_SIZES: [f64; 11] =
    [1.0, 2.0, 3.0, 5.0, 8.0, 12.0, 25.0, 35.0, 50.0, 75.0, 100.0];

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Initial surface size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 300,
        }
    }
}

/// Spray tool timing and density.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SprayConfig {
    /// Milliseconds between spray ticks.
    pub interval_ms: u64,
    /// Square pixels of brush area per dot emitted each tick.
    pub area_per_dot: f64,
    /// Upper bound on ticks replayed in one frame after a stall.
    pub max_catch_up_ticks: u32,
}

impl Default for SprayConfig {
    fn default() -> Self {
        Self {
            interval_ms: 25,
            area_per_dot: 30.0,
            max_catch_up_ticks: 8,
        }
    }
}

/// Text stamp settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Smallest font size used by the text tool.
    pub min_font_px: f64,
    /// Font file to use instead of the system sans-serif face.
    pub font_path: Option<PathBuf>,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            min_font_px: 7.0,
            font_path: None,
        }
    }
}

/// Host window settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Page color behind the paint panel (`#rrggbb`).
    pub background: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Easel".to_string(),
            width: 800,
            height: 520,
            background: "#f4f4f5".to_string(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EaselConfig {
    pub canvas: CanvasConfig,
    pub brush_sizes: Vec<f64>,
    pub spray: SprayConfig,
    pub text: TextConfig,
    /// Hosts whose images do not taint the surface.
    pub trusted_origins: Vec<String>,
    pub window: WindowConfig,
}

impl EaselConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validated()
    }

    /// Read and validate a JSON config file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Where the native host looks for its config file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("easel").join("config.json"))
    }

    /// Load the native config, falling back to defaults.
    ///
    /// A missing file is not an error; a malformed one is logged and ignored.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            log::info!("No config directory, using defaults");
            return Self::default();
        };
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::error!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Check invariants, filling in the default brush sizes when omitted.
    pub fn validated(mut self) -> ConfigResult<Self> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "canvas must be non-empty, got {}x{}",
                self.canvas.width, self.canvas.height
            )));
        }
        if self.brush_sizes.is_empty() {
            self.brush_sizes = DEFAULT_BRUSH_SIZES.to_vec();
        }
        if self.brush_sizes.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
            return Err(ConfigError::Invalid(
                "brush sizes must be positive".to_string(),
            ));
        }
        if !self.brush_sizes.windows(2).all(|w| w[0] < w[1]) {
            return Err(ConfigError::Invalid(
                "brush sizes must be strictly increasing".to_string(),
            ));
        }
        if self.spray.interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "spray interval must be positive".to_string(),
            ));
        }
        if !(self.spray.area_per_dot.is_finite() && self.spray.area_per_dot > 0.0) {
            return Err(ConfigError::Invalid(
                "spray area per dot must be positive".to_string(),
            ));
        }
        if self.spray.max_catch_up_ticks == 0 {
            self.spray.max_catch_up_ticks = 1;
        }
        Ok(self)
    }

    /// Brush sizes, falling back to the defaults for an unvalidated config.
    pub fn brush_sizes(&self) -> &[f64] {
        if self.brush_sizes.is_empty() {
            &DEFAULT_BRUSH_SIZES
        } else {
            &self.brush_sizes
        }
    }

    /// Whether images from `host` may be drawn without tainting.
    pub fn is_trusted_origin(&self, host: &str) -> bool {
        self.trusted_origins
            .iter()
            .any(|trusted| trusted.eq_ignore_ascii_case(host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EaselConfig::default().validated().unwrap();
        assert_eq!(config.canvas, CanvasConfig { width: 500, height: 300 });
        assert_eq!(config.brush_sizes(), &DEFAULT_BRUSH_SIZES);
        assert_eq!(config.spray.interval_ms, 25);
        assert_eq!(config.text.min_font_px, 7.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EaselConfig::from_json(r#"{ "canvas": { "width": 640 } }"#).unwrap();
        assert_eq!(config.canvas.width, 640);
        assert_eq!(config.canvas.height, 300);
        assert_eq!(config.spray, SprayConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            EaselConfig::from_json(r#"{ "canvas": { "width": 0 } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EaselConfig::from_json(r#"{ "brush_sizes": [5, 3] }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EaselConfig::from_json(r#"{ "spray": { "interval_ms": 0 } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EaselConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "trusted_origins": ["images.example.com"], "spray": {{ "interval_ms": 40 }} }}"#
        )
        .unwrap();

        let config = EaselConfig::load_from(file.path()).unwrap();
        assert_eq!(config.spray.interval_ms, 40);
        assert!(config.is_trusted_origin("IMAGES.example.com"));
        assert!(!config.is_trusted_origin("evil.example.com"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = EaselConfig::load_from(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
