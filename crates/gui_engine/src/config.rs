//! GUI runtime configuration

use serde::{Deserialize, Serialize};

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
}

/// Tunable behavior of the GUI manager
///
/// Defaults match the engine's long-standing values: a 3 px drag threshold,
/// a one second tooltip delay and a half second caret blink.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuiConfig {
    /// Manhattan distance in pixels the pointer must travel from the press
    /// position before a held button becomes a drag
    pub drag_distance: u32,

    /// Seconds the pointer must hover over an element before its tooltip shows
    pub tooltip_hover_time: f32,

    /// Seconds between caret blink phase flips
    pub caret_blink_interval: f32,

    /// When enabled, elements from different widgets never share a draw batch
    pub separate_meshes_by_widget: bool,

    /// Priority at which per-camera GUI draw callbacks register with the renderer
    pub render_priority: i32,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            drag_distance: 3,
            tooltip_hover_time: 1.0,
            caret_blink_interval: 0.5,
            separate_meshes_by_widget: true,
            render_priority: 30,
        }
    }
}

impl GuiConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}
