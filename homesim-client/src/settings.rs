use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How a drop interacts with devices already on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasMode {
    /// At most one device; every drop replaces the canvas
    #[default]
    Single,
    /// Device drops append; preset drops replace the canvas with every template
    Multi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const FALLBACK: Position = Position { x: 100, y: 100 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::FALLBACK
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// API root, e.g. `http://127.0.0.1:8000/api`
    pub base_url: String,
    pub timeout_secs: u64,
    pub canvas_mode: CanvasMode,
    /// Used whenever a device has no stored coordinate
    pub fallback_position: Position,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: String::from("http://127.0.0.1:8000/api"),
            timeout_secs: 30,
            canvas_mode: CanvasMode::default(),
            fallback_position: Position::FALLBACK,
        }
    }
}

impl ClientSettings {
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = ClientSettings::from_toml_str(
            r#"
            base_url = "http://sandbox.local/api"
            canvas_mode = "multi"

            [fallback_position]
            x = 20
            y = 40
            "#,
        )
        .unwrap();

        assert_eq!(settings.base_url, "http://sandbox.local/api");
        assert_eq!(settings.canvas_mode, CanvasMode::Multi);
        assert_eq!(settings.fallback_position, Position::new(20, 40));
        assert_eq!(settings.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_unknown_canvas_mode_is_rejected() {
        assert!(ClientSettings::from_toml_str(r#"canvas_mode = "grid""#).is_err());
    }
}
