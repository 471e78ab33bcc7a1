//! Shell configuration (`[shell]` table of kohksh.toml)

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{PlatformError, Result};
use crate::window::WindowConfig;

/// Whether `startKohksh` blocks for the engine lifetime or returns promptly
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineMode {
    /// `start` runs the engine loop on the launch worker and returns when it exits
    #[default]
    Blocking,
    /// `start` hands the loop to its own thread and returns immediately
    Detached,
}

/// Loading screen and launch sequence settings
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ShellConfig {
    /// First label line(s), shown above the version
    pub greeting: String,
    /// Label text once the delay elapses
    pub starting_message: String,
    /// Delay before the native handoff
    pub launch_delay_ms: u64,
    /// Label text size
    pub text_size: f32,
    pub fullscreen: bool,
    pub show_title: bool,
    pub engine_mode: EngineMode,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            greeting: "Kohksh SDL Game\nLoading...".to_string(),
            starting_message: "Starting SDL Engine...".to_string(),
            launch_delay_ms: 2000,
            text_size: 20.0,
            fullscreen: true,
            show_title: false,
            engine_mode: EngineMode::Blocking,
        }
    }
}

impl ShellConfig {
    /// Parse a `[shell]`-shaped TOML document
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input).map_err(|e| PlatformError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate from a file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PlatformError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.text_size.is_finite() || self.text_size <= 0.0 {
            return Err(PlatformError::Config(format!(
                "text_size must be positive, got {}",
                self.text_size
            )));
        }
        Ok(())
    }

    pub fn launch_delay(&self) -> Duration {
        Duration::from_millis(self.launch_delay_ms)
    }

    /// Label text shown at creation
    pub fn loading_text(&self, version: &str) -> String {
        format!("{}\n\n{}", self.greeting, version)
    }

    pub fn window(&self) -> WindowConfig {
        WindowConfig {
            fullscreen: self.fullscreen,
            show_title: self.show_title,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_loading_screen() {
        let config = ShellConfig::default();
        assert_eq!(
            config.loading_text("Kohksh v0.1.0"),
            "Kohksh SDL Game\nLoading...\n\nKohksh v0.1.0"
        );
        assert_eq!(config.launch_delay(), Duration::from_millis(2000));
        assert_eq!(config.engine_mode, EngineMode::Blocking);
        assert!(config.window().fullscreen);
        assert!(!config.window().show_title);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ShellConfig::from_toml_str(
            r#"
            launch_delay_ms = 250
            engine_mode = "detached"
            "#,
        )
        .unwrap();

        assert_eq!(config.launch_delay_ms, 250);
        assert_eq!(config.engine_mode, EngineMode::Detached);
        assert_eq!(config.starting_message, "Starting SDL Engine...");
    }

    #[test]
    fn test_rejects_bad_text_size() {
        let err = ShellConfig::from_toml_str("text_size = 0.0").unwrap_err();
        assert!(matches!(err, PlatformError::Config(_)));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(ShellConfig::from_toml_str("launch_delay_ms = \"soon\"").is_err());
    }
}
