//! kohksh.toml handling

use anyhow::{Context, Result};
use kohksh_engine::EngineSettings;
use kohksh_platform::ShellConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "kohksh.toml";

/// Top-level configuration (kohksh.toml)
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct KohkshConfig {
    #[serde(default)]
    pub shell: ShellConfig,
    #[serde(default)]
    pub engine: EngineSettings,
}

impl KohkshConfig {
    /// Parse and validate both tables
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: KohkshConfig = toml::from_str(input).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file or a directory containing kohksh.toml
    pub fn load(path: &Path) -> Result<Self> {
        let config_path = if path.is_dir() {
            path.join(DEFAULT_CONFIG_FILE)
        } else {
            path.to_path_buf()
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config in {}", config_path.display()))
    }

    /// Explicit path if given, otherwise ./kohksh.toml if present, otherwise defaults
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.is_file() {
                    Self::load(local)
                } else {
                    tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.shell.validate()?;
        self.engine.validate()?;
        Ok(())
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kohksh_platform::EngineMode;

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config = KohkshConfig::from_toml_str("").unwrap();
        assert_eq!(config.shell.launch_delay_ms, 2000);
        assert_eq!(config.shell.engine_mode, EngineMode::Blocking);
        assert_eq!(config.engine.target_fps, 144);
    }

    #[test]
    fn test_both_tables() {
        let config = KohkshConfig::from_toml_str(
            r#"
            [shell]
            launch_delay_ms = 500
            engine_mode = "detached"

            [engine]
            max_frames = 60

            [engine.physics]
            time_scale = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.shell.launch_delay_ms, 500);
        assert_eq!(config.shell.engine_mode, EngineMode::Detached);
        assert_eq!(config.engine.max_frames, Some(60));
        assert_eq!(config.engine.physics.time_scale, 0.5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(KohkshConfig::from_toml_str("[shell]\ntext_size = -1.0").is_err());
        assert!(KohkshConfig::from_toml_str("[engine]\ntarget_fps = 0").is_err());
        assert!(KohkshConfig::from_toml_str("[engine]\nmax_frames = 0").is_err());

        let mut config = KohkshConfig::default();
        config.engine.max_frames = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_written_config_reads_back() {
        let text = KohkshConfig::default().to_toml().unwrap();
        let config = KohkshConfig::from_toml_str(&text).unwrap();
        assert_eq!(config.shell.greeting, ShellConfig::default().greeting);
        assert_eq!(config.engine, EngineSettings::default());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = KohkshConfig::load(Path::new("/nonexistent/kohksh.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/kohksh.toml"));
    }
}
