//! Engine settings (`[engine]` table of kohksh.toml)

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Top-level engine configuration
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct EngineSettings {
    #[serde(default = "default_title")]
    pub title: String,
    /// Frame pacing target
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,
    /// Upper bound on a single frame delta, in seconds
    #[serde(default = "default_max_delta")]
    pub max_delta: f32,
    /// Stop after this many frames (headless runs)
    #[serde(default)]
    pub max_frames: Option<u64>,
    #[serde(default)]
    pub graphics: GraphicsSettings,
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub physics: PhysicsSettings,
}

fn default_title() -> String {
    "Galactic Odyssey".to_string()
}

fn default_target_fps() -> u32 {
    144
}

fn default_max_delta() -> f32 {
    0.1
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            target_fps: default_target_fps(),
            max_delta: default_max_delta(),
            max_frames: None,
            graphics: GraphicsSettings::default(),
            audio: AudioSettings::default(),
            physics: PhysicsSettings::default(),
        }
    }
}

impl EngineSettings {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(input).map_err(|e| EngineError::InvalidSettings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_fps == 0 {
            return Err(EngineError::InvalidSettings("target_fps must be > 0".to_string()));
        }
        if self.max_frames == Some(0) {
            return Err(EngineError::InvalidSettings(
                "max_frames must be > 0 when set".to_string(),
            ));
        }
        if !(self.max_delta > 0.0) {
            return Err(EngineError::InvalidSettings(format!(
                "max_delta must be positive, got {}",
                self.max_delta
            )));
        }
        if self.physics.time_scale < 0.0 {
            return Err(EngineError::InvalidSettings(format!(
                "physics.time_scale must be >= 0, got {}",
                self.physics.time_scale
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GraphicsSettings {
    pub screen_width: u32,
    pub screen_height: u32,
    pub fullscreen: bool,
    pub vsync: bool,
    pub msaa_samples: u32,
    pub field_of_view: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub bloom: bool,
    pub motion_blur: bool,
    pub shadows: bool,
}

impl Default for GraphicsSettings {
    fn default() -> Self {
        Self {
            screen_width: 1920,
            screen_height: 1080,
            fullscreen: false,
            vsync: true,
            msaa_samples: 4,
            field_of_view: 60.0,
            near_plane: 0.1,
            far_plane: 1000.0,
            bloom: true,
            motion_blur: false,
            shadows: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioSettings {
    pub master_volume: f32,
    pub music_volume: f32,
    pub effects_volume: f32,
    pub spatial_audio: bool,
    pub channels: u32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            music_volume: 0.7,
            effects_volume: 0.8,
            spatial_audio: true,
            channels: 32,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PhysicsSettings {
    pub gravity: f32,
    pub air_resistance: f32,
    pub time_scale: f32,
    pub collision_detection: bool,
    pub raycasting: bool,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: 0.0,
            air_resistance: 0.1,
            time_scale: 1.0,
            collision_detection: true,
            raycasting: true,
        }
    }
}
