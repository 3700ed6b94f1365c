//! Playfield geometry and tunables
//!
//! Loaded from JSON (LocalStorage on web). Missing fields fall back to the
//! defaults, so older saved configs keep working.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a config was rejected
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f32 },
    #[error("win line ({win_line_y}) must sit between the pendulum ({pendulum_y}) and the ground ({ground_y})")]
    WinLineOutOfRange {
        win_line_y: f32,
        pendulum_y: f32,
        ground_y: f32,
    },
}

/// Game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Play area ===
    /// Play-area width (px)
    pub width: f32,
    /// Play-area height (px)
    pub height: f32,
    /// Height of the ground slab at the bottom (px)
    pub ground_height: f32,

    // === Cats ===
    /// Collision proxy width (px)
    pub cat_width: f32,
    /// Collision proxy height (px)
    pub cat_height: f32,
    /// Rounded-corner radius of the proxy (renderer hint)
    pub cat_chamfer: f32,

    // === Pendulum / goal ===
    /// Fixed pendulum Y (px from top)
    pub pendulum_y: f32,
    /// Reach-the-Top goal line Y (px from top)
    pub win_line_y: f32,

    // === Input ===
    /// Minimum game time between two drops (ms, 0 = every tap drops)
    pub drop_cooldown_ms: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 720.0,
            height: 1080.0,
            ground_height: 40.0,

            cat_width: 80.0,
            cat_height: 70.0,
            cat_chamfer: 12.0,

            pendulum_y: 100.0,
            win_line_y: 260.0,

            drop_cooldown_ms: 0.0,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check dimensions and ordering of the horizontal lines
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("width", self.width),
            ("height", self.height),
            ("ground_height", self.ground_height),
            ("cat_width", self.cat_width),
            ("cat_height", self.cat_height),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        let ground_y = self.ground_y();
        if self.win_line_y <= self.pendulum_y || self.win_line_y >= ground_y {
            return Err(ConfigError::WinLineOutOfRange {
                win_line_y: self.win_line_y,
                pendulum_y: self.pendulum_y,
                ground_y,
            });
        }
        Ok(())
    }

    /// Y of the ground's top surface
    #[inline]
    pub fn ground_y(&self) -> f32 {
        self.height - self.ground_height
    }

    /// Horizontal center of the play area
    #[inline]
    pub fn center_x(&self) -> f32 {
        self.width / 2.0
    }

    /// True if a point is far enough outside the play area to count as gone
    pub fn is_out_of_bounds(&self, x: f32, y: f32) -> bool {
        x < -self.cat_width || x > self.width + self.cat_width || y > self.height + self.cat_height
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "cat_stack_config";

    /// Load config from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        use crate::persistence::{LocalStorage, Storage};

        match LocalStorage.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded config from LocalStorage");
                    return config;
                }
                Err(e) => log::warn!("Ignoring stored config: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Config storage unavailable: {}", e),
        }

        log::info!("Using default config");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json(r#"{ "width": 600.0 }"#).unwrap();
        assert_eq!(config.width, 600.0);
        assert_eq!(config.cat_width, 80.0);
        assert_eq!(config.drop_cooldown_ms, 0.0);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            GameConfig::from_json(r#"{ "cat_width": 0.0 }"#),
            Err(ConfigError::NotPositive { field: "cat_width", .. })
        ));
        assert!(matches!(
            GameConfig::from_json(r#"{ "win_line_y": 50.0 }"#),
            Err(ConfigError::WinLineOutOfRange { .. })
        ));
        assert!(matches!(GameConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_out_of_bounds() {
        let config = GameConfig::default();
        assert!(!config.is_out_of_bounds(360.0, 500.0));
        assert!(config.is_out_of_bounds(-100.0, 500.0));
        assert!(config.is_out_of_bounds(360.0, 1200.0));
        // Above the top is fine: cats spawn up there
        assert!(!config.is_out_of_bounds(360.0, -10.0));
    }
}
