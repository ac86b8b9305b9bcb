//! Game settings and host preferences
//!
//! Persisted as a JSON file next to the binary (or wherever the host points).

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Difficulty tiers; the level files are named after them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Darkness speed multiplier for this tier
    pub fn darkness_factor(&self) -> f32 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Medium => 1.5,
            Difficulty::Hard => 2.0,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Display ===
    /// Screen width in world units (supplied by the host display)
    pub screen_width: f32,
    /// Screen height in world units
    pub screen_height: f32,

    // === Level layout ===
    /// Width of one grid cell
    pub cell_width: f32,
    /// Height of one grid cell
    pub cell_height: f32,
    /// Difficulty tier (selects the level file prefix)
    pub difficulty: Difficulty,
    /// Optional directory of `<difficulty>-0<N>.txt` level files
    pub level_dir: Option<String>,

    // === Hazard ===
    /// Darkness rise speed (units/sec at simulation speed 1)
    pub darkness_speed: f32,
    /// How far below the bottom row the darkness starts
    pub darkness_start_offset: f32,

    // === Moving platforms ===
    /// Horizontal travel either side of the spawn cell
    pub platform_travel: f32,
    /// Moving platform speed (units/sec)
    pub platform_speed: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_width: 390.0,
            screen_height: 844.0,

            cell_width: 32.0,
            cell_height: 32.0,
            difficulty: Difficulty::Easy,
            level_dir: None,

            darkness_speed: 12.0,
            darkness_start_offset: 64.0,

            platform_travel: 64.0,
            platform_speed: 40.0,
        }
    }
}

impl Settings {
    /// Screen extents as a vector
    pub fn screen_size(&self) -> Vec2 {
        Vec2::new(self.screen_width, self.screen_height)
    }

    /// Grid cell extents as a vector
    pub fn cell_size(&self) -> Vec2 {
        Vec2::new(self.cell_width, self.cell_height)
    }

    /// Effective darkness speed (respects difficulty)
    pub fn effective_darkness_speed(&self) -> f32 {
        self.darkness_speed * self.difficulty.darkness_factor()
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(_) => {
                log::info!("No settings at {}, using defaults", path.display());
                return Self::default();
            }
        };

        match serde_json::from_str(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring malformed settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "screen_width": 100.0, "difficulty": "hard" }"#).unwrap();
        assert_eq!(settings.screen_width, 100.0);
        assert_eq!(settings.screen_height, Settings::default().screen_height);
        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert_eq!(settings.effective_darkness_speed(), settings.darkness_speed * 2.0);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let settings = Settings::load(Path::new("/nonexistent/darkrise/settings.json"));
        assert_eq!(settings.cell_width, Settings::default().cell_width);
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("darkrise-settings-{}.json", std::process::id()));
        let settings = Settings {
            difficulty: Difficulty::Medium,
            darkness_speed: 20.0,
            level_dir: Some("levels".to_string()),
            ..Settings::default()
        };
        settings.save(&path).unwrap();

        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("\"medium\""));

        let loaded = Settings::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.difficulty, Difficulty::Medium);
        assert_eq!(loaded.darkness_speed, 20.0);
        assert_eq!(loaded.level_dir.as_deref(), Some("levels"));
        assert_eq!(loaded.screen_width, settings.screen_width);
    }

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!(Difficulty::from_str("MED"), Some(Difficulty::Medium));
        assert_eq!(Difficulty::from_str("nightmare"), None);
        assert_eq!(Difficulty::Hard.as_str(), "hard");
    }
}
