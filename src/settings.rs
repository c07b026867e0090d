//! Game settings and preferences
//!
//! Persisted separately from the player profile as a small JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Visual Effects ===
    /// Screen shake on hits
    pub screen_shake: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Accessibility ===
    /// Reduced motion (no shake)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_shake: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            mute_on_blur: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Load settings from a JSON file, falling back to defaults on any failure
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<Settings>(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    return settings.clamped();
                }
                Err(e) => log::warn!("Ignoring unreadable settings {}: {}", path.display(), e),
            },
            Err(e) => log::debug!("No settings at {}: {}", path.display(), e),
        }
        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings as JSON. Failures are logged, never fatal.
    pub fn save(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let result = serde_json::to_string_pretty(self)
            .map_err(std::io::Error::other)
            .and_then(|json| std::fs::write(path, json));
        match result {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Failed to save settings to {}: {}", path.display(), e),
        }
    }

    fn clamped(mut self) -> Self {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("siege_line_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn test_reduced_motion_disables_shake() {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        assert!(!settings.effective_screen_shake());
        assert!(Settings::default().effective_screen_shake());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = Settings::load(temp_path("missing_settings"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("settings_roundtrip");
        let settings = Settings {
            screen_shake: false,
            music_volume: 0.2,
            ..Settings::default()
        };
        settings.save(&path);
        assert_eq!(Settings::load(&path), settings);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_partial_and_out_of_range_values() {
        let path = temp_path("settings_partial");
        std::fs::write(&path, r#"{"master_volume": 3.0}"#).unwrap();
        let settings = Settings::load(&path);
        assert_eq!(settings.master_volume, 1.0);
        assert!(settings.screen_shake);
        let _ = std::fs::remove_file(&path);
    }
}
