//! Player settings and preferences
//!
//! Persisted separately from the best score: LocalStorage on web, a JSON file
//! on native.

use serde::{Deserialize, Serialize};

/// Default flap cue length; the cue is cut off after this many milliseconds
pub const DEFAULT_FLAP_CUE_MS: u32 = 800;

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Mute everything
    pub muted: bool,
    /// How long the flap cue plays before it is cut short
    pub flap_cue_ms: u32,

    // === Behavior ===
    /// Pause a running game when the tab is hidden or the window loses focus
    pub pause_on_blur: bool,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.6,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
            flap_cue_ms: DEFAULT_FLAP_CUE_MS,
            pause_on_blur: true,
            show_fps: false,
        }
    }
}

impl Settings {
    /// Set master volume, clamped to 0.0 - 1.0
    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = clamp_volume(volume);
    }

    /// Set master volume from a 0 - 100 slider position
    pub fn set_volume_percent(&mut self, percent: f32) {
        self.set_master_volume(percent / 100.0);
    }

    /// Volume actually applied to sound effects
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            clamp_volume(self.master_volume) * clamp_volume(self.sfx_volume)
        }
    }

    /// Volume actually applied to the background music
    pub fn effective_music_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            clamp_volume(self.master_volume) * clamp_volume(self.music_volume)
        }
    }

    /// Flap cue length in seconds
    pub fn flap_cue_secs(&self) -> f32 {
        self.flap_cue_ms as f32 / 1000.0
    }

    /// Repair values a hand-edited or stale record might carry
    pub fn sanitized(mut self) -> Self {
        self.master_volume = clamp_volume(self.master_volume);
        self.sfx_volume = clamp_volume(self.sfx_volume);
        self.music_volume = clamp_volume(self.music_volume);
        self
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "skyhop_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<Settings>(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings.sanitized();
                    }
                    Err(e) => log::warn!("Ignoring malformed settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Load settings from a JSON file; missing or malformed files give defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<Settings>(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings.sanitized()
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings in {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings to a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) {
        match crate::platform::storage::write_json_atomic(path, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Could not save settings: {}", e),
        }
    }
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_finite() {
        volume.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.flap_cue_ms, 800);
        assert!((settings.effective_sfx_volume() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_volume_clamped() {
        let mut settings = Settings::default();
        settings.set_volume_percent(150.0);
        assert_eq!(settings.master_volume, 1.0);
        settings.set_master_volume(-2.0);
        assert_eq!(settings.master_volume, 0.0);
        settings.set_master_volume(f32::NAN);
        assert_eq!(settings.master_volume, 0.0);
    }

    #[test]
    fn test_muted_silences() {
        let settings = Settings {
            muted: true,
            ..Settings::default()
        };
        assert_eq!(settings.effective_sfx_volume(), 0.0);
        assert_eq!(settings.effective_music_volume(), 0.0);
    }

    #[test]
    fn test_music_follows_master_volume() {
        let mut settings = Settings::default();
        assert!((settings.effective_music_volume() - 0.42).abs() < 1e-6);
        settings.set_volume_percent(0.0);
        assert_eq!(settings.effective_music_volume(), 0.0);
    }

    #[test]
    fn test_partial_record_sanitized() {
        let settings: Settings = serde_json::from_str(r#"{ "master_volume": 4.0 }"#).unwrap();
        let settings = settings.sanitized();
        assert_eq!(settings.master_volume, 1.0);
        assert_eq!(settings.flap_cue_ms, DEFAULT_FLAP_CUE_MS);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            flap_cue_ms: 300,
            show_fps: true,
            ..Settings::default()
        };
        settings.save_to(&path);
        assert_eq!(Settings::load_from(&path), settings);
    }
}
