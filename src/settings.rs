//! Game settings and preferences
//!
//! Read from JSON or from the page's URL query string (`?difficulty=hard&sensitivity=0.003`).
//! Nothing is persisted between sessions.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_PARTICLES;

/// Settings parse errors
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    /// Malformed JSON
    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Query parameter with a value that does not parse
    #[error("Invalid value for '{key}': {value}")]
    InvalidValue { key: String, value: String },

    /// Numeric value outside its allowed range
    #[error("Value for '{key}' out of range: {value}")]
    OutOfRange { key: String, value: f32 },
}

/// Starting difficulty chosen on the start screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DifficultyPreset {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl DifficultyPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyPreset::Easy => "Easy",
            DifficultyPreset::Medium => "Medium",
            DifficultyPreset::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(DifficultyPreset::Easy),
            "medium" | "med" | "normal" => Some(DifficultyPreset::Medium),
            "hard" => Some(DifficultyPreset::Hard),
            _ => None,
        }
    }

    /// Difficulty multiplier a run starts with
    pub fn multiplier(&self) -> f32 {
        match self {
            DifficultyPreset::Easy => 0.7,
            DifficultyPreset::Medium => 1.0,
            DifficultyPreset::Hard => 1.5,
        }
    }
}

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum live particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 200,
            QualityPreset::Medium => 1000,
            QualityPreset::High => MAX_PARTICLES,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Starting difficulty
    pub difficulty: DifficultyPreset,
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Explosion debris
    pub particles: bool,

    // === HUD ===
    pub show_fps: bool,
    pub show_minimap: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Controls ===
    /// Radians of camera rotation per pixel of mouse movement
    pub mouse_sensitivity: f32,
    pub invert_y: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: DifficultyPreset::Medium,
            quality: QualityPreset::Medium,

            particles: true,

            show_fps: true,
            show_minimap: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            mute_on_blur: true,

            mouse_sensitivity: 0.002,
            invert_y: false,
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, SettingsError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(SettingsError::InvalidValue {
            key: key.to_owned(),
            value: value.to_owned(),
        }),
    }
}

fn parse_ranged(key: &str, value: &str, min: f32, max: f32) -> Result<f32, SettingsError> {
    let parsed: f32 = value.parse().map_err(|_| SettingsError::InvalidValue {
        key: key.to_owned(),
        value: value.to_owned(),
    })?;
    if !(min..=max).contains(&parsed) {
        return Err(SettingsError::OutOfRange {
            key: key.to_owned(),
            value: parsed,
        });
    }
    Ok(parsed)
}

impl Settings {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Apply `key=value` pairs from a URL query string on top of the defaults.
    /// Unknown keys are skipped.
    pub fn from_query(query: &str) -> Result<Self, SettingsError> {
        let mut settings = Self::default();
        let query = query.trim_start_matches('?');

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let invalid = || SettingsError::InvalidValue {
                key: key.to_owned(),
                value: value.to_owned(),
            };
            match key {
                "difficulty" => {
                    settings.difficulty = DifficultyPreset::from_str(value).ok_or_else(invalid)?
                }
                "quality" => settings.quality = QualityPreset::from_str(value).ok_or_else(invalid)?,
                "particles" => settings.particles = parse_bool(key, value)?,
                "fps" => settings.show_fps = parse_bool(key, value)?,
                "minimap" => settings.show_minimap = parse_bool(key, value)?,
                "volume" => settings.master_volume = parse_ranged(key, value, 0.0, 1.0)?,
                "sfx" => settings.sfx_volume = parse_ranged(key, value, 0.0, 1.0)?,
                "mute_on_blur" => settings.mute_on_blur = parse_bool(key, value)?,
                "sensitivity" => {
                    settings.mouse_sensitivity = parse_ranged(key, value, 0.0001, 0.05)?
                }
                "invert_y" => settings.invert_y = parse_bool(key, value)?,
                _ => log::warn!("Ignoring unknown setting '{}'", key),
            }
        }
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        for (key, value) in [
            ("master_volume", self.master_volume),
            ("sfx_volume", self.sfx_volume),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SettingsError::OutOfRange {
                    key: key.to_owned(),
                    value,
                });
            }
        }
        if !(self.mouse_sensitivity > 0.0 && self.mouse_sensitivity.is_finite()) {
            return Err(SettingsError::OutOfRange {
                key: "mouse_sensitivity".to_owned(),
                value: self.mouse_sensitivity,
            });
        }
        Ok(())
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Whether audio should be muted for the given window focus
    pub fn muted_for_focus(&self, focused: bool) -> bool {
        !focused && self.mute_on_blur
    }

    /// Load settings from the page URL (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let query = web_sys::window().and_then(|w| w.location().search().ok());

        if let Some(query) = query.filter(|q| !q.is_empty()) {
            match Self::from_query(&query) {
                Ok(settings) => {
                    log::info!("Loaded settings from URL");
                    return settings;
                }
                Err(e) => log::warn!("Bad settings in URL, using defaults: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native: settings JSON path from `SPACE_DEFENDER_SETTINGS`, else defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var("SPACE_DEFENDER_SETTINGS") else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => Self::from_json(&json).unwrap_or_else(|e| {
                log::warn!("Bad settings in {}, using defaults: {}", path, e);
                Self::default()
            }),
            Err(e) => {
                log::warn!("Cannot read {}: {}", path, e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_multipliers() {
        assert_eq!(DifficultyPreset::Easy.multiplier(), 0.7);
        assert_eq!(DifficultyPreset::Medium.multiplier(), 1.0);
        assert_eq!(DifficultyPreset::Hard.multiplier(), 1.5);
        assert_eq!(DifficultyPreset::from_str("HARD"), Some(DifficultyPreset::Hard));
        assert_eq!(DifficultyPreset::from_str("insane"), None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{"difficulty":"Easy","invert_y":true}"#)
            .expect("valid json");
        assert_eq!(settings.difficulty, DifficultyPreset::Easy);
        assert!(settings.invert_y);
        assert_eq!(settings.quality, QualityPreset::Medium);
        assert!(settings.show_minimap);
    }

    #[test]
    fn test_json_round_trip() {
        let settings = Settings {
            quality: QualityPreset::High,
            particles: false,
            ..Default::default()
        };
        let json = settings.to_json().expect("serialize");
        assert_eq!(Settings::from_json(&json).expect("parse"), settings);
    }

    #[test]
    fn test_json_errors() {
        assert!(matches!(
            Settings::from_json("{not json"),
            Err(SettingsError::Json(_))
        ));
        assert!(matches!(
            Settings::from_json(r#"{"master_volume":2.0}"#),
            Err(SettingsError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_mute_follows_focus() {
        let settings = Settings::default();
        assert!(settings.mute_on_blur);
        assert!(settings.muted_for_focus(false));
        assert!(!settings.muted_for_focus(true));

        let settings = Settings::from_query("mute_on_blur=off").expect("valid query");
        assert!(!settings.muted_for_focus(false));
        assert!(!settings.muted_for_focus(true));
    }

    #[test]
    fn test_query_string() {
        let settings =
            Settings::from_query("?difficulty=hard&sensitivity=0.003&minimap=off&foo=bar")
                .expect("valid query");
        assert_eq!(settings.difficulty, DifficultyPreset::Hard);
        assert!((settings.mouse_sensitivity - 0.003).abs() < 1e-7);
        assert!(!settings.show_minimap);

        assert!(matches!(
            Settings::from_query("difficulty=insane"),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert!(matches!(
            Settings::from_query("volume=3"),
            Err(SettingsError::OutOfRange { .. })
        ));
        assert_eq!(Settings::from_query("").expect("empty"), Settings::default());
    }

    #[test]
    fn test_particle_cap() {
        let mut settings = Settings::default();
        assert_eq!(settings.max_particles(), 1000);
        settings.particles = false;
        assert_eq!(settings.max_particles(), 0);
    }
}
