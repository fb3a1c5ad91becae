//! Key-value settings persisted as JSON in the user's config directory.
//!
//! Two keys: the default capture mode and the notice language. Read once at
//! startup, written whenever the user changes either.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::capture::CaptureMode;
use crate::i18n::Language;

const APP_DIR: &str = "domsnap";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub default_capture_mode: CaptureMode,
    pub language: Language,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_capture_mode: CaptureMode::Vector,
            language: Language::ZhCn,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("no config directory on this system")]
    NoConfigDir,

    #[error("failed to write settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

pub fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
}

/// Load settings, falling back to defaults on a missing or unreadable
/// file — a broken settings file must never keep the app from starting.
pub fn load() -> Settings {
    let Some(path) = settings_path() else {
        log::warn!("no config directory, using default settings");
        return Settings::default();
    };
    match std::fs::read_to_string(&path) {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("unparseable settings at {}: {}", path.display(), e);
                Settings::default()
            }
        },
        Err(_) => Settings::default(),
    }
}

pub fn save(settings: &Settings) -> Result<(), SettingsError> {
    let path = settings_path().ok_or(SettingsError::NoConfigDir)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let raw = serde_json::to_string_pretty(settings)?;
    std::fs::write(&path, raw)?;
    log::info!("settings saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_original_behavior() {
        let s = Settings::default();
        assert_eq!(s.default_capture_mode, CaptureMode::Vector);
        assert_eq!(s.language, Language::ZhCn);
    }

    #[test]
    fn wire_format_is_camel_case() {
        let raw = serde_json::to_string(&Settings::default()).unwrap();
        assert!(raw.contains("\"defaultCaptureMode\":\"vector\""));
        assert!(raw.contains("\"language\":\"zh-CN\""));
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let s: Settings = serde_json::from_str("{\"language\":\"en-US\"}").unwrap();
        assert_eq!(s.language, Language::EnUs);
        assert_eq!(s.default_capture_mode, CaptureMode::Vector);
    }
}
