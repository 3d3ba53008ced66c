//! Settings persistence in the blob store.

use crate::models::Settings;
use crate::store::{BlobStore, StoreError};
use thiserror::Error;
use tracing::warn;

/// Key under which the settings are stored.
pub const SETTINGS_KEY: &str = "focusflow.settings";

/// Upper bound for any period, one day.
const MAX_PERIOD_MINS: u32 = 24 * 60;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown setting: {0}")]
    UnknownKey(String),
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Loads settings from the store, returning defaults if not found.
pub fn load_settings<S: BlobStore + ?Sized>(store: &S) -> Result<Settings, SettingsError> {
    match store.get(SETTINGS_KEY)? {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(Settings::default()),
    }
}

/// Loads settings, falling back to defaults on any error.
pub fn load_settings_or_default<S: BlobStore + ?Sized>(store: &S) -> Settings {
    load_settings(store).unwrap_or_else(|e| {
        warn!(error = %e, "could not load settings, using defaults");
        Settings::default()
    })
}

/// Saves settings to the store.
pub fn save_settings<S: BlobStore + ?Sized>(
    store: &mut S,
    settings: &Settings,
) -> Result<(), SettingsError> {
    let json = serde_json::to_string(settings)?;
    store.set(SETTINGS_KEY, &json)?;
    Ok(())
}

/// Updates one field from its textual `key = value` form.
pub fn set_value(settings: &mut Settings, key: &str, value: &str) -> Result<(), SettingsError> {
    let invalid = || SettingsError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    };
    let minutes = |min: u32| {
        value
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|m| (min..=MAX_PERIOD_MINS).contains(m))
            .ok_or_else(invalid)
    };
    let flag = || match value.trim() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(invalid()),
    };

    match key.trim().replace('-', "_").as_str() {
        // A work period must have some length; breaks may be skipped.
        "work_mins" | "work" => settings.work_mins = minutes(1)?,
        "short_break_mins" | "short_break" => settings.short_break_mins = minutes(0)?,
        "long_break_mins" | "long_break" => settings.long_break_mins = minutes(0)?,
        "sound_enabled" | "sound" => settings.sound_enabled = flag()?,
        "notifications_enabled" | "notifications" => settings.notifications_enabled = flag()?,
        _ => return Err(SettingsError::UnknownKey(key.to_string())),
    }
    Ok(())
}
