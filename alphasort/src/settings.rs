use std::{fs, path::Path};

use thiserror::Error;

use crate::types::SortSettings;

/// Reason why sort settings could not be loaded.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse sort settings")]
    Parse(#[from] toml::de::Error),
    #[error("camera_epsilon must be finite and non-negative, got {value}")]
    InvalidEpsilon { value: f32 },
}

/// Rejects a negative or non-finite `camera_epsilon`.
pub fn validate_settings(settings: &SortSettings) -> Result<(), SettingsError> {
    let value = settings.camera_epsilon;
    if !value.is_finite() || value < 0.0 {
        return Err(SettingsError::InvalidEpsilon { value });
    }
    Ok(())
}

/// Parses settings from TOML. Missing fields take their default values.
pub fn parse_settings(source: &str) -> Result<SortSettings, SettingsError> {
    let settings = toml::from_str(source)?;
    validate_settings(&settings)?;
    Ok(settings)
}

pub fn load_settings(path: impl AsRef<Path>) -> Result<SortSettings, SettingsError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let settings = parse_settings(&source)?;
    log::debug!("Loaded sort settings from {}: {:?}", path.display(), settings);

    Ok(settings)
}
