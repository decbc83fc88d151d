//! Configuration file handling.
//!
//! Loads configuration from `~/.config/viewfinder/config.toml` or a custom
//! path and maps it onto [`ControllerSettings`].

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::camera::{
    ControllerSettings, DeviceKind, DevicePosition, FlashMode, PhotoSettings, Resolution,
    SessionSettings,
};

/// Configuration file structure.
/// Loaded from ~/.config/viewfinder/config.toml (or a custom path).
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
}

#[derive(Debug, Deserialize, Default)]
pub struct CameraConfig {
    /// Camera optics: "wide", "telephoto", or "ultrawide"
    #[serde(default)]
    pub kind: Option<String>,
    /// Camera position: "front", "back", or "any"
    #[serde(default)]
    pub position: Option<String>,
    /// Mirror preview frames (selfie mode)
    #[serde(default)]
    pub mirror_preview: bool,
}

#[derive(Debug, Deserialize)]
pub struct CaptureConfig {
    /// Requested resolution as "WIDTHxHEIGHT"
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_true")]
    pub high_resolution: bool,
    /// Flash policy: "auto", "on", or "off"
    #[serde(default)]
    pub flash: Option<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            resolution: None,
            fps: default_fps(),
            high_resolution: true,
            flash: None,
        }
    }
}

fn default_fps() -> u32 {
    30
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.clone(),
                source: e,
            })?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Map the configuration onto controller settings, validating values.
    pub fn controller_settings(&self) -> Result<ControllerSettings, ConfigError> {
        let kind = match self.camera.kind.as_deref() {
            None => DeviceKind::default(),
            Some("wide") | Some("wide-angle") => DeviceKind::WideAngle,
            Some("telephoto") | Some("tele") => DeviceKind::Telephoto,
            Some("ultrawide") | Some("ultra-wide") => DeviceKind::UltraWide,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    field: "camera.kind",
                    value: other.to_string(),
                    expected: "wide, telephoto, or ultrawide",
                })
            }
        };

        let position = match self.camera.position.as_deref() {
            None => DevicePosition::default(),
            Some("front") => DevicePosition::Front,
            Some("back") => DevicePosition::Back,
            Some("any") => DevicePosition::Any,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    field: "camera.position",
                    value: other.to_string(),
                    expected: "front, back, or any",
                })
            }
        };

        let resolution = match self.capture.resolution.as_deref() {
            None => Resolution::default(),
            Some(s) => parse_resolution(s)?,
        };

        let flash = match self.capture.flash.as_deref() {
            None => FlashMode::default(),
            Some("auto") => FlashMode::Auto,
            Some("on") => FlashMode::On,
            Some("off") => FlashMode::Off,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    field: "capture.flash",
                    value: other.to_string(),
                    expected: "auto, on, or off",
                })
            }
        };

        Ok(ControllerSettings {
            kind,
            position,
            session: SessionSettings {
                resolution,
                fps: self.capture.fps,
                mirror_preview: self.camera.mirror_preview,
                high_resolution: self.capture.high_resolution,
            },
            photo: PhotoSettings {
                flash,
                ..PhotoSettings::default()
            },
        })
    }
}

/// Parse and validate a "WIDTHxHEIGHT" resolution string.
fn parse_resolution(s: &str) -> Result<Resolution, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        field: "capture.resolution",
        value: s.to_string(),
        expected: "WIDTHxHEIGHT with both nonzero (e.g. 1280x720)",
    };

    let (width, height) = s.split_once('x').ok_or_else(invalid)?;
    let width: u32 = width.parse().map_err(|_| invalid())?;
    let height: u32 = height.parse().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    Ok(Resolution { width, height })
}

fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("viewfinder")
        .join("config.toml")
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value '{value}' for {field}: expected {expected}")]
    InvalidValue {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nope.toml");
        let config = Config::load(Some(&path)).expect("missing file is not an error");
        let settings = config.controller_settings().expect("defaults are valid");
        assert_eq!(settings.kind, DeviceKind::WideAngle);
        assert_eq!(settings.position, DevicePosition::Any);
        assert_eq!(settings.session.resolution, Resolution::MEDIUM);
        assert_eq!(settings.session.fps, 30);
    }

    #[test]
    fn test_full_config_parses() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).expect("create");
        write!(
            file,
            r#"
[camera]
kind = "ultrawide"
position = "front"
mirror_preview = true

[capture]
resolution = "1920x1080"
fps = 24
high_resolution = false
flash = "off"
"#
        )
        .expect("write");

        let config = Config::load(Some(&path)).expect("valid config");
        let settings = config.controller_settings().expect("valid values");
        assert_eq!(settings.kind, DeviceKind::UltraWide);
        assert_eq!(settings.position, DevicePosition::Front);
        assert!(settings.session.mirror_preview);
        assert_eq!(
            settings.session.resolution,
            Resolution {
                width: 1920,
                height: 1080
            }
        );
        assert_eq!(settings.session.fps, 24);
        assert!(!settings.session.high_resolution);
        assert_eq!(settings.photo.flash, FlashMode::Off);
    }

    #[test]
    fn test_unparsable_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not [valid toml").expect("write");

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_invalid_kind_is_rejected() {
        let config = Config {
            camera: CameraConfig {
                kind: Some("fisheye".to_string()),
                ..CameraConfig::default()
            },
            capture: CaptureConfig::default(),
        };
        let err = config.controller_settings().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "camera.kind",
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_resolution_is_rejected() {
        for bad in ["1920", "0x1080", "1920x", "widexhigh"] {
            let config = Config {
                camera: CameraConfig::default(),
                capture: CaptureConfig {
                    resolution: Some(bad.to_string()),
                    ..CaptureConfig::default()
                },
            };
            let err = config.controller_settings().unwrap_err();
            assert!(
                matches!(
                    err,
                    ConfigError::InvalidValue {
                        field: "capture.resolution",
                        ..
                    }
                ),
                "'{}' should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            field: "camera.position",
            value: "sideways".to_string(),
            expected: "front, back, or any",
        };
        let msg = format!("{}", err);
        assert!(msg.contains("camera.position"));
        assert!(msg.contains("sideways"));
        assert!(msg.contains("front, back, or any"));
    }
}
