// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Session configuration.
//!
//! The configuration is usually read from a TOML file such as:
//!
//! ```toml
//! head_device_index = 0
//! color_space = "gamma"
//! texture_type = "opengl"
//!
//! [clip]
//! near = 0.1
//! far = 30.0
//! ```

use crate::xr::{ColorSpace, DeviceIndex, TextureType, HMD_DEVICE_INDEX, MAX_TRACKED_DEVICE_COUNT};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Near and far clip distances, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClipPlanes {
    /// Distance to the near clip plane.
    pub near: f32,
    /// Distance to the far clip plane.
    pub far: f32,
}

impl Default for ClipPlanes {
    fn default() -> Self {
        Self {
            near: 0.1,
            far: 30.0,
        }
    }
}

/// Everything a stereo session needs to know up front.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Clip planes used for both eye projections. Constant for the session.
    pub clip: ClipPlanes,
    /// The pose slot of the device that drives the camera.
    pub head_device_index: DeviceIndex,
    /// Color space announced to the compositor on submission.
    pub color_space: ColorSpace,
    /// Graphics API announced to the compositor on submission.
    pub texture_type: TextureType,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            clip: ClipPlanes::default(),
            head_device_index: HMD_DEVICE_INDEX,
            color_space: ColorSpace::Auto,
            texture_type: TextureType::OpenGl,
        }
    }
}

impl SessionConfig {
    /// Parses a configuration from TOML text and validates it.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig =
            toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        log::debug!("Parsing session configuration from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Checks the invariants the pipeline relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ClipPlanes { near, far } = self.clip;
        if !(near.is_finite() && near > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "near clip plane must be positive, got {near}"
            )));
        }
        if !(far.is_finite() && far > near) {
            return Err(ConfigError::Invalid(format!(
                "far clip plane must be greater than near ({near}), got {far}"
            )));
        }
        if self.head_device_index as usize >= MAX_TRACKED_DEVICE_COUNT {
            return Err(ConfigError::Invalid(format!(
                "head device index {} is out of range (max {})",
                self.head_device_index,
                MAX_TRACKED_DEVICE_COUNT - 1
            )));
        }
        Ok(())
    }
}

/// A configuration could not be loaded or was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The file could not be read.
    Io {
        /// The path that failed to load.
        path: String,
        /// The underlying I/O error.
        message: String,
    },
    /// The text is not valid TOML for a [`SessionConfig`].
    Parse(String),
    /// A value violates an invariant.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, message } => {
                write!(f, "Failed to read configuration '{path}': {message}")
            }
            ConfigError::Parse(msg) => write!(f, "Failed to parse configuration: {msg}"),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
