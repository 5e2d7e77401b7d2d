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

//! Error types reported by the tracking runtime and the compositor.

use crate::config::ConfigError;
use crate::renderer::AllocationError;
use std::fmt;

/// Why a session could not be started. Every variant is fatal to session start.
#[derive(Debug)]
pub enum InitError {
    /// No tracking runtime is installed on this machine.
    RuntimeNotInstalled,
    /// The runtime is installed but reports no head-mounted display.
    DeviceUnavailable,
    /// A runtime interface (system, compositor, ...) could not be acquired.
    InterfaceUnavailable {
        /// The name of the interface.
        interface: String,
        /// The runtime's description of the failure.
        reason: String,
    },
    /// The session configuration was rejected.
    InvalidConfig(ConfigError),
    /// The per-eye render targets could not be allocated.
    Allocation(AllocationError),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::RuntimeNotInstalled => write!(f, "No tracking runtime is installed"),
            InitError::DeviceUnavailable => write!(f, "No head-mounted display is present"),
            InitError::InterfaceUnavailable { interface, reason } => {
                write!(f, "Failed to acquire runtime interface '{interface}': {reason}")
            }
            InitError::InvalidConfig(err) => write!(f, "Invalid session configuration: {err}"),
            InitError::Allocation(err) => write!(f, "Failed to allocate eye targets: {err}"),
        }
    }
}

impl std::error::Error for InitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InitError::InvalidConfig(err) => Some(err),
            InitError::Allocation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AllocationError> for InitError {
    fn from(err: AllocationError) -> Self {
        InitError::Allocation(err)
    }
}

impl From<ConfigError> for InitError {
    fn from(err: ConfigError) -> Self {
        InitError::InvalidConfig(err)
    }
}

/// A failed pose sample. Recoverable: the frame is skipped and the last pose kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoseSampleError {
    /// The runtime went away (shut down, crashed, disconnected).
    RuntimeUnavailable,
    /// The runtime answered with an error.
    Communication(String),
}

impl fmt::Display for PoseSampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoseSampleError::RuntimeUnavailable => {
                write!(f, "The tracking runtime is no longer available")
            }
            PoseSampleError::Communication(msg) => {
                write!(f, "Pose sampling failed: {msg}")
            }
        }
    }
}

impl std::error::Error for PoseSampleError {}

/// A rejected eye submission. Recoverable: the frame is dropped, the next one proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositorError {
    /// The compositor could not process the request.
    RequestFailed,
    /// Client and compositor disagree on the interface version.
    IncompatibleVersion,
    /// Another application has the compositor's focus.
    DoNotHaveFocus,
    /// The texture handle is invalid.
    InvalidTexture,
    /// The client was not registered as a scene application.
    IsNotSceneApplication,
    /// The texture lives on a different GPU than the compositor.
    TextureIsOnWrongDevice,
    /// The texture format is not supported.
    TextureUsesUnsupportedFormat,
    /// Shared textures are not supported by the compositor.
    SharedTexturesNotSupported,
    /// The eye index is out of range.
    IndexOutOfRange,
    /// This eye was already submitted for the current frame.
    AlreadySubmitted,
    /// The texture bounds are invalid.
    InvalidBounds,
    /// The value was already set.
    AlreadySet,
    /// An error code this crate does not know.
    Other(i32),
}

impl CompositorError {
    /// Decodes a raw compositor result code. `0` means success and yields `None`.
    pub fn from_code(code: i32) -> Option<Self> {
        let err = match code {
            0 => return None,
            1 => CompositorError::RequestFailed,
            100 => CompositorError::IncompatibleVersion,
            101 => CompositorError::DoNotHaveFocus,
            102 => CompositorError::InvalidTexture,
            103 => CompositorError::IsNotSceneApplication,
            104 => CompositorError::TextureIsOnWrongDevice,
            105 => CompositorError::TextureUsesUnsupportedFormat,
            106 => CompositorError::SharedTexturesNotSupported,
            107 => CompositorError::IndexOutOfRange,
            108 => CompositorError::AlreadySubmitted,
            109 => CompositorError::InvalidBounds,
            110 => CompositorError::AlreadySet,
            other => CompositorError::Other(other),
        };
        Some(err)
    }

    /// The raw result code for this error.
    pub fn code(&self) -> i32 {
        match self {
            CompositorError::RequestFailed => 1,
            CompositorError::IncompatibleVersion => 100,
            CompositorError::DoNotHaveFocus => 101,
            CompositorError::InvalidTexture => 102,
            CompositorError::IsNotSceneApplication => 103,
            CompositorError::TextureIsOnWrongDevice => 104,
            CompositorError::TextureUsesUnsupportedFormat => 105,
            CompositorError::SharedTexturesNotSupported => 106,
            CompositorError::IndexOutOfRange => 107,
            CompositorError::AlreadySubmitted => 108,
            CompositorError::InvalidBounds => 109,
            CompositorError::AlreadySet => 110,
            CompositorError::Other(code) => *code,
        }
    }
}

impl fmt::Display for CompositorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self {
            CompositorError::RequestFailed => "request failed",
            CompositorError::IncompatibleVersion => "incompatible version",
            CompositorError::DoNotHaveFocus => "application does not have focus",
            CompositorError::InvalidTexture => "invalid texture",
            CompositorError::IsNotSceneApplication => "not a scene application",
            CompositorError::TextureIsOnWrongDevice => "texture is on the wrong device",
            CompositorError::TextureUsesUnsupportedFormat => "unsupported texture format",
            CompositorError::SharedTexturesNotSupported => "shared textures not supported",
            CompositorError::IndexOutOfRange => "index out of range",
            CompositorError::AlreadySubmitted => "already submitted",
            CompositorError::InvalidBounds => "invalid bounds",
            CompositorError::AlreadySet => "already set",
            CompositorError::Other(_) => "unknown error",
        };
        write!(f, "Compositor error {} ({what})", self.code())
    }
}

impl std::error::Error for CompositorError {}
