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

//! Plain data exchanged with the tracking runtime.

use crate::math::Mat4;
use serde::Deserialize;
use std::fmt;

/// Index of a tracked device in the runtime's pose array.
pub type DeviceIndex = u32;

/// The number of pose slots the runtime fills on each sample.
pub const MAX_TRACKED_DEVICE_COUNT: usize = 64;

/// The slot the runtime reserves for the head-mounted display.
pub const HMD_DEVICE_INDEX: DeviceIndex = 0;

/// One of the two eyes of a head-mounted display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Eye {
    /// The left eye.
    Left,
    /// The right eye.
    Right,
}

impl Eye {
    /// Both eyes in submission order.
    pub const BOTH: [Eye; 2] = [Eye::Left, Eye::Right];
}

impl fmt::Display for Eye {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eye::Left => write!(f, "left"),
            Eye::Right => write!(f, "right"),
        }
    }
}

/// A pair of values, one per eye.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PerEye<T> {
    /// The value for the left eye.
    pub left: T,
    /// The value for the right eye.
    pub right: T,
}

impl<T> PerEye<T> {
    /// Creates a pair from its two halves.
    #[inline]
    pub const fn new(left: T, right: T) -> Self {
        Self { left, right }
    }

    /// Builds each half by calling `f` with the corresponding eye, left first.
    pub fn try_from_fn<E>(mut f: impl FnMut(Eye) -> Result<T, E>) -> Result<Self, E> {
        let left = f(Eye::Left)?;
        let right = f(Eye::Right)?;
        Ok(Self { left, right })
    }

    /// Returns the value for `eye`.
    #[inline]
    pub fn get(&self, eye: Eye) -> &T {
        match eye {
            Eye::Left => &self.left,
            Eye::Right => &self.right,
        }
    }

    /// Returns the value for `eye` mutably.
    #[inline]
    pub fn get_mut(&mut self, eye: Eye) -> &mut T {
        match eye {
            Eye::Left => &mut self.left,
            Eye::Right => &mut self.right,
        }
    }

    /// Iterates over `(eye, value)` in left-then-right order.
    pub fn iter(&self) -> impl Iterator<Item = (Eye, &T)> {
        [(Eye::Left, &self.left), (Eye::Right, &self.right)].into_iter()
    }
}

/// A row-major 3x4 affine matrix as produced by the tracking runtime.
///
/// `m[r][c]` is row `r`, column `c`; the translation lives in column 3.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RuntimeMatrix34 {
    /// Matrix rows.
    pub m: [[f32; 4]; 3],
}

/// A row-major 4x4 matrix as produced by the tracking runtime.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RuntimeMatrix44 {
    /// Matrix rows.
    pub m: [[f32; 4]; 4],
}

/// Tracking quality reported alongside each pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrackingResult {
    /// The device has not been tracked yet.
    #[default]
    Uninitialized,
    /// Calibration is in progress.
    CalibratingInProgress,
    /// Calibration failed because the device is out of range.
    CalibratingOutOfRange,
    /// Tracking is running normally.
    RunningOk,
    /// The device left the tracked volume.
    RunningOutOfRange,
    /// Only rotation is tracked.
    FallbackRotationOnly,
}

/// A pose slot as the runtime fills it during a sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackedDevicePose {
    /// Device-to-tracking-space transform.
    pub device_to_absolute_tracking: RuntimeMatrix34,
    /// Linear velocity in tracking space, meters per second.
    pub velocity: [f32; 3],
    /// Angular velocity in tracking space, radians per second.
    pub angular_velocity: [f32; 3],
    /// Tracking quality.
    pub tracking_result: TrackingResult,
    /// Whether the transform can be trusted for this sample.
    pub pose_is_valid: bool,
    /// Whether the device is connected at all.
    pub device_is_connected: bool,
}

/// A tracked device pose converted to the renderer's conventions.
///
/// Poses are `Copy` so consumers take snapshots instead of holding references into the
/// store, which overwrites its slots on every sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Whether the runtime flagged this pose as valid.
    pub valid: bool,
    /// Device-to-tracking-space rigid transform.
    pub transform: Mat4,
    /// Linear velocity, passed through from the runtime.
    pub velocity: [f32; 3],
    /// Angular velocity, passed through from the runtime.
    pub angular_velocity: [f32; 3],
    /// Tracking quality, passed through from the runtime.
    pub tracking_result: TrackingResult,
    /// Whether the device is connected.
    pub connected: bool,
}

/// The graphics API a submitted texture handle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureType {
    /// An OpenGL texture name.
    #[default]
    #[serde(rename = "opengl")]
    OpenGl,
    /// A Vulkan image.
    Vulkan,
    /// A Direct3D 11 texture.
    #[serde(rename = "directx")]
    DirectX,
}

/// How the compositor should interpret the colors of a submitted texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSpace {
    /// Let the compositor decide from the texture format.
    #[default]
    Auto,
    /// Gamma-encoded (sRGB) colors.
    Gamma,
    /// Linear colors.
    Linear,
}

/// What the compositor receives for one eye.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EyeTexture {
    /// The backend-specific texture handle.
    pub handle: u64,
    /// The graphics API of `handle`.
    pub texture_type: TextureType,
    /// The color space of the texture contents.
    pub color_space: ColorSpace,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_eye_access() {
        let mut pair = PerEye::new(1, 2);
        assert_eq!(*pair.get(Eye::Left), 1);
        assert_eq!(*pair.get(Eye::Right), 2);
        *pair.get_mut(Eye::Right) = 5;
        let collected: Vec<_> = pair.iter().map(|(eye, v)| (eye, *v)).collect();
        assert_eq!(collected, vec![(Eye::Left, 1), (Eye::Right, 5)]);
    }

    #[test]
    fn test_per_eye_try_from_fn_stops_on_error() {
        let mut calls = Vec::new();
        let result: Result<PerEye<u32>, &str> = PerEye::try_from_fn(|eye| {
            calls.push(eye);
            match eye {
                Eye::Left => Err("boom"),
                Eye::Right => Ok(1),
            }
        });
        assert_eq!(result, Err("boom"));
        assert_eq!(calls, vec![Eye::Left]);
    }

    #[test]
    fn test_eye_display() {
        assert_eq!(Eye::Left.to_string(), "left");
        assert_eq!(Eye::Right.to_string(), "right");
    }
}
