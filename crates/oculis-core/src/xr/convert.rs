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

//! Conversions between the tracking runtime's matrix layouts and [`Mat4`].
//!
//! Both directions are pure relabelings: element `(r, c)` keeps its value and its
//! meaning. The runtime and the renderer agree on handedness (right-handed, +Y up,
//! -Z forward), so no axis is flipped here.

use super::types::{Pose, RuntimeMatrix34, RuntimeMatrix44, TrackedDevicePose};
use crate::math::Mat4;

/// The homogeneous row appended to a 3x4 affine block.
const AFFINE_LAST_ROW: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Converts a row-major 4x4 runtime matrix into a [`Mat4`].
#[inline]
pub fn to_mat4(src: &RuntimeMatrix44) -> Mat4 {
    Mat4::from_rows(src.m)
}

/// Converts a row-major 3x4 affine runtime matrix into a [`Mat4`], completing it with
/// the row `[0, 0, 0, 1]`.
#[inline]
pub fn affine_to_mat4(src: &RuntimeMatrix34) -> Mat4 {
    Mat4::from_rows([src.m[0], src.m[1], src.m[2], AFFINE_LAST_ROW])
}

/// Drops the last row of `m`, producing the runtime's 3x4 affine layout.
#[inline]
pub fn mat4_to_affine(m: &Mat4) -> RuntimeMatrix34 {
    let rows = m.to_rows();
    RuntimeMatrix34 {
        m: [rows[0], rows[1], rows[2]],
    }
}

impl From<RuntimeMatrix44> for Mat4 {
    fn from(src: RuntimeMatrix44) -> Self {
        to_mat4(&src)
    }
}

impl From<RuntimeMatrix34> for Mat4 {
    fn from(src: RuntimeMatrix34) -> Self {
        affine_to_mat4(&src)
    }
}

impl Pose {
    /// Converts a raw pose slot.
    pub fn from_tracked(raw: &TrackedDevicePose) -> Self {
        Self {
            valid: raw.pose_is_valid,
            transform: affine_to_mat4(&raw.device_to_absolute_tracking),
            velocity: raw.velocity,
            angular_velocity: raw.angular_velocity,
            tracking_result: raw.tracking_result,
            connected: raw.device_is_connected,
        }
    }
}
