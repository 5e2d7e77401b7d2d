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

//! Capability traits the stereo pipeline consumes.

use super::error::{CompositorError, InitError, PoseSampleError};
use super::types::{Eye, EyeTexture, RuntimeMatrix34, RuntimeMatrix44, TrackedDevicePose};
use crate::math::Extent2D;

/// The tracking runtime: device presence, per-eye intrinsics and pose sampling.
///
/// Implementations are driven from a single render thread; none of the methods are
/// expected to be called concurrently.
pub trait TrackingRuntime {
    /// Whether a runtime is installed at all.
    fn is_runtime_installed(&self) -> bool;

    /// Whether a head-mounted display is connected.
    fn is_device_available(&self) -> bool;

    /// A human-readable name of the tracking system, if the runtime exposes one.
    fn tracking_system_name(&self) -> Option<String> {
        None
    }

    /// The per-eye render target size the runtime recommends.
    fn recommended_target_size(&self) -> Extent2D;

    /// The projection matrix for `eye` with the given clip planes.
    fn projection_matrix(&self, eye: Eye, near: f32, far: f32) -> RuntimeMatrix44;

    /// The transform from `eye` space to head space.
    fn eye_to_head_transform(&self, eye: Eye) -> RuntimeMatrix34;

    /// Blocks until the runtime hands out fresh poses, filling up to `poses.len()` slots.
    ///
    /// This is the per-frame synchronization point with the tracking hardware.
    fn wait_and_sample_poses(
        &mut self,
        poses: &mut [TrackedDevicePose],
    ) -> Result<(), PoseSampleError>;

    /// Acquires the compositor interface of this runtime.
    fn acquire_compositor(&mut self) -> Result<Box<dyn Compositor>, InitError>;

    /// Releases the runtime connection. Called once, when the session shuts down.
    fn shutdown(&mut self) {}
}

/// The compositor service that presents submitted eye textures on the display.
pub trait Compositor {
    /// Hands the texture rendered for `eye` to the compositor.
    fn submit_eye_texture(&mut self, eye: Eye, texture: &EyeTexture)
        -> Result<(), CompositorError>;
}
