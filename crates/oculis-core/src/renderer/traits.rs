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

//! Defines the `RenderEngine` trait the stereo pipeline drives.

use super::error::{AllocationError, MatrixStackError};
use crate::math::{Extent2D, Mat4};

/// Which matrix stack subsequent matrix operations apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixMode {
    /// The projection stack.
    Projection,
    /// The model-view stack.
    ModelView,
}

/// An opaque handle to an off-screen render target owned by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetId(pub u64);

/// An allocated off-screen color target with an implicit depth attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffscreenTarget {
    /// The engine-side handle.
    pub id: RenderTargetId,
    /// The backend handle of the color attachment, as the compositor expects it.
    pub color_texture: u64,
    /// The size of the target in pixels.
    pub size: Extent2D,
}

/// A rendering engine with a GL-style matrix stack and off-screen targets.
///
/// The engine owns its matrix stacks; the stereo pipeline only pushes into them for
/// the duration of an eye bracket and pops back out when the bracket ends.
pub trait RenderEngine {
    /// Allocates an off-screen color target (plus depth) of the given size.
    fn create_offscreen_target(&mut self, size: Extent2D)
        -> Result<OffscreenTarget, AllocationError>;

    /// Releases an off-screen target.
    fn destroy_offscreen_target(&mut self, target: OffscreenTarget);

    /// Redirects drawing to `target`, or back to the default framebuffer with `None`.
    fn set_active_render_target(&mut self, target: Option<RenderTargetId>);

    /// Selects the stack subsequent matrix operations apply to.
    fn matrix_mode(&mut self, mode: MatrixMode);

    /// Saves the current matrix of the selected stack.
    ///
    /// A full stack is reported as [`MatrixStackError::Overflow`] and leaves the
    /// stack untouched.
    fn push_matrix(&mut self) -> Result<(), MatrixStackError>;

    /// Restores the last saved matrix of the selected stack.
    fn pop_matrix(&mut self) -> Result<(), MatrixStackError>;

    /// Replaces the current matrix with the identity.
    fn load_identity(&mut self);

    /// Replaces the current matrix with `matrix`.
    fn load_matrix(&mut self, matrix: &Mat4);

    /// Submits any batched geometry before state changes.
    fn flush(&mut self) {}

    /// Enables or disables depth testing.
    fn set_depth_test(&mut self, _enabled: bool) {}
}
