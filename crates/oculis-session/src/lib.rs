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

//! # Oculis Session
//!
//! The stereo pipeline proper. A [`StereoSession`] owns the tracking runtime, the
//! compositor, the rendering engine and the per-eye render targets, and walks every
//! frame through the same strict sequence:
//!
//! ```text
//! begin_frame (sample poses) -> eye(Left) -> eye(Right) -> end_frame (submit both)
//! ```

pub mod eye_geometry;
pub mod frame;
pub mod pose_store;
pub mod render_targets;
pub mod session;
pub mod stats;
pub mod submission;

pub use eye_geometry::{EyeDescriptor, EyeDescriptors, EyeGeometryError};
pub use frame::{FrameController, FrameError, FrameState, SubmitFailures};
pub use pose_store::{HeadTransform, PoseStore};
pub use render_targets::{RenderTarget, RenderTargetPair};
pub use session::{EyeScope, StereoSession};
pub use stats::FrameStats;
pub use submission::CompositorSubmitter;
