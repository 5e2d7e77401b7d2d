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

//! The contract with the rendering engine the stereo pipeline drives.
//!
//! The pipeline never draws anything itself. It selects an off-screen target, loads
//! the per-eye projection and view matrices into the engine's matrix stack, and lets
//! the caller draw the scene in between.

pub mod error;
pub mod matrix_stack;
pub mod traits;

pub use self::error::{AllocationError, MatrixStackError};
pub use self::matrix_stack::{MatrixStack, MAX_MATRIX_STACK_DEPTH};
pub use self::traits::{MatrixMode, OffscreenTarget, RenderEngine, RenderTargetId};
