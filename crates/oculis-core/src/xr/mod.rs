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

//! Contracts and data types for talking to a tracking runtime and its compositor.
//!
//! The tracking runtime hands out row-major 3x4 and 4x4 matrices; [`convert`] turns
//! them into the renderer's [`Mat4`](crate::math::Mat4). Everything else the stereo
//! pipeline needs from the outside world is expressed by the [`TrackingRuntime`] and
//! [`Compositor`] traits.

pub mod convert;
pub mod error;
pub mod runtime;
pub mod types;

pub use self::error::{CompositorError, InitError, PoseSampleError};
pub use self::runtime::{Compositor, TrackingRuntime};
pub use self::types::*;
