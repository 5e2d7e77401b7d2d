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

//! Linear algebra primitives used by the pose pipeline.
//!
//! Matrices are column-major and follow the column-vector convention: a point is
//! transformed as `M * p`, and `A * B` applies `B` first. This is the layout a
//! GL-style matrix stack consumes directly.

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;

pub use std::f32::consts::{FRAC_PI_2, PI, TAU};

pub mod dimension;
pub mod matrix;
pub mod vector;

pub use self::dimension::Extent2D;
pub use self::matrix::Mat4;
pub use self::vector::{Vec3, Vec4};
