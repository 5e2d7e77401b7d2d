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

//! Errors raised by rendering engine implementations.

use crate::math::Extent2D;
use std::fmt;

/// An off-screen target could not be allocated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// The requested size has a zero dimension or exceeds the backend's limits.
    InvalidSize {
        /// The rejected size.
        size: Extent2D,
        /// The largest dimension the backend accepts.
        max_dimension: u32,
    },
    /// The backend ran out of memory.
    OutOfMemory,
    /// The backend does not support the target's color or depth format.
    UnsupportedFormat(String),
    /// An error originating from the specific graphics backend implementation.
    Backend(String),
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationError::InvalidSize {
                size,
                max_dimension,
            } => write!(
                f,
                "Invalid render target size {}x{} (maximum dimension {max_dimension})",
                size.width, size.height
            ),
            AllocationError::OutOfMemory => write!(f, "Out of memory"),
            AllocationError::UnsupportedFormat(format) => {
                write!(f, "Unsupported render target format: {format}")
            }
            AllocationError::Backend(msg) => write!(f, "Backend-specific allocation error: {msg}"),
        }
    }
}

impl std::error::Error for AllocationError {}

/// Misuse of a [`MatrixStack`](super::MatrixStack).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixStackError {
    /// A push would exceed the maximum stack depth.
    Overflow,
    /// A pop was issued with nothing saved on the stack.
    Underflow,
}

impl fmt::Display for MatrixStackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixStackError::Overflow => write!(f, "Matrix stack overflow"),
            MatrixStackError::Underflow => write!(f, "Matrix stack underflow"),
        }
    }
}

impl std::error::Error for MatrixStackError {}
