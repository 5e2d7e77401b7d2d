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

//! # Oculis Infra
//!
//! Concrete implementations of the contracts declared in `oculis-core`:
//!
//! - [`software::SoftwareRenderEngine`]: CPU targets, for tests and headless runs.
//! - [`gpu::WgpuRenderEngine`]: GPU targets backed by `wgpu` textures.
//! - [`simulated::SimulatedRuntime`]: a deterministic tracking runtime and compositor.
//! - [`logging`]: process-wide logger setup.

pub mod logging;
pub mod simulated;
pub mod software;
#[cfg(feature = "graphics")]
pub mod gpu;

pub use simulated::{SimulatedCompositor, SimulatedRuntime, SimulatedRuntimeConfig};
pub use software::SoftwareRenderEngine;
#[cfg(feature = "graphics")]
pub use gpu::WgpuRenderEngine;
