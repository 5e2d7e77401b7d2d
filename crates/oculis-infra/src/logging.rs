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

//! Logger setup for binaries.

use anyhow::{Context, Result};
use env_logger::{Builder, Env};

/// Installs the global logger with an `info` default, overridable through `RUST_LOG`.
pub fn init() -> Result<()> {
    init_with_default("info")
}

/// Installs the global logger with `filter` as the default filter.
///
/// The `wgpu` internals are capped at `error`; they are very chatty at `info`.
pub fn init_with_default(filter: &str) -> Result<()> {
    Builder::from_env(Env::default().default_filter_or(filter))
        .filter_module("wgpu_hal", log::LevelFilter::Error)
        .filter_module("wgpu_core", log::LevelFilter::Error)
        .try_init()
        .context("A global logger is already installed")
}
