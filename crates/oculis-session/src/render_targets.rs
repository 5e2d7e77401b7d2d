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

//! The two off-screen targets eyes are rendered into.

use oculis_core::math::Extent2D;
use oculis_core::renderer::{AllocationError, OffscreenTarget, RenderEngine, RenderTargetId};
use oculis_core::xr::{Eye, PerEye};

/// One eye's off-screen target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTarget {
    /// The eye this target is rendered for.
    pub eye: Eye,
    /// The engine allocation backing it.
    pub target: OffscreenTarget,
}

impl RenderTarget {
    /// The engine handle used to bind this target.
    pub fn id(&self) -> RenderTargetId {
        self.target.id
    }

    /// The color texture handed to the compositor.
    pub fn color_texture(&self) -> u64 {
        self.target.color_texture
    }

    /// The size of the target in pixels.
    pub fn size(&self) -> Extent2D {
        self.target.size
    }
}

/// Both eye targets. Always the same size; released together by [`destroy_targets`].
#[derive(Debug, PartialEq, Eq)]
pub struct RenderTargetPair {
    targets: PerEye<RenderTarget>,
}

impl RenderTargetPair {
    /// The target of `eye`.
    pub fn get(&self, eye: Eye) -> &RenderTarget {
        self.targets.get(eye)
    }

    /// The shared size of both targets.
    pub fn size(&self) -> Extent2D {
        self.targets.left.size()
    }
}

/// Allocates one target per eye at `size`.
///
/// If the right eye allocation fails the already created left target is released
/// before returning, so nothing leaks.
pub fn create_targets(
    engine: &mut dyn RenderEngine,
    size: Extent2D,
) -> Result<RenderTargetPair, AllocationError> {
    if size.is_empty() {
        return Err(AllocationError::InvalidSize {
            size,
            max_dimension: 0,
        });
    }

    let left = engine.create_offscreen_target(size)?;
    let right = match engine.create_offscreen_target(size) {
        Ok(target) => target,
        Err(err) => {
            log::error!("Failed to allocate the right eye target: {err}");
            engine.destroy_offscreen_target(left);
            return Err(err);
        }
    };
    log::info!(
        "Created eye targets of {}x{} (left {:?}, right {:?})",
        size.width,
        size.height,
        left.id,
        right.id
    );

    Ok(RenderTargetPair {
        targets: PerEye::new(
            RenderTarget {
                eye: Eye::Left,
                target: left,
            },
            RenderTarget {
                eye: Eye::Right,
                target: right,
            },
        ),
    })
}

/// Releases both targets. Consuming the pair makes a second release impossible.
pub fn destroy_targets(engine: &mut dyn RenderEngine, pair: RenderTargetPair) {
    let PerEye { left, right } = pair.targets;
    engine.destroy_offscreen_target(left.target);
    engine.destroy_offscreen_target(right.target);
    log::debug!("Released eye targets {:?} and {:?}", left.id(), right.id());
}
