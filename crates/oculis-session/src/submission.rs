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

//! Hands finished eye images to the compositor.

use crate::render_targets::RenderTarget;
use oculis_core::xr::{ColorSpace, Compositor, CompositorError, Eye, EyeTexture, TextureType};

/// Describes eye textures the way the compositor expects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompositorSubmitter {
    /// The graphics API the textures were rendered with.
    pub texture_type: TextureType,
    /// The color space of the rendered images.
    pub color_space: ColorSpace,
}

impl CompositorSubmitter {
    /// Creates a submitter for textures of the given kind.
    pub fn new(texture_type: TextureType, color_space: ColorSpace) -> Self {
        Self {
            texture_type,
            color_space,
        }
    }

    /// The descriptor submitted for `target`.
    pub fn texture_for(&self, target: &RenderTarget) -> EyeTexture {
        EyeTexture {
            handle: target.color_texture(),
            texture_type: self.texture_type,
            color_space: self.color_space,
        }
    }

    /// Submits the color texture of `target` as the image for `eye`.
    pub fn submit(
        &self,
        compositor: &mut dyn Compositor,
        eye: Eye,
        target: &RenderTarget,
    ) -> Result<(), CompositorError> {
        let texture = self.texture_for(target);
        compositor.submit_eye_texture(eye, &texture).map_err(|err| {
            log::error!("{err} while submitting the {eye} eye");
            err
        })
    }
}
