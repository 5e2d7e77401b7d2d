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

//! A CPU rendering engine.
//!
//! Targets are plain RGBA8 + depth buffers in memory. Only points can be drawn, which
//! is enough to check where geometry lands in each eye without a GPU.

use oculis_core::math::{Extent2D, Mat4, Vec3, Vec4};
use oculis_core::renderer::{
    AllocationError, MatrixMode, MatrixStack, MatrixStackError, OffscreenTarget, RenderEngine,
    RenderTargetId,
};
use std::collections::HashMap;

/// The largest width or height a software target may have.
pub const MAX_SOFTWARE_TARGET_DIMENSION: u32 = 8192;

/// An RGBA8 color buffer with a matching depth buffer.
#[derive(Debug)]
pub struct SoftwareTarget {
    size: Extent2D,
    color: Vec<[u8; 4]>,
    depth: Vec<f32>,
}

impl SoftwareTarget {
    fn allocate(size: Extent2D) -> Result<Self, AllocationError> {
        let len = size.width as usize * size.height as usize;
        let mut color = Vec::new();
        let mut depth = Vec::new();
        color
            .try_reserve_exact(len)
            .map_err(|_| AllocationError::OutOfMemory)?;
        depth
            .try_reserve_exact(len)
            .map_err(|_| AllocationError::OutOfMemory)?;
        color.resize(len, [0; 4]);
        depth.resize(len, 1.0);
        Ok(Self { size, color, depth })
    }

    /// The size in pixels.
    pub fn size(&self) -> Extent2D {
        self.size
    }

    /// The color at `(x, y)`, with `y` growing downwards.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.index(x, y).map(|i| self.color[i])
    }

    /// The depth at `(x, y)`, `1.0` where nothing was drawn.
    pub fn depth(&self, x: u32, y: u32) -> Option<f32> {
        self.index(x, y).map(|i| self.depth[i])
    }

    /// Pixels whose color differs from `background`.
    pub fn count_not(&self, background: [u8; 4]) -> usize {
        self.color.iter().filter(|c| **c != background).count()
    }

    /// The first pixel, in row order, with exactly `color`.
    pub fn find(&self, color: [u8; 4]) -> Option<(u32, u32)> {
        let i = self.color.iter().position(|c| *c == color)?;
        let width = self.size.width as usize;
        Some(((i % width) as u32, (i / width) as u32))
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.size.width && y < self.size.height)
            .then(|| y as usize * self.size.width as usize + x as usize)
    }

    fn clear(&mut self, color: [u8; 4]) {
        self.color.fill(color);
        self.depth.fill(1.0);
    }
}

/// A [`RenderEngine`] drawing into memory.
#[derive(Debug)]
pub struct SoftwareRenderEngine {
    targets: HashMap<RenderTargetId, SoftwareTarget>,
    next_id: u64,
    active: Option<RenderTargetId>,
    matrices: MatrixStack,
    depth_test: bool,
    max_dimension: u32,
    flushes: u64,
}

impl Default for SoftwareRenderEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareRenderEngine {
    /// Creates an engine with no targets.
    pub fn new() -> Self {
        Self::with_max_dimension(MAX_SOFTWARE_TARGET_DIMENSION)
    }

    /// Creates an engine that rejects targets larger than `max_dimension` on either side.
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            targets: HashMap::new(),
            next_id: 0,
            active: None,
            matrices: MatrixStack::new(),
            depth_test: false,
            max_dimension,
            flushes: 0,
        }
    }

    /// The target behind `id`, if it is still alive.
    pub fn target(&self, id: RenderTargetId) -> Option<&SoftwareTarget> {
        self.targets.get(&id)
    }

    /// The currently bound target.
    pub fn active_target(&self) -> Option<RenderTargetId> {
        self.active
    }

    /// How many targets are allocated.
    pub fn live_targets(&self) -> usize {
        self.targets.len()
    }

    /// The matrix stacks.
    pub fn matrices(&self) -> &MatrixStack {
        &self.matrices
    }

    /// Whether depth testing is on.
    pub fn depth_test_enabled(&self) -> bool {
        self.depth_test
    }

    /// How many times batched work was flushed.
    pub fn flush_count(&self) -> u64 {
        self.flushes
    }

    /// Post-multiplies the selected matrix, e.g. to place a model.
    pub fn multiply_matrix(&mut self, matrix: &Mat4) {
        self.matrices.multiply(matrix);
    }

    /// Clears the bound target to `color` and resets its depth.
    pub fn clear(&mut self, color: [u8; 4]) {
        if let Some(target) = self.active.and_then(|id| self.targets.get_mut(&id)) {
            target.clear(color);
        }
    }

    /// Projects `points` through the current matrices into the bound target.
    ///
    /// Returns how many points were written. Points behind the eye, outside the
    /// view volume or failing the depth test are skipped.
    pub fn draw_points(&mut self, points: &[Vec3], color: [u8; 4]) -> usize {
        let Some(target) = self.active.and_then(|id| self.targets.get_mut(&id)) else {
            log::warn!("draw_points called with no render target bound");
            return 0;
        };
        let mvp = self.matrices.model_view_projection();
        let (width, height) = (target.size.width as f32, target.size.height as f32);

        let mut drawn = 0;
        for &p in points {
            let clip = mvp * Vec4::from_vec3(p, 1.0);
            if clip.w <= 0.0 {
                continue;
            }
            let ndc = Vec3::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w);
            if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 || ndc.z.abs() > 1.0 {
                continue;
            }
            let x = (((ndc.x + 1.0) * 0.5 * width) as u32).min(target.size.width - 1);
            let y = (((1.0 - ndc.y) * 0.5 * height) as u32).min(target.size.height - 1);
            let depth = ndc.z * 0.5 + 0.5;

            let Some(i) = target.index(x, y) else {
                continue;
            };
            if self.depth_test && depth >= target.depth[i] {
                continue;
            }
            target.color[i] = color;
            target.depth[i] = depth;
            drawn += 1;
        }
        drawn
    }
}

impl RenderEngine for SoftwareRenderEngine {
    fn create_offscreen_target(
        &mut self,
        size: Extent2D,
    ) -> Result<OffscreenTarget, AllocationError> {
        if size.is_empty() || size.width > self.max_dimension || size.height > self.max_dimension {
            return Err(AllocationError::InvalidSize {
                size,
                max_dimension: self.max_dimension,
            });
        }
        let target = SoftwareTarget::allocate(size)?;
        self.next_id += 1;
        let id = RenderTargetId(self.next_id);
        self.targets.insert(id, target);
        log::debug!("Allocated software target {id:?} ({}x{})", size.width, size.height);

        Ok(OffscreenTarget {
            id,
            color_texture: self.next_id,
            size,
        })
    }

    fn destroy_offscreen_target(&mut self, target: OffscreenTarget) {
        if self.targets.remove(&target.id).is_none() {
            log::warn!("Tried to destroy unknown software target {:?}", target.id);
        }
        if self.active == Some(target.id) {
            self.active = None;
        }
    }

    fn set_active_render_target(&mut self, target: Option<RenderTargetId>) {
        if let Some(id) = target {
            if !self.targets.contains_key(&id) {
                log::error!("Cannot bind unknown software target {id:?}");
                return;
            }
        }
        self.active = target;
    }

    fn matrix_mode(&mut self, mode: MatrixMode) {
        self.matrices.set_mode(mode);
    }

    fn push_matrix(&mut self) -> Result<(), MatrixStackError> {
        self.matrices.push()
    }

    fn pop_matrix(&mut self) -> Result<(), MatrixStackError> {
        self.matrices.pop()
    }

    fn load_identity(&mut self) {
        self.matrices.load_identity();
    }

    fn load_matrix(&mut self, matrix: &Mat4) {
        self.matrices.load(matrix);
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oculis_core::renderer::MAX_MATRIX_STACK_DEPTH;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn perspective(near: f32, far: f32) -> Mat4 {
        Mat4::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, -(far + near) / (far - near), -2.0 * far * near / (far - near)],
            [0.0, 0.0, -1.0, 0.0],
        ])
    }

    fn bound_engine(size: Extent2D) -> (SoftwareRenderEngine, RenderTargetId) {
        let mut engine = SoftwareRenderEngine::new();
        let target = engine.create_offscreen_target(size).unwrap();
        engine.set_active_render_target(Some(target.id));
        engine.matrix_mode(MatrixMode::Projection);
        engine.load_matrix(&perspective(0.1, 10.0));
        engine.matrix_mode(MatrixMode::ModelView);
        (engine, target.id)
    }

    #[test]
    fn rejects_oversized_and_empty_targets() {
        let mut engine = SoftwareRenderEngine::with_max_dimension(256);
        assert_eq!(
            engine.create_offscreen_target(Extent2D::new(512, 16)),
            Err(AllocationError::InvalidSize {
                size: Extent2D::new(512, 16),
                max_dimension: 256
            })
        );
        assert!(engine.create_offscreen_target(Extent2D::new(16, 0)).is_err());
        assert_eq!(engine.live_targets(), 0);
    }

    #[test]
    fn targets_have_distinct_handles() {
        let mut engine = SoftwareRenderEngine::new();
        let a = engine.create_offscreen_target(Extent2D::new(8, 8)).unwrap();
        let b = engine.create_offscreen_target(Extent2D::new(8, 8)).unwrap();
        assert_ne!(a.id, b.id);
        assert_ne!(a.color_texture, b.color_texture);

        engine.set_active_render_target(Some(a.id));
        engine.destroy_offscreen_target(a);
        assert_eq!(engine.active_target(), None);
        assert_eq!(engine.live_targets(), 1);
    }

    #[test]
    fn point_in_front_lands_in_the_center() {
        let (mut engine, id) = bound_engine(Extent2D::new(64, 32));
        engine.clear([0, 0, 0, 255]);
        let drawn = engine.draw_points(&[Vec3::new(0.0, 0.0, -2.0)], RED);
        assert_eq!(drawn, 1);
        assert_eq!(engine.target(id).unwrap().pixel(32, 16), Some(RED));
    }

    #[test]
    fn points_behind_the_eye_are_skipped() {
        let (mut engine, id) = bound_engine(Extent2D::new(16, 16));
        let drawn = engine.draw_points(&[Vec3::new(0.0, 0.0, 2.0)], RED);
        assert_eq!(drawn, 0);
        assert_eq!(engine.target(id).unwrap().count_not([0; 4]), 0);
    }

    #[test]
    fn depth_test_keeps_the_nearest_point() {
        let (mut engine, id) = bound_engine(Extent2D::new(16, 16));
        engine.set_depth_test(true);
        engine.draw_points(&[Vec3::new(0.0, 0.0, -1.0)], RED);
        assert_eq!(engine.draw_points(&[Vec3::new(0.0, 0.0, -5.0)], BLUE), 0);
        assert_eq!(engine.target(id).unwrap().pixel(8, 8), Some(RED));

        engine.set_depth_test(false);
        assert_eq!(engine.draw_points(&[Vec3::new(0.0, 0.0, -5.0)], BLUE), 1);
        assert_eq!(engine.target(id).unwrap().pixel(8, 8), Some(BLUE));
    }

    #[test]
    fn model_transform_moves_points() {
        let (mut engine, id) = bound_engine(Extent2D::new(16, 16));
        engine.multiply_matrix(&Mat4::from_translation(Vec3::new(0.0, 0.0, -2.0)));
        engine.draw_points(&[Vec3::new(1.0, 0.0, 0.0)], RED);
        // x_ndc = 1 / 2, so a quarter of the width right of center.
        assert_eq!(engine.target(id).unwrap().pixel(12, 8), Some(RED));
    }

    #[test]
    fn stack_misuse_is_reported() {
        let mut engine = SoftwareRenderEngine::new();
        assert_eq!(engine.pop_matrix(), Err(MatrixStackError::Underflow));
        assert_eq!(engine.matrices().depth(MatrixMode::ModelView), 0);
        engine.push_matrix().unwrap();
        assert_eq!(engine.matrices().depth(MatrixMode::ModelView), 1);

        engine.matrix_mode(MatrixMode::Projection);
        for _ in 0..MAX_MATRIX_STACK_DEPTH {
            engine.push_matrix().unwrap();
        }
        assert_eq!(engine.push_matrix(), Err(MatrixStackError::Overflow));
        assert_eq!(engine.matrices().depth(MatrixMode::Projection), MAX_MATRIX_STACK_DEPTH);
    }

    #[test]
    fn binding_unknown_target_is_ignored() {
        let mut engine = SoftwareRenderEngine::new();
        engine.set_active_render_target(Some(RenderTargetId(99)));
        assert_eq!(engine.active_target(), None);
        assert_eq!(engine.draw_points(&[Vec3::ZERO], RED), 0);
    }
}
