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

//! A CPU-side projection/model-view matrix stack.
//!
//! Engines that do not have a fixed-function matrix stack of their own embed this
//! type to implement the matrix half of [`RenderEngine`](super::RenderEngine).

use super::error::MatrixStackError;
use super::traits::MatrixMode;
use crate::math::Mat4;

/// The number of matrices that can be saved per stack.
pub const MAX_MATRIX_STACK_DEPTH: usize = 32;

#[derive(Debug, Clone)]
struct Stack {
    current: Mat4,
    saved: Vec<Mat4>,
}

impl Stack {
    fn new() -> Self {
        Self {
            current: Mat4::IDENTITY,
            saved: Vec::with_capacity(MAX_MATRIX_STACK_DEPTH),
        }
    }
}

/// Two independent matrix stacks, one per [`MatrixMode`].
#[derive(Debug, Clone)]
pub struct MatrixStack {
    mode: MatrixMode,
    projection: Stack,
    model_view: Stack,
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixStack {
    /// Creates a stack with identity matrices and the model-view stack selected.
    pub fn new() -> Self {
        Self {
            mode: MatrixMode::ModelView,
            projection: Stack::new(),
            model_view: Stack::new(),
        }
    }

    fn selected(&mut self) -> &mut Stack {
        match self.mode {
            MatrixMode::Projection => &mut self.projection,
            MatrixMode::ModelView => &mut self.model_view,
        }
    }

    fn stack(&self, mode: MatrixMode) -> &Stack {
        match mode {
            MatrixMode::Projection => &self.projection,
            MatrixMode::ModelView => &self.model_view,
        }
    }

    /// Selects the stack subsequent operations apply to.
    pub fn set_mode(&mut self, mode: MatrixMode) {
        self.mode = mode;
    }

    /// The currently selected stack.
    pub fn mode(&self) -> MatrixMode {
        self.mode
    }

    /// Saves the current matrix of the selected stack.
    pub fn push(&mut self) -> Result<(), MatrixStackError> {
        let stack = self.selected();
        if stack.saved.len() >= MAX_MATRIX_STACK_DEPTH {
            return Err(MatrixStackError::Overflow);
        }
        let current = stack.current;
        stack.saved.push(current);
        Ok(())
    }

    /// Restores the last saved matrix of the selected stack.
    pub fn pop(&mut self) -> Result<(), MatrixStackError> {
        let stack = self.selected();
        let restored = stack.saved.pop().ok_or(MatrixStackError::Underflow)?;
        stack.current = restored;
        Ok(())
    }

    /// Replaces the current matrix of the selected stack with the identity.
    pub fn load_identity(&mut self) {
        self.selected().current = Mat4::IDENTITY;
    }

    /// Replaces the current matrix of the selected stack.
    pub fn load(&mut self, matrix: &Mat4) {
        self.selected().current = *matrix;
    }

    /// Post-multiplies the current matrix of the selected stack by `matrix`.
    pub fn multiply(&mut self, matrix: &Mat4) {
        let stack = self.selected();
        stack.current = stack.current * *matrix;
    }

    /// The current matrix of `mode`'s stack.
    pub fn current(&self, mode: MatrixMode) -> Mat4 {
        self.stack(mode).current
    }

    /// How many matrices are saved on `mode`'s stack.
    pub fn depth(&self, mode: MatrixMode) -> usize {
        self.stack(mode).saved.len()
    }

    /// The combined `projection * model_view` transform.
    pub fn model_view_projection(&self) -> Mat4 {
        self.projection.current * self.model_view.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    #[test]
    fn push_pop_restores_the_selected_stack_only() {
        let mut stack = MatrixStack::new();
        let p = Mat4::from_translation(Vec3::new(0.0, 0.0, -1.0));
        stack.set_mode(MatrixMode::Projection);
        stack.push().unwrap();
        stack.load(&p);
        assert_eq!(stack.depth(MatrixMode::Projection), 1);
        assert_eq!(stack.depth(MatrixMode::ModelView), 0);
        assert_eq!(stack.current(MatrixMode::Projection), p);

        stack.pop().unwrap();
        assert_eq!(stack.current(MatrixMode::Projection), Mat4::IDENTITY);
        assert_eq!(stack.depth(MatrixMode::Projection), 0);
    }

    #[test]
    fn underflow_is_reported() {
        let mut stack = MatrixStack::new();
        assert_eq!(stack.pop(), Err(MatrixStackError::Underflow));
    }

    #[test]
    fn overflow_is_reported() {
        let mut stack = MatrixStack::new();
        for _ in 0..MAX_MATRIX_STACK_DEPTH {
            stack.push().unwrap();
        }
        assert_eq!(stack.push(), Err(MatrixStackError::Overflow));
        assert_eq!(stack.depth(MatrixMode::ModelView), MAX_MATRIX_STACK_DEPTH);
    }

    #[test]
    fn multiply_post_multiplies() {
        let mut stack = MatrixStack::new();
        let a = Mat4::from_translation(Vec3::X);
        let b = Mat4::from_rotation_y(0.5);
        stack.load(&a);
        stack.multiply(&b);
        assert_eq!(stack.current(MatrixMode::ModelView), a * b);
        assert_eq!(stack.model_view_projection(), a * b);
    }
}
