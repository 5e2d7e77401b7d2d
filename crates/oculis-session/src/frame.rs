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

//! The per-frame state machine.
//!
//! A frame always runs `begin_frame`, one bracket per eye, then `end_frame`. Calls
//! made out of order are rejected with [`FrameError::InvalidState`] before anything
//! is touched: no state changes, no collaborator is called.

use crate::eye_geometry::EyeDescriptor;
use crate::pose_store::PoseStore;
use crate::render_targets::{RenderTarget, RenderTargetPair};
use crate::submission::CompositorSubmitter;
use oculis_core::renderer::{MatrixMode, MatrixStackError, RenderEngine};
use oculis_core::xr::{Compositor, CompositorError, Eye, PerEye, PoseSampleError, TrackingRuntime};
use std::fmt;

/// Where the controller is within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrameState {
    /// No frame in progress.
    #[default]
    Idle,
    /// Poses are sampled and no eye is being rendered.
    PosesSampled,
    /// An eye bracket is open.
    EyeActive(Eye),
    /// Both eyes are being handed to the compositor.
    Submitted,
}

impl fmt::Display for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameState::Idle => write!(f, "idle"),
            FrameState::PosesSampled => write!(f, "poses sampled"),
            FrameState::EyeActive(eye) => write!(f, "rendering the {eye} eye"),
            FrameState::Submitted => write!(f, "submitted"),
        }
    }
}

/// The per-eye outcome of a partially failed submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubmitFailures(pub PerEye<Option<CompositorError>>);

impl SubmitFailures {
    /// The error the compositor returned for `eye`, if any.
    pub fn get(&self, eye: Eye) -> Option<CompositorError> {
        *self.0.get(eye)
    }

    /// The eyes whose submission failed, left first.
    pub fn failed_eyes(&self) -> impl Iterator<Item = Eye> + '_ {
        self.0
            .iter()
            .filter_map(|(eye, err)| err.as_ref().map(|_| eye))
    }

    fn is_empty(&self) -> bool {
        self.0.left.is_none() && self.0.right.is_none()
    }
}

impl fmt::Display for SubmitFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (eye, err) in self.0.iter() {
            if let Some(err) = err {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{eye} eye: {err}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Errors reported by the frame lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The call is not valid in the current state. Nothing was changed.
    #[error("`{operation}` is not allowed while {state}")]
    InvalidState {
        /// The rejected operation.
        operation: &'static str,
        /// The state the controller was in.
        state: FrameState,
    },
    /// The pose sample failed; the frame was not started.
    #[error("Pose sampling failed: {0}")]
    PoseSample(#[from] PoseSampleError),
    /// The engine could not save its projection matrix. The bracket was not opened
    /// and the eye's target was not bound.
    #[error("Cannot open the eye bracket: {0}")]
    MatrixStack(#[from] MatrixStackError),
    /// The compositor rejected at least one eye. The frame is over regardless.
    #[error("Compositor rejected the frame ({0})")]
    SubmissionFailed(SubmitFailures),
}

/// Drives the frame state machine and owns the latest poses.
#[derive(Debug)]
pub struct FrameController {
    state: FrameState,
    completed: PerEye<bool>,
    poses: PoseStore,
}

impl FrameController {
    /// Creates an idle controller sampling poses into `poses`.
    pub fn new(poses: PoseStore) -> Self {
        Self {
            state: FrameState::Idle,
            completed: PerEye::default(),
            poses,
        }
    }

    /// The current state.
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Whether `eye` was rendered in the current frame.
    pub fn is_completed(&self, eye: Eye) -> bool {
        *self.completed.get(eye)
    }

    /// The latest poses.
    pub fn poses(&self) -> &PoseStore {
        &self.poses
    }

    fn reject(&self, operation: &'static str) -> FrameError {
        let err = FrameError::InvalidState {
            operation,
            state: self.state,
        };
        log::error!("{err}");
        err
    }

    /// Samples poses and opens a frame.
    ///
    /// On a sampling failure the controller stays idle and the frame should be
    /// skipped; the previous head pose is still available.
    pub fn begin_frame(&mut self, runtime: &mut dyn TrackingRuntime) -> Result<(), FrameError> {
        if self.state != FrameState::Idle {
            return Err(self.reject("begin_frame"));
        }
        if let Err(err) = self.poses.sample(runtime) {
            log::warn!("Dropping frame: {err}");
            return Err(err.into());
        }
        self.completed = PerEye::default();
        self.state = FrameState::PosesSampled;
        Ok(())
    }

    /// Opens the bracket for `eye`: saves the projection matrix, binds the eye's
    /// target and loads its matrices.
    ///
    /// If the projection matrix cannot be saved nothing else is touched and
    /// [`FrameError::MatrixStack`] is returned; the frame stays open.
    pub fn begin_eye(
        &mut self,
        eye: Eye,
        engine: &mut dyn RenderEngine,
        target: &RenderTarget,
        descriptor: &EyeDescriptor,
    ) -> Result<(), FrameError> {
        if self.state != FrameState::PosesSampled || self.is_completed(eye) {
            return Err(self.reject("begin_eye"));
        }

        engine.flush();
        engine.matrix_mode(MatrixMode::Projection);
        if let Err(err) = engine.push_matrix() {
            engine.matrix_mode(MatrixMode::ModelView);
            log::error!("Cannot open the {eye} eye bracket: {err}");
            return Err(err.into());
        }
        engine.set_active_render_target(Some(target.id()));
        engine.set_depth_test(true);
        engine.load_matrix(&descriptor.projection);
        engine.matrix_mode(MatrixMode::ModelView);
        engine.load_matrix(&descriptor.view(&self.poses.head_inverse()));

        log::trace!("Began {eye} eye");
        self.state = FrameState::EyeActive(eye);
        Ok(())
    }

    /// Closes the open eye bracket and marks the eye as rendered.
    pub fn end_eye(&mut self, engine: &mut dyn RenderEngine) -> Result<Eye, FrameError> {
        let FrameState::EyeActive(eye) = self.state else {
            return Err(self.reject("end_eye"));
        };
        self.close_bracket(engine);
        *self.completed.get_mut(eye) = true;
        log::trace!("Ended {eye} eye");
        Ok(eye)
    }

    /// Closes the open eye bracket without marking the eye as rendered.
    pub fn abort_eye(&mut self, engine: &mut dyn RenderEngine) -> Result<Eye, FrameError> {
        let FrameState::EyeActive(eye) = self.state else {
            return Err(self.reject("abort_eye"));
        };
        self.close_bracket(engine);
        log::warn!("The {eye} eye bracket was abandoned");
        Ok(eye)
    }

    fn close_bracket(&mut self, engine: &mut dyn RenderEngine) {
        engine.flush();
        engine.matrix_mode(MatrixMode::Projection);
        if let Err(err) = engine.pop_matrix() {
            log::error!("Projection matrix lost while closing the eye bracket: {err}");
        }
        engine.matrix_mode(MatrixMode::ModelView);
        engine.load_identity();
        engine.set_depth_test(false);
        engine.set_active_render_target(None);
        self.state = FrameState::PosesSampled;
    }

    /// Submits both eyes, left then right, and closes the frame.
    ///
    /// Both submissions are always attempted. If either fails the error names the
    /// failed eye(s), and the controller is idle again all the same.
    pub fn end_frame(
        &mut self,
        compositor: &mut dyn Compositor,
        submitter: &CompositorSubmitter,
        targets: &RenderTargetPair,
    ) -> Result<(), FrameError> {
        if self.state != FrameState::PosesSampled || !(self.completed.left && self.completed.right)
        {
            return Err(self.reject("end_frame"));
        }

        self.state = FrameState::Submitted;
        let mut failures = SubmitFailures::default();
        for eye in Eye::BOTH {
            if let Err(err) = submitter.submit(compositor, eye, targets.get(eye)) {
                *failures.0.get_mut(eye) = Some(err);
            }
        }
        self.state = FrameState::Idle;

        if failures.is_empty() {
            Ok(())
        } else {
            Err(FrameError::SubmissionFailed(failures))
        }
    }
}
