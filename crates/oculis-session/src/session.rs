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

//! The producer-facing session object.

use crate::eye_geometry::{EyeDescriptors, EyeGeometryError};
use crate::frame::{FrameController, FrameError, FrameState};
use crate::pose_store::PoseStore;
use crate::render_targets::{self, RenderTargetPair};
use crate::stats::FrameStats;
use crate::submission::CompositorSubmitter;
use oculis_core::config::SessionConfig;
use oculis_core::math::{Extent2D, Mat4};
use oculis_core::renderer::RenderEngine;
use oculis_core::xr::{Compositor, DeviceIndex, Eye, InitError, Pose, TrackingRuntime};
use std::time::Instant;

impl From<EyeGeometryError> for InitError {
    fn from(err: EyeGeometryError) -> Self {
        match err {
            EyeGeometryError::DeviceUnavailable => InitError::DeviceUnavailable,
            other => InitError::InterfaceUnavailable {
                interface: "eye geometry".to_owned(),
                reason: other.to_string(),
            },
        }
    }
}

/// A running stereo session.
///
/// Owns the tracking runtime, its compositor, the rendering engine and both eye
/// targets. Every frame goes through [`begin_frame`](Self::begin_frame), one
/// [`begin_eye`](Self::begin_eye) bracket per eye and [`end_frame`](Self::end_frame).
///
/// Dropping the session releases the eye targets and shuts the runtime down, the same
/// as calling [`shutdown`](Self::shutdown).
pub struct StereoSession<R: RenderEngine> {
    runtime: Box<dyn TrackingRuntime>,
    compositor: Box<dyn Compositor>,
    engine: R,
    targets: Option<RenderTargetPair>,
    eyes: EyeDescriptors,
    frame: FrameController,
    submitter: CompositorSubmitter,
    config: SessionConfig,
    stats: FrameStats,
    frame_started: Option<Instant>,
}

impl<R: RenderEngine> StereoSession<R> {
    /// Connects to the runtime, queries the eye geometry and allocates the eye
    /// targets at the runtime's recommended size.
    pub fn init(
        config: SessionConfig,
        mut runtime: Box<dyn TrackingRuntime>,
        mut engine: R,
    ) -> Result<Self, InitError> {
        config.validate()?;
        if !runtime.is_runtime_installed() {
            log::error!("No tracking runtime is installed");
            return Err(InitError::RuntimeNotInstalled);
        }
        if !runtime.is_device_available() {
            log::error!("No head-mounted display is present");
            return Err(InitError::DeviceUnavailable);
        }

        let started = Self::connect(&config, runtime.as_mut(), &mut engine);
        let (compositor, eyes, targets) = match started {
            Ok(parts) => parts,
            Err(err) => {
                log::error!("Stereo session failed to start: {err}");
                runtime.shutdown();
                return Err(err);
            }
        };

        log::info!(
            "Stereo session started on '{}' with {}x{} eye targets",
            runtime
                .tracking_system_name()
                .unwrap_or_else(|| "unknown system".to_owned()),
            targets.size().width,
            targets.size().height
        );

        Ok(Self {
            runtime,
            compositor,
            engine,
            targets: Some(targets),
            eyes,
            frame: FrameController::new(PoseStore::new(config.head_device_index)),
            submitter: CompositorSubmitter::new(config.texture_type, config.color_space),
            config,
            stats: FrameStats::default(),
            frame_started: None,
        })
    }

    fn connect(
        config: &SessionConfig,
        runtime: &mut dyn TrackingRuntime,
        engine: &mut R,
    ) -> Result<(Box<dyn Compositor>, EyeDescriptors, RenderTargetPair), InitError> {
        let compositor = runtime.acquire_compositor()?;
        let eyes = EyeDescriptors::compute(runtime, config.clip)?;
        let size = runtime.recommended_target_size();
        log::debug!("Runtime recommends {}x{} per eye", size.width, size.height);
        let targets = render_targets::create_targets(engine, size)?;
        Ok((compositor, eyes, targets))
    }

    /// Releases the eye targets and shuts the runtime down.
    pub fn shutdown(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let Some(targets) = self.targets.take() else {
            return;
        };
        if self.frame.state() != FrameState::Idle {
            log::warn!("Shutting down with a frame in progress ({})", self.frame.state());
        }
        render_targets::destroy_targets(&mut self.engine, targets);
        self.runtime.shutdown();
        log::info!(
            "Stereo session shut down after {} frames ({} dropped)",
            self.stats.frames_submitted,
            self.stats.frames_dropped
        );
    }

    /// Samples poses and opens a frame.
    ///
    /// A [`FrameError::PoseSample`] means this frame should be skipped; the session is
    /// idle and the next call may try again.
    pub fn begin_frame(&mut self) -> Result<(), FrameError> {
        match self.frame.begin_frame(self.runtime.as_mut()) {
            Ok(()) => {
                self.stats.frames_begun += 1;
                self.frame_started = Some(Instant::now());
                Ok(())
            }
            Err(err) => {
                if matches!(err, FrameError::PoseSample(_)) {
                    self.stats.frames_dropped += 1;
                }
                Err(err)
            }
        }
    }

    /// Opens the bracket for `eye`.
    ///
    /// While the returned guard lives, drawing through [`EyeScope::engine`] lands in
    /// the eye's target with its projection and view loaded. Ending the guard with
    /// [`EyeScope::end`] marks the eye as rendered; dropping it without doing so
    /// restores the matrix stacks but leaves the eye unrendered.
    pub fn begin_eye(&mut self, eye: Eye) -> Result<EyeScope<'_, R>, FrameError> {
        let Some(targets) = self.targets.as_ref() else {
            return Err(FrameError::InvalidState {
                operation: "begin_eye",
                state: self.frame.state(),
            });
        };
        self.frame.begin_eye(
            eye,
            &mut self.engine,
            targets.get(eye),
            self.eyes.get(eye),
        )?;
        Ok(EyeScope {
            session: self,
            eye,
            ended: false,
        })
    }

    /// Renders `eye` by running `draw` inside its bracket.
    pub fn render_eye(&mut self, eye: Eye, draw: impl FnOnce(&mut R)) -> Result<(), FrameError> {
        let mut scope = self.begin_eye(eye)?;
        draw(scope.engine());
        scope.end()
    }

    /// Submits both eyes and closes the frame.
    pub fn end_frame(&mut self) -> Result<(), FrameError> {
        let Some(targets) = self.targets.as_ref() else {
            return Err(FrameError::InvalidState {
                operation: "end_frame",
                state: self.frame.state(),
            });
        };
        let result = self
            .frame
            .end_frame(self.compositor.as_mut(), &self.submitter, targets);

        if let Err(FrameError::InvalidState { .. }) = result {
            return result;
        }
        if let Err(FrameError::SubmissionFailed(failures)) = &result {
            self.stats.frames_rejected += 1;
            self.stats.submission_failures += failures.failed_eyes().count() as u64;
        }
        self.stats.frames_submitted += 1;
        self.stats.last_frame_duration = self.frame_started.take().map(|t| t.elapsed());
        result
    }

    /// The last valid head transform, or the identity before the first one.
    pub fn head_transform(&self) -> Mat4 {
        self.frame.poses().head_transform()
    }

    /// The pose of any tracked device from the last successful sample.
    pub fn device_pose(&self, index: DeviceIndex) -> Option<Pose> {
        self.frame.poses().device_pose(index)
    }

    /// The fixed per-eye geometry.
    pub fn eyes(&self) -> &EyeDescriptors {
        &self.eyes
    }

    /// The size of each eye target.
    pub fn target_size(&self) -> Extent2D {
        self.targets
            .as_ref()
            .map(RenderTargetPair::size)
            .unwrap_or_default()
    }

    /// Frame counters.
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Where the current frame is.
    pub fn frame_state(&self) -> FrameState {
        self.frame.state()
    }

    /// The configuration the session was started with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The rendering engine.
    pub fn engine(&self) -> &R {
        &self.engine
    }

    /// The rendering engine, mutably. Use it outside eye brackets, e.g. for mirror windows.
    pub fn engine_mut(&mut self) -> &mut R {
        &mut self.engine
    }
}

impl<R: RenderEngine> Drop for StereoSession<R> {
    fn drop(&mut self) {
        self.release();
    }
}

/// An open eye bracket. See [`StereoSession::begin_eye`].
#[must_use = "dropping the scope abandons the eye without rendering it"]
pub struct EyeScope<'a, R: RenderEngine> {
    session: &'a mut StereoSession<R>,
    eye: Eye,
    ended: bool,
}

impl<R: RenderEngine> EyeScope<'_, R> {
    /// The eye being rendered.
    pub fn eye(&self) -> Eye {
        self.eye
    }

    /// The engine to draw the eye with.
    pub fn engine(&mut self) -> &mut R {
        &mut self.session.engine
    }

    /// The view matrix loaded for this eye.
    pub fn view(&self) -> Mat4 {
        self.session
            .eyes
            .get(self.eye)
            .view(&self.session.frame.poses().head_inverse())
    }

    /// Closes the bracket and marks the eye as rendered.
    pub fn end(mut self) -> Result<(), FrameError> {
        self.ended = true;
        self.session
            .frame
            .end_eye(&mut self.session.engine)
            .map(|_| ())
    }
}

impl<R: RenderEngine> Drop for EyeScope<'_, R> {
    fn drop(&mut self) {
        if !self.ended {
            let _ = self.session.frame.abort_eye(&mut self.session.engine);
        }
    }
}
