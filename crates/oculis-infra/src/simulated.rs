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

//! A deterministic tracking runtime and compositor for headless runs.
//!
//! The simulated headset sits at standing height and slowly looks left and right.
//! Tracking loss, runtime hiccups and compositor errors can be injected at fixed
//! intervals.

use oculis_core::math::{Extent2D, Mat4, Vec3, TAU};
use oculis_core::xr::{
    convert, Compositor, CompositorError, Eye, EyeTexture, InitError, PerEye, PoseSampleError,
    RuntimeMatrix34, RuntimeMatrix44, TrackedDevicePose, TrackingResult, TrackingRuntime,
    HMD_DEVICE_INDEX,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Half-angles of one eye's field of view, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldOfView {
    pub left: f32,
    pub right: f32,
    pub up: f32,
    pub down: f32,
}

impl FieldOfView {
    /// The same field of view with left and right swapped.
    pub fn mirrored(self) -> Self {
        Self {
            left: self.right,
            right: self.left,
            ..self
        }
    }
}

/// How the simulated headset behaves.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedRuntimeConfig {
    pub installed: bool,
    pub device_present: bool,
    pub resolution: Extent2D,
    pub ipd: f32,
    /// Field of view of the left eye; the right eye is its mirror image.
    pub fov: FieldOfView,
    pub head_height: f32,
    /// Peak yaw of the head sway, in degrees.
    pub sway_degrees: f32,
    pub sway_frequency_hz: f32,
    pub refresh_rate_hz: f32,
    /// Every n-th sample reports the head as not tracked.
    pub head_dropout_every: Option<u64>,
    /// Every n-th sample fails outright.
    pub sample_failure_every: Option<u64>,
    /// `(n, code)`: on every n-th frame the compositor answers both eyes with the raw
    /// result `code`, e.g. `101` when another application holds the focus.
    pub compositor_fault: Option<(u64, i32)>,
}

impl Default for SimulatedRuntimeConfig {
    fn default() -> Self {
        Self {
            installed: true,
            device_present: true,
            resolution: Extent2D::new(1080, 1200),
            ipd: 0.064,
            fov: FieldOfView {
                left: 50.0,
                right: 45.0,
                up: 50.0,
                down: 50.0,
            },
            head_height: 1.7,
            sway_degrees: 15.0,
            sway_frequency_hz: 0.25,
            refresh_rate_hz: 90.0,
            head_dropout_every: None,
            sample_failure_every: None,
            compositor_fault: None,
        }
    }
}

/// What the simulated compositor has seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionLog {
    /// Accepted submissions per eye.
    pub accepted: PerEye<u64>,
    /// Rejected submissions.
    pub rejected: u64,
    /// The last accepted texture per eye.
    pub last: PerEye<Option<EyeTexture>>,
    frame: u64,
    submitted_this_frame: PerEye<bool>,
}

/// A [`TrackingRuntime`] with a scripted head.
#[derive(Debug)]
pub struct SimulatedRuntime {
    config: SimulatedRuntimeConfig,
    samples: u64,
    log: Rc<RefCell<SubmissionLog>>,
}

impl SimulatedRuntime {
    pub fn new(config: SimulatedRuntimeConfig) -> Self {
        Self {
            config,
            samples: 0,
            log: Rc::new(RefCell::new(SubmissionLog::default())),
        }
    }

    /// A shared view of everything the compositor received.
    pub fn submission_log(&self) -> Rc<RefCell<SubmissionLog>> {
        self.log.clone()
    }

    /// The head transform at sample `n`.
    pub fn head_at(&self, n: u64) -> Mat4 {
        let t = n as f32 / self.config.refresh_rate_hz;
        let phase = (TAU * self.config.sway_frequency_hz * t).sin();
        let yaw = self.config.sway_degrees.to_radians() * phase;
        let nod = 0.1 * yaw;
        Mat4::from_translation(Vec3::new(0.02 * phase, self.config.head_height, 0.0))
            * Mat4::from_rotation_y(yaw)
            * Mat4::from_rotation_x(nod)
    }

    fn every(n: u64, interval: Option<u64>) -> bool {
        matches!(interval, Some(k) if k > 0 && n % k == 0)
    }
}

impl Default for SimulatedRuntime {
    fn default() -> Self {
        Self::new(SimulatedRuntimeConfig::default())
    }
}

/// Builds a row-major off-axis projection from the frustum edges at the near plane.
fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> RuntimeMatrix44 {
    let r_width = 1.0 / (right - left);
    let r_height = 1.0 / (top - bottom);
    let r_depth = 1.0 / (near - far);
    RuntimeMatrix44 {
        m: [
            [2.0 * near * r_width, 0.0, (right + left) * r_width, 0.0],
            [0.0, 2.0 * near * r_height, (top + bottom) * r_height, 0.0],
            [0.0, 0.0, (far + near) * r_depth, 2.0 * far * near * r_depth],
            [0.0, 0.0, -1.0, 0.0],
        ],
    }
}

impl TrackingRuntime for SimulatedRuntime {
    fn is_runtime_installed(&self) -> bool {
        self.config.installed
    }

    fn is_device_available(&self) -> bool {
        self.config.installed && self.config.device_present
    }

    fn tracking_system_name(&self) -> Option<String> {
        Some("simulated".to_owned())
    }

    fn recommended_target_size(&self) -> Extent2D {
        self.config.resolution
    }

    fn projection_matrix(&self, eye: Eye, near: f32, far: f32) -> RuntimeMatrix44 {
        let fov = match eye {
            Eye::Left => self.config.fov,
            Eye::Right => self.config.fov.mirrored(),
        };
        frustum(
            -fov.left.to_radians().tan() * near,
            fov.right.to_radians().tan() * near,
            -fov.down.to_radians().tan() * near,
            fov.up.to_radians().tan() * near,
            near,
            far,
        )
    }

    fn eye_to_head_transform(&self, eye: Eye) -> RuntimeMatrix34 {
        let half = self.config.ipd / 2.0;
        let x = match eye {
            Eye::Left => -half,
            Eye::Right => half,
        };
        convert::mat4_to_affine(&Mat4::from_translation(Vec3::new(x, 0.0, 0.0)))
    }

    fn wait_and_sample_poses(
        &mut self,
        poses: &mut [TrackedDevicePose],
    ) -> Result<(), PoseSampleError> {
        self.samples += 1;
        let n = self.samples;
        {
            let mut log = self.log.borrow_mut();
            log.frame = n;
            log.submitted_this_frame = PerEye::default();
        }

        if Self::every(n, self.config.sample_failure_every) {
            return Err(PoseSampleError::Communication(format!(
                "simulated hiccup at sample {n}"
            )));
        }

        let Some(head) = poses.get_mut(HMD_DEVICE_INDEX as usize) else {
            return Ok(());
        };
        head.device_is_connected = true;
        if Self::every(n, self.config.head_dropout_every) {
            head.pose_is_valid = false;
            head.tracking_result = TrackingResult::RunningOutOfRange;
            return Ok(());
        }

        let current = self.head_at(n);
        let previous = self.head_at(n - 1);
        let dt = 1.0 / self.config.refresh_rate_hz;
        let v = (current.translation() - previous.translation()) * (1.0 / dt);

        head.device_to_absolute_tracking = convert::mat4_to_affine(&current);
        head.velocity = [v.x, v.y, v.z];
        head.pose_is_valid = true;
        head.tracking_result = TrackingResult::RunningOk;
        Ok(())
    }

    fn acquire_compositor(&mut self) -> Result<Box<dyn Compositor>, InitError> {
        if !self.is_device_available() {
            return Err(InitError::DeviceUnavailable);
        }
        Ok(Box::new(SimulatedCompositor {
            log: self.log.clone(),
            fault: self.config.compositor_fault,
        }))
    }

    fn shutdown(&mut self) {
        log::debug!("Simulated runtime stopped after {} samples", self.samples);
    }
}

const SUBMIT_OK: i32 = 0;
const SUBMIT_INVALID_TEXTURE: i32 = 102;
const SUBMIT_ALREADY_SUBMITTED: i32 = 108;

/// Accepts eye textures the way a real compositor would and records them.
///
/// Submissions are answered with raw runtime result codes, decoded through
/// [`CompositorError::from_code`].
#[derive(Debug)]
pub struct SimulatedCompositor {
    log: Rc<RefCell<SubmissionLog>>,
    fault: Option<(u64, i32)>,
}

impl SimulatedCompositor {
    fn result_code(&self, log: &SubmissionLog, eye: Eye, texture: &EyeTexture) -> i32 {
        if texture.handle == 0 {
            return SUBMIT_INVALID_TEXTURE;
        }
        if *log.submitted_this_frame.get(eye) {
            return SUBMIT_ALREADY_SUBMITTED;
        }
        match self.fault {
            Some((every, code)) if SimulatedRuntime::every(log.frame, Some(every)) => code,
            _ => SUBMIT_OK,
        }
    }
}

impl Compositor for SimulatedCompositor {
    fn submit_eye_texture(&mut self, eye: Eye, texture: &EyeTexture) -> Result<(), CompositorError> {
        let mut log = self.log.borrow_mut();
        let code = self.result_code(&log, eye, texture);

        match CompositorError::from_code(code) {
            None => {
                *log.accepted.get_mut(eye) += 1;
                *log.last.get_mut(eye) = Some(*texture);
                *log.submitted_this_frame.get_mut(eye) = true;
                Ok(())
            }
            Some(err) => {
                log.rejected += 1;
                Err(err)
            }
        }
    }
}
