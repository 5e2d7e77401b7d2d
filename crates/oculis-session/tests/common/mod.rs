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

//! Recording test doubles shared by the session integration tests.

#![allow(dead_code)]

use oculis_core::math::{Extent2D, Mat4, Vec3};
use oculis_core::renderer::{
    AllocationError, MatrixMode, MatrixStack, MatrixStackError, OffscreenTarget, RenderEngine,
    RenderTargetId,
};
use oculis_core::xr::{
    convert, Compositor, CompositorError, Eye, EyeTexture, InitError, PerEye, PoseSampleError,
    RuntimeMatrix34, RuntimeMatrix44, TrackedDevicePose, TrackingRuntime,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

pub const IPD: f32 = 0.064;

/// What the runtime returns for the head on the next sample.
#[derive(Debug, Clone, Copy)]
pub enum HeadSample {
    Valid(Mat4),
    Invalid,
    Fail,
}

pub struct RuntimeState {
    pub installed: bool,
    pub device: bool,
    pub compositor_available: bool,
    pub size: Extent2D,
    pub ipd: f32,
    pub geometry_queries: u32,
    pub script: VecDeque<HeadSample>,
    pub samples: u32,
    pub shutdowns: u32,
}

#[derive(Default)]
pub struct CompositorState {
    pub submissions: Vec<(Eye, EyeTexture)>,
    pub reject: PerEye<Option<CompositorError>>,
}

/// Shared handles onto the runtime and compositor a session owns.
#[derive(Clone)]
pub struct Harness {
    pub runtime: Rc<RefCell<RuntimeState>>,
    pub compositor: Rc<RefCell<CompositorState>>,
}

impl Harness {
    pub fn new(size: Extent2D) -> Self {
        Self {
            runtime: Rc::new(RefCell::new(RuntimeState {
                installed: true,
                device: true,
                compositor_available: true,
                size,
                ipd: IPD,
                geometry_queries: 0,
                script: VecDeque::new(),
                samples: 0,
                shutdowns: 0,
            })),
            compositor: Rc::new(RefCell::new(CompositorState::default())),
        }
    }

    pub fn runtime(&self) -> Box<dyn TrackingRuntime> {
        Box::new(ScriptedRuntime {
            harness: self.clone(),
        })
    }

    pub fn script(&self, samples: impl IntoIterator<Item = HeadSample>) {
        self.runtime.borrow_mut().script.extend(samples);
    }

    pub fn submissions(&self) -> Vec<(Eye, EyeTexture)> {
        self.compositor.borrow().submissions.clone()
    }
}

/// A head pose at standing height, yawed by `yaw` radians.
pub fn head_pose(yaw: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.1 * yaw, 1.7, 0.2)) * Mat4::from_rotation_y(yaw)
}

pub fn eye_offset(eye: Eye) -> Mat4 {
    eye_offset_for(eye, IPD)
}

fn eye_offset_for(eye: Eye, ipd: f32) -> Mat4 {
    let x = match eye {
        Eye::Left => -ipd / 2.0,
        Eye::Right => ipd / 2.0,
    };
    Mat4::from_translation(Vec3::new(x, 0.0, 0.0))
}

pub fn projection_rows(near: f32, far: f32) -> [[f32; 4]; 4] {
    [
        [1.2, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, -(far + near) / (far - near), -2.0 * far * near / (far - near)],
        [0.0, 0.0, -1.0, 0.0],
    ]
}

pub struct ScriptedRuntime {
    harness: Harness,
}

impl TrackingRuntime for ScriptedRuntime {
    fn is_runtime_installed(&self) -> bool {
        self.harness.runtime.borrow().installed
    }

    fn is_device_available(&self) -> bool {
        self.harness.runtime.borrow().device
    }

    fn tracking_system_name(&self) -> Option<String> {
        Some("scripted".to_owned())
    }

    fn recommended_target_size(&self) -> Extent2D {
        self.harness.runtime.borrow().size
    }

    fn projection_matrix(&self, _eye: Eye, near: f32, far: f32) -> RuntimeMatrix44 {
        self.harness.runtime.borrow_mut().geometry_queries += 1;
        RuntimeMatrix44 {
            m: projection_rows(near, far),
        }
    }

    fn eye_to_head_transform(&self, eye: Eye) -> RuntimeMatrix34 {
        let mut state = self.harness.runtime.borrow_mut();
        state.geometry_queries += 1;
        convert::mat4_to_affine(&eye_offset_for(eye, state.ipd))
    }

    fn wait_and_sample_poses(
        &mut self,
        poses: &mut [TrackedDevicePose],
    ) -> Result<(), PoseSampleError> {
        let mut state = self.harness.runtime.borrow_mut();
        state.samples += 1;
        match state.script.pop_front().unwrap_or(HeadSample::Invalid) {
            HeadSample::Fail => Err(PoseSampleError::RuntimeUnavailable),
            HeadSample::Invalid => Ok(()),
            HeadSample::Valid(head) => {
                poses[0].device_to_absolute_tracking = convert::mat4_to_affine(&head);
                poses[0].pose_is_valid = true;
                poses[0].device_is_connected = true;
                Ok(())
            }
        }
    }

    fn acquire_compositor(&mut self) -> Result<Box<dyn Compositor>, InitError> {
        if !self.harness.runtime.borrow().compositor_available {
            return Err(InitError::InterfaceUnavailable {
                interface: "compositor".to_owned(),
                reason: "scripted failure".to_owned(),
            });
        }
        Ok(Box::new(RecordingCompositor {
            state: self.harness.compositor.clone(),
        }))
    }

    fn shutdown(&mut self) {
        self.harness.runtime.borrow_mut().shutdowns += 1;
    }
}

pub struct RecordingCompositor {
    state: Rc<RefCell<CompositorState>>,
}

impl Compositor for RecordingCompositor {
    fn submit_eye_texture(&mut self, eye: Eye, texture: &EyeTexture) -> Result<(), CompositorError> {
        let mut state = self.state.borrow_mut();
        state.submissions.push((eye, *texture));
        match *state.reject.get(eye) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineCall {
    Create(Extent2D),
    Destroy(RenderTargetId),
    SetTarget(Option<RenderTargetId>),
    Mode(MatrixMode),
    Push,
    Pop,
    LoadIdentity,
    Load(Mat4),
    Flush,
    DepthTest(bool),
}

/// A rendering engine that records every call and keeps a real matrix stack.
#[derive(Default)]
pub struct RecordingEngine {
    pub calls: Vec<EngineCall>,
    pub stack: MatrixStack,
    pub active: Option<RenderTargetId>,
    pub depth_test: bool,
    pub live: Vec<RenderTargetId>,
    pub destroyed: Rc<RefCell<Vec<RenderTargetId>>>,
    pub fail_allocation: Option<usize>,
    pub allocations: usize,
}

impl RecordingEngine {
    pub fn creations(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, EngineCall::Create(_)))
            .count()
    }

    pub fn calls_since(&self, mark: usize) -> &[EngineCall] {
        &self.calls[mark..]
    }
}

impl RenderEngine for RecordingEngine {
    fn create_offscreen_target(
        &mut self,
        size: Extent2D,
    ) -> Result<OffscreenTarget, AllocationError> {
        self.calls.push(EngineCall::Create(size));
        let index = self.allocations;
        self.allocations += 1;
        if self.fail_allocation == Some(index) {
            return Err(AllocationError::OutOfMemory);
        }
        let id = RenderTargetId(index as u64 + 1);
        self.live.push(id);
        Ok(OffscreenTarget {
            id,
            color_texture: 0x1000 + index as u64,
            size,
        })
    }

    fn destroy_offscreen_target(&mut self, target: OffscreenTarget) {
        self.calls.push(EngineCall::Destroy(target.id));
        self.live.retain(|id| *id != target.id);
        self.destroyed.borrow_mut().push(target.id);
    }

    fn set_active_render_target(&mut self, target: Option<RenderTargetId>) {
        self.calls.push(EngineCall::SetTarget(target));
        self.active = target;
    }

    fn matrix_mode(&mut self, mode: MatrixMode) {
        self.calls.push(EngineCall::Mode(mode));
        self.stack.set_mode(mode);
    }

    fn push_matrix(&mut self) -> Result<(), MatrixStackError> {
        self.calls.push(EngineCall::Push);
        self.stack.push()
    }

    fn pop_matrix(&mut self) -> Result<(), MatrixStackError> {
        self.calls.push(EngineCall::Pop);
        self.stack.pop()
    }

    fn load_identity(&mut self) {
        self.calls.push(EngineCall::LoadIdentity);
        self.stack.load_identity();
    }

    fn load_matrix(&mut self, matrix: &Mat4) {
        self.calls.push(EngineCall::Load(*matrix));
        self.stack.load(matrix);
    }

    fn flush(&mut self) {
        self.calls.push(EngineCall::Flush);
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.calls.push(EngineCall::DepthTest(enabled));
        self.depth_test = enabled;
    }
}

pub fn assert_mat4_near(actual: Mat4, expected: Mat4) {
    for (a, e) in actual.to_cols_array().iter().zip(expected.to_cols_array().iter()) {
        approx::assert_abs_diff_eq!(*a, *e, epsilon = 1e-5);
    }
}
