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

//! Full sessions against the simulated runtime and the software engine.

use oculis_core::config::SessionConfig;
use oculis_core::math::{Extent2D, Vec3};
use oculis_core::renderer::{
    MatrixMode, MatrixStackError, RenderEngine, RenderTargetId, MAX_MATRIX_STACK_DEPTH,
};
use oculis_core::xr::{CompositorError, Eye};
use oculis_infra::simulated::{SimulatedRuntime, SimulatedRuntimeConfig};
use oculis_infra::SoftwareRenderEngine;
use oculis_session::{FrameError, StereoSession};

const BACKGROUND: [u8; 4] = [10, 10, 10, 255];
const MARKER: [u8; 4] = [255, 64, 0, 255];

fn start(config: SimulatedRuntimeConfig) -> StereoSession<SoftwareRenderEngine> {
    StereoSession::init(
        SessionConfig::default(),
        Box::new(SimulatedRuntime::new(config)),
        SoftwareRenderEngine::new(),
    )
    .unwrap()
}

#[test]
fn marker_in_front_of_the_head_shows_parallax() {
    let config = SimulatedRuntimeConfig {
        resolution: Extent2D::new(200, 200),
        ..Default::default()
    };
    let mut session = start(config);

    session.begin_frame().unwrap();
    let marker = session.head_transform().transform_point3(Vec3::new(0.0, 0.0, -1.0));
    for eye in Eye::BOTH {
        session
            .render_eye(eye, |engine| {
                engine.clear(BACKGROUND);
                assert_eq!(engine.draw_points(&[marker], MARKER), 1);
            })
            .unwrap();
    }
    session.end_frame().unwrap();

    let engine = session.engine();
    let (left_x, left_y) = engine.target(RenderTargetId(1)).unwrap().find(MARKER).unwrap();
    let (right_x, right_y) = engine.target(RenderTargetId(2)).unwrap().find(MARKER).unwrap();
    assert!(left_x > right_x, "left {left_x} right {right_x}");
    assert!(left_y.abs_diff(right_y) <= 1);
    assert_eq!(engine.matrices().depth(MatrixMode::Projection), 0);
    assert!(!engine.depth_test_enabled());
}

#[test]
fn saved_projection_matrices_survive_a_full_stack() {
    let mut session = start(SimulatedRuntimeConfig {
        resolution: Extent2D::new(32, 32),
        ..Default::default()
    });
    {
        let engine = session.engine_mut();
        engine.matrix_mode(MatrixMode::Projection);
        for _ in 0..MAX_MATRIX_STACK_DEPTH {
            engine.push_matrix().unwrap();
        }
        engine.matrix_mode(MatrixMode::ModelView);
    }

    session.begin_frame().unwrap();
    let result = session.render_eye(Eye::Left, |_| {});
    assert_eq!(result, Err(FrameError::MatrixStack(MatrixStackError::Overflow)));
    let engine = session.engine();
    assert_eq!(engine.matrices().depth(MatrixMode::Projection), MAX_MATRIX_STACK_DEPTH);
    assert_eq!(engine.active_target(), None);
    assert!(!engine.depth_test_enabled());
}

#[test]
fn dropouts_and_hiccups_are_absorbed() {
    let runtime = SimulatedRuntime::new(SimulatedRuntimeConfig {
        resolution: Extent2D::new(32, 32),
        head_dropout_every: Some(7),
        sample_failure_every: Some(10),
        ..Default::default()
    });
    let log = runtime.submission_log();
    let mut session = StereoSession::init(
        SessionConfig::default(),
        Box::new(runtime),
        SoftwareRenderEngine::new(),
    )
    .unwrap();

    let mut dropped = 0;
    for _ in 0..50 {
        match session.begin_frame() {
            Ok(()) => {}
            Err(FrameError::PoseSample(_)) => {
                dropped += 1;
                continue;
            }
            Err(err) => panic!("unexpected error: {err}"),
        }
        session.render_eye(Eye::Left, |_| {}).unwrap();
        session.render_eye(Eye::Right, |_| {}).unwrap();
        session.end_frame().unwrap();
    }

    assert_eq!(dropped, 5);
    let stats = session.stats();
    assert_eq!(stats.frames_dropped, 5);
    assert_eq!(stats.frames_submitted, 45);
    assert_eq!(stats.frames_presented(), 45);

    let log = log.borrow();
    assert_eq!(log.accepted.left, 45);
    assert_eq!(log.accepted.right, 45);
    assert_eq!(log.rejected, 0);
}

#[test]
fn lost_focus_rejects_whole_frames() {
    let runtime = SimulatedRuntime::new(SimulatedRuntimeConfig {
        resolution: Extent2D::new(32, 32),
        compositor_fault: Some((4, 101)),
        ..Default::default()
    });
    let log = runtime.submission_log();
    let mut session = StereoSession::init(
        SessionConfig::default(),
        Box::new(runtime),
        SoftwareRenderEngine::new(),
    )
    .unwrap();

    for frame in 1..=12 {
        session.begin_frame().unwrap();
        session.render_eye(Eye::Left, |_| {}).unwrap();
        session.render_eye(Eye::Right, |_| {}).unwrap();
        match session.end_frame() {
            Ok(()) => assert_ne!(frame % 4, 0),
            Err(FrameError::SubmissionFailed(failures)) => {
                assert_eq!(frame % 4, 0);
                assert_eq!(failures.get(Eye::Left), Some(CompositorError::DoNotHaveFocus));
                assert_eq!(failures.get(Eye::Right), Some(CompositorError::DoNotHaveFocus));
            }
            Err(err) => panic!("unexpected error: {err}"),
        }
    }

    let stats = session.stats();
    assert_eq!(stats.frames_submitted, 12);
    assert_eq!(stats.frames_rejected, 3);
    assert_eq!(stats.submission_failures, 6);
    assert_eq!(stats.frames_presented(), 9);
    assert_eq!(log.borrow().rejected, 6);
}

#[test]
fn session_refuses_to_start_without_headset() {
    let runtime = SimulatedRuntime::new(SimulatedRuntimeConfig {
        device_present: false,
        ..Default::default()
    });
    assert!(StereoSession::init(
        SessionConfig::default(),
        Box::new(runtime),
        SoftwareRenderEngine::new()
    )
    .is_err());
}
