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

// Oculis Sandbox
// Runs a stereo session against the simulated headset and reports frame statistics.
//
// Usage: sandbox [CONFIG] [--frames N] [--gpu]

use anyhow::{bail, Context, Result};
use oculis_core::math::{Vec3, TAU};
use oculis_core::renderer::RenderEngine;
use oculis_core::xr::Eye;
use oculis_core::SessionConfig;
use oculis_infra::simulated::{SimulatedRuntime, SimulatedRuntimeConfig};
use oculis_infra::{SoftwareRenderEngine, WgpuRenderEngine};
use oculis_session::{FrameError, StereoSession};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = "Oculis.toml";
const DEFAULT_FRAMES: u64 = 270;

struct Args {
    config: PathBuf,
    frames: u64,
    gpu: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config: PathBuf::from(DEFAULT_CONFIG),
        frames: DEFAULT_FRAMES,
        gpu: false,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--gpu" => args.gpu = true,
            "--frames" => {
                let value = it.next().context("--frames needs a value")?;
                args.frames = value
                    .parse()
                    .with_context(|| format!("Invalid frame count '{value}'"))?;
            }
            flag if flag.starts_with("--") => bail!("Unknown option '{flag}'"),
            path => args.config = PathBuf::from(path),
        }
    }
    Ok(args)
}

fn load_config(path: &Path) -> Result<SessionConfig> {
    if !path.exists() {
        log::info!("{} not found, using the default session configuration", path.display());
        return Ok(SessionConfig::default());
    }
    let config = SessionConfig::load(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    log::info!("Loaded session configuration from {}", path.display());
    Ok(config)
}

/// A ring of markers around the origin at eye height.
fn scene() -> Vec<Vec3> {
    (0..64)
        .map(|i| {
            let angle = i as f32 / 64.0 * TAU;
            Vec3::new(2.0 * angle.cos(), 1.7, 2.0 * angle.sin())
        })
        .collect()
}

/// Runs `frames` frames, calling `draw` inside every eye bracket.
fn run<R: RenderEngine>(
    session: &mut StereoSession<R>,
    frames: u64,
    mut draw: impl FnMut(&mut R),
) -> Result<()> {
    for _ in 0..frames {
        match session.begin_frame() {
            Ok(()) => {}
            Err(FrameError::PoseSample(err)) => {
                log::debug!("Skipping frame: {err}");
                continue;
            }
            Err(err) => return Err(err.into()),
        }
        for eye in Eye::BOTH {
            session.render_eye(eye, &mut draw)?;
        }
        match session.end_frame() {
            Ok(()) => {}
            Err(FrameError::SubmissionFailed(failures)) => {
                log::warn!("Frame partially rejected: {failures}");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn report<R: RenderEngine>(session: &StereoSession<R>) {
    let stats = session.stats();
    log::info!(
        "{} frames begun, {} presented, {} dropped, {} eye submissions rejected",
        stats.frames_begun,
        stats.frames_presented(),
        stats.frames_dropped,
        stats.submission_failures
    );
    if let Some(duration) = stats.last_frame_duration {
        log::info!("Last frame took {duration:?}");
    }
}

fn main() -> Result<()> {
    oculis_infra::logging::init()?;
    let args = parse_args()?;
    let config = load_config(&args.config)?;

    let runtime = SimulatedRuntime::new(SimulatedRuntimeConfig {
        head_dropout_every: Some(45),
        sample_failure_every: Some(120),
        compositor_fault: Some((300, 101)),
        ..Default::default()
    });
    let submissions = runtime.submission_log();

    if args.gpu {
        let engine = WgpuRenderEngine::new_headless()?;
        let mut session = StereoSession::init(config, Box::new(runtime), engine)?;
        run(&mut session, args.frames, |engine| engine.clear())?;
        report(&session);
        session.shutdown();
    } else {
        let markers = scene();
        let mut session = StereoSession::init(config, Box::new(runtime), SoftwareRenderEngine::new())?;
        let mut covered = 0;
        run(&mut session, args.frames, |engine| {
            engine.clear([16, 16, 24, 255]);
            covered += engine.draw_points(&markers, [255, 200, 64, 255]);
        })?;
        log::info!("{covered} marker samples landed in the eye targets");
        report(&session);
        session.shutdown();
    }

    let submissions = submissions.borrow();
    log::info!(
        "Compositor accepted {} left and {} right eye images",
        submissions.accepted.left,
        submissions.accepted.right
    );
    Ok(())
}
