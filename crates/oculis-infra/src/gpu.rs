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

//! A rendering engine whose eye targets are `wgpu` textures.

use anyhow::{anyhow, Result};
use oculis_core::math::{Extent2D, Mat4};
use oculis_core::renderer::{
    AllocationError, MatrixMode, MatrixStack, MatrixStackError, OffscreenTarget, RenderEngine,
    RenderTargetId,
};
use std::collections::HashMap;

/// The color format of eye targets. sRGB so the compositor can treat it as gamma.
pub const EYE_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
/// The depth format of eye targets.
pub const EYE_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

/// One eye target: a color texture and its depth buffer.
#[derive(Debug)]
pub struct WgpuEyeTarget {
    /// The color attachment, in [`EYE_COLOR_FORMAT`].
    pub color: wgpu::Texture,
    /// A view of the whole color texture.
    pub color_view: wgpu::TextureView,
    /// The depth attachment, in [`EYE_DEPTH_FORMAT`].
    pub depth: wgpu::Texture,
    /// A view of the whole depth texture.
    pub depth_view: wgpu::TextureView,
    /// The size of both attachments in pixels.
    pub size: Extent2D,
}

/// A [`RenderEngine`] allocating its targets on a `wgpu` device.
///
/// `wgpu` does not expose native texture handles, so the
/// [`OffscreenTarget::color_texture`] this engine hands out is not a backend handle.
/// It is the numeric value of the target's [`RenderTargetId`], never zero. A
/// compositor bridge resolves it with
/// `engine.target(RenderTargetId(color_texture))` to reach the actual texture.
#[derive(Debug)]
pub struct WgpuRenderEngine {
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter_name: String,
    targets: HashMap<RenderTargetId, WgpuEyeTarget>,
    next_id: u64,
    active: Option<RenderTargetId>,
    matrices: MatrixStack,
    depth_test: bool,
    clear_color: wgpu::Color,
    pending: Vec<wgpu::CommandBuffer>,
}

impl WgpuRenderEngine {
    /// Creates an engine on the default adapter without any window.
    pub fn new_headless() -> Result<Self> {
        log::info!("Initializing headless WGPU device for eye targets...");
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::new_without_display_handle());
        let adapter =
            pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))
                .map_err(|e| anyhow!("No suitable graphics adapter: {}", e))?;
        let info = adapter.get_info();
        log::info!(
            "Using graphics adapter: \"{}\" (Backend: {:?})",
            info.name,
            info.backend
        );

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Oculis Eye Device"),
            required_limits: adapter.limits(),
            ..Default::default()
        }))
        .map_err(|e| anyhow!("Failed to create logical device: {}", e))?;

        device.on_uncaptured_error(std::sync::Arc::new(|e| {
            log::error!("WGPU Uncaptured Error: {e:?}");
        }));

        Ok(Self::from_device(device, queue, info.name))
    }

    /// Wraps an existing device, e.g. one shared with a desktop mirror window.
    pub fn from_device(device: wgpu::Device, queue: wgpu::Queue, adapter_name: String) -> Self {
        Self {
            device,
            queue,
            adapter_name,
            targets: HashMap::new(),
            next_id: 0,
            active: None,
            matrices: MatrixStack::new(),
            depth_test: false,
            clear_color: wgpu::Color::BLACK,
            pending: Vec::new(),
        }
    }

    /// The name of the adapter the device was created on.
    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    /// The device eye targets are allocated on.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// The queue flushed command buffers are submitted to.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// The target behind `id`, if it is still alive.
    pub fn target(&self, id: RenderTargetId) -> Option<&WgpuEyeTarget> {
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

    /// The color the bound target is cleared to by [`WgpuRenderEngine::clear`].
    pub fn set_clear_color(&mut self, color: wgpu::Color) {
        self.clear_color = color;
    }

    /// Records a pass clearing the bound target's color and depth.
    ///
    /// The pass is queued and reaches the GPU on the next [`RenderEngine::flush`].
    pub fn clear(&mut self) {
        let Some(target) = self.active.and_then(|id| self.targets.get(&id)) else {
            log::warn!("clear called with no render target bound");
            return;
        };
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Oculis Eye Clear Encoder"),
            });
        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Oculis Eye Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &target.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }
        self.pending.push(encoder.finish());
    }

    /// Queued command buffers not yet submitted.
    pub fn pending_commands(&self) -> usize {
        self.pending.len()
    }

    fn create_texture(&self, size: Extent2D, format: wgpu::TextureFormat, label: &str) -> wgpu::Texture {
        self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        })
    }
}

impl RenderEngine for WgpuRenderEngine {
    fn create_offscreen_target(
        &mut self,
        size: Extent2D,
    ) -> Result<OffscreenTarget, AllocationError> {
        let max_dimension = self.device.limits().max_texture_dimension_2d;
        if size.is_empty() || size.width > max_dimension || size.height > max_dimension {
            return Err(AllocationError::InvalidSize {
                size,
                max_dimension,
            });
        }

        self.next_id += 1;
        let id = RenderTargetId(self.next_id);
        let color = self.create_texture(size, EYE_COLOR_FORMAT, "Oculis Eye Color");
        let depth = self.create_texture(size, EYE_DEPTH_FORMAT, "Oculis Eye Depth");
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());
        log::debug!(
            "Created WGPU eye target {id:?} ({}x{}, {:?} + {:?})",
            size.width,
            size.height,
            EYE_COLOR_FORMAT,
            EYE_DEPTH_FORMAT
        );

        self.targets.insert(
            id,
            WgpuEyeTarget {
                color,
                color_view,
                depth,
                depth_view,
                size,
            },
        );
        // Stands in for the native handle; see the type-level docs.
        Ok(OffscreenTarget {
            id,
            color_texture: id.0,
            size,
        })
    }

    fn destroy_offscreen_target(&mut self, target: OffscreenTarget) {
        match self.targets.remove(&target.id) {
            Some(eye_target) => {
                eye_target.color.destroy();
                eye_target.depth.destroy();
            }
            None => log::warn!("Tried to destroy unknown WGPU eye target {:?}", target.id),
        }
        if self.active == Some(target.id) {
            self.active = None;
        }
    }

    fn set_active_render_target(&mut self, target: Option<RenderTargetId>) {
        if let Some(id) = target {
            if !self.targets.contains_key(&id) {
                log::error!("Cannot bind unknown WGPU eye target {id:?}");
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
        if !self.pending.is_empty() {
            self.queue.submit(self.pending.drain(..));
        }
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
    }
}
