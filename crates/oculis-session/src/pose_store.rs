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

//! Latest sampled poses and the cached head transform.

use oculis_core::math::Mat4;
use oculis_core::xr::{
    DeviceIndex, Pose, PoseSampleError, TrackedDevicePose, TrackingRuntime,
    MAX_TRACKED_DEVICE_COUNT,
};

/// The head pose together with its inverse.
///
/// Both matrices always come from the same sample: they are only ever replaced
/// together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadTransform {
    /// Head-to-tracking-space transform.
    pub transform: Mat4,
    /// Tracking-to-head-space transform.
    pub inverse: Mat4,
}

impl Default for HeadTransform {
    fn default() -> Self {
        Self {
            transform: Mat4::IDENTITY,
            inverse: Mat4::IDENTITY,
        }
    }
}

/// Holds the poses of the last successful sample for every tracked device slot.
#[derive(Debug)]
pub struct PoseStore {
    head_index: DeviceIndex,
    poses: Vec<TrackedDevicePose>,
    // Written by the runtime; committed to `poses` only when the sample succeeds.
    scratch: Vec<TrackedDevicePose>,
    head: HeadTransform,
    has_head_pose: bool,
    samples: u64,
}

impl PoseStore {
    /// Creates an empty store whose camera follows the device at `head_index`.
    pub fn new(head_index: DeviceIndex) -> Self {
        Self {
            head_index,
            poses: Vec::new(),
            scratch: vec![TrackedDevicePose::default(); MAX_TRACKED_DEVICE_COUNT],
            head: HeadTransform::default(),
            has_head_pose: false,
            samples: 0,
        }
    }

    /// Blocks on the runtime for a fresh set of poses.
    ///
    /// The head transform is replaced only when the head pose of this sample is
    /// valid; otherwise the previous one stays in place so that a transient tracking
    /// loss freezes the view instead of snapping it to the origin. On error nothing
    /// in the store changes.
    pub fn sample(&mut self, runtime: &mut dyn TrackingRuntime) -> Result<(), PoseSampleError> {
        self.scratch.fill(TrackedDevicePose::default());
        runtime.wait_and_sample_poses(&mut self.scratch)?;
        std::mem::swap(&mut self.poses, &mut self.scratch);
        if self.scratch.len() != MAX_TRACKED_DEVICE_COUNT {
            self.scratch = vec![TrackedDevicePose::default(); MAX_TRACKED_DEVICE_COUNT];
        }
        self.samples += 1;

        let Some(head) = self.device_pose(self.head_index) else {
            log::warn!("Head device index {} is out of range", self.head_index);
            return Ok(());
        };
        if !head.valid {
            log::trace!("Head pose invalid in sample {}, keeping last pose", self.samples);
            return Ok(());
        }
        match head.transform.inverse() {
            Some(inverse) => {
                self.head = HeadTransform {
                    transform: head.transform,
                    inverse,
                };
                self.has_head_pose = true;
            }
            None => log::warn!(
                "Head pose in sample {} is not invertible, keeping last pose",
                self.samples
            ),
        }
        Ok(())
    }

    /// The last valid head transform, or the identity if none was ever sampled.
    pub fn head_transform(&self) -> Mat4 {
        self.head.transform
    }

    /// The inverse of [`PoseStore::head_transform`].
    pub fn head_inverse(&self) -> Mat4 {
        self.head.inverse
    }

    /// The head transform and its inverse.
    pub fn head(&self) -> HeadTransform {
        self.head
    }

    /// Whether at least one valid head pose was sampled.
    pub fn has_head_pose(&self) -> bool {
        self.has_head_pose
    }

    /// The pose slot of the head device.
    pub fn head_index(&self) -> DeviceIndex {
        self.head_index
    }

    /// The number of successful samples so far.
    pub fn sample_count(&self) -> u64 {
        self.samples
    }

    /// The raw pose of any device slot from the last successful sample.
    ///
    /// Returns `None` for out-of-range indices and before the first sample.
    pub fn device_pose(&self, index: DeviceIndex) -> Option<Pose> {
        self.poses.get(index as usize).map(Pose::from_tracked)
    }
}
