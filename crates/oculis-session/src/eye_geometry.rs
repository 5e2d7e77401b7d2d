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

//! Per-eye projection and head-to-eye offsets.
//!
//! Both are session-constant. They are queried from the runtime once, when the
//! session starts, with the clip planes from its configuration. Later changes on
//! the runtime side are not picked up until the next session.

use oculis_core::config::ClipPlanes;
use oculis_core::math::Mat4;
use oculis_core::xr::{convert, Eye, PerEye, TrackingRuntime};
use std::fmt;

/// Raised when the eye geometry cannot be queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EyeGeometryError {
    /// No head-mounted display is attached to the runtime.
    DeviceUnavailable,
    /// The runtime returned an eye-to-head transform that cannot be inverted.
    SingularEyeOffset(Eye),
}

impl fmt::Display for EyeGeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EyeGeometryError::DeviceUnavailable => {
                write!(f, "No head-mounted display is available")
            }
            EyeGeometryError::SingularEyeOffset(eye) => {
                write!(f, "The {eye} eye-to-head transform is not invertible")
            }
        }
    }
}

impl std::error::Error for EyeGeometryError {}

/// Returns the projection matrix of `eye` for the given clip planes.
pub fn compute_projection(
    runtime: &dyn TrackingRuntime,
    eye: Eye,
    clip: ClipPlanes,
) -> Result<Mat4, EyeGeometryError> {
    if !runtime.is_device_available() {
        return Err(EyeGeometryError::DeviceUnavailable);
    }
    Ok(convert::to_mat4(
        &runtime.projection_matrix(eye, clip.near, clip.far),
    ))
}

/// Returns the eye-to-head transform of `eye`.
pub fn compute_eye_offset(runtime: &dyn TrackingRuntime, eye: Eye) -> Result<Mat4, EyeGeometryError> {
    if !runtime.is_device_available() {
        return Err(EyeGeometryError::DeviceUnavailable);
    }
    Ok(convert::affine_to_mat4(&runtime.eye_to_head_transform(eye)))
}

/// The fixed geometry of one eye.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeDescriptor {
    /// Which eye this describes.
    pub eye: Eye,
    /// Eye-space to clip-space.
    pub projection: Mat4,
    /// Eye-space to head-space.
    pub eye_to_head: Mat4,
    /// Head-space to eye-space, the inverse of `eye_to_head`.
    pub head_to_eye: Mat4,
}

impl EyeDescriptor {
    /// Queries the geometry of `eye`.
    pub fn compute(
        runtime: &dyn TrackingRuntime,
        eye: Eye,
        clip: ClipPlanes,
    ) -> Result<Self, EyeGeometryError> {
        let projection = compute_projection(runtime, eye, clip)?;
        let eye_to_head = compute_eye_offset(runtime, eye)?;
        let head_to_eye = eye_to_head
            .inverse()
            .ok_or(EyeGeometryError::SingularEyeOffset(eye))?;
        Ok(Self {
            eye,
            projection,
            eye_to_head,
            head_to_eye,
        })
    }

    /// The view matrix for this eye given the inverse head transform.
    ///
    /// World-space points are first brought into head space, then into eye space.
    pub fn view(&self, head_inverse: &Mat4) -> Mat4 {
        self.head_to_eye * *head_inverse
    }
}

/// The geometry of both eyes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeDescriptors {
    eyes: PerEye<EyeDescriptor>,
}

impl EyeDescriptors {
    /// Queries the geometry of both eyes, left first.
    pub fn compute(runtime: &dyn TrackingRuntime, clip: ClipPlanes) -> Result<Self, EyeGeometryError> {
        let eyes = Self {
            eyes: PerEye::try_from_fn(|eye| EyeDescriptor::compute(runtime, eye, clip))?,
        };
        log::info!(
            "Eye geometry ready: IPD {:.1} mm, clip planes [{}, {}]",
            eyes.interpupillary_distance() * 1000.0,
            clip.near,
            clip.far
        );
        Ok(eyes)
    }

    /// The descriptor of `eye`.
    pub fn get(&self, eye: Eye) -> &EyeDescriptor {
        self.eyes.get(eye)
    }

    /// Iterates over both descriptors, left first.
    pub fn iter(&self) -> impl Iterator<Item = &EyeDescriptor> {
        self.eyes.iter().map(|(_, descriptor)| descriptor)
    }

    /// The distance between the two eye origins, in meters.
    pub fn interpupillary_distance(&self) -> f32 {
        self.eyes
            .left
            .eye_to_head
            .translation()
            .distance(self.eyes.right.eye_to_head.translation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use oculis_core::math::{Extent2D, Vec3};
    use oculis_core::xr::{
        Compositor, InitError, PoseSampleError, RuntimeMatrix34, RuntimeMatrix44, TrackedDevicePose,
    };

    struct FixedRuntime {
        device: bool,
        ipd: f32,
    }

    impl TrackingRuntime for FixedRuntime {
        fn is_runtime_installed(&self) -> bool {
            true
        }
        fn is_device_available(&self) -> bool {
            self.device
        }
        fn recommended_target_size(&self) -> Extent2D {
            Extent2D::new(8, 8)
        }
        fn projection_matrix(&self, eye: Eye, near: f32, far: f32) -> RuntimeMatrix44 {
            let skew = match eye {
                Eye::Left => -0.1,
                Eye::Right => 0.1,
            };
            let a = -(far + near) / (far - near);
            let b = -2.0 * far * near / (far - near);
            RuntimeMatrix44 {
                m: [
                    [1.0, 0.0, skew, 0.0],
                    [0.0, 1.0, 0.0, 0.0],
                    [0.0, 0.0, a, b],
                    [0.0, 0.0, -1.0, 0.0],
                ],
            }
        }
        fn eye_to_head_transform(&self, eye: Eye) -> RuntimeMatrix34 {
            let half = match eye {
                Eye::Left => -self.ipd / 2.0,
                Eye::Right => self.ipd / 2.0,
            };
            convert::mat4_to_affine(&Mat4::from_translation(Vec3::new(half, 0.0, 0.0)))
        }
        fn wait_and_sample_poses(
            &mut self,
            _poses: &mut [TrackedDevicePose],
        ) -> Result<(), PoseSampleError> {
            Ok(())
        }
        fn acquire_compositor(&mut self) -> Result<Box<dyn Compositor>, InitError> {
            Err(InitError::DeviceUnavailable)
        }
    }

    #[test]
    fn projection_keeps_runtime_layout() {
        let runtime = FixedRuntime { device: true, ipd: 0.064 };
        let clip = ClipPlanes { near: 0.1, far: 30.0 };
        let left = compute_projection(&runtime, Eye::Left, clip).unwrap();
        assert_eq!(left.element(0, 2), -0.1);
        assert_eq!(left.element(3, 2), -1.0);
        assert_relative_eq!(left.element(2, 3), -2.0 * 30.0 * 0.1 / 29.9, epsilon = 1e-6);
    }

    #[test]
    fn missing_device_is_reported() {
        let runtime = FixedRuntime { device: false, ipd: 0.064 };
        assert_eq!(
            compute_projection(&runtime, Eye::Right, ClipPlanes::default()),
            Err(EyeGeometryError::DeviceUnavailable)
        );
        assert_eq!(
            compute_eye_offset(&runtime, Eye::Left),
            Err(EyeGeometryError::DeviceUnavailable)
        );
    }

    #[test]
    fn descriptors_measure_ipd() {
        let runtime = FixedRuntime { device: true, ipd: 0.064 };
        let eyes = EyeDescriptors::compute(&runtime, ClipPlanes::default()).unwrap();
        assert_relative_eq!(eyes.interpupillary_distance(), 0.064, epsilon = 1e-6);
        let order: Vec<Eye> = eyes.iter().map(|d| d.eye).collect();
        assert_eq!(order, vec![Eye::Left, Eye::Right]);
        assert_eq!(eyes.get(Eye::Right).eye, Eye::Right);
    }

    #[test]
    fn view_moves_world_into_eye_space() {
        let runtime = FixedRuntime { device: true, ipd: 0.064 };
        let right = EyeDescriptor::compute(&runtime, Eye::Right, ClipPlanes::default()).unwrap();
        let head = Mat4::from_translation(Vec3::new(0.0, 1.6, 0.0));
        let head_inverse = head.inverse().unwrap();

        // A point right in front of the right eye lands on the eye's optical axis.
        let p = right.view(&head_inverse).transform_point3(Vec3::new(0.032, 1.6, -2.0));
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.z, -2.0, epsilon = 1e-6);
    }
}
