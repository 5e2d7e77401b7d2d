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

//! Counters describing how frames went.

use std::time::Duration;

/// Per-session frame counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames whose pose sample succeeded.
    pub frames_begun: u64,
    /// Frames that reached the compositor, including partially rejected ones.
    pub frames_submitted: u64,
    /// Frames skipped because the pose sample failed.
    pub frames_dropped: u64,
    /// Submitted frames with at least one rejected eye.
    pub frames_rejected: u64,
    /// Eye images the compositor rejected.
    pub submission_failures: u64,
    /// Time from `begin_frame` to the end of the last submitted frame.
    pub last_frame_duration: Option<Duration>,
}

impl FrameStats {
    /// Frames submitted with both eyes accepted.
    pub fn frames_presented(&self) -> u64 {
        self.frames_submitted - self.frames_rejected
    }
}
