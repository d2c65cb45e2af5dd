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

use std::time::{Duration, Instant};

/// Reports the time elapsed between consecutive calls to [`DeltaTimer::tick`].
///
/// The first tick measures from construction.
#[derive(Debug, Clone)]
pub struct DeltaTimer {
    last_tick: Instant,
    last_delta: Duration,
}

impl DeltaTimer {
    /// Creates a timer whose first delta starts now.
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
            last_delta: Duration::ZERO,
        }
    }

    /// Returns the time since the previous tick and starts a new interval.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        self.last_delta = now.duration_since(self.last_tick);
        self.last_tick = now;
        self.last_delta
    }

    /// The value returned by the most recent [`DeltaTimer::tick`].
    #[inline]
    pub fn last_delta(&self) -> Duration {
        self.last_delta
    }

    /// Restarts the current interval without producing a delta.
    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
        self.last_delta = Duration::ZERO;
    }
}

impl Default for DeltaTimer {
    fn default() -> Self {
        Self::new()
    }
}
