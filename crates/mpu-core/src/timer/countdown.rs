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

/// A one-shot countdown polled by its owner.
///
/// A timer that was never started is not finished.
#[derive(Debug, Clone)]
pub struct Timer {
    duration: Duration,
    started_at: Option<Instant>,
}

impl Timer {
    /// Creates a stopped timer for `duration`.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            started_at: None,
        }
    }

    /// Creates a timer and starts it.
    pub fn started(duration: Duration) -> Self {
        let mut timer = Self::new(duration);
        timer.start();
        timer
    }

    /// Starts the countdown if it is not running yet.
    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    /// Starts the countdown over from the full duration.
    pub fn restart(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// Stops the countdown; the timer is neither running nor finished afterwards.
    pub fn stop(&mut self) {
        self.started_at = None;
    }

    /// Changes the duration. Takes effect on the running countdown as well.
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    /// The configured duration.
    #[inline]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether the countdown has been started.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Whether the countdown was started and has run out.
    pub fn is_finished(&self) -> bool {
        self.started_at
            .is_some_and(|start| start.elapsed() >= self.duration)
    }

    /// Time left; the full duration when stopped and zero once finished.
    pub fn remaining(&self) -> Duration {
        match self.started_at {
            Some(start) => self.duration.saturating_sub(start.elapsed()),
            None => self.duration,
        }
    }
}
