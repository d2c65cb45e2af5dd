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

/// Measures elapsed wall-clock time, excluding the time spent paused.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    /// Time accumulated before the current running segment.
    accumulated: Duration,
    /// Start of the current running segment, `None` while paused.
    segment_start: Option<Instant>,
}

impl Stopwatch {
    /// Creates a running stopwatch.
    #[inline]
    pub fn new() -> Self {
        Self {
            accumulated: Duration::ZERO,
            segment_start: Some(Instant::now()),
        }
    }

    /// Creates a stopwatch that does not run until [`Stopwatch::resume`] is called.
    #[inline]
    pub fn paused() -> Self {
        Self {
            accumulated: Duration::ZERO,
            segment_start: None,
        }
    }

    /// Stops accumulating time. Pausing a paused stopwatch does nothing.
    pub fn pause(&mut self) {
        if let Some(start) = self.segment_start.take() {
            self.accumulated += start.elapsed();
        }
    }

    /// Continues accumulating time. Resuming a running stopwatch does nothing.
    pub fn resume(&mut self) {
        if self.segment_start.is_none() {
            self.segment_start = Some(Instant::now());
        }
    }

    /// Sets the elapsed time back to zero, keeping the running state.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        if self.segment_start.is_some() {
            self.segment_start = Some(Instant::now());
        }
    }

    /// Whether the stopwatch is currently running.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.segment_start.is_some()
    }

    /// Total running time.
    /// ## Returns
    /// The time spent running since creation or the last [`Stopwatch::reset`],
    /// not counting paused intervals.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.accumulated + self.segment_start.map_or(Duration::ZERO, |s| s.elapsed())
    }

    /// Total running time in milliseconds.
    /// ## Returns
    /// Whole milliseconds, truncated.
    #[inline]
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    /// Total running time in microseconds.
    #[inline]
    pub fn elapsed_us(&self) -> u64 {
        self.elapsed().as_micros() as u64
    }

    /// Total running time in seconds.
    #[inline]
    pub fn elapsed_secs_f64(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}
