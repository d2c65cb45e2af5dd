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

//! Time measurement utilities.
//!
//! * [`Stopwatch`] measures elapsed time and can be paused.
//! * [`DeltaTimer`] reports the time between consecutive ticks (frame times).
//! * [`Timer`] is a one-shot countdown polled by the caller.
//! * [`AsyncTimer`] fires a callback on a background thread.

mod async_timer;
mod countdown;
mod delta;
mod stopwatch;

pub use async_timer::AsyncTimer;
pub use countdown::Timer;
pub use delta::DeltaTimer;
pub use stopwatch::Stopwatch;
