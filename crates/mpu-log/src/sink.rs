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

use crate::LogMessage;

/// A destination for log messages.
///
/// Sinks run on the log's worker thread, one message at a time, so they need
/// no internal synchronisation. They must not log through the `log` facade
/// themselves; report sink failures on stderr instead.
pub trait Sink: Send + 'static {
    /// Writes one message.
    fn write(&mut self, msg: &LogMessage);

    /// Flushes buffered output. Called on [`crate::Log::flush`] and on close.
    fn flush(&mut self) {}
}

/// Any `FnMut(&LogMessage)` closure is a sink.
impl<F> Sink for F
where
    F: FnMut(&LogMessage) + Send + 'static,
{
    fn write(&mut self, msg: &LogMessage) {
        self(msg)
    }
}
