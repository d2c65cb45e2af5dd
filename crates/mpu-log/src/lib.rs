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

//! Leveled logging with pluggable sinks.
//!
//! Create a [`Log`], add sinks, then either use it directly or
//! [`install`](Log::install) it so that the `log` crate macros
//! (`log::info!`, `log::warn!`, ...) end up in its sinks.
//!
//! ```no_run
//! use mpu_log::{sinks::ConsoleSink, Log, LogLevel};
//!
//! let log = Log::new(LogLevel::Debug).unwrap();
//! log.add_sink(ConsoleSink::new());
//! log.clone().install().unwrap();
//! log::info!("ready");
//! log.flush();
//! ```

#![warn(missing_docs)]

pub mod config;
mod dispatcher;
mod error;
mod level;
mod message;
mod sink;
pub mod sinks;

pub use config::LogConfig;
pub use dispatcher::{global, submit_global, Log};
pub use error::LogError;
pub use level::{LogLevel, ParseLevelError};
pub use message::LogMessage;
pub use sink::Sink;

/// Logs a `Fatal` message to the global log.
///
/// The `log` crate has no level above `Error`, so this is the only way to
/// emit `Fatal` through the global log.
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)+) => {
        $crate::submit_global(
            $crate::LogMessage::new($crate::LogLevel::Fatal, module_path!(), format!($($arg)+))
                .with_position(file!(), line!()),
        )
    };
}

/// Writes an undecorated line to the global log.
#[macro_export]
macro_rules! plain {
    ($($arg:tt)+) => {
        $crate::submit_global($crate::LogMessage::plain(format!($($arg)+)))
    };
}
