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

use std::thread;

use chrono::{DateTime, Local};
use mpu_core::strings::{file_name, DEFAULT_TIME_FORMAT};

use crate::LogLevel;

/// One log entry as handed to every sink.
#[derive(Debug, Clone, PartialEq)]
pub struct LogMessage {
    /// Severity.
    pub level: LogLevel,
    /// Wall-clock time of creation.
    pub timestamp: DateTime<Local>,
    /// Module or subsystem that produced the message.
    pub module: String,
    /// `file:line` of the call site, if known.
    pub file_position: Option<String>,
    /// Name (or id) of the thread that produced the message.
    pub thread: String,
    /// The message text.
    pub text: String,
    /// Plaintext messages are written without any decoration.
    pub plaintext: bool,
}

impl LogMessage {
    /// Creates a message stamped with the current time and thread.
    pub fn new(level: LogLevel, module: impl Into<String>, text: impl Into<String>) -> Self {
        let current = thread::current();
        let thread = match current.name() {
            Some(name) => name.to_string(),
            None => format!("{:?}", current.id()),
        };
        Self {
            level,
            timestamp: Local::now(),
            module: module.into(),
            file_position: None,
            thread,
            text: text.into(),
            plaintext: false,
        }
    }

    /// Creates an undecorated message at `Info` level.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            plaintext: true,
            ..Self::new(LogLevel::Info, "", text)
        }
    }

    /// Attaches the call site. Only the file name is kept, not the full path.
    pub fn with_position(mut self, file: &str, line: u32) -> Self {
        self.file_position = Some(format!("{}:{line}", file_name(file)));
        self
    }

    /// Renders the message as a single line (without the trailing newline).
    ///
    /// `[LEVEL] [2025-01-31 12:00:00] [main] {module}: text  @file.rs:42`
    pub fn format_line(&self) -> String {
        if self.plaintext {
            return self.text.clone();
        }
        let mut line = format!(
            "{} {}",
            self.format_level_tag(),
            self.format_body()
        );
        if let Some(pos) = &self.file_position {
            line.push_str("  @");
            line.push_str(pos);
        }
        line
    }

    /// `[LEVEL]`
    pub(crate) fn format_level_tag(&self) -> String {
        format!("[{}]", self.level)
    }

    /// Everything between the level tag and the file position.
    pub(crate) fn format_body(&self) -> String {
        format!(
            "[{}] [{}] {{{}}}: {}",
            self.timestamp.format(DEFAULT_TIME_FORMAT),
            self.thread,
            self.module,
            self.text
        )
    }
}
