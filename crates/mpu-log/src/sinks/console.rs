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

use std::io::Write;

use console::{style, StyledObject};

use crate::{LogLevel, LogMessage, Sink};

/// Writes to the terminal. `Fatal` and `Error` go to stderr, the rest to
/// stdout. The level tag is coloured when the stream supports it.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ConsoleSink {
    /// Creates a console sink.
    pub fn new() -> Self {
        Self
    }

    fn styled_tag(msg: &LogMessage) -> StyledObject<String> {
        let tag = style(msg.format_level_tag());
        match msg.level {
            LogLevel::Fatal => tag.red().bold(),
            LogLevel::Error => tag.red(),
            LogLevel::Warning => tag.yellow(),
            LogLevel::Info => tag.green(),
            LogLevel::Debug => tag.cyan(),
            LogLevel::Debug2 => tag.blue().dim(),
        }
    }

    fn render(msg: &LogMessage, for_stderr: bool) -> String {
        if msg.plaintext {
            return msg.text.clone();
        }
        let mut tag = Self::styled_tag(msg);
        if for_stderr {
            tag = tag.for_stderr();
        }
        let mut line = format!("{tag} {}", msg.format_body());
        if let Some(pos) = &msg.file_position {
            line.push_str("  @");
            line.push_str(pos);
        }
        line
    }
}

impl Sink for ConsoleSink {
    fn write(&mut self, msg: &LogMessage) {
        if msg.level <= LogLevel::Error {
            let line = Self::render(msg, true);
            let _ = writeln!(std::io::stderr().lock(), "{line}");
        } else {
            let line = Self::render(msg, false);
            let _ = writeln!(std::io::stdout().lock(), "{line}");
        }
    }

    fn flush(&mut self) {
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_without_colours_matches_plain_format() {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
        let msg = LogMessage::new(LogLevel::Error, "io", "disk full").with_position("a/b.rs", 3);
        assert_eq!(ConsoleSink::render(&msg, true), msg.format_line());
        assert_eq!(ConsoleSink::render(&msg, false), msg.format_line());
    }

    #[test]
    fn test_plaintext_passthrough() {
        let msg = LogMessage::plain("raw");
        assert_eq!(ConsoleSink::render(&msg, false), "raw");
    }
}
