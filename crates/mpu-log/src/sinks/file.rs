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

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::{LogError, LogMessage, Sink};

/// Appends formatted messages to a file, rotating it when it grows too big.
///
/// On rotation `log.txt` becomes `log.txt.1`, the old `log.txt.1` becomes
/// `log.txt.2` and so on. At most `logs_to_keep` rotated files are kept.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    written: u64,
    max_file_size: u64,
    logs_to_keep: usize,
    print_plaintexts: bool,
}

impl FileSink {
    /// Opens (or creates) `path` for appending.
    ///
    /// A `max_file_size` of zero disables rotation.
    pub fn new(
        path: impl Into<PathBuf>,
        max_file_size: u64,
        logs_to_keep: usize,
        print_plaintexts: bool,
    ) -> Result<Self, LogError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| LogError::File {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let (writer, written) = open_append(&path)?;
        Ok(Self {
            path,
            writer: Some(writer),
            written,
            max_file_size,
            logs_to_keep,
            print_plaintexts,
        })
    }

    /// The active log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the `n`-th rotated file.
    pub fn rotated_path(&self, n: usize) -> PathBuf {
        rotated_path(&self.path, n)
    }

    /// Shifts the rotated files and starts a fresh log file.
    ///
    /// The active file is reopened even when shifting fails, so messages keep
    /// landing somewhere. The size counter then restarts at zero and the next
    /// attempt happens after another `max_file_size` bytes.
    fn rotate(&mut self) -> Result<(), LogError> {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
        let shifted = self.shift_files();
        let (writer, written) = open_append(&self.path)?;
        self.writer = Some(writer);
        self.written = if shifted.is_ok() { written } else { 0 };
        shifted
    }

    fn shift_files(&self) -> Result<(), LogError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| LogError::File { path, source }
        };

        if self.logs_to_keep == 0 {
            return fs::remove_file(&self.path).map_err(io_err(&self.path));
        }
        let oldest = rotated_path(&self.path, self.logs_to_keep);
        if oldest.exists() {
            fs::remove_file(&oldest).map_err(io_err(&oldest))?;
        }
        for n in (1..self.logs_to_keep).rev() {
            let from = rotated_path(&self.path, n);
            if from.exists() {
                fs::rename(&from, rotated_path(&self.path, n + 1)).map_err(io_err(&from))?;
            }
        }
        fs::rename(&self.path, rotated_path(&self.path, 1)).map_err(io_err(&self.path))
    }

    fn reopen(&mut self) -> Result<(), LogError> {
        let (writer, written) = open_append(&self.path)?;
        self.writer = Some(writer);
        self.written = written;
        Ok(())
    }
}

impl Sink for FileSink {
    fn write(&mut self, msg: &LogMessage) {
        if msg.plaintext && !self.print_plaintexts {
            return;
        }
        if self.max_file_size > 0 && self.written >= self.max_file_size {
            if let Err(e) = self.rotate() {
                eprintln!("mpu-log: rotating failed: {e}");
            }
        }
        if self.writer.is_none() {
            if let Err(e) = self.reopen() {
                eprintln!("mpu-log: {e}");
                return;
            }
        }
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        let line = msg.format_line();
        match writeln!(writer, "{line}") {
            Ok(()) => self.written += line.len() as u64 + 1,
            Err(e) => eprintln!("mpu-log: writing to {} failed: {e}", self.path.display()),
        }
    }

    fn flush(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            let _ = writer.flush();
        }
    }
}

fn rotated_path(base: &Path, n: usize) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".{n}"));
    PathBuf::from(name)
}

fn open_append(path: &Path) -> Result<(BufWriter<File>, u64), LogError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LogError::File {
            path: path.to_path_buf(),
            source,
        })?;
    let len = file.metadata().map(|m| m.len()).unwrap_or(0);
    Ok((BufWriter::new(file), len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogLevel;

    fn msg(text: &str) -> LogMessage {
        LogMessage::new(LogLevel::Info, "test", text)
    }

    #[test]
    fn test_rotated_path_appends_index() {
        assert_eq!(
            rotated_path(Path::new("/var/log/app.log"), 3),
            PathBuf::from("/var/log/app.log.3")
        );
    }

    #[test]
    fn test_writes_formatted_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut sink = FileSink::new(&path, 0, 0, true).unwrap();
        sink.write(&msg("hello"));
        sink.write(&LogMessage::plain("raw line"));
        sink.flush();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("[INFO]"));
        assert!(lines[0].ends_with("{test}: hello"));
        assert_eq!(lines[1], "raw line");
    }

    #[test]
    fn test_plaintext_suppressed_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut sink = FileSink::new(&path, 0, 0, false).unwrap();
        sink.write(&LogMessage::plain("raw line"));
        sink.flush();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/app.log");
        let mut sink = FileSink::new(&path, 0, 0, true).unwrap();
        sink.write(&msg("x"));
        sink.flush();
        assert!(path.exists());
    }

    #[test]
    fn test_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "previous\n").unwrap();
        let mut sink = FileSink::new(&path, 0, 0, true).unwrap();
        sink.write(&LogMessage::plain("next"));
        sink.flush();
        assert_eq!(fs::read_to_string(&path).unwrap(), "previous\nnext\n");
    }

    #[test]
    fn test_failed_rotation_keeps_writing_to_active_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        // A directory where the rotated file should go makes every shift fail.
        let blocker = dir.path().join("app.log.1");
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("keep"), "x").unwrap();

        let mut sink = FileSink::new(&path, 10, 1, true).unwrap();
        for i in 0..5 {
            sink.write(&LogMessage::plain(format!("line {i:04}")));
        }
        sink.flush();
        let expected: String = (0..5).map(|i| format!("line {i:04}\n")).collect();
        assert_eq!(fs::read_to_string(&path).unwrap(), expected);

        // Once the obstacle is gone rotation resumes.
        fs::remove_dir_all(&blocker).unwrap();
        sink.write(&LogMessage::plain("line 0005"));
        sink.flush();
        assert_eq!(fs::read_to_string(&path).unwrap(), "line 0005\n");
        assert_eq!(fs::read_to_string(sink.rotated_path(1)).unwrap(), expected);
    }
}
