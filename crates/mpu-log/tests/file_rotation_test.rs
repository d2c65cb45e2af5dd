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

use std::fs;

use mpu_log::sinks::FileSink;
use mpu_log::{Log, LogLevel, LogMessage, Sink};

fn line(n: usize) -> LogMessage {
    LogMessage::plain(format!("line {n:04}"))
}

#[test]
fn rotation_keeps_newest_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");
    // Every plain line is 10 bytes with its newline, so each file holds 3.
    let mut sink = FileSink::new(&path, 30, 2, true).unwrap();
    for n in 0..12 {
        sink.write(&line(n));
    }
    sink.flush();

    assert_eq!(fs::read_to_string(&path).unwrap(), "line 0009\nline 0010\nline 0011\n");
    assert_eq!(
        fs::read_to_string(sink.rotated_path(1)).unwrap(),
        "line 0006\nline 0007\nline 0008\n"
    );
    assert_eq!(
        fs::read_to_string(sink.rotated_path(2)).unwrap(),
        "line 0003\nline 0004\nline 0005\n"
    );
    assert!(!sink.rotated_path(3).exists());
}

#[test]
fn rotation_without_keep_discards_old_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");
    let mut sink = FileSink::new(&path, 20, 0, true).unwrap();
    for n in 0..5 {
        sink.write(&line(n));
    }
    sink.flush();

    assert_eq!(fs::read_to_string(&path).unwrap(), "line 0004\n");
    assert!(!sink.rotated_path(1).exists());
}

#[test]
fn existing_file_size_counts_towards_rotation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");
    fs::write(&path, "0123456789012345678\n").unwrap();

    let mut sink = FileSink::new(&path, 20, 1, true).unwrap();
    sink.write(&line(1));
    sink.flush();

    assert_eq!(fs::read_to_string(&path).unwrap(), "line 0001\n");
    assert_eq!(
        fs::read_to_string(sink.rotated_path(1)).unwrap(),
        "0123456789012345678\n"
    );
}

#[test]
fn file_sink_behind_log_worker() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("worker.log");

    let log = Log::new(LogLevel::Info).unwrap();
    log.add_sink(FileSink::new(&path, 0, 0, true).unwrap());
    log.log_text(LogLevel::Warning, "io", "first");
    log.log_text(LogLevel::Debug, "io", "filtered");
    log.submit(LogMessage::plain("second"));
    log.close();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("[WARNING]"));
    assert!(lines[0].ends_with("{io}: first"));
    assert_eq!(lines[1], "second");
}
