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

//! The log dispatcher.
//!
//! A [`Log`] filters messages on the calling thread and hands the survivors
//! to a dedicated worker thread, which writes them to every registered sink
//! in submission order.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::{self, JoinHandle};

use flume::{Receiver, Sender};

use crate::{LogError, LogLevel, LogMessage, Sink};

static GLOBAL: OnceLock<Log> = OnceLock::new();

enum Command {
    Write(LogMessage),
    AddSink(Box<dyn Sink>),
    RemoveAllSinks,
    Flush(Sender<()>),
    Close,
}

struct Shared {
    level: AtomicU8,
    installed: AtomicBool,
    sender: Sender<Command>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Shared {
    fn close(&self) {
        let handle = match self.worker.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            let _ = self.sender.send(Command::Close);
            let _ = handle.join();
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.close();
    }
}

/// A leveled, thread-safe log with any number of sinks.
///
/// `Log` is a cheap handle; clones share the same worker and sinks. The worker
/// is shut down when the last handle is dropped or [`Log::close`] is called,
/// after writing everything already queued.
#[derive(Clone)]
pub struct Log {
    shared: Arc<Shared>,
}

impl Log {
    /// Creates a log without sinks.
    pub fn new(level: LogLevel) -> Result<Self, LogError> {
        let (sender, receiver) = flume::unbounded();
        let worker = thread::Builder::new()
            .name("mpu-log".to_string())
            .spawn(move || run_worker(receiver))
            .map_err(LogError::Spawn)?;
        Ok(Self {
            shared: Arc::new(Shared {
                level: AtomicU8::new(level as u8),
                installed: AtomicBool::new(false),
                sender,
                worker: Mutex::new(Some(worker)),
            }),
        })
    }

    /// Current level; messages less severe than this are discarded.
    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.shared.level.load(Ordering::Relaxed))
    }

    /// Changes the level for all messages submitted afterwards.
    pub fn set_level(&self, level: LogLevel) {
        self.shared.level.store(level as u8, Ordering::Relaxed);
        if self.shared.installed.load(Ordering::Relaxed) {
            log::set_max_level(level.to_level_filter());
        }
    }

    /// Whether a message of `level` would be delivered.
    pub fn enabled(&self, level: LogLevel) -> bool {
        level <= self.level()
    }

    /// Registers a sink. It receives every message submitted after this call.
    pub fn add_sink(&self, sink: impl Sink) {
        let _ = self.shared.sender.send(Command::AddSink(Box::new(sink)));
    }

    /// Flushes and drops every sink.
    pub fn remove_all_sinks(&self) {
        let _ = self.shared.sender.send(Command::RemoveAllSinks);
    }

    /// Queues `msg` for the sinks if its level passes the filter.
    ///
    /// After [`Log::close`] this is a no-op.
    pub fn submit(&self, msg: LogMessage) {
        if self.enabled(msg.level) {
            let _ = self.shared.sender.send(Command::Write(msg));
        }
    }

    /// Convenience for `submit(LogMessage::new(level, module, text))`.
    pub fn log_text(&self, level: LogLevel, module: &str, text: impl Into<String>) {
        if self.enabled(level) {
            self.submit(LogMessage::new(level, module, text));
        }
    }

    /// Blocks until everything submitted before this call has been written
    /// and every sink has been flushed.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = flume::bounded(1);
        if self.shared.sender.send(Command::Flush(ack_tx)).is_ok() {
            // Err means the worker already exited, which also flushed.
            let _ = ack_rx.recv();
        }
    }

    /// Writes all queued messages, flushes the sinks and stops the worker.
    pub fn close(&self) {
        self.shared.close();
    }

    /// Makes this log the backend of the `log` facade and of [`global`].
    ///
    /// Facade records map `Error`, `Warn`, `Info`, `Debug`, `Trace` to
    /// `Error`, `Warning`, `Info`, `Debug`, `Debug2`; the record target
    /// becomes the module name.
    pub fn install(self) -> Result<(), LogError> {
        log::set_boxed_logger(Box::new(self.clone())).map_err(|_| LogError::AlreadyInstalled)?;
        if GLOBAL.set(self.clone()).is_err() {
            return Err(LogError::AlreadyInstalled);
        }
        self.shared.installed.store(true, Ordering::Relaxed);
        log::set_max_level(self.level().to_level_filter());
        Ok(())
    }
}

impl std::fmt::Debug for Log {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Log").field("level", &self.level()).finish()
    }
}

impl log::Log for Log {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        Log::enabled(self, metadata.level().into())
    }

    fn log(&self, record: &log::Record) {
        let level = LogLevel::from(record.level());
        if !Log::enabled(self, level) {
            return;
        }
        let mut msg = LogMessage::new(level, record.target(), record.args().to_string());
        if let (Some(file), Some(line)) = (record.file(), record.line()) {
            msg = msg.with_position(file, line);
        }
        self.submit(msg);
    }

    fn flush(&self) {
        Log::flush(self);
    }
}

/// The installed global log, if any.
pub fn global() -> Option<&'static Log> {
    GLOBAL.get()
}

/// Submits to the global log. Silently dropped when none is installed.
pub fn submit_global(msg: LogMessage) {
    if let Some(log) = global() {
        log.submit(msg);
    }
}

fn run_worker(receiver: Receiver<Command>) {
    let mut sinks: Vec<Box<dyn Sink>> = Vec::new();
    for command in receiver.iter() {
        match command {
            Command::Write(msg) => {
                for sink in sinks.iter_mut() {
                    sink.write(&msg);
                }
            }
            Command::AddSink(sink) => sinks.push(sink),
            Command::RemoveAllSinks => {
                sinks.iter_mut().for_each(|s| s.flush());
                sinks.clear();
            }
            Command::Flush(ack) => {
                sinks.iter_mut().for_each(|s| s.flush());
                let _ = ack.send(());
            }
            Command::Close => break,
        }
    }

    // Anything queued behind Close came from a racing submitter.
    for command in receiver.try_iter() {
        if let Command::Write(msg) = command {
            for sink in sinks.iter_mut() {
                sink.write(&msg);
            }
        }
    }
    sinks.iter_mut().for_each(|s| s.flush());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn collecting_sink() -> (Arc<Mutex<Vec<LogMessage>>>, impl Sink) {
        let store = Arc::new(Mutex::new(Vec::new()));
        let writer = store.clone();
        (store, move |msg: &LogMessage| writer.lock().unwrap().push(msg.clone()))
    }

    #[test]
    fn test_level_filtering() {
        let log = Log::new(LogLevel::Warning).unwrap();
        let (store, sink) = collecting_sink();
        log.add_sink(sink);

        log.log_text(LogLevel::Error, "t", "kept");
        log.log_text(LogLevel::Info, "t", "dropped");
        log.log_text(LogLevel::Warning, "t", "kept too");
        log.flush();

        let texts: Vec<_> = store.lock().unwrap().iter().map(|m| m.text.clone()).collect();
        assert_eq!(texts, vec!["kept", "kept too"]);
    }

    #[test]
    fn test_set_level_applies_to_later_messages() {
        let log = Log::new(LogLevel::Error).unwrap();
        let (store, sink) = collecting_sink();
        log.add_sink(sink);

        log.log_text(LogLevel::Debug, "t", "a");
        log.set_level(LogLevel::Debug2);
        log.log_text(LogLevel::Debug, "t", "b");
        log.flush();

        assert_eq!(store.lock().unwrap().len(), 1);
        assert_eq!(log.level(), LogLevel::Debug2);
    }

    #[test]
    fn test_every_sink_sees_every_message_in_order() {
        let log = Log::new(LogLevel::Debug2).unwrap();
        let (first, sink_a) = collecting_sink();
        let (second, sink_b) = collecting_sink();
        log.add_sink(sink_a);
        log.add_sink(sink_b);

        for i in 0..50 {
            log.log_text(LogLevel::Info, "t", i.to_string());
        }
        log.flush();

        let expected: Vec<String> = (0..50).map(|i| i.to_string()).collect();
        for store in [first, second] {
            let texts: Vec<_> = store.lock().unwrap().iter().map(|m| m.text.clone()).collect();
            assert_eq!(texts, expected);
        }
    }

    #[test]
    fn test_remove_all_sinks() {
        let log = Log::new(LogLevel::Info).unwrap();
        let (store, sink) = collecting_sink();
        log.add_sink(sink);
        log.log_text(LogLevel::Info, "t", "before");
        log.remove_all_sinks();
        log.log_text(LogLevel::Info, "t", "after");
        log.flush();
        assert_eq!(store.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_close_drains_queue_and_ignores_later_submits() {
        let log = Log::new(LogLevel::Info).unwrap();
        let (store, sink) = collecting_sink();
        log.add_sink(sink);
        for _ in 0..10 {
            log.log_text(LogLevel::Info, "t", "x");
        }
        log.close();
        assert_eq!(store.lock().unwrap().len(), 10);

        log.log_text(LogLevel::Info, "t", "late");
        log.flush();
        assert_eq!(store.lock().unwrap().len(), 10);
    }

    #[test]
    fn test_messages_from_many_threads_arrive() {
        let log = Log::new(LogLevel::Info).unwrap();
        let (store, sink) = collecting_sink();
        log.add_sink(sink);

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let log = log.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        log.log_text(LogLevel::Info, "t", format!("{t}-{i}"));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        log.flush();
        assert_eq!(store.lock().unwrap().len(), 100);
    }

    #[test]
    fn test_facade_record_conversion() {
        let log = Log::new(LogLevel::Debug2).unwrap();
        let (store, sink) = collecting_sink();
        log.add_sink(sink);

        let record = log::Record::builder()
            .level(log::Level::Warn)
            .target("net")
            .file(Some("src/net/socket.rs"))
            .line(Some(12))
            .args(format_args!("retrying"))
            .build();
        log::Log::log(&log, &record);
        log.flush();

        let stored = store.lock().unwrap();
        assert_eq!(stored[0].level, LogLevel::Warning);
        assert_eq!(stored[0].module, "net");
        assert_eq!(stored[0].file_position.as_deref(), Some("socket.rs:12"));
        assert_eq!(stored[0].text, "retrying");
    }
}
