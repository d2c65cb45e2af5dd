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

use std::thread::{self, JoinHandle};
use std::time::Duration;

use flume::RecvTimeoutError;

/// Runs a callback on a background thread after a delay, once or repeatedly.
///
/// Dropping the handle cancels the timer and joins its thread, so the
/// callback never outlives the `AsyncTimer`.
#[derive(Debug)]
pub struct AsyncTimer {
    cancel: flume::Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl AsyncTimer {
    /// Calls `callback` once after `delay`.
    pub fn once<F>(delay: Duration, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let mut callback = Some(callback);
        Self::spawn(delay, false, move || {
            if let Some(cb) = callback.take() {
                cb();
            }
        })
    }

    /// Calls `callback` every `interval` until cancelled.
    pub fn repeating<F>(interval: Duration, callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        Self::spawn(interval, true, callback)
    }

    fn spawn<F>(interval: Duration, repeat: bool, mut callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (cancel, cancelled) = flume::bounded::<()>(1);
        let thread = thread::Builder::new()
            .name("mpu-async-timer".to_string())
            .spawn(move || loop {
                match cancelled.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        callback();
                        if !repeat {
                            break;
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            });

        let thread = match thread {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("Failed to spawn async timer thread: {e}");
                None
            }
        };

        Self { cancel, thread }
    }

    /// Stops the timer before its next firing. A callback that is already
    /// running completes.
    pub fn cancel(&self) {
        let _ = self.cancel.try_send(());
    }

    /// Whether the timer thread has exited (fired once, or was cancelled).
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Blocks until the timer thread exits. Never returns for an
    /// uncancelled repeating timer.
    pub fn wait(mut self) {
        self.join();
    }

    fn join(&mut self) {
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                log::warn!("Async timer callback panicked");
            }
        }
    }
}

impl Drop for AsyncTimer {
    fn drop(&mut self) {
        self.cancel();
        self.join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn once_fires_a_single_time() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let timer = AsyncTimer::once(Duration::from_millis(10), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        timer.wait();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn repeating_fires_until_cancelled() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let timer = AsyncTimer::repeating(Duration::from_millis(5), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        thread::sleep(Duration::from_millis(60));
        timer.cancel();
        timer.wait();

        let fired = count.load(Ordering::SeqCst);
        assert!(fired >= 2, "Repeating timer fired only {fired} times");
        thread::sleep(Duration::from_millis(20));
        assert_eq!(count.load(Ordering::SeqCst), fired, "No firing after cancel");
    }

    #[test]
    fn drop_cancels_pending_callback() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let timer = AsyncTimer::once(Duration::from_secs(30), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert!(!timer.is_finished());
        drop(timer);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
