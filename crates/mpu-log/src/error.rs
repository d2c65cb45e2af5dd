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

use std::path::PathBuf;

use mpu_core::CfgError;
use thiserror::Error;

/// Errors raised while setting up logging.
#[derive(Debug, Error)]
pub enum LogError {
    /// A log file could not be opened or rotated.
    #[error("log file '{path}': {source}")]
    File {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The syslog socket could not be opened.
    #[error("cannot connect to syslog at '{path}': {source}")]
    Syslog {
        /// The socket path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Syslog was requested on a platform without it.
    #[error("syslog is not available on this platform")]
    SyslogUnsupported,
    /// Another logger is already registered with the `log` facade.
    #[error("a global logger is already installed")]
    AlreadyInstalled,
    /// The worker thread could not be started.
    #[error("failed to spawn the log worker thread: {0}")]
    Spawn(#[source] std::io::Error),
    /// The logging configuration is invalid.
    #[error("invalid logging configuration: {0}")]
    Config(#[from] CfgError),
}
