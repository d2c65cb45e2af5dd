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

use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};

use super::Facility;
use crate::{LogError, LogLevel, LogMessage, Sink};

const DEFAULT_SOCKET: &str = "/dev/log";

/// Syslog severity for a level.
pub(crate) fn severity(level: LogLevel) -> u8 {
    match level {
        LogLevel::Fatal => 2,
        LogLevel::Error => 3,
        LogLevel::Warning => 4,
        LogLevel::Info => 6,
        LogLevel::Debug | LogLevel::Debug2 => 7,
    }
}

/// Sends messages to the local syslog daemon in RFC 3164 format.
///
/// Plaintext messages are not forwarded. Send failures are ignored apart
/// from one reconnect attempt.
#[derive(Debug)]
pub struct SyslogSink {
    ident: String,
    facility: Facility,
    pid: u32,
    socket_path: PathBuf,
    socket: UnixDatagram,
}

impl SyslogSink {
    /// Connects to `/dev/log`.
    pub fn new(ident: impl Into<String>, facility: Facility) -> Result<Self, LogError> {
        Self::with_socket_path(ident, facility, DEFAULT_SOCKET)
    }

    /// Connects to a syslog socket at a custom path.
    pub fn with_socket_path(
        ident: impl Into<String>,
        facility: Facility,
        socket_path: impl AsRef<Path>,
    ) -> Result<Self, LogError> {
        let socket_path = socket_path.as_ref().to_path_buf();
        let socket = connect(&socket_path)?;
        Ok(Self {
            ident: ident.into(),
            facility,
            pid: std::process::id(),
            socket_path,
            socket,
        })
    }

    /// Renders the datagram for `msg`.
    pub fn format(&self, msg: &LogMessage) -> String {
        let pri = self.facility.code() as u32 * 8 + severity(msg.level) as u32;
        format!(
            "<{pri}>{} {}[{}]: {}",
            msg.timestamp.format("%b %e %H:%M:%S"),
            self.ident,
            self.pid,
            msg.text
        )
    }
}

impl Sink for SyslogSink {
    fn write(&mut self, msg: &LogMessage) {
        if msg.plaintext {
            return;
        }
        let datagram = self.format(msg);
        if self.socket.send(datagram.as_bytes()).is_err() {
            if let Ok(socket) = connect(&self.socket_path) {
                self.socket = socket;
                let _ = self.socket.send(datagram.as_bytes());
            }
        }
    }
}

fn connect(path: &Path) -> Result<UnixDatagram, LogError> {
    let err = |source| LogError::Syslog {
        path: path.to_path_buf(),
        source,
    };
    let socket = UnixDatagram::unbound().map_err(err)?;
    socket.connect(path).map_err(err)?;
    Ok(socket)
}
