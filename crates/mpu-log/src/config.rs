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

//! Building a [`Log`] from a configuration file block.

use std::path::PathBuf;

use mpu_core::{CfgError, CfgFile};

use crate::sinks::{ConsoleSink, Facility, FileSink};
use crate::{Log, LogError, LogLevel};

/// Default size at which log files are rotated (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default number of rotated files kept.
pub const DEFAULT_LOGS_TO_KEEP: usize = 4;

/// Logging settings.
///
/// Read from a block such as:
///
/// ```text
/// [logging]
/// level = debug
/// console = true
/// file = logs/app.log
/// max_file_size = 1048576
/// logs_to_keep = 3
/// file_plaintexts = false
/// syslog = my-app
/// syslog_facility = local0
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// Minimum severity delivered.
    pub level: LogLevel,
    /// Add a [`ConsoleSink`].
    pub console: bool,
    /// Add a [`FileSink`] writing here.
    pub file: Option<PathBuf>,
    /// Rotation threshold in bytes, zero disables rotation.
    pub max_file_size: u64,
    /// Rotated files kept.
    pub logs_to_keep: usize,
    /// Whether plaintext messages reach the log file.
    pub file_plaintexts: bool,
    /// Add a syslog sink with this ident.
    pub syslog_ident: Option<String>,
    /// Facility for the syslog sink.
    pub syslog_facility: Facility,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            console: true,
            file: None,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            logs_to_keep: DEFAULT_LOGS_TO_KEEP,
            file_plaintexts: true,
            syslog_ident: None,
            syslog_facility: Facility::User,
        }
    }
}

impl LogConfig {
    /// Reads the settings from `block`, falling back to defaults for
    /// missing keys.
    pub fn from_cfg(cfg: &CfgFile, block: &str) -> Result<Self, CfgError> {
        let defaults = Self::default();
        let non_empty = |key: &str| {
            cfg.get_raw(block, key)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Ok(Self {
            level: cfg.get_or(block, "level", defaults.level)?,
            console: cfg.get_flag_or(block, "console", defaults.console)?,
            file: non_empty("file").map(PathBuf::from),
            max_file_size: cfg.get_or(block, "max_file_size", defaults.max_file_size)?,
            logs_to_keep: cfg.get_or(block, "logs_to_keep", defaults.logs_to_keep)?,
            file_plaintexts: cfg.get_flag_or(block, "file_plaintexts", defaults.file_plaintexts)?,
            syslog_ident: non_empty("syslog"),
            syslog_facility: match non_empty("syslog_facility") {
                Some(_) => cfg.get(block, "syslog_facility")?,
                None => defaults.syslog_facility,
            },
        })
    }

    /// Creates a log with the configured sinks.
    pub fn build(&self) -> Result<Log, LogError> {
        let log = Log::new(self.level)?;
        if self.console {
            log.add_sink(ConsoleSink::new());
        }
        if let Some(path) = &self.file {
            log.add_sink(FileSink::new(
                path,
                self.max_file_size,
                self.logs_to_keep,
                self.file_plaintexts,
            )?);
        }
        if let Some(ident) = &self.syslog_ident {
            self.add_syslog(&log, ident)?;
        }
        Ok(log)
    }

    #[cfg(unix)]
    fn add_syslog(&self, log: &Log, ident: &str) -> Result<(), LogError> {
        use crate::sinks::SyslogSink;

        log.add_sink(SyslogSink::new(ident, self.syslog_facility)?);
        Ok(())
    }

    #[cfg(not(unix))]
    fn add_syslog(&self, _log: &Log, _ident: &str) -> Result<(), LogError> {
        Err(LogError::SyslogUnsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_empty_block() {
        let cfg = CfgFile::new();
        assert_eq!(LogConfig::from_cfg(&cfg, "logging").unwrap(), LogConfig::default());
    }

    #[test]
    fn test_reads_all_keys() {
        let cfg: CfgFile = "[logging]\n\
            level = debug2\n\
            console = off\n\
            file = out/app.log\n\
            max_file_size = 2048\n\
            logs_to_keep = 2\n\
            file_plaintexts = false\n\
            syslog = demo\n\
            syslog_facility = local1\n"
            .parse()
            .unwrap();
        let config = LogConfig::from_cfg(&cfg, "logging").unwrap();
        assert_eq!(config.level, LogLevel::Debug2);
        assert!(!config.console);
        assert_eq!(config.file, Some(PathBuf::from("out/app.log")));
        assert_eq!(config.max_file_size, 2048);
        assert_eq!(config.logs_to_keep, 2);
        assert!(!config.file_plaintexts);
        assert_eq!(config.syslog_ident.as_deref(), Some("demo"));
        assert_eq!(config.syslog_facility, Facility::Local1);
    }

    #[test]
    fn test_invalid_level_is_reported() {
        let cfg: CfgFile = "[logging]\nlevel = chatty\n".parse().unwrap();
        assert!(matches!(
            LogConfig::from_cfg(&cfg, "logging"),
            Err(CfgError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_unknown_facility_fails_while_reading() {
        let cfg: CfgFile = "[logging]\nsyslog_facility = bogus\n".parse().unwrap();
        match LogConfig::from_cfg(&cfg, "logging") {
            Err(CfgError::InvalidValue { block, key, value }) => {
                assert_eq!(block, "logging");
                assert_eq!(key, "syslog_facility");
                assert_eq!(value, "bogus");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }

        let blank: CfgFile = "[logging]\nsyslog_facility =\n".parse().unwrap();
        assert_eq!(
            LogConfig::from_cfg(&blank, "logging").unwrap().syslog_facility,
            Facility::User
        );
    }
}
