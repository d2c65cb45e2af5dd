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

//! Block-structured `key = value` configuration files.
//!
//! ```text
//! # global values come before the first header
//! app_name = demo
//!
//! [Log]
//! level = debug          ; trailing comments start with '#' or ';'
//! file = "logs/app.log"  # quoted values may contain '#' and ';'
//! ```
//!
//! Blocks and keys keep their insertion order, so a file that is loaded,
//! modified and saved again stays diff friendly.

use std::fmt::{self, Display};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::strings::{cut_after_first, escape, unescape};

/// Name of the implicit block holding values that precede the first header.
pub const GLOBAL_BLOCK: &str = "";

/// Errors produced while reading, writing or querying a [`CfgFile`].
#[derive(Debug, Error)]
pub enum CfgError {
    /// The file could not be read or written.
    #[error("I/O error on config file '{path}': {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A line could not be parsed.
    #[error("syntax error on line {line}: {message}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },
    /// The requested value does not exist.
    #[error("missing config value '{key}' in block '[{block}]'")]
    MissingValue {
        /// Block that was searched.
        block: String,
        /// Key that was not found.
        key: String,
    },
    /// The value exists but could not be converted to the requested type.
    #[error("invalid config value '{value}' for '{key}' in block '[{block}]'")]
    InvalidValue {
        /// Block containing the value.
        block: String,
        /// Key of the value.
        key: String,
        /// The raw text.
        value: String,
    },
    /// A block name or key cannot be written back in a form that parses.
    #[error("invalid config name '{name}': {reason}")]
    InvalidName {
        /// The rejected block name or key.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Block {
    name: String,
    entries: Vec<(String, String)>,
}

/// An in-memory configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CfgFile {
    blocks: Vec<Block>,
}

impl CfgFile {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and parses the file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CfgError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| CfgError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = Self::parse(&text)?;
        log::debug!("Loaded config file '{}' ({} blocks)", path.display(), cfg.blocks.len());
        Ok(cfg)
    }

    /// Parses configuration text.
    pub fn parse(text: &str) -> Result<Self, CfgError> {
        let mut cfg = Self::new();
        let mut current = GLOBAL_BLOCK.to_string();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = strip_comment(raw).map_err(|message| CfgError::Syntax {
                line: line_no,
                message,
            })?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let name = header.strip_suffix(']').ok_or_else(|| CfgError::Syntax {
                    line: line_no,
                    message: "block header is missing ']'".to_string(),
                })?;
                let name = name.trim();
                if name.is_empty() {
                    return Err(CfgError::Syntax {
                        line: line_no,
                        message: "empty block name".to_string(),
                    });
                }
                current = name.to_string();
                cfg.block_mut(&current);
                continue;
            }

            let (key, value) = match cut_after_first(line, '=', '\\') {
                (key, Some(value)) => (key.trim(), value.trim()),
                (_, None) => {
                    return Err(CfgError::Syntax {
                        line: line_no,
                        message: format!("expected 'key = value', found '{line}'"),
                    })
                }
            };
            if key.is_empty() {
                return Err(CfgError::Syntax {
                    line: line_no,
                    message: "empty key".to_string(),
                });
            }

            let value = match value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
            {
                Some(quoted) => unescape(quoted),
                None => value.to_string(),
            };
            cfg.insert(&current, key, value);
        }

        Ok(cfg)
    }

    /// Writes the configuration to `path`, replacing its content.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CfgError> {
        let path = path.as_ref();
        fs::write(path, self.to_string()).map_err(|source| CfgError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Returns the value of `key` in `block` converted to `T`.
    pub fn get<T: FromStr>(&self, block: &str, key: &str) -> Result<T, CfgError> {
        let raw = self.get_raw(block, key).ok_or_else(|| CfgError::MissingValue {
            block: block.to_string(),
            key: key.to_string(),
        })?;
        raw.parse().map_err(|_| CfgError::InvalidValue {
            block: block.to_string(),
            key: key.to_string(),
            value: raw.to_string(),
        })
    }

    /// Like [`CfgFile::get`] but falls back to `default` when the value is
    /// missing. Unparsable values are still reported.
    pub fn get_or<T: FromStr>(&self, block: &str, key: &str, default: T) -> Result<T, CfgError> {
        match self.get(block, key) {
            Err(CfgError::MissingValue { .. }) => Ok(default),
            other => other,
        }
    }

    /// Reads a boolean, accepting `true/false`, `yes/no`, `on/off` and `1/0`.
    pub fn get_flag(&self, block: &str, key: &str) -> Result<bool, CfgError> {
        let raw: String = self.get(block, key)?;
        match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(CfgError::InvalidValue {
                block: block.to_string(),
                key: key.to_string(),
                value: raw,
            }),
        }
    }

    /// [`CfgFile::get_flag`] with a fallback for missing values.
    pub fn get_flag_or(&self, block: &str, key: &str, default: bool) -> Result<bool, CfgError> {
        match self.get_flag(block, key) {
            Err(CfgError::MissingValue { .. }) => Ok(default),
            other => other,
        }
    }

    /// The raw text of a value.
    pub fn get_raw(&self, block: &str, key: &str) -> Option<&str> {
        self.block(block)?
            .entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Sets `key` in `block`, creating both if needed.
    ///
    /// Values are quoted on output as needed, but names are written verbatim,
    /// so block names and keys that could not be read back are rejected with
    /// [`CfgError::InvalidName`]: empty names (other than [`GLOBAL_BLOCK`]),
    /// surrounding whitespace, line breaks, comment characters, quotes, `=` in
    /// keys and brackets in block names or at the start of a key.
    pub fn set<T: Display>(&mut self, block: &str, key: &str, value: T) -> Result<(), CfgError> {
        if block != GLOBAL_BLOCK {
            validate_name(block, &['[', ']'])?;
        }
        validate_name(key, &['='])?;
        if key.starts_with('[') {
            return Err(CfgError::InvalidName {
                name: key.to_string(),
                reason: "keys must not start with '['",
            });
        }
        self.insert(block, key, value.to_string());
        Ok(())
    }

    fn insert(&mut self, block: &str, key: &str, value: String) {
        let entries = &mut self.block_mut(block).entries;
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => entries.push((key.to_string(), value)),
        }
    }

    /// Whether `key` exists in `block`.
    pub fn has(&self, block: &str, key: &str) -> bool {
        self.get_raw(block, key).is_some()
    }

    /// Removes `key` from `block`, returning its raw value.
    pub fn remove(&mut self, block: &str, key: &str) -> Option<String> {
        let block = self.blocks.iter_mut().find(|b| b.name == block)?;
        let idx = block.entries.iter().position(|(k, _)| k == key)?;
        Some(block.entries.remove(idx).1)
    }

    /// Block names in insertion order. The global block is included only if it exists.
    pub fn blocks(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().map(|b| b.name.as_str())
    }

    /// Keys of `block` in insertion order.
    pub fn keys<'a>(&'a self, block: &str) -> impl Iterator<Item = &'a str> {
        self.block(block)
            .into_iter()
            .flat_map(|b| b.entries.iter().map(|(k, _)| k.as_str()))
    }

    fn block(&self, name: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.name == name)
    }

    fn block_mut(&mut self, name: &str) -> &mut Block {
        let idx = match self.blocks.iter().position(|b| b.name == name) {
            Some(idx) => idx,
            None => {
                let block = Block {
                    name: name.to_string(),
                    entries: Vec::new(),
                };
                // The global block has no header, so it must stay in front.
                if name == GLOBAL_BLOCK {
                    self.blocks.insert(0, block);
                    0
                } else {
                    self.blocks.push(block);
                    self.blocks.len() - 1
                }
            }
        };
        &mut self.blocks[idx]
    }
}

impl Display for CfgFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for block in &self.blocks {
            if block.name != GLOBAL_BLOCK {
                if !first {
                    writeln!(f)?;
                }
                writeln!(f, "[{}]", block.name)?;
            }
            for (key, value) in &block.entries {
                writeln!(f, "{key} = {}", quote_if_needed(value))?;
            }
            first = false;
        }
        Ok(())
    }
}

impl FromStr for CfgFile {
    type Err = CfgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn validate_name(name: &str, forbidden: &[char]) -> Result<(), CfgError> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.trim() != name {
        "name has surrounding whitespace"
    } else if name.contains(['\n', '\r']) {
        "name contains a line break"
    } else if name.contains(['#', ';', '"']) {
        "name contains a comment character or quote"
    } else if name.contains(forbidden) {
        "name contains a reserved character"
    } else {
        return Ok(());
    };
    Err(CfgError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

/// Cuts the line at the first '#' or ';' outside double quotes.
fn strip_comment(line: &str) -> Result<&str, String> {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            '#' | ';' if !in_quotes => return Ok(&line[..i]),
            _ => {}
        }
    }
    if in_quotes {
        Err("unterminated quoted value".to_string())
    } else {
        Ok(line)
    }
}

fn quote_if_needed(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value.trim() != value
        || value.contains(['#', ';', '"', '\n', '\t']);
    if needs_quotes {
        format!("\"{}\"", escape(value))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# leading comment
app_name = demo

[Log]
level = debug          ; trailing comment
file = "logs/#1.log"
max_size = 1024

[Camera]
move_speed = 0.25
"#;

    #[test]
    fn test_parse_blocks_and_values() {
        let cfg = CfgFile::parse(SAMPLE).expect("sample should parse");
        assert_eq!(cfg.get::<String>(GLOBAL_BLOCK, "app_name").unwrap(), "demo");
        assert_eq!(cfg.get::<String>("Log", "level").unwrap(), "debug");
        assert_eq!(cfg.get::<String>("Log", "file").unwrap(), "logs/#1.log");
        assert_eq!(cfg.get::<u64>("Log", "max_size").unwrap(), 1024);
        assert_eq!(cfg.get::<f32>("Camera", "move_speed").unwrap(), 0.25);
        assert_eq!(cfg.blocks().collect::<Vec<_>>(), vec!["", "Log", "Camera"]);
        assert_eq!(cfg.keys("Log").collect::<Vec<_>>(), vec!["level", "file", "max_size"]);
    }

    #[test]
    fn test_missing_and_invalid_values() {
        let cfg = CfgFile::parse(SAMPLE).unwrap();
        assert!(matches!(
            cfg.get::<u32>("Log", "nope"),
            Err(CfgError::MissingValue { .. })
        ));
        assert!(matches!(
            cfg.get::<u32>("Log", "level"),
            Err(CfgError::InvalidValue { .. })
        ));
        assert_eq!(cfg.get_or("Log", "nope", 7u32).unwrap(), 7);
        assert!(cfg.get_or("Log", "level", 7u32).is_err());
    }

    #[test]
    fn test_syntax_errors_report_line() {
        match CfgFile::parse("a = 1\n[Broken\n") {
            Err(CfgError::Syntax { line, .. }) => assert_eq!(line, 2),
            other => panic!("Expected syntax error, got {other:?}"),
        }
        match CfgFile::parse("\n\njust text") {
            Err(CfgError::Syntax { line, .. }) => assert_eq!(line, 3),
            other => panic!("Expected syntax error, got {other:?}"),
        }
        assert!(CfgFile::parse("k = \"open").is_err());
        assert!(CfgFile::parse(" = value").is_err());
        match CfgFile::parse("a = 1\n[]\nb = 2") {
            Err(CfgError::Syntax { line, .. }) => assert_eq!(line, 2),
            other => panic!("Expected syntax error for empty header, got {other:?}"),
        }
    }

    #[test]
    fn test_set_rejects_names_that_cannot_be_read_back() {
        let mut cfg = CfgFile::new();
        for key in ["color#1", "a;b", "x = y", "[k", " padded", "two\nlines", "say\"", ""] {
            assert!(
                matches!(cfg.set("S", key, "red"), Err(CfgError::InvalidName { .. })),
                "key {key:?} should be rejected"
            );
        }
        for block in ["a]b", "[a", "b#", " pad"] {
            assert!(
                matches!(cfg.set(block, "k", 1), Err(CfgError::InvalidName { .. })),
                "block {block:?} should be rejected"
            );
        }
        assert_eq!(cfg, CfgFile::new(), "rejected names must not create entries");

        cfg.set("Some Block", "key.with-dots_and[brackets]", "v").unwrap();
        let reparsed = CfgFile::parse(&cfg.to_string()).unwrap();
        assert_eq!(reparsed, cfg);
    }

    #[test]
    fn test_duplicate_key_keeps_last() {
        let cfg = CfgFile::parse("[A]\nx = 1\nx = 2\n").unwrap();
        assert_eq!(cfg.get::<i32>("A", "x").unwrap(), 2);
        assert_eq!(cfg.keys("A").count(), 1);
    }

    #[test]
    fn test_set_remove_has() {
        let mut cfg = CfgFile::new();
        cfg.set("Render", "vsync", true).unwrap();
        assert!(cfg.has("Render", "vsync"));
        assert!(cfg.get_flag("Render", "vsync").unwrap());
        cfg.set("Render", "vsync", "off").unwrap();
        assert!(!cfg.get_flag("Render", "vsync").unwrap());
        assert_eq!(cfg.remove("Render", "vsync").as_deref(), Some("off"));
        assert!(!cfg.has("Render", "vsync"));
        assert_eq!(cfg.remove("Render", "vsync"), None);
    }

    #[test]
    fn test_global_block_is_written_first() {
        let mut cfg = CfgFile::new();
        cfg.set("B", "k", 1).unwrap();
        cfg.set(GLOBAL_BLOCK, "top", "yes").unwrap();
        let text = cfg.to_string();
        assert!(text.starts_with("top = yes\n"), "unexpected output:\n{text}");
        assert_eq!(CfgFile::parse(&text).unwrap(), cfg);
    }

    #[test]
    fn test_special_values_survive_serialization() {
        let mut cfg = CfgFile::new();
        cfg.set("S", "comment_chars", "a # b ; c").unwrap();
        cfg.set("S", "padded", "  spaced  ").unwrap();
        cfg.set("S", "quote", "say \"hi\"").unwrap();
        cfg.set("S", "empty", "").unwrap();
        let reparsed = CfgFile::parse(&cfg.to_string()).unwrap();
        assert_eq!(reparsed, cfg);
    }
}
