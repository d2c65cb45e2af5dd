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

//! String helpers shared by the config parser and the log sinks.

/// Default format used by [`timestamp`] callers in this library.
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats the current local time with a `strftime`-style format string.
///
/// ```
/// let ts = mpu_core::strings::timestamp("%Y");
/// assert_eq!(ts.len(), 4);
/// ```
pub fn timestamp(format: &str) -> String {
    chrono::Local::now().format(format).to_string()
}

/// Escapes newlines, tabs, backslashes and double quotes with a backslash.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}

/// Reverses [`escape`]. Unknown escape sequences are kept verbatim.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Returns `true` when `()`, `[]` and `{}` are balanced and properly nested.
pub fn check_brackets(s: &str) -> bool {
    let mut stack = Vec::new();
    for c in s.chars() {
        match c {
            '(' | '[' | '{' => stack.push(c),
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                if stack.pop() != Some(expected) {
                    return false;
                }
            }
            _ => {}
        }
    }
    stack.is_empty()
}

/// Splits `s` at the first `delimiter` not preceded by `escape`.
///
/// Returns the part before the delimiter and, if a delimiter was found, the
/// part after it.
///
/// ```
/// use mpu_core::strings::cut_after_first;
/// assert_eq!(cut_after_first("a = b # c", '#', '\\'), ("a = b ", Some(" c")));
/// assert_eq!(cut_after_first("a \\# b", '#', '\\'), ("a \\# b", None));
/// ```
pub fn cut_after_first(s: &str, delimiter: char, escape: char) -> (&str, Option<&str>) {
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
        } else if c == escape {
            escaped = true;
        } else if c == delimiter {
            return (&s[..i], Some(&s[i + c.len_utf8()..]));
        }
    }
    (s, None)
}

/// Final component of a path, accepting both `/` and `\` as separators.
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
