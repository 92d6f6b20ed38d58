// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parser for line-oriented `key=value` properties documents.
//!
//! Supports the usual properties conventions:
//!
//! - `#` and `!` comment lines, blank lines
//! - `key=value`, `key: value` and `key value` separators
//! - line continuation with a trailing backslash
//! - `\t`, `\n`, `\r`, `\f` and `\uXXXX` escapes; any other escaped character stands for itself

use crate::domain::{ConfigError, Result};
use crate::ports::ConfigParser;
use std::str::Chars;

/// Properties parser implementation.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::PropertiesParser;
/// use layercfg::ports::ConfigParser;
///
/// let parser = PropertiesParser::new();
/// let entries = parser.parse("# db\ndb.host = localhost\ndb.port:5432").unwrap();
/// assert_eq!(entries[0], ("db.host".to_string(), "localhost".to_string()));
/// assert_eq!(entries[1], ("db.port".to_string(), "5432".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PropertiesParser;

impl PropertiesParser {
    /// Creates a new properties parser.
    pub fn new() -> Self {
        PropertiesParser
    }

    /// Joins natural lines into logical lines, dropping comments and blanks.
    fn logical_lines(content: &str) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current: Option<String> = None;

        for natural in content.lines() {
            let trimmed = natural.trim_start_matches([' ', '\t', '\x0c']);
            let continuing = current.is_some();

            if !continuing && (trimmed.is_empty() || trimmed.starts_with(['#', '!'])) {
                continue;
            }

            let (body, continues) = match trailing_backslashes(trimmed) % 2 {
                1 => (&trimmed[..trimmed.len() - 1], true),
                _ => (trimmed, false),
            };

            let line = current.get_or_insert_with(String::new);
            line.push_str(body);

            if !continues {
                if let Some(done) = current.take() {
                    lines.push(done);
                }
            }
        }

        // A continuation on the last line simply ends the document.
        if let Some(done) = current.take() {
            lines.push(done);
        }
        lines
    }

    /// Splits a logical line into its raw key and raw value.
    fn split_entry(line: &str) -> (&str, &str) {
        let bytes = line.as_bytes();
        let mut i = 0;
        let mut key_end = line.len();
        let mut escaped = false;

        while i < bytes.len() {
            let b = bytes[i];
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'=' || b == b':' || is_blank(b) {
                key_end = i;
                break;
            }
            i += 1;
        }

        let key = &line[..key_end];
        let mut rest = &line[key_end..];

        rest = rest.trim_start_matches([' ', '\t', '\x0c']);
        if let Some(stripped) = rest.strip_prefix(['=', ':']) {
            rest = stripped.trim_start_matches([' ', '\t', '\x0c']);
        }
        (key, rest)
    }

    /// Resolves escape sequences.
    fn unescape(raw: &str) -> Result<String> {
        let mut out = String::with_capacity(raw.len());
        let mut chars = raw.chars();

        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('t') => out.push('\t'),
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('f') => out.push('\x0c'),
                Some('u') => out.push(Self::unicode_escape(&mut chars)?),
                Some(other) => out.push(other),
                None => {}
            }
        }
        Ok(out)
    }

    /// Decodes the digits after `\u`. A high surrogate must be followed by a
    /// `\u` low surrogate; the pair becomes one character.
    fn unicode_escape(chars: &mut Chars<'_>) -> Result<char> {
        let (hex, unit) = hex4(chars);
        let unit = unit.ok_or_else(|| malformed_unicode(&hex))?;
        if !(0xD800..0xDC00).contains(&unit) {
            return char::from_u32(unit).ok_or_else(|| malformed_unicode(&hex));
        }

        let mut lookahead = chars.clone();
        if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
            if let (low_hex, Some(low @ 0xDC00..=0xDFFF)) = hex4(&mut lookahead) {
                *chars = lookahead;
                return char::from_u32(0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00))
                    .ok_or_else(|| malformed_unicode(&low_hex));
            }
        }
        Err(malformed_unicode(&hex))
    }
}

fn hex4(chars: &mut Chars<'_>) -> (String, Option<u32>) {
    let hex: String = chars.by_ref().take(4).collect();
    let unit = (hex.len() == 4)
        .then(|| u32::from_str_radix(&hex, 16).ok())
        .flatten();
    (hex, unit)
}

fn malformed_unicode(hex: &str) -> ConfigError {
    ConfigError::ParseError {
        path: None,
        message: format!("Malformed \\uxxxx encoding: \\u{}", hex),
        source: None,
    }
}

fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t' || b == 0x0c
}

fn trailing_backslashes(line: &str) -> usize {
    line.bytes().rev().take_while(|&b| b == b'\\').count()
}

impl ConfigParser for PropertiesParser {
    fn parse(&self, content: &str) -> Result<Vec<(String, String)>> {
        Self::logical_lines(content)
            .iter()
            .map(|line| {
                let (key, value) = Self::split_entry(line);
                Ok((Self::unescape(key)?, Self::unescape(value)?))
            })
            .collect()
    }

    fn supported_extensions(&self) -> &[&str] {
        &["properties"]
    }
}
