//! Pattern Matcher Module
//!
//! Compiles glob-style key patterns for bulk invalidation.
//!
//! # Syntax
//! - `*` matches any run of characters, including none
//! - `?` matches exactly one character
//! - `[abc]`, `[a-z]` match one character from the set; `[!abc]` negates it
//! - `\` makes the next character literal
//!
//! Everything else matches itself. Patterns are anchored at both ends.

use regex::Regex;

use crate::error::{CacheError, Result};

// == Key Pattern ==
/// A validated glob pattern over cache keys.
#[derive(Debug, Clone)]
pub struct KeyPattern {
    source: String,
    regex: Regex,
}

impl KeyPattern {
    // == Parse ==
    /// Compiles a glob pattern.
    ///
    /// Fails with `InvalidPattern` when the pattern is empty, has an
    /// unterminated class or trailing escape, or yields an invalid range.
    pub fn parse(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(CacheError::InvalidPattern(
                "pattern must not be empty".to_string(),
            ));
        }

        let translated = glob_to_regex(pattern)?;
        let regex = Regex::new(&translated)
            .map_err(|e| CacheError::InvalidPattern(format!("{}: {}", pattern, e)))?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    // == Is Match ==
    /// Checks whether the whole key matches the pattern.
    pub fn is_match(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }

    /// Returns the glob the pattern was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl std::str::FromStr for KeyPattern {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// == Translation ==
fn glob_to_regex(pattern: &str) -> Result<String> {
    let mut out = String::with_capacity(pattern.len() * 2 + 8);
    out.push_str("(?s)^");

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                // Collapse runs of stars
                while chars.peek() == Some(&'*') {
                    chars.next();
                }
                out.push_str(".*");
            }
            '?' => out.push('.'),
            '\\' => match chars.next() {
                Some(literal) => push_literal(&mut out, literal),
                None => {
                    return Err(CacheError::InvalidPattern(format!(
                        "{}: trailing escape",
                        pattern
                    )))
                }
            },
            '[' => {
                let mut class = Vec::new();
                let mut closed = false;

                if matches!(chars.peek(), Some('!') | Some('^')) {
                    chars.next();
                    out.push_str("[^");
                } else {
                    out.push('[');
                }
                // A leading ']' is a member, not the terminator
                if chars.peek() == Some(&']') {
                    chars.next();
                    class.push(']');
                }
                for member in chars.by_ref() {
                    if member == ']' {
                        closed = true;
                        break;
                    }
                    class.push(member);
                }
                if !closed {
                    return Err(CacheError::InvalidPattern(format!(
                        "{}: unterminated character class",
                        pattern
                    )));
                }

                let last = class.len() - 1;
                for (i, member) in class.into_iter().enumerate() {
                    if member == '-' && i != 0 && i != last {
                        out.push('-');
                    } else if matches!(member, '\\' | '[' | ']' | '^' | '-' | '&' | '~') {
                        out.push('\\');
                        out.push(member);
                    } else {
                        out.push(member);
                    }
                }
                out.push(']');
            }
            other => push_literal(&mut out, other),
        }
    }

    out.push('$');
    Ok(out)
}

fn push_literal(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}
