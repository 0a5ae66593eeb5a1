//! Identifier normalization for cross-collection matching
//!
//! The backing API is inconsistent about identifier typing: the same record
//! may carry its id as a JSON number in one collection and as a numeric
//! string in the foreign-key field that points at it. Matching is therefore
//! done on a canonical token:
//! - stringify the value
//! - trim surrounding whitespace
//! - compare the resulting strings
//!
//! Leading zeros are deliberately preserved (`"07"` does not match `"7"`);
//! the rule is lenient about type, not about digits. Absent, null, and
//! all-whitespace values normalize to an empty token that matches nothing.

use serde_json::Value;
use std::fmt;

/// An identifier or foreign-key value as it arrived off the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// JSON number id (the usual json-server shape).
    Numeric(i64),
    /// String id, possibly numeric text.
    Text(String),
    /// Absent, null, or unusable value.
    Empty,
}

impl Key {
    /// Read a key out of a raw JSON value.
    ///
    /// Booleans, arrays, and objects are not identifiers; they normalize to
    /// `Empty` rather than erroring so that a malformed foreign-key field
    /// degrades into an unresolved reference downstream.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Key::Numeric(i),
                // Fractional ids are not a thing in this API; keep the raw
                // text so diagnostics can show what arrived.
                None => Key::Text(n.to_string()),
            },
            Value::String(s) if !s.trim().is_empty() => Key::Text(s.clone()),
            _ => Key::Empty,
        }
    }

    /// Canonical comparison token: trimmed string form, or `None` for empty.
    pub fn token(&self) -> Option<String> {
        match self {
            Key::Numeric(n) => Some(n.to_string()),
            Key::Text(s) => {
                let t = s.trim();
                if t.is_empty() {
                    None
                } else {
                    Some(t.to_string())
                }
            }
            Key::Empty => None,
        }
    }

    /// Two keys match iff both have tokens and the tokens are equal.
    /// Empty never matches anything, including another empty key.
    pub fn matches(&self, other: &Key) -> bool {
        match (self.token(), other.token()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.token().is_none()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token() {
            Some(t) => write!(f, "{}", t),
            None => write!(f, "<empty>"),
        }
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Numeric(n)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        if s.trim().is_empty() {
            Key::Empty
        } else {
            Key::Text(s.to_string())
        }
    }
}
