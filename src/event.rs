use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// A single log data value, covering every payload kind the appender
/// knows how to persist.
///
/// The set is closed on purpose: the normalizer and sanitizer dispatch
/// over these variants instead of sniffing runtime shapes. `DateTime`,
/// `Regex` and `ObjectId` are exempt from key sanitization because the
/// document store has native support for them and they must round-trip
/// unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(DateTime<Utc>),
    /// A regular-expression pattern, carried as its source text.
    Regex(String),
    /// An opaque document identifier (hex form), passed through as-is.
    ObjectId(String),
    /// A captured error. Persisting one naively would yield an empty
    /// document, so the sanitizer rewrites it into a plain record.
    Error(LoggedError),
    Array(Vec<Payload>),
    Object(BTreeMap<String, Payload>),
}

/// Name and message of an error value captured into a log event.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedError {
    pub name: String,
    pub message: String,
}

impl LoggedError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        LoggedError { name: name.into(), message: message.into() }
    }

    /// String form of the error, e.g. `"Error: connection refused"`.
    pub fn display_form(&self) -> String {
        format!("{}: {}", self.name, self.message)
    }
}

impl Payload {
    pub fn text(value: impl Into<String>) -> Payload {
        Payload::Text(value.into())
    }

    /// Build an object payload from key/value pairs.
    pub fn object<K, I>(entries: I) -> Payload
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Payload)>,
    {
        Payload::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Payload::Text(_))
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Payload::Null => serializer.serialize_unit(),
            Payload::Bool(b) => serializer.serialize_bool(*b),
            Payload::Int(i) => serializer.serialize_i64(*i),
            Payload::Float(f) => serializer.serialize_f64(*f),
            Payload::Text(s) => serializer.serialize_str(s),
            Payload::DateTime(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            Payload::Regex(pattern) => serializer.serialize_str(pattern),
            Payload::ObjectId(id) => serializer.serialize_str(id),
            Payload::Error(e) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("name", &e.name)?;
                map.serialize_entry("message", &e.message)?;
                map.end()
            }
            Payload::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Payload::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

/// Severity of a log event as the framework's numeric/name pair.
///
/// The numeric scale follows the classic appender convention
/// (DEBUG 10000, INFO 20000, ... FATAL 50000) so documents sort by
/// severity with a plain numeric comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Level {
    pub value: i64,
    pub name: String,
}

impl Level {
    pub fn new(value: i64, name: impl Into<String>) -> Self {
        Level { value, name: name.into() }
    }

    pub fn trace() -> Self {
        Level::new(5_000, "TRACE")
    }

    pub fn debug() -> Self {
        Level::new(10_000, "DEBUG")
    }

    pub fn info() -> Self {
        Level::new(20_000, "INFO")
    }

    pub fn warn() -> Self {
        Level::new(30_000, "WARN")
    }

    pub fn error() -> Self {
        Level::new(40_000, "ERROR")
    }

    pub fn fatal() -> Self {
        Level::new(50_000, "FATAL")
    }
}

/// A log event as handed over by the host logging framework.
///
/// `data` holds one or more payload values; the appender normalizes it
/// into a single value before persistence but never mutates the other
/// fields.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub data: Vec<Payload>,
    pub level: Level,
    pub category: String,
}

impl LogEvent {
    pub fn new(level: Level, category: impl Into<String>, data: Vec<Payload>) -> Self {
        LogEvent {
            timestamp: Utc::now(),
            data,
            level,
            category: category.into(),
        }
    }
}

/// The document shape written to the store: `{timestamp, data, level, category}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogDocument {
    pub timestamp: DateTime<Utc>,
    pub data: Payload,
    pub level: Level,
    pub category: String,
}
