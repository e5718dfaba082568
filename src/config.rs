use crate::layout::Layout;
use std::collections::BTreeMap;

/// Default collection documents are written to when none is configured.
pub const DEFAULT_COLLECTION: &str = "log";

/// Scheme prepended to connection strings that carry none.
pub const DEFAULT_SCHEME: &str = "mongodb://";

/// Appender configuration, built once at setup time.
///
/// Only `connection_string` is required. `write` is kept as the raw
/// declarative string; see [`resolve_write_options`] for how it maps to
/// durability options. `connection_options` is an opaque map handed to
/// the store connector untouched.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub connection_string: Option<String>,
    pub collection_name: Option<String>,
    pub layout: Option<Layout>,
    /// Declarative layout name, resolved by [`crate::appender::configure`].
    pub layout_name: Option<String>,
    pub write: Option<String>,
    pub connection_options: BTreeMap<String, String>,
}

impl Config {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Config {
            connection_string: Some(connection_string.into()),
            ..Config::default()
        }
    }

    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection_name = Some(name.into());
        self
    }

    pub fn write_mode(mut self, mode: impl Into<String>) -> Self {
        self.write = Some(mode.into());
        self
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }
}

/// Error raised synchronously while building an appender.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("connection string is missing, cannot connect to the document store")]
    MissingConnectionString,
}

/// Durability options attached to every insert issued by one appender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Observe the write's completion and report failures locally.
    pub acknowledge: bool,
    /// Additionally require the write to be flushed to persistent
    /// storage before completion is reported.
    pub durable: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions { acknowledge: false, durable: false }
    }
}

/// Map the declarative write mode onto [`WriteOptions`].
///
/// `"normal"` acknowledges, `"safe"` acknowledges and journals; anything
/// else, including `None` and unrecognized strings, degrades to the
/// fire-and-forget default without raising an error.
pub fn resolve_write_options(mode: Option<&str>) -> WriteOptions {
    match mode {
        Some("normal") => WriteOptions { acknowledge: true, durable: false },
        Some("safe") => WriteOptions { acknowledge: true, durable: true },
        _ => WriteOptions::default(),
    }
}

/// Prefix the connection string with the store scheme when absent, so
/// bare `host:port/db` strings keep working.
pub fn ensure_scheme(connection_string: &str) -> String {
    if connection_string.contains("://") {
        connection_string.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME, connection_string)
    }
}
