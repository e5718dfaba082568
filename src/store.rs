use crate::config::WriteOptions;
use crate::event::LogDocument;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::Arc;

/// Error type shared by the asynchronous store traits.
pub type StoreError = Box<dyn Error + Send + Sync>;

/// Establishes connections to a concrete document store.
///
/// Implementations wrap a real driver (HTTP, in-memory, etc). The
/// connection manager calls `connect` exactly once per appender from a
/// background task, so implementations are free to take their time; the
/// appender buffers events until the future resolves.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    /// Open a connection to the store.
    ///
    /// **Parameters**
    /// - `connection_string`: scheme-prefixed target, e.g.
    ///   `mongodb://host:27017/db`.
    /// - `options`: opaque driver options from the configuration,
    ///   passed through untouched.
    ///
    /// **Returns**
    /// - `Ok(..)` with a live connection handle.
    /// - `Err(..)` if the store is unreachable; the appender for this
    ///   connector instance then stays disconnected for good.
    async fn connect(
        &self,
        connection_string: &str,
        options: &BTreeMap<String, String>,
    ) -> Result<Arc<dyn StoreConnection>, StoreError>;
}

/// A live connection handle that can hand out collections by name.
pub trait StoreConnection: Send + Sync {
    fn collection(&self, name: &str) -> Arc<dyn Collection>;
}

/// A single document collection inside a connected store.
#[async_trait]
pub trait Collection: Send + Sync {
    /// Insert one document.
    ///
    /// With `options.acknowledge` set the returned result reflects the
    /// store's acknowledgement (and, with `durable`, its journal flush).
    /// Without it, implementations should fire the write and resolve
    /// without observing a completion; the caller ignores the result
    /// either way in that mode.
    async fn insert(&self, document: &LogDocument, options: WriteOptions) -> Result<(), StoreError>;
}
