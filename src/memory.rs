use crate::config::WriteOptions;
use crate::event::LogDocument;
use crate::store::{Collection, StoreConnection, StoreConnector, StoreError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// In-process document store, for unit tests and for measuring the
/// appender's own overhead without any I/O.
///
/// The store handle is cheaply cloneable and can be inspected while an
/// appender writes into it from its background task.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<Mutex<BTreeMap<String, Vec<LogDocument>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Snapshot of every document written to `collection` so far, in
    /// write order.
    pub fn documents(&self, collection: &str) -> Vec<LogDocument> {
        self.collections
            .lock()
            .expect("memory store lock poisoned")
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .expect("memory store lock poisoned")
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn push(&self, collection: &str, document: LogDocument) {
        self.collections
            .lock()
            .expect("memory store lock poisoned")
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }
}

/// Lets a test hold a [`MemoryConnector`]'s connect attempt open until
/// it decides the "server" has come up.
#[derive(Clone)]
pub struct ConnectGate {
    notify: Arc<Notify>,
}

impl ConnectGate {
    /// Let the pending (or upcoming) connect attempt complete.
    pub fn release(&self) {
        self.notify.notify_one();
    }
}

/// [`StoreConnector`] over a [`MemoryStore`].
#[derive(Clone)]
pub struct MemoryConnector {
    store: MemoryStore,
    gate: Option<Arc<Notify>>,
    fail_connect: bool,
    fail_writes: bool,
}

impl MemoryConnector {
    /// Connector whose connect resolves immediately.
    pub fn new() -> Self {
        MemoryConnector {
            store: MemoryStore::new(),
            gate: None,
            fail_connect: false,
            fail_writes: false,
        }
    }

    /// Connector whose connect stays pending until the returned gate is
    /// released.
    pub fn gated() -> (Self, ConnectGate) {
        let notify = Arc::new(Notify::new());
        let connector = MemoryConnector {
            store: MemoryStore::new(),
            gate: Some(Arc::clone(&notify)),
            fail_connect: false,
            fail_writes: false,
        };
        (connector, ConnectGate { notify })
    }

    /// Connector whose connect always fails.
    pub fn failing_connect() -> Self {
        MemoryConnector { fail_connect: true, ..MemoryConnector::new() }
    }

    /// Connector whose collections reject every insert.
    pub fn failing_writes() -> Self {
        MemoryConnector { fail_writes: true, ..MemoryConnector::new() }
    }

    /// Handle onto the backing store for assertions.
    pub fn store(&self) -> MemoryStore {
        self.store.clone()
    }
}

impl Default for MemoryConnector {
    fn default() -> Self {
        MemoryConnector::new()
    }
}

#[async_trait]
impl StoreConnector for MemoryConnector {
    async fn connect(
        &self,
        connection_string: &str,
        _options: &BTreeMap<String, String>,
    ) -> Result<Arc<dyn StoreConnection>, StoreError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        if self.fail_connect {
            return Err(format!("memory store refused connection to {}", connection_string).into());
        }

        Ok(Arc::new(MemoryConnection {
            store: self.store.clone(),
            fail_writes: self.fail_writes,
        }))
    }
}

struct MemoryConnection {
    store: MemoryStore,
    fail_writes: bool,
}

impl StoreConnection for MemoryConnection {
    fn collection(&self, name: &str) -> Arc<dyn Collection> {
        Arc::new(MemoryCollection {
            store: self.store.clone(),
            name: name.to_string(),
            fail_writes: self.fail_writes,
        })
    }
}

struct MemoryCollection {
    store: MemoryStore,
    name: String,
    fail_writes: bool,
}

#[async_trait]
impl Collection for MemoryCollection {
    async fn insert(&self, document: &LogDocument, _options: WriteOptions) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(format!("memory collection {} rejected the insert", self.name).into());
        }

        self.store.push(&self.name, document.clone());
        Ok(())
    }
}
