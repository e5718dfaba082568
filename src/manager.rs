use crate::config::{ensure_scheme, WriteOptions};
use crate::event::LogDocument;
use crate::store::{Collection, StoreConnection, StoreConnector, StoreError};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::error;

/// Lifecycle of one appender's store connection.
///
/// There is no reconnection: a failed connect leaves the manager
/// `Disconnected` for the rest of its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Owns the asynchronous connection to the target collection and the
/// queue of documents waiting for it.
///
/// Construction spawns a background task that connects, captures the
/// collection handle, and then drains the queue strictly in arrival
/// order. [`ConnectionManager::write`] never blocks and never fails from
/// the caller's point of view: while the connection is pending (or
/// permanently lost) documents simply accumulate in the unbounded queue.
/// Queue growth is unbounded: there is no backpressure signal upstream
/// to throttle producers.
pub struct ConnectionManager {
    sender: mpsc::UnboundedSender<LogDocument>,
    state_rx: watch::Receiver<ConnectionState>,
    handle: JoinHandle<()>,
}

impl ConnectionManager {
    /// Start connecting and return immediately.
    ///
    /// **Parameters**
    /// - `connector`: store driver; called exactly once.
    /// - `connection_string`: raw configured target, scheme-prefixed
    ///   here if it carries none.
    /// - `connection_options`: opaque driver options, passed through.
    /// - `collection_name`: collection all documents go to.
    /// - `write_options`: durability options applied to every insert.
    pub fn new(
        connector: Arc<dyn StoreConnector>,
        connection_string: &str,
        connection_options: BTreeMap<String, String>,
        collection_name: String,
        write_options: WriteOptions,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<LogDocument>();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);

        let target = ensure_scheme(connection_string);
        let handle = tokio::spawn(run(
            connector,
            target,
            connection_options,
            collection_name,
            write_options,
            rx,
            state_tx,
        ));

        ConnectionManager { sender: tx, state_rx, handle }
    }

    /// Hand a document over for writing. Never blocks; while the
    /// connection is not yet (or no longer going to be) ready the
    /// document is queued.
    pub fn write(&self, document: LogDocument) {
        // The receiver lives as long as the background task, which never
        // exits on its own; a send can only fail after `shutdown`.
        let _ = self.sender.send(document);
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Watch handle for connection-state transitions, mainly for hosts
    /// and tests that want to await readiness.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Abort the background task. Queued documents are dropped.
    pub fn shutdown(self) {
        self.handle.abort();
    }
}

async fn run(
    connector: Arc<dyn StoreConnector>,
    target: String,
    connection_options: BTreeMap<String, String>,
    collection_name: String,
    write_options: WriteOptions,
    mut rx: mpsc::UnboundedReceiver<LogDocument>,
    state_tx: watch::Sender<ConnectionState>,
) {
    let connection = match connector.connect(&target, &connection_options).await {
        Ok(connection) => connection,
        Err(e) => {
            let _ = state_tx.send(ConnectionState::Disconnected);
            report_connect_error(&target, e);
            // Keep the queue alive so producers never observe a closed
            // channel; documents accumulate here forever.
            std::future::pending::<()>().await;
            unreachable!();
        }
    };

    let collection = connection.collection(&collection_name);
    let _ = state_tx.send(ConnectionState::Connected);

    // Drains the pre-connection backlog first, then serves new writes;
    // the channel keeps everything in arrival order.
    while let Some(document) = rx.recv().await {
        let result = collection.insert(&document, write_options).await;
        if write_options.acknowledge {
            if let Err(e) = result {
                error!(
                    connection = %target,
                    collection = %collection_name,
                    document = ?document,
                    "error writing log document: {}",
                    e
                );
            }
        }
    }
}

fn report_connect_error(target: &str, e: StoreError) {
    error!(connection = %target, "failed to connect to the document store: {}", e);
}
