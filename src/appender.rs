use crate::config::{resolve_write_options, Config, ConfigError, DEFAULT_COLLECTION};
use crate::event::{LogDocument, LogEvent};
use crate::layout::Layout;
use crate::manager::{ConnectionManager, ConnectionState};
use crate::normalize::normalize;
use crate::store::StoreConnector;
use std::sync::Arc;
use tokio::sync::watch;

/// The composed sink: normalizes, sanitizes, and hands documents to the
/// connection manager. Calling [`MongoAppender::append`] never blocks
/// the caller and never fails; backend errors stay on the diagnostic
/// channel.
pub struct MongoAppender {
    layout: Layout,
    manager: ConnectionManager,
}

impl MongoAppender {
    /// Append one log event.
    ///
    /// The event's data parts are folded into a single sanitized value
    /// and wrapped into the persisted `{timestamp, data, level,
    /// category}` document.
    pub fn append(&self, event: &LogEvent) {
        let data = normalize(event, &self.layout);
        self.manager.write(LogDocument {
            timestamp: event.timestamp,
            data,
            level: event.level.clone(),
            category: event.category.clone(),
        });
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.manager.state()
    }

    /// Watch handle over the connection lifecycle, for hosts and tests
    /// that want to await readiness.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.manager.subscribe()
    }

    /// Tear down the background task. Documents still queued are lost.
    pub fn shutdown(self) {
        self.manager.shutdown();
    }
}

/// Build an appender from a configuration and an explicit store
/// connector.
///
/// Fails synchronously with [`ConfigError::MissingConnectionString`]
/// before any connect attempt when no connection string is configured.
/// Must be called within a Tokio runtime, since construction spawns the
/// connect-and-drain task.
pub fn appender(
    config: Config,
    connector: Arc<dyn StoreConnector>,
) -> Result<MongoAppender, ConfigError> {
    let connection_string = config
        .connection_string
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(ConfigError::MissingConnectionString)?;

    let layout = config.layout.clone().unwrap_or_default();
    let collection_name = config
        .collection_name
        .clone()
        .unwrap_or_else(|| DEFAULT_COLLECTION.to_string());
    let write_options = resolve_write_options(config.write.as_deref());

    let manager = ConnectionManager::new(
        connector,
        connection_string,
        config.connection_options.clone(),
        collection_name,
        write_options,
    );

    Ok(MongoAppender { layout, manager })
}

/// Like [`appender`], but first resolves a declarative `layout_name`
/// from the configuration into a concrete [`Layout`]. An explicitly set
/// layout function takes precedence over the name.
pub fn configure(
    mut config: Config,
    connector: Arc<dyn StoreConnector>,
) -> Result<MongoAppender, ConfigError> {
    if config.layout.is_none() {
        if let Some(name) = config.layout_name.take() {
            config.layout = Some(Layout::resolve(&name));
        }
    }

    appender(config, connector)
}
