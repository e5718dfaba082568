use mongo_log_appender::appender::appender;
use mongo_log_appender::config::Config;
use mongo_log_appender::event::{Level, Payload};
use mongo_log_appender::layer::AppenderLayer;
use mongo_log_appender::memory::{MemoryConnector, MemoryStore};
use std::sync::Arc;
use tokio::time::{sleep, timeout, Duration};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

async fn wait_for_documents(store: &MemoryStore, collection: &str, count: usize) {
    timeout(Duration::from_secs(5), async {
        while store.len(collection) < count {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("timed out waiting for documents");
}

#[tokio::test]
async fn plain_messages_land_as_text_documents() {
    let connector = MemoryConnector::new();
    let store = connector.store();
    let sink = appender(Config::new("localhost:27017/test_log"), Arc::new(connector)).unwrap();

    let subscriber = Registry::default().with(AppenderLayer::new(sink));
    tracing::subscriber::with_default(subscriber, || {
        info!(target: "demo", "Ready to log!");
    });

    wait_for_documents(&store, "log", 1).await;

    let docs = store.documents("log");
    assert_eq!(docs[0].data, Payload::text("Ready to log!"));
    assert_eq!(docs[0].category, "demo");
    assert_eq!(docs[0].level, Level::info());
}

#[tokio::test]
async fn event_fields_land_as_a_sanitized_object() {
    let connector = MemoryConnector::new();
    let store = connector.store();
    let sink = appender(Config::new("localhost:27017/test_log"), Arc::new(connector)).unwrap();

    let subscriber = Registry::default().with(AppenderLayer::new(sink));
    tracing::subscriber::with_default(subscriber, || {
        warn!(target: "auth", user_id = 42, reason = "invalid password", "authentication failed");
    });

    wait_for_documents(&store, "log", 1).await;

    let docs = store.documents("log");
    assert_eq!(docs[0].level, Level::warn());
    assert_eq!(docs[0].category, "auth");
    // Message first, remaining fields as a trailing object; the textual
    // lead element means the pass-through layout formats the document.
    assert_eq!(docs[0].data, Payload::text("authentication failed"));
}

#[tokio::test]
async fn field_only_events_are_stored_structurally() {
    let connector = MemoryConnector::new();
    let store = connector.store();
    let sink = appender(Config::new("localhost:27017/test_log"), Arc::new(connector)).unwrap();

    let subscriber = Registry::default().with(AppenderLayer::new(sink));
    tracing::subscriber::with_default(subscriber, || {
        info!(target: "metrics", requests = 17i64, healthy = true);
    });

    wait_for_documents(&store, "log", 1).await;

    let docs = store.documents("log");
    assert_eq!(
        docs[0].data,
        Payload::object([
            ("requests", Payload::Int(17)),
            ("healthy", Payload::Bool(true)),
        ])
    );
}
