use mongo_log_appender::appender::appender;
use mongo_log_appender::config::Config;
use mongo_log_appender::layer::AppenderLayer;
use mongo_log_appender::memory::MemoryConnector;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

#[tokio::main]
async fn main() {
    // For demonstration the documents land in an in-process store; swap
    // in `HttpConnector` to persist against a real backend.
    let connector = MemoryConnector::new();
    let store = connector.store();

    let sink = appender(Config::new("localhost:27017/demo_log"), Arc::new(connector))
        .expect("build appender");

    let subscriber = Registry::default()
        .with(AppenderLayer::new(sink))
        .with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber).expect("set global subscriber");

    info!("starting service");
    error!(user_id = 42, reason = "invalid password", "authentication failed");

    sleep(Duration::from_millis(200)).await;

    for document in store.documents("log") {
        println!("stored: {:?}", document);
    }
}
