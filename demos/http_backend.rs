use mongo_log_appender::appender::appender;
use mongo_log_appender::config::Config;
use mongo_log_appender::event::{Level, LogEvent, Payload};
use mongo_log_appender::http::HttpConnector;
use mongo_log_appender::manager::ConnectionState;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

#[tokio::main]
async fn main() {
    let config = Config::new("http://127.0.0.1:8080/logs_db")
        .collection("log")
        .write_mode("safe");

    let sink = appender(config, Arc::new(HttpConnector::new())).expect("build appender");

    // Events submitted before the connection resolves are queued and
    // drained in order once it does.
    sink.append(&LogEvent::new(
        Level::info(),
        "demo",
        vec![Payload::text("Ready to log!")],
    ));
    sink.append(&LogEvent::new(
        Level::warn(),
        "demo",
        vec![Payload::object([
            ("$and", Payload::Array(vec![Payload::object([("a.d", Payload::Int(3))])])),
            ("test.1.2", Payload::Int(5)),
        ])],
    ));

    sleep(Duration::from_secs(1)).await;
    match sink.connection_state() {
        ConnectionState::Connected => println!("documents written"),
        state => println!("store not reachable, events remain queued ({:?})", state),
    }
}
