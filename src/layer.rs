use crate::appender::MongoAppender;
use crate::event::{Level, LogEvent, LoggedError, Payload};
use chrono::Utc;
use std::collections::BTreeMap;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that feeds every observed event into a
/// [`MongoAppender`].
///
/// The event's `message` field becomes the leading textual data element;
/// any remaining fields become a trailing object, so plain messages take
/// the layout path while structured events land as documents. Level
/// filtering is left to the host subscriber; this layer forwards
/// everything it sees.
pub struct AppenderLayer {
    appender: MongoAppender,
}

impl AppenderLayer {
    pub fn new(appender: MongoAppender) -> Self {
        AppenderLayer { appender }
    }
}

impl<S> Layer<S> for AppenderLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, _ctx: Context<'_, S>) {
        let mut fields = BTreeMap::new();
        let mut message: Option<String> = None;

        let mut visitor = PayloadVisitor { fields: &mut fields, message: &mut message };
        event.record(&mut visitor);

        let mut data = Vec::new();
        if let Some(message) = message {
            data.push(Payload::Text(message));
        }
        if !fields.is_empty() {
            data.push(Payload::Object(fields));
        }

        let meta = event.metadata();
        self.appender.append(&LogEvent {
            timestamp: Utc::now(),
            data,
            level: map_level(meta.level()),
            category: meta.target().to_string(),
        });
    }
}

fn map_level(level: &tracing::Level) -> Level {
    match *level {
        tracing::Level::TRACE => Level::trace(),
        tracing::Level::DEBUG => Level::debug(),
        tracing::Level::INFO => Level::info(),
        tracing::Level::WARN => Level::warn(),
        tracing::Level::ERROR => Level::error(),
    }
}

struct PayloadVisitor<'a> {
    fields: &'a mut BTreeMap<String, Payload>,
    message: &'a mut Option<String>,
}

impl<'a> Visit for PayloadVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), Payload::text(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), Payload::Int(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        let value = i64::try_from(value)
            .map(Payload::Int)
            .unwrap_or(Payload::Float(value as f64));
        self.fields.insert(field.name().to_string(), value);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), Payload::Float(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), Payload::Bool(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.fields.insert(
            field.name().to_string(),
            Payload::Error(LoggedError::new("Error", value.to_string())),
        );
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        // The message of `info!("...")` style events arrives here as
        // format args rather than through `record_str`.
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), Payload::Text(format!("{:?}", value)));
        }
    }
}
