use crate::event::LogEvent;
use std::fmt;
use std::sync::Arc;

/// Formatting function used when an event's leading data element is text.
pub type LayoutFn = Arc<dyn Fn(&LogEvent) -> String + Send + Sync>;

/// Converts a log event's raw message parts into a single storable string.
///
/// `MessagePassThrough` is the default: it joins the textual parts of the
/// event with single spaces and ignores everything else. `Basic` prefixes
/// the message with the timestamp, level name and category. `Custom`
/// wraps an arbitrary host-supplied formatting function.
#[derive(Clone)]
pub enum Layout {
    MessagePassThrough,
    Basic,
    Custom(LayoutFn),
}

impl Default for Layout {
    fn default() -> Self {
        Layout::MessagePassThrough
    }
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::MessagePassThrough => f.write_str("MessagePassThrough"),
            Layout::Basic => f.write_str("Basic"),
            Layout::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Layout {
    /// Resolve a declarative layout name into a concrete layout.
    ///
    /// Unrecognized names resolve to the default pass-through layout, in
    /// line with the host framework's lenient layout lookup.
    pub fn resolve(name: &str) -> Layout {
        match name {
            "basic" => Layout::Basic,
            // The colored console layouts carry no meaning in a stored
            // document; treat them as plain pass-through.
            "colored" | "coloured" => Layout::MessagePassThrough,
            "messagePassThrough" => Layout::MessagePassThrough,
            _ => Layout::MessagePassThrough,
        }
    }

    pub fn format(&self, event: &LogEvent) -> String {
        match self {
            Layout::MessagePassThrough => message_pass_through(event),
            Layout::Basic => format!(
                "[{}] [{}] {} - {}",
                event.timestamp.to_rfc3339(),
                event.level.name,
                event.category,
                message_pass_through(event)
            ),
            Layout::Custom(f) => f(event),
        }
    }

    pub fn custom<F>(f: F) -> Layout
    where
        F: Fn(&LogEvent) -> String + Send + Sync + 'static,
    {
        Layout::Custom(Arc::new(f))
    }
}

fn message_pass_through(event: &LogEvent) -> String {
    let parts: Vec<&str> = event.data.iter().filter_map(|p| p.as_text()).collect();
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Level, LogEvent, Payload};

    fn event_with(data: Vec<Payload>) -> LogEvent {
        LogEvent::new(Level::info(), "[default]", data)
    }

    #[test]
    fn pass_through_joins_textual_parts() {
        let event = event_with(vec![Payload::text("Ready"), Payload::text("to"), Payload::text("log!")]);
        assert_eq!(Layout::MessagePassThrough.format(&event), "Ready to log!");
    }

    #[test]
    fn pass_through_skips_non_text_parts() {
        let event = event_with(vec![Payload::text("count:"), Payload::Int(3)]);
        assert_eq!(Layout::MessagePassThrough.format(&event), "count:");
    }

    #[test]
    fn basic_layout_includes_level_and_category() {
        let event = event_with(vec![Payload::text("hello")]);
        let formatted = Layout::Basic.format(&event);
        assert!(formatted.contains("[INFO]"));
        assert!(formatted.contains("[default] - hello"));
    }

    #[test]
    fn unknown_names_resolve_to_pass_through() {
        assert!(matches!(Layout::resolve("nope"), Layout::MessagePassThrough));
        assert!(matches!(Layout::resolve("colored"), Layout::MessagePassThrough));
        assert!(matches!(Layout::resolve("basic"), Layout::Basic));
    }

    #[test]
    fn custom_layout_is_invoked() {
        let layout = Layout::custom(|e| format!("<{}>", e.category));
        let event = event_with(vec![Payload::text("x")]);
        assert_eq!(layout.format(&event), "<[default]>");
    }
}
