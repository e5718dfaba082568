use crate::event::{LogEvent, Payload};
use crate::layout::Layout;
use crate::sanitize::sanitize;

/// Turn an event's raw data parts into the single value that gets stored.
///
/// - Leading textual element: the whole event goes through the layout and
///   its output becomes the data.
/// - Exactly one element: it is unwrapped so single objects and errors
///   are stored as themselves rather than a one-element array.
/// - Anything else (empty, or several non-text elements): the original
///   sequence is kept.
///
/// The result is always piped through [`sanitize`] so no reserved field
/// name can reach the store.
pub fn normalize(event: &LogEvent, layout: &Layout) -> Payload {
    let data = match event.data.as_slice() {
        [first, ..] if first.is_text() => Payload::Text(layout.format(event)),
        [single] => single.clone(),
        _ => Payload::Array(event.data.clone()),
    };

    sanitize(data)
}
