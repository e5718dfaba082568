use crate::event::Payload;
use std::collections::BTreeMap;

/// Rewrite a payload so every field name in it is safe to persist.
///
/// The document store rejects field names that start with `$` or contain
/// `.`, so keys are rewritten at every depth: a leading `$` becomes the
/// literal token `_dollar_` and every `.` becomes `_dot_`. Values are
/// untouched except for errors, which are turned into a plain
/// `{name, message}` record (a raw error would persist as an empty
/// document since its fields are not part of the structural value).
///
/// Total over all inputs: never panics, never errors. Exempt types
/// (`DateTime`, `Regex`, `ObjectId`) and non-structural values are
/// returned unchanged.
pub fn sanitize(value: Payload) -> Payload {
    match value {
        Payload::Error(e) => {
            let mut record = BTreeMap::new();
            let message = if e.message.is_empty() { "error".to_string() } else { e.message.clone() };
            record.insert("name".to_string(), Payload::Text(e.display_form()));
            record.insert("message".to_string(), Payload::Text(message));
            Payload::Object(record)
        }
        Payload::Array(items) => Payload::Array(items.into_iter().map(sanitize).collect()),
        Payload::Object(entries) => {
            // Rewritten keys can collide with distinct originals; the last
            // key in iteration order wins.
            let mut rewritten = BTreeMap::new();
            for (key, value) in entries {
                rewritten.insert(sanitize_key(&key), sanitize(value));
            }
            Payload::Object(rewritten)
        }
        other => other,
    }
}

/// Rewrite a single field name: leading `$` → `_dollar_`, every `.` → `_dot_`.
fn sanitize_key(key: &str) -> String {
    let prefixed = match key.strip_prefix('$') {
        Some(rest) => format!("_dollar_{}", rest),
        None => key.to_string(),
    };
    prefixed.replace('.', "_dot_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::LoggedError;
    use chrono::Utc;

    #[test]
    fn leading_dollar_is_replaced_only_at_the_front() {
        let value = Payload::object([("$or", Payload::Int(1)), ("a$b", Payload::Int(2))]);
        let expected = Payload::object([("_dollar_or", Payload::Int(1)), ("a$b", Payload::Int(2))]);
        assert_eq!(sanitize(value), expected);
    }

    #[test]
    fn every_dot_is_replaced_at_every_depth() {
        let value = Payload::object([(
            "outer.key",
            Payload::object([("in.ner.most", Payload::text("x"))]),
        )]);
        let expected = Payload::object([(
            "outer_dot_key",
            Payload::object([("in_dot_ner_dot_most", Payload::text("x"))]),
        )]);
        assert_eq!(sanitize(value), expected);
    }

    #[test]
    fn second_application_is_a_no_op() {
        let value = Payload::object([
            ("$and", Payload::Array(vec![Payload::object([("a.d", Payload::Int(3))])])),
            ("test.1.2", Payload::Int(5)),
        ]);

        let once = sanitize(value);
        let twice = sanitize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn exempt_values_pass_through_unchanged() {
        let now = Utc::now();
        assert_eq!(sanitize(Payload::DateTime(now)), Payload::DateTime(now));
        assert_eq!(
            sanitize(Payload::Regex("aaa".to_string())),
            Payload::Regex("aaa".to_string())
        );
        assert_eq!(
            sanitize(Payload::ObjectId("507f1f77bcf86cd799439011".to_string())),
            Payload::ObjectId("507f1f77bcf86cd799439011".to_string())
        );
        assert_eq!(sanitize(Payload::Int(42)), Payload::Int(42));
        assert_eq!(sanitize(Payload::Null), Payload::Null);
    }

    #[test]
    fn errors_become_a_name_message_record() {
        let value = Payload::Error(LoggedError::new("Error", "wayne"));
        let expected = Payload::object([
            ("name", Payload::text("Error: wayne")),
            ("message", Payload::text("wayne")),
        ]);
        assert_eq!(sanitize(value), expected);
    }

    #[test]
    fn empty_error_message_falls_back_to_error() {
        let value = Payload::Error(LoggedError::new("Error", ""));
        match sanitize(value) {
            Payload::Object(entries) => {
                assert_eq!(entries.get("message"), Some(&Payload::text("error")));
                assert_eq!(entries.len(), 2);
            }
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn reserved_keys_inside_arrays_are_rewritten() {
        let value = Payload::object([
            (
                "$and",
                Payload::Array(vec![
                    Payload::object([("a.d", Payload::Int(3))]),
                    Payload::object([("$or", Payload::object([("a", Payload::Int(1))]))]),
                ]),
            ),
            ("test.1.2", Payload::Int(5)),
        ]);

        let expected = Payload::object([
            (
                "_dollar_and",
                Payload::Array(vec![
                    Payload::object([("a_dot_d", Payload::Int(3))]),
                    Payload::object([("_dollar_or", Payload::object([("a", Payload::Int(1))]))]),
                ]),
            ),
            ("test_dot_1_dot_2", Payload::Int(5)),
        ]);

        assert_eq!(sanitize(value), expected);
    }

    #[test]
    fn colliding_rewrites_keep_the_last_key_in_iteration_order() {
        // "$a" and "_dollar_a" both rewrite to "_dollar_a"; BTreeMap
        // iterates "$a" first, so the original "_dollar_a" entry wins.
        let value = Payload::object([("$a", Payload::Int(1)), ("_dollar_a", Payload::Int(2))]);
        let expected = Payload::object([("_dollar_a", Payload::Int(2))]);
        assert_eq!(sanitize(value), expected);
    }
}
