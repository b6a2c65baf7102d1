use crate::constants::markers::{SERVER_ONLY_FIELDS, TYPENAME_KEY};
use serde_json::{Map, Value};

/// A fetch answer with no record in it: `null` or an empty object.
pub fn is_absent_record(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Removes the GraphQL `__typename` marker at every depth, arrays included.
pub fn strip_typename(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| key.as_str() != TYPENAME_KEY)
                .map(|(key, val)| (key.clone(), strip_typename(val)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(strip_typename).collect()),
        other => other.clone(),
    }
}

/// Prepares a fetched service record for use as a merge target: introspection
/// markers go everywhere, read-only server fields go from the top level.
pub fn sanitize_existing(value: &Value) -> Value {
    let mut cleaned = strip_typename(value);
    if let Value::Object(map) = &mut cleaned {
        for field in SERVER_ONLY_FIELDS {
            map.remove(*field);
        }
    }
    cleaned
}
