use serde_json::{Map, Value};

/// Structural view of a JSON value as the merge policy sees it. `null` and a
/// missing key are both `Absent`.
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    Object(&'a Map<String, Value>),
    Array(&'a [Value]),
    Scalar(&'a Value),
    Absent,
}

impl<'a> Shape<'a> {
    pub fn of(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => Shape::Absent,
            Some(Value::Object(map)) => Shape::Object(map),
            Some(Value::Array(items)) => Shape::Array(items.as_slice()),
            Some(scalar) => Shape::Scalar(scalar),
        }
    }
}

/// Layers `source` over `target` and returns a new tree; neither input is touched.
///
/// Objects recurse, arrays from `source` replace the target array whole, and
/// every other `source` value (including `null`) overwrites. Keys only present
/// in `target` are kept. When either side is not an object the result is
/// `target` unchanged.
///
/// A `null` target field counts as absent, so a `source` object fills it
/// rather than passing the `null` through.
pub fn merge_deep(target: &Value, source: &Value) -> Value {
    let (Value::Object(target_map), Value::Object(source_map)) = (target, source) else {
        return target.clone();
    };

    let mut output = target_map.clone();
    for (key, value) in source_map {
        let merged = match Shape::of(Some(value)) {
            Shape::Object(_) => match target_map.get(key) {
                Some(existing) if !existing.is_null() => merge_deep(existing, value),
                _ => value.clone(),
            },
            Shape::Array(_) | Shape::Scalar(_) | Shape::Absent => value.clone(),
        };
        output.insert(key.clone(), merged);
    }

    Value::Object(output)
}

#[cfg(test)]
mod tests {
    use super::merge_deep;
    use serde_json::json;

    #[test]
    fn source_scalars_win() {
        let target = json!({ "name": "svc", "image": "repo/img:0.9" });
        let source = json!({ "image": "repo/img:1.0" });
        assert_eq!(
            merge_deep(&target, &source),
            json!({ "name": "svc", "image": "repo/img:1.0" })
        );
    }

    #[test]
    fn arrays_are_replaced_not_concatenated() {
        let target = json!({ "env": [{ "name": "X", "value": "1" }] });
        let source = json!({ "env": [{ "name": "Y", "value": "2" }] });
        let merged = merge_deep(&target, &source);
        assert_eq!(merged["env"], json!([{ "name": "Y", "value": "2" }]));
        assert_eq!(merged["env"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn empty_source_array_clears_target_array() {
        let target = json!({ "ports": [{ "containerPort": 80 }] });
        let source = json!({ "ports": [] });
        assert_eq!(merge_deep(&target, &source), json!({ "ports": [] }));
    }

    #[test]
    fn key_union_keeps_target_only_and_adds_source_only() {
        let target = json!({ "a": 1, "nested": { "keep": true } });
        let source = json!({ "b": 2, "nested": { "add": "x" } });
        assert_eq!(
            merge_deep(&target, &source),
            json!({ "a": 1, "b": 2, "nested": { "keep": true, "add": "x" } })
        );
    }

    #[test]
    fn nested_objects_recurse() {
        let target = json!({
            "resources": { "limits": { "cpu": "250m", "memory": "256Mi" } }
        });
        let source = json!({ "resources": { "limits": { "cpu": "500m" } } });
        assert_eq!(
            merge_deep(&target, &source),
            json!({ "resources": { "limits": { "cpu": "500m", "memory": "256Mi" } } })
        );
    }

    #[test]
    fn null_in_source_overwrites() {
        let target = json!({ "portName": "http1" });
        let source = json!({ "portName": null });
        assert_eq!(merge_deep(&target, &source), json!({ "portName": null }));
    }

    #[test]
    fn source_object_fills_null_target_field() {
        let target = json!({ "metadata": null });
        let source = json!({ "metadata": { "labels": [] } });
        assert_eq!(
            merge_deep(&target, &source),
            json!({ "metadata": { "labels": [] } })
        );
    }

    #[test]
    fn object_over_scalar_keeps_target_scalar() {
        let target = json!({ "spec": "opaque" });
        let source = json!({ "spec": { "containers": [] } });
        assert_eq!(merge_deep(&target, &source), json!({ "spec": "opaque" }));
    }

    #[test]
    fn non_objects_pass_target_through() {
        assert_eq!(merge_deep(&json!([1, 2]), &json!({ "a": 1 })), json!([1, 2]));
        assert_eq!(merge_deep(&json!({ "a": 1 }), &json!("x")), json!({ "a": 1 }));
        assert_eq!(merge_deep(&json!(null), &json!({ "a": 1 })), json!(null));
    }

    #[test]
    fn inputs_are_left_untouched() {
        let target = json!({ "env": [{ "name": "OLD" }], "keep": 1 });
        let source = json!({ "env": [{ "name": "NEW" }] });
        let target_before = target.clone();
        let source_before = source.clone();
        let _ = merge_deep(&target, &source);
        assert_eq!(target, target_before);
        assert_eq!(source, source_before);
    }
}
