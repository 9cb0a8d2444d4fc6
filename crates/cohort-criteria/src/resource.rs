//! Construction of canonical resource projections
//!
//! Builds the JSON projection of a clinical fact from dotted-path value
//! assignments, the shape row mappers hand to the evaluator.

use serde_json::{Map, Value};

use crate::model::ClinicalEntityType;

/// Build the JSON projection of a resource of `entity_type`
///
/// Each `(path, values)` pair writes its values at the dotted path. A single
/// segment path holds a scalar (or an array of scalars for several values);
/// deeper paths place one object per value in an array at the innermost
/// container, e.g. `code.coding.code = [a, b]` becomes
/// `{"code": {"coding": [{"code": "a"}, {"code": "b"}]}}`.
pub fn build_resource<I, K>(entity_type: ClinicalEntityType, id: impl Into<String>, values: I) -> Value
where
    I: IntoIterator<Item = (K, Vec<String>)>,
    K: AsRef<str>,
{
    let mut root = Map::new();
    root.insert(
        "resourceType".to_string(),
        Value::String(entity_type.resource_type().to_string()),
    );
    root.insert("id".to_string(), Value::String(id.into()));

    for (path, path_values) in values {
        let segments: Vec<&str> = path.as_ref().split('.').filter(|s| !s.is_empty()).collect();
        write_values(&mut root, &segments, path_values);
    }

    Value::Object(root)
}

fn write_values(root: &mut Map<String, Value>, segments: &[&str], values: Vec<String>) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let Some((container, ancestors)) = parents.split_last() else {
        let value = match values.len() {
            1 => values.into_iter().map(Value::String).next().unwrap_or(Value::Null),
            _ => Value::Array(values.into_iter().map(Value::String).collect()),
        };
        root.insert((*last).to_string(), value);
        return;
    };

    let Some(parent) = object_at(root, ancestors) else {
        return;
    };
    let entries = values.into_iter().map(|v| {
        let mut entry = Map::new();
        entry.insert((*last).to_string(), Value::String(v));
        Value::Object(entry)
    });

    match parent.get_mut(*container) {
        Some(Value::Array(existing)) => existing.extend(entries),
        _ => {
            parent.insert((*container).to_string(), Value::Array(entries.collect()));
        }
    }
}

fn object_at<'a>(root: &'a mut Map<String, Value>, segments: &[&str]) -> Option<&'a mut Map<String, Value>> {
    let mut current = root;
    for segment in segments {
        let slot = current
            .entry((*segment).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        current = slot.as_object_mut()?;
    }
    Some(current)
}
