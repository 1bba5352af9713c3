//! JSON <-> query Value conversion and JSON entity getters

use std::collections::BTreeMap;

use crate::{Database, Value};

/// Convert a JSON scalar to a query Value.
///
/// Only booleans, integers and strings have a counterpart; everything else
/// (null, floats, arrays, objects) yields `None`.
pub fn json_to_value(v: &serde_json::Value) -> Option<Value> {
    match v {
        serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
        serde_json::Value::Number(n) => n.as_i64().map(Value::Int),
        serde_json::Value::String(s) => Some(Value::Str(s.clone())),
        _ => None,
    }
}

pub(crate) fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Defines one base-table getter per top-level scalar key of the entities.
///
/// A key's kind is fixed by its first scalar occurrence. Entities where the
/// key is missing or holds another kind read as that kind's zero value.
/// Returns the defined attribute names, sorted.
pub fn define_json_getters(db: &mut Database<serde_json::Value>) -> Vec<String> {
    let mut kinds: BTreeMap<String, Value> = BTreeMap::new();
    for entity in db.entities() {
        let Some(obj) = entity.as_object() else {
            continue;
        };
        for (key, field) in obj {
            if kinds.contains_key(key) {
                continue;
            }
            if let Some(value) = json_to_value(field) {
                kinds.insert(key.clone(), value.zero_of());
            }
        }
    }

    let table = db.base_table_mut();
    for (key, zero) in &kinds {
        let key_owned = key.clone();
        let zero = zero.clone();
        table.define(key.clone(), move |entity: &serde_json::Value| {
            entity
                .get(&key_owned)
                .and_then(json_to_value)
                .filter(|v| v.same_kind(&zero))
                .unwrap_or_else(|| zero.clone())
        });
    }
    kinds.into_keys().collect()
}
