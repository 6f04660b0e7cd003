use serde_json::{Map, Value};
use std::path::Path;
use testshape_core::{MigrateError, Result, scan::parse_jsonc};

pub(crate) fn parse(path: &Path, text: &str) -> Result<Value> {
    parse_jsonc(text).map_err(|e| MigrateError::json(path, e))
}

/// Two-space pretty JSON with a trailing newline.
pub(crate) fn render(path: &Path, value: &Value) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value).map_err(|e| MigrateError::json(path, e))?;
    text.push('\n');
    Ok(text)
}

pub(crate) fn string_array(items: &[&str]) -> Value {
    Value::Array(items.iter().map(|s| Value::String(s.to_string())).collect())
}

/// The object under `key`, replacing whatever non-object value sits there.
pub(crate) fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let slot = map.entry(key.to_string()).or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(obj) => obj,
        _ => unreachable!("slot was just set to an object"),
    }
}

/// Sets `key` to `value` unless it already holds exactly that.
pub(crate) fn set_if_different(map: &mut Map<String, Value>, key: &str, value: Value) {
    if map.get(key) != Some(&value) {
        map.insert(key.to_string(), value);
    }
}

pub(crate) fn root_object<'a>(path: &Path, value: &'a mut Value) -> Result<&'a mut Map<String, Value>> {
    value.as_object_mut().ok_or_else(|| MigrateError::shape(path, "top-level value is not an object"))
}
