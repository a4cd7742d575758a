use serde_json::Value;

/// Extension keyword carrying per-list editor configuration.
pub const EDITOR_EXTENSION: &str = "x-item-editor";

pub fn extension<'a>(schema: &'a Value, key: &str) -> Option<&'a Value> {
    if !key.starts_with("x-") {
        return None;
    }
    schema.as_object().and_then(|map| map.get(key))
}

/// Returns the text when `value` is a string with visible content.
pub fn non_blank_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
}
