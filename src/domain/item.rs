use schemars::JsonSchema;
use serde_json::{Value, json};

use crate::form::SchemaError;

use super::metadata::{EDITOR_EXTENSION, extension};

/// Schema view of a single array field: its element schema plus the
/// editor metadata declared on the array itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSchema {
    items: Value,
    editor: Option<Value>,
}

impl ItemSchema {
    /// Wraps an element schema directly, with no editor metadata.
    pub fn from_items(items: Value) -> Self {
        Self {
            items,
            editor: None,
        }
    }

    /// Derives the element schema from a Rust type.
    pub fn for_type<T: JsonSchema>() -> Self {
        let root = schemars::schema_for!(T);
        let items = serde_json::to_value(root).unwrap_or_else(|_| json!({}));
        Self::from_items(items)
    }

    /// Reads an `{"type": "array", "items": ...}` schema.
    pub fn from_array_schema(schema: &Value) -> Result<Self, SchemaError> {
        Self::at_pointer(schema, "")
    }

    /// Reads the array schema found at `pointer` inside a larger document,
    /// e.g. `/properties/addresses`.
    pub fn at_pointer(document: &Value, pointer: &str) -> Result<Self, SchemaError> {
        let schema = document
            .pointer(pointer)
            .ok_or_else(|| SchemaError::NotAnArray {
                pointer: pointer.to_string(),
                found: "<missing>".to_string(),
            })?;
        let map = schema.as_object().ok_or(SchemaError::NotAnObject)?;
        if let Some(kind) = map.get("type")
            && !declares_array(kind)
        {
            return Err(SchemaError::NotAnArray {
                pointer: pointer.to_string(),
                found: kind.to_string(),
            });
        }
        let items = map.get("items").cloned().unwrap_or_else(|| json!({}));
        Ok(Self {
            items,
            editor: extension(schema, EDITOR_EXTENSION).cloned(),
        })
    }

    pub fn with_editor_metadata(mut self, editor: Value) -> Self {
        self.editor = Some(editor);
        self
    }

    pub fn items(&self) -> &Value {
        &self.items
    }

    pub fn title(&self) -> Option<&Value> {
        self.keyword("title")
    }

    pub fn description(&self) -> Option<&Value> {
        self.keyword("description")
    }

    /// The element schema's `default`, used to seed placeholders.
    pub fn default_item(&self) -> Option<&Value> {
        self.keyword("default")
    }

    pub fn editor_metadata(&self) -> Option<&Value> {
        self.editor.as_ref()
    }

    fn keyword(&self, key: &str) -> Option<&Value> {
        self.items.as_object().and_then(|map| map.get(key))
    }
}

fn declares_array(kind: &Value) -> bool {
    match kind {
        Value::String(name) => name == "array",
        Value::Array(names) => names.iter().any(|name| name == "array"),
        _ => false,
    }
}
