use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::{
    domain::ItemSchema,
    form::SchemaError,
};

use super::{
    active::{CreationMethod, CreationMode},
    shake::DEFAULT_SHAKE_DURATION,
};

/// Which presentation shell hosts the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HostKind {
    #[default]
    Dialog,
    Popover,
    Accordion,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub auto_save: bool,
    pub creation_mode: CreationMode,
    pub creation_method: CreationMethod,
    pub initial_value: Option<Value>,
    pub shake_duration: Duration,
    pub host: HostKind,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            auto_save: false,
            creation_mode: CreationMode::Inserted,
            creation_method: CreationMethod::Append,
            initial_value: None,
            shake_duration: DEFAULT_SHAKE_DURATION,
            host: HostKind::Dialog,
        }
    }
}

/// Shape of the `x-item-editor` extension object.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct EditorMetadata {
    auto_save: Option<bool>,
    creation_mode: Option<CreationMode>,
    creation_method: Option<CreationMethod>,
    initial_value: Option<Value>,
    shake_ms: Option<u64>,
    host: Option<HostKind>,
}

impl SessionOptions {
    /// Defaults overlaid with the schema's `x-item-editor` metadata.
    pub fn from_schema(schema: &ItemSchema) -> Result<Self, SchemaError> {
        Self::default().with_schema_metadata(schema)
    }

    pub fn with_schema_metadata(self, schema: &ItemSchema) -> Result<Self, SchemaError> {
        match schema.editor_metadata() {
            Some(metadata) => self.with_metadata(metadata),
            None => Ok(self),
        }
    }

    pub fn with_metadata(mut self, metadata: &Value) -> Result<Self, SchemaError> {
        let raw = EditorMetadata::deserialize(metadata).map_err(SchemaError::EditorMetadata)?;
        if let Some(auto_save) = raw.auto_save {
            self.auto_save = auto_save;
        }
        if let Some(mode) = raw.creation_mode {
            self.creation_mode = mode;
        }
        if let Some(method) = raw.creation_method {
            self.creation_method = method;
        }
        if raw.initial_value.is_some() {
            self.initial_value = raw.initial_value;
        }
        if let Some(millis) = raw.shake_ms {
            self.shake_duration = Duration::from_millis(millis);
        }
        if let Some(host) = raw.host {
            self.host = host;
        }
        Ok(self)
    }

    pub fn with_auto_save(mut self, enabled: bool) -> Self {
        self.auto_save = enabled;
        self
    }

    pub fn with_creation_mode(mut self, mode: CreationMode) -> Self {
        self.creation_mode = mode;
        self
    }

    pub fn with_creation_method(mut self, method: CreationMethod) -> Self {
        self.creation_method = method;
        self
    }

    pub fn with_initial_value(mut self, value: Value) -> Self {
        self.initial_value = Some(value);
        self
    }

    pub fn with_shake_duration(mut self, duration: Duration) -> Self {
        self.shake_duration = duration;
        self
    }

    pub fn with_host(mut self, host: HostKind) -> Self {
        self.host = host;
        self
    }
}
