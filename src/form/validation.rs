use std::fmt;
use std::future::Future;
use std::rc::Rc;

use jsonschema::Validator;
use serde_json::Value;

use crate::domain::ItemSchema;

use super::error::SchemaError;

/// One validation message attached to a draft field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub pointer: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(pointer: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pointer.is_empty() {
            write!(f, "<root>: {}", self.message)
        } else {
            write!(f, "{}: {}", self.pointer, self.message)
        }
    }
}

/// Validation owned by the schema engine. Resolves `Err` with every issue
/// found under the draft; the rules themselves are the implementor's.
pub trait ItemValidator {
    fn validate(&self, value: &Value) -> impl Future<Output = Result<(), Vec<FieldIssue>>>;
}

impl<V: ItemValidator> ItemValidator for Rc<V> {
    fn validate(&self, value: &Value) -> impl Future<Output = Result<(), Vec<FieldIssue>>> {
        (**self).validate(value)
    }
}

/// Validates drafts against the compiled element schema.
pub struct SchemaValidator {
    validator: Validator,
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator").finish_non_exhaustive()
    }
}

impl SchemaValidator {
    pub fn new(schema: &ItemSchema) -> Result<Self, SchemaError> {
        let validator = jsonschema::validator_for(schema.items())
            .map_err(|err| SchemaError::Compile(err.to_string()))?;
        Ok(Self { validator })
    }

    pub fn issues(&self, value: &Value) -> Vec<FieldIssue> {
        self.validator
            .iter_errors(value)
            .map(|error| FieldIssue::new(error.instance_path.to_string(), error.to_string()))
            .collect()
    }
}

impl ItemValidator for SchemaValidator {
    async fn validate(&self, value: &Value) -> Result<(), Vec<FieldIssue>> {
        if self.validator.is_valid(value) {
            return Ok(());
        }
        Err(self.issues(value))
    }
}
