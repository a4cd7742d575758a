use indexmap::IndexMap;
use serde_json::Value;

use super::{
    error::DraftError,
    factory::DraftKey,
    pointer::{is_within, remove_at, set_at},
    validation::FieldIssue,
};

/// Emitted by every draft mutation after seeding.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftChange {
    pub revision: u64,
    pub value: Option<Value>,
}

/// Isolated editable copy of one collection element.
///
/// `draft` is `None` when the session had nothing to seed from. Field errors
/// are keyed by JSON pointer relative to the draft root and kept in the order
/// the validator reported them.
#[derive(Debug, Clone)]
pub struct DraftForm {
    key: DraftKey,
    seed: Option<Value>,
    draft: Option<Value>,
    revision: u64,
    errors: IndexMap<String, Vec<String>>,
}

impl DraftForm {
    pub(crate) fn seeded(key: DraftKey, seed: Option<Value>) -> Self {
        Self {
            key,
            draft: seed.clone(),
            seed,
            revision: 0,
            errors: IndexMap::new(),
        }
    }

    pub fn key(&self) -> DraftKey {
        self.key
    }

    /// Moves the draft to a new address without reseeding it.
    pub(crate) fn rekey(&mut self, key: DraftKey) {
        self.key = key;
    }

    pub fn draft(&self) -> Option<&Value> {
        self.draft.as_ref()
    }

    pub fn seed(&self) -> Option<&Value> {
        self.seed.as_ref()
    }

    /// Number of mutations applied since seeding.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True once the draft differs from the value it was seeded with.
    pub fn modified(&self) -> bool {
        self.draft != self.seed
    }

    pub fn replace(&mut self, value: Value) -> DraftChange {
        self.errors.clear();
        self.draft = Some(value);
        self.bump()
    }

    pub fn set_pointer(&mut self, pointer: &str, value: Value) -> Result<DraftChange, DraftError> {
        let mut next = self.draft.clone().unwrap_or(Value::Null);
        set_at(&mut next, pointer, value)?;
        self.draft = Some(next);
        self.clear_errors_within(pointer);
        Ok(self.bump())
    }

    pub fn remove_pointer(&mut self, pointer: &str) -> Result<DraftChange, DraftError> {
        let Some(current) = self.draft.as_mut() else {
            return Err(DraftError::Missing(pointer.to_string()));
        };
        if pointer.is_empty() {
            self.draft = None;
        } else {
            remove_at(current, pointer)?;
        }
        self.clear_errors_within(pointer);
        Ok(self.bump())
    }

    pub fn errors(&self) -> &IndexMap<String, Vec<String>> {
        &self.errors
    }

    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn field_errors(&self, pointer: &str) -> &[String] {
        self.errors.get(pointer).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replaces the error state with `issues`.
    pub fn set_errors(&mut self, issues: &[FieldIssue]) {
        self.errors.clear();
        for issue in issues {
            self.errors
                .entry(issue.pointer.clone())
                .or_default()
                .push(issue.message.clone());
        }
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    pub fn into_value(self) -> Option<Value> {
        self.draft
    }

    fn clear_errors_within(&mut self, pointer: &str) {
        self.errors.retain(|path, _| !is_within(path, pointer));
    }

    fn bump(&mut self) -> DraftChange {
        self.revision += 1;
        DraftChange {
            revision: self.revision,
            value: self.draft.clone(),
        }
    }
}
