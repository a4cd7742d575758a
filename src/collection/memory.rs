use std::cell::{Cell, RefCell};

use serde_json::Value;
use tracing::trace;

use crate::form::CollectionError;

use super::{CollectionId, SourceCollection};

/// In-memory array field backed by a `Vec<Value>`.
#[derive(Debug)]
pub struct ArrayField {
    id: Cell<CollectionId>,
    entries: RefCell<Vec<Value>>,
}

impl Default for ArrayField {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ArrayField {
    pub fn new(entries: Vec<Value>) -> Self {
        Self {
            id: Cell::new(CollectionId::next()),
            entries: RefCell::new(entries),
        }
    }

    /// Accepts a JSON array, or `null` for an empty field.
    pub fn from_value(value: Value) -> Result<Self, CollectionError> {
        match value {
            Value::Array(items) => Ok(Self::new(items)),
            Value::Null => Ok(Self::default()),
            other => Err(CollectionError::Rejected {
                pointer: String::new(),
                message: format!("expected an array, found {other}"),
            }),
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Array(self.entries.borrow().clone())
    }

    pub fn values(&self) -> Vec<Value> {
        self.entries.borrow().clone()
    }

    /// Swaps in a new set of entries. Reports a fresh identity, so any open
    /// draft is regenerated.
    pub fn replace_all(&self, entries: Vec<Value>) {
        *self.entries.borrow_mut() = entries;
        self.id.set(CollectionId::next());
    }
}

impl SourceCollection for ArrayField {
    fn id(&self) -> CollectionId {
        self.id.get()
    }

    fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    fn get(&self, index: usize) -> Option<Value> {
        self.entries.borrow().get(index).cloned()
    }

    async fn set(&self, index: usize, value: Value) -> Result<(), CollectionError> {
        let mut entries = self.entries.borrow_mut();
        let len = entries.len();
        let slot = entries
            .get_mut(index)
            .ok_or(CollectionError::OutOfBounds { index, len })?;
        *slot = value;
        trace!(index, "array field entry set");
        Ok(())
    }

    async fn append(&self, value: Value) -> Result<(), CollectionError> {
        self.entries.borrow_mut().push(value);
        trace!(len = self.len(), "array field entry appended");
        Ok(())
    }

    async fn prepend(&self, value: Value) -> Result<(), CollectionError> {
        self.entries.borrow_mut().insert(0, value);
        trace!(len = self.len(), "array field entry prepended");
        Ok(())
    }

    async fn remove(&self, index: usize) -> Result<(), CollectionError> {
        let mut entries = self.entries.borrow_mut();
        if index >= entries.len() {
            return Err(CollectionError::OutOfBounds {
                index,
                len: entries.len(),
            });
        }
        entries.remove(index);
        trace!(index, "array field entry removed");
        Ok(())
    }
}
