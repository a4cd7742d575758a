//! The authoritative list a draft session edits, as seen by the controller.

use std::future::Future;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

use crate::form::CollectionError;

mod memory;

pub use memory::ArrayField;

/// Identity of a collection instance. Drafts are scoped to one identity;
/// a collection that is replaced wholesale should report a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollectionId(u64);

impl CollectionId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Where the active item lives.
///
/// `Pending` marks a draft-only item with no slot in the collection yet; it
/// never addresses the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemAddress {
    Slot(usize),
    Pending,
}

impl ItemAddress {
    pub fn slot(self) -> Option<usize> {
        match self {
            ItemAddress::Slot(index) => Some(index),
            ItemAddress::Pending => None,
        }
    }
}

impl From<usize> for ItemAddress {
    fn from(index: usize) -> Self {
        ItemAddress::Slot(index)
    }
}

/// Operations the schema engine exposes for an array field.
///
/// Reads are synchronous snapshots; mutations may suspend and may fail.
pub trait SourceCollection {
    fn id(&self) -> CollectionId;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<Value>;

    fn set(&self, index: usize, value: Value) -> impl Future<Output = Result<(), CollectionError>>;

    fn append(&self, value: Value) -> impl Future<Output = Result<(), CollectionError>>;

    fn prepend(&self, value: Value) -> impl Future<Output = Result<(), CollectionError>>;

    fn remove(&self, index: usize) -> impl Future<Output = Result<(), CollectionError>>;
}

impl<C: SourceCollection> SourceCollection for Rc<C> {
    fn id(&self) -> CollectionId {
        (**self).id()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn get(&self, index: usize) -> Option<Value> {
        (**self).get(index)
    }

    fn set(&self, index: usize, value: Value) -> impl Future<Output = Result<(), CollectionError>> {
        (**self).set(index, value)
    }

    fn append(&self, value: Value) -> impl Future<Output = Result<(), CollectionError>> {
        (**self).append(value)
    }

    fn prepend(&self, value: Value) -> impl Future<Output = Result<(), CollectionError>> {
        (**self).prepend(value)
    }

    fn remove(&self, index: usize) -> impl Future<Output = Result<(), CollectionError>> {
        (**self).remove(index)
    }
}
