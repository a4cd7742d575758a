use std::cell::RefCell;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::collection::ItemAddress;

/// Whether a new item is placed into the collection on open or only on save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CreationMode {
    #[default]
    Inserted,
    DraftOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CreationMethod {
    #[default]
    Append,
    Prepend,
}

/// The single item a list currently has open.
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveItem {
    Existing {
        index: usize,
    },
    NewInserted {
        index: usize,
        method: CreationMethod,
    },
    NewDraftOnly {
        method: CreationMethod,
        seed: Option<Value>,
    },
}

impl ActiveItem {
    pub fn address(&self) -> ItemAddress {
        match self {
            ActiveItem::Existing { index } | ActiveItem::NewInserted { index, .. } => {
                ItemAddress::Slot(*index)
            }
            ActiveItem::NewDraftOnly { .. } => ItemAddress::Pending,
        }
    }

    pub fn is_new(&self) -> bool {
        !matches!(self, ActiveItem::Existing { .. })
    }

    pub fn creation_mode(&self) -> Option<CreationMode> {
        match self {
            ActiveItem::Existing { .. } => None,
            ActiveItem::NewInserted { .. } => Some(CreationMode::Inserted),
            ActiveItem::NewDraftOnly { .. } => Some(CreationMode::DraftOnly),
        }
    }

    pub fn creation_method(&self) -> Option<CreationMethod> {
        match self {
            ActiveItem::Existing { .. } => None,
            ActiveItem::NewInserted { method, .. } | ActiveItem::NewDraftOnly { method, .. } => {
                Some(*method)
            }
        }
    }

    pub fn draft_seed(&self) -> Option<&Value> {
        match self {
            ActiveItem::NewDraftOnly { seed, .. } => seed.as_ref(),
            _ => None,
        }
    }
}

/// Per-list record of which item is open for editing.
///
/// One instance belongs to one list field; it outlives individual sessions
/// and is shared with the controller that drives them.
#[derive(Debug, Default)]
pub struct ActiveItemManager {
    active: RefCell<Option<ActiveItem>>,
}

impl ActiveItemManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the whole state with `item`.
    pub fn set_active_item(&self, item: ActiveItem) {
        debug!(address = ?item.address(), is_new = item.is_new(), "active item set");
        *self.active.borrow_mut() = Some(item);
    }

    pub fn has_active_item(&self, address: ItemAddress) -> bool {
        self.active_index() == Some(address)
    }

    /// Clears the state only if `address` is still the active one.
    pub fn remove_active_item(&self, address: ItemAddress) -> bool {
        let mut active = self.active.borrow_mut();
        if active.as_ref().is_some_and(|item| item.address() == address) {
            *active = None;
            return true;
        }
        debug!(
            ?address,
            current = ?active.as_ref().map(ActiveItem::address),
            "ignoring stale active item removal"
        );
        false
    }

    pub fn is_new_item(&self, address: ItemAddress) -> bool {
        self.active
            .borrow()
            .as_ref()
            .is_some_and(|item| item.address() == address && item.is_new())
    }

    pub fn active_item(&self) -> Option<ActiveItem> {
        self.active.borrow().clone()
    }

    pub fn active_index(&self) -> Option<ItemAddress> {
        self.active.borrow().as_ref().map(ActiveItem::address)
    }

    pub fn is_new(&self) -> bool {
        self.active.borrow().as_ref().is_some_and(ActiveItem::is_new)
    }

    pub fn creation_mode(&self) -> Option<CreationMode> {
        self.active
            .borrow()
            .as_ref()
            .and_then(ActiveItem::creation_mode)
    }

    pub fn creation_method(&self) -> Option<CreationMethod> {
        self.active
            .borrow()
            .as_ref()
            .and_then(ActiveItem::creation_method)
    }

    pub fn draft_seed(&self) -> Option<Value> {
        self.active
            .borrow()
            .as_ref()
            .and_then(|item| item.draft_seed().cloned())
    }
}
