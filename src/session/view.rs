use indexmap::IndexMap;
use serde_json::Value;

use crate::collection::ItemAddress;

use super::{options::HostKind, outcome::SessionState};

/// Everything a dialog, popover or accordion host renders for the open
/// session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub state: SessionState,
    pub address: ItemAddress,
    pub title: String,
    pub description: String,
    pub is_dirty: bool,
    pub should_shake: bool,
    pub host: HostKind,
    pub errors: IndexMap<String, Vec<String>>,
    pub draft: Option<Value>,
}
