use serde_json::Value;

use crate::collection::{CollectionId, ItemAddress, SourceCollection};

use super::draft::DraftForm;

/// Inputs a draft is a pure function of. A cached draft whose key no longer
/// matches the session must be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DraftKey {
    pub collection: CollectionId,
    pub address: ItemAddress,
    pub auto_save: bool,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DraftFormFactory;

impl DraftFormFactory {
    pub fn key<C: SourceCollection>(
        collection: &C,
        address: ItemAddress,
        auto_save: bool,
    ) -> DraftKey {
        DraftKey {
            collection: collection.id(),
            address,
            auto_save,
        }
    }

    /// Seeds from the collection slot when `address` names one, else from
    /// `draft_seed`, else leaves the draft undefined.
    pub fn create<C: SourceCollection>(
        collection: &C,
        address: ItemAddress,
        draft_seed: Option<&Value>,
        auto_save: bool,
    ) -> DraftForm {
        let key = Self::key(collection, address, auto_save);
        let seed = address
            .slot()
            .and_then(|index| collection.get(index))
            .or_else(|| draft_seed.cloned());
        DraftForm::seeded(key, seed)
    }
}
